use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::ui::{Icons, theme};

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

/// Failure line for stderr, kept free of icons and color so scripts can match it
pub fn error_line(err: &dyn Display) -> String {
    format!("error: {}", err)
}

pub fn error(err: &dyn Display) {
    eprintln!("{}", error_line(err));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn heading(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
