//! Machine-readable output
//!
//! Human mode prints tables; JSON mode prints one envelope per command on stdout.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    data: T,
}

pub fn success_envelope<T: Serialize>(command: &str, data: T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Envelope { ok: true, command, data })
}

/// Print a success envelope. No-op in human mode.
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> serde_json::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", success_envelope(command, data)?);
    }
    Ok(())
}
