use std::sync::OnceLock;

use owo_colors::Style;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub dim: Style,
}

impl Theme {
    /// Colored only when both streams are terminals, so piped output stays plain
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() || !console::Term::stderr().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            dim: Style::new().white().dimmed(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            dim: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
