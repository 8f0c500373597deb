//! Terminal styling for prompts and verdicts.

use console::style;
use is_terminal::IsTerminal;

/// Resolved color policy for one session.
pub struct Theme {
    enabled: bool,
}

impl Theme {
    /// `want_color` comes from config; it is still ignored when stdout is not
    /// a terminal or `NO_COLOR` is set.
    pub fn new(want_color: bool) -> Self {
        Self {
            enabled: want_color && !Self::should_disable_colors(),
        }
    }

    pub fn should_disable_colors() -> bool {
        std::env::var_os("NO_COLOR").is_some() || !std::io::stdout().is_terminal()
    }

    /// Section headings for each operation.
    pub fn header(&self, text: &str) -> String {
        if self.enabled {
            style(text).cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// A significant test result.
    pub fn significant(&self, text: &str) -> String {
        if self.enabled {
            style(text).red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// A non-significant test result.
    pub fn not_significant(&self, text: &str) -> String {
        if self.enabled {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_theme_passes_text_through() {
        let theme = Theme { enabled: false };
        assert_eq!(theme.header("Menu"), "Menu");
        assert_eq!(theme.significant("SIGNIFICANT"), "SIGNIFICANT");
        assert_eq!(theme.not_significant("NOT significant"), "NOT significant");
    }

    #[test]
    fn styled_text_keeps_its_content() {
        let theme = Theme { enabled: true };
        assert!(theme.header("Menu").contains("Menu"));
        assert!(theme.significant("SIGNIFICANT").contains("SIGNIFICANT"));
    }
}
