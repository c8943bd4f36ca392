// src/output/render.rs

use owo_colors::OwoColorize;

/// Turns a host-tagged line into its display form, `<host> -> <content>`.
///
/// Coloured mode paints the host green and the separator yellow; plain mode
/// emits bare text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    colored: bool,
}

impl Renderer {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn render_line(&self, host: &str, content: &str) -> String {
        if self.colored {
            format!("{} {} {}", host.green(), "->".yellow(), content)
        } else {
            format!("{host} -> {content}")
        }
    }

    /// Diagnostic text for stderr.
    pub fn render_diagnostic(&self, text: &str) -> String {
        if self.colored {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Colour follows `silent` and the `NO_COLOR` convention.
pub fn colors_enabled(silent: bool) -> bool {
    !silent && std::env::var_os("NO_COLOR").is_none()
}
