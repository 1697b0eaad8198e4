//! # Output Configuration
//!
//! This module decides whether output is colored and holds the handful of
//! styles the reports use.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! The decision is made once per run and passed down as a plain `bool`;
//! nothing here is global.

use std::env;

use console::Style;

/// Output configuration for controlling colors.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// Whether ANSI colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// The colors used across reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Clean repos and success lines.
    Good,
    /// Repos with problems and error counts.
    Bad,
    /// Plain files and repo-free directories.
    Neutral,
    Link,
    Mercurial,
    /// Tree-drawing glyphs.
    Guide,
}

impl Tone {
    fn style(self) -> Style {
        let style = match self {
            Tone::Good => Style::new().green().bold(),
            Tone::Bad => Style::new().red().bold(),
            Tone::Neutral => Style::new().blue().bold(),
            Tone::Link => Style::new().cyan().bold(),
            Tone::Mercurial => Style::new().magenta().bold(),
            Tone::Guide => Style::new().dim(),
        };
        // Whether to color was already decided by the caller
        style.force_styling(true)
    }
}

/// Wrap `text` in the tone's ANSI codes when `color` is on.
pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if color {
        tone.style().apply_to(text).to_string()
    } else {
        text.to_string()
    }
}
