//! Glyph presets, color constants, and duration formatting for progress lines.

use std::{sync::LazyLock, time::Duration};

use console::Style;

/// Green color style for completed bars.
pub static GREEN: LazyLock<Style> = LazyLock::new(|| Style::new().green());

/// Red color style for bars running past the slow threshold.
pub static RED: LazyLock<Style> = LazyLock::new(|| Style::new().red());

/// Yellow color style for borderline slow bars.
pub static YELLOW: LazyLock<Style> = LazyLock::new(|| Style::new().yellow());

/// Glyph pair used to draw the filled and unfilled portions of a bar track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGlyphs {
    /// Glyph for the completed portion.
    pub filled: char,
    /// Glyph for the remaining portion.
    pub empty: char,
}

impl BarGlyphs {
    /// Plain ASCII glyphs, safe on any terminal.
    pub const fn ascii() -> Self {
        Self {
            filled: '#',
            empty: '-',
        }
    }

    /// Unicode block glyphs for terminals that render them.
    pub const fn block() -> Self {
        Self {
            filled: '█',
            empty: '░',
        }
    }
}

impl Default for BarGlyphs {
    fn default() -> Self {
        Self::ascii()
    }
}

/// Formats a duration as zero-padded `hh:mm:ss`.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
