//! Composable display segments that each render one fragment of a progress line.
//!
//! Rendering is a pure function of the [`RenderState`] snapshot: no segment
//! reads a clock or mutates shared state, and every arithmetic edge case
//! (zero total, zero elapsed, count past total) degrades to defined output
//! instead of failing.

use std::time::Duration;

use crate::DEFAULT_BAR_WIDTH;
use crate::styles::BarGlyphs;
use crate::styles::format_hms;

/// Snapshot of a bar's state handed to each segment during rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Items completed so far. May exceed `total`.
    pub count: u64,
    /// Items expected. May be zero.
    pub total: u64,
    /// Time since the bar was started.
    pub elapsed: Duration,
}

impl RenderState {
    /// Items completed per second, `0.0` until the first item lands or
    /// while no time has passed.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.count == 0 || secs == 0.0 {
            0.0
        } else {
            self.count as f64 / secs
        }
    }
}

/// One composable unit of a progress line.
///
/// Segments are plain values: cloning a sequence gives the new owner a
/// fully independent copy, which is what lets a bar snapshot the process
/// default at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `"3 of 10"` item counter.
    Index,
    /// Fixed-width track of filled and unfilled glyphs, e.g. `[###---]`.
    BarLine {
        /// Number of glyphs in the track.
        width: usize,
        /// Glyph pair for the filled and unfilled portions.
        glyphs: BarGlyphs,
    },
    /// `"ETA: 00:00:12 (at 4.10) it/s)"` time estimate with current rate.
    TimeEstimate,
    /// `"42%"` rounded completion percentage.
    Percent,
}

impl Segment {
    /// A bar track with the default width and ASCII glyphs.
    pub fn bar_line() -> Self {
        Segment::BarLine {
            width: DEFAULT_BAR_WIDTH,
            glyphs: BarGlyphs::ascii(),
        }
    }

    /// Renders this segment's fragment for the given state.
    pub fn render(&self, state: &RenderState) -> String {
        match self {
            Segment::Index => format!("{} of {}", state.count, state.total),
            Segment::BarLine { width, glyphs } => render_bar_line(*width, *glyphs, state),
            Segment::TimeEstimate => render_time_estimate(state),
            Segment::Percent => render_percent(state),
        }
    }
}

fn render_bar_line(width: usize, glyphs: BarGlyphs, state: &RenderState) -> String {
    // The filled run is not clamped to `width`: a count past the total
    // draws an overrun track rather than hiding it.
    let filled = if state.total == 0 {
        0
    } else {
        ((state.count as u128 * width as u128) / state.total as u128) as usize
    };
    let empty = width.saturating_sub(filled);

    let mut track = String::with_capacity(filled + empty + 2);
    track.push('[');
    track.extend(std::iter::repeat_n(glyphs.filled, filled));
    track.extend(std::iter::repeat_n(glyphs.empty, empty));
    track.push(']');
    track
}

fn render_time_estimate(state: &RenderState) -> String {
    let rate = state.rate();
    let remaining = state.total.saturating_sub(state.count);
    let eta = if rate == 0.0 || remaining == 0 {
        Duration::ZERO
    } else {
        // An estimate too large to represent collapses to the sentinel
        Duration::try_from_secs_f64(remaining as f64 / rate).unwrap_or(Duration::ZERO)
    };
    format!("ETA: {} (at {rate:.2}) it/s)", format_hms(eta))
}

fn render_percent(state: &RenderState) -> String {
    if state.total == 0 {
        // An empty task is 0% complete, never the 100% fallthrough
        return "0%".to_string();
    }
    let percent = (state.count as f64 / state.total as f64) * 100.0;
    format!("{}%", percent.round() as u64)
}
