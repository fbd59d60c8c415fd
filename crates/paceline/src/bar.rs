//! The progress line type owned by a single tracked task.

use std::fmt;
use std::time::Duration;
use std::time::Instant;

use itertools::Itertools as _;

use crate::config;
use crate::segment::RenderState;
use crate::segment::Segment;

/// A progress line for one tracked task.
///
/// A bar owns its segment sequence for its entire lifetime. When built
/// with [`ProgressBar::new`] the sequence is copied from the process-wide
/// default at construction time, so later reconfiguration of the default
/// never changes an existing bar.
///
/// Rendering never fails: any `(count, total)` combination, including a
/// zero total and a count past the total, produces a defined line.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    count: u64,
    total: u64,
    start_time: Instant,
    segments: Vec<Segment>,
}

impl ProgressBar {
    /// Creates a bar over `total` expected items with the process-wide
    /// default segment sequence.
    pub fn new(total: u64) -> Self {
        Self::with_segments(total, config::default_segments())
    }

    /// Creates a bar with an explicit segment sequence.
    pub fn with_segments(total: u64, segments: Vec<Segment>) -> Self {
        Self {
            count: 0,
            total,
            start_time: Instant::now(),
            segments,
        }
    }

    /// Items completed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Items expected in total.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Time since the bar was constructed.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Whether every expected item has been counted.
    ///
    /// A zero-total bar is never complete; it renders the empty-track
    /// sentinel line instead.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.count >= self.total
    }

    /// Sets the completed count.
    ///
    /// Counts past `total` are kept as-is and render as an overrun.
    pub fn set_count(&mut self, count: u64) {
        self.count = count;
    }

    /// Advances the completed count by `delta`.
    pub fn inc(&mut self, delta: u64) {
        self.count = self.count.saturating_add(delta);
    }

    /// Renders the current line using the wall-clock elapsed time.
    pub fn render(&self) -> String {
        self.render_at(self.elapsed())
    }

    /// Renders the line as it would appear `elapsed` after the start.
    ///
    /// Deterministic: the same `(count, total, elapsed)` always yields
    /// the same line.
    pub fn render_at(&self, elapsed: Duration) -> String {
        let state = RenderState {
            count: self.count,
            total: self.total,
            elapsed,
        };
        self.segments
            .iter()
            .map(|segment| segment.render(&state))
            .join(" ")
    }
}

impl fmt::Display for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultSegmentsGuard;
    use crate::config::test_support::lock_defaults;

    #[test]
    fn test_zero_total_default_line() {
        let _defaults = lock_defaults();

        let bar = ProgressBar::new(0);
        assert_eq!(
            bar.render_at(Duration::ZERO),
            "0 of 0 [------------------------------] ETA: 00:00:00 (at 0.00) it/s)"
        );
    }

    #[test]
    fn test_complete_line_is_fully_filled() {
        let mut bar =
            ProgressBar::with_segments(8, vec![Segment::bar_line(), Segment::Percent]);
        bar.set_count(8);
        assert_eq!(
            bar.render_at(Duration::ZERO),
            format!("[{}] 100%", "#".repeat(30))
        );
        assert!(bar.is_complete());
    }

    #[test]
    fn test_count_past_total_renders() {
        let mut bar = ProgressBar::with_segments(
            4,
            vec![Segment::Index, Segment::bar_line(), Segment::Percent],
        );
        bar.set_count(6);
        assert_eq!(
            bar.render_at(Duration::ZERO),
            format!("6 of 4 [{}] 150%", "#".repeat(45))
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut bar = ProgressBar::with_segments(
            100,
            vec![Segment::Index, Segment::bar_line(), Segment::TimeEstimate],
        );
        bar.set_count(37);
        let elapsed = Duration::from_secs(5);
        assert_eq!(bar.render_at(elapsed), bar.render_at(elapsed));
    }

    #[test]
    fn test_inc_saturates() {
        let mut bar = ProgressBar::with_segments(10, vec![Segment::Index]);
        bar.set_count(u64::MAX);
        bar.inc(1);
        assert_eq!(bar.count(), u64::MAX);
    }

    #[test]
    fn test_display_matches_render() {
        // Time-independent segments so the two wall-clock reads agree
        let mut bar = ProgressBar::with_segments(10, vec![Segment::Index, Segment::Percent]);
        bar.set_count(5);
        assert_eq!(format!("{bar}"), bar.render());
        assert_eq!(bar.render(), "5 of 10 50%");
    }

    #[test]
    fn test_default_reconfiguration_leaves_existing_bars_alone() {
        let _defaults = lock_defaults();

        let mut bar = ProgressBar::new(10);
        bar.set_count(5);
        let before = bar.render_at(Duration::ZERO);

        let _guard = DefaultSegmentsGuard::new(vec![Segment::Percent]);
        assert_eq!(bar.render_at(Duration::ZERO), before);

        // New bars do pick up the override
        let fresh = ProgressBar::new(10);
        assert_eq!(fresh.render_at(Duration::ZERO), "0%");
    }
}
