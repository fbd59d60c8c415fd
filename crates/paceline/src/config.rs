//! Process-wide default segment sequence.
//!
//! Every bar built with [`crate::ProgressBar::new`] copies this sequence at
//! construction time. The copy happens under the lock, so a construction
//! racing a reconfiguration on another thread observes exactly one complete
//! sequence, never a torn mix. No live reference to the global is ever
//! handed out.

use std::sync::LazyLock;
use std::sync::Mutex;

use crate::segment::Segment;

static DEFAULT_SEGMENTS: LazyLock<Mutex<Vec<Segment>>> =
    LazyLock::new(|| Mutex::new(builtin_segments()));

/// The built-in sequence: index counter, bar track, time estimate.
fn builtin_segments() -> Vec<Segment> {
    vec![Segment::Index, Segment::bar_line(), Segment::TimeEstimate]
}

/// Returns a copy of the process-wide default segment sequence.
///
/// A poisoned lock degrades to the built-in sequence rather than
/// panicking.
pub fn default_segments() -> Vec<Segment> {
    let Ok(defaults) = DEFAULT_SEGMENTS.lock() else {
        return builtin_segments();
    };
    defaults.clone()
}

/// Replaces the process-wide default segment sequence.
///
/// Only affects bars constructed afterwards; existing bars own their
/// copies. For a temporary change, prefer [`DefaultSegmentsGuard`].
pub fn set_default_segments(segments: Vec<Segment>) {
    if let Ok(mut defaults) = DEFAULT_SEGMENTS.lock() {
        *defaults = segments;
    }
}

/// Guard that temporarily overrides the process-wide default segments.
///
/// The override is installed when the guard is created and the previous
/// sequence is restored when it is dropped, on every exit path including
/// unwinding.
///
/// # Example
/// ```
/// use paceline::{DefaultSegmentsGuard, Segment};
///
/// fn percent_only_section() {
///     let _guard = DefaultSegmentsGuard::new(vec![Segment::Percent]);
///     // Bars constructed here default to a bare percent display
/// }
/// ```
pub struct DefaultSegmentsGuard {
    previous: Option<Vec<Segment>>,
}

impl DefaultSegmentsGuard {
    /// Installs `segments` as the default and captures the previous
    /// sequence for restoration.
    pub fn new(segments: Vec<Segment>) -> Self {
        let Ok(mut defaults) = DEFAULT_SEGMENTS.lock() else {
            // Nothing sane to capture from a poisoned lock
            return Self { previous: None };
        };
        let previous = std::mem::replace(&mut *defaults, segments);
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for DefaultSegmentsGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take()
            && let Ok(mut defaults) = DEFAULT_SEGMENTS.lock()
        {
            *defaults = previous;
        }
    }
}


#[cfg(test)]
mod tests {
    use std::panic::AssertUnwindSafe;
    use std::panic::catch_unwind;
    use std::time::Duration;

    use super::test_support::lock_defaults;
    use super::*;
    use crate::ProgressBar;

    #[test]
    fn test_builtin_sequence() {
        let _defaults = lock_defaults();

        assert_eq!(
            default_segments(),
            vec![Segment::Index, Segment::bar_line(), Segment::TimeEstimate]
        );
    }

    #[test]
    fn test_returned_sequence_is_a_copy() {
        let _defaults = lock_defaults();

        let mut copy = default_segments();
        copy.clear();
        assert!(!default_segments().is_empty());
    }

    #[test]
    fn test_set_then_restore() {
        let _defaults = lock_defaults();

        let before = default_segments();
        set_default_segments(vec![Segment::Percent]);
        assert_eq!(default_segments(), vec![Segment::Percent]);

        set_default_segments(before.clone());
        assert_eq!(default_segments(), before);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let _defaults = lock_defaults();

        let before = default_segments();
        {
            let _guard = DefaultSegmentsGuard::new(vec![Segment::Index]);
            assert_eq!(default_segments(), vec![Segment::Index]);
        }
        assert_eq!(default_segments(), before);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let _defaults = lock_defaults();

        let before = default_segments();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = DefaultSegmentsGuard::new(vec![Segment::Percent]);
            panic!("scoped body failed");
        }));
        assert!(result.is_err());
        assert_eq!(default_segments(), before);
    }

    #[test]
    fn test_constructions_never_observe_a_torn_default() {
        let _defaults = lock_defaults();

        let base = default_segments();
        let overridden = vec![Segment::Percent];
        let base_line = ProgressBar::with_segments(0, base.clone()).render_at(Duration::ZERO);
        let overridden_line =
            ProgressBar::with_segments(0, overridden.clone()).render_at(Duration::ZERO);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..200 {
                    let _guard = DefaultSegmentsGuard::new(overridden.clone());
                }
            });

            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let snapshot = default_segments();
                        assert!(snapshot == base || snapshot == overridden);

                        let line = ProgressBar::new(0).render_at(Duration::ZERO);
                        assert!(line == base_line || line == overridden_line);
                    }
                });
            }
        });

        assert_eq!(default_segments(), base);
    }

    #[test]
    fn test_explicit_segments_ignore_a_live_override() {
        let _defaults = lock_defaults();

        let _guard = DefaultSegmentsGuard::new(vec![Segment::Index]);
        let bar = ProgressBar::with_segments(10, vec![Segment::Percent]);
        assert_eq!(bar.render_at(Duration::ZERO), "0%");
    }
}
