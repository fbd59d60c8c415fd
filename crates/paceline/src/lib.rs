//! Segment-based terminal progress lines.
//!
//! This crate renders task progress as a single line of text composed from
//! an ordered sequence of display segments (index counter, bar track,
//! ETA/rate estimate, percent), and drives any number of such lines on a
//! terminal through a thread-safe controller.
//!
//! # Features
//!
//! - Pure rendering: a line is a function of `(count, total, elapsed)` and
//!   the bar's segment sequence, with no shared state touched during render
//! - Copy-on-construct defaults: a bar snapshots the process-wide default
//!   segment sequence once; reconfiguring the default later never changes
//!   an existing bar
//! - Scoped overrides of the default sequence with guaranteed restoration
//! - Generic ID type for controller-managed bars (decoupled from display)
//! - Background ticker thread keeping ETA/rate fields live between updates
//! - Line suspension for clean interleaved log output
//!
//! # Example
//!
//! ```ignore
//! use paceline::{ProgressBar, ProgressController};
//!
//! // A standalone line, rendered wherever the caller wants it.
//! let mut bar = ProgressBar::new(10);
//! bar.set_count(3);
//! println!("{bar}");
//! // => 3 of 10 [#########---------------------] ETA: 00:00:02 (at 2.71) it/s)
//!
//! // Or any number of lines driven on one terminal.
//! let mut ctrl = ProgressController::<String>::new();
//! ctrl.start_ticker();
//! ctrl.start_bar("download".to_string(), 10);
//! ctrl.inc_bar(&"download".to_string(), 1);
//! ctrl.remove_bar(&"download".to_string());
//! ```

use std::time::Duration;

mod bar;
pub mod config;
mod controller;
mod segment;
pub mod styles;

pub use bar::ProgressBar;
pub use config::DefaultSegmentsGuard;
pub use config::default_segments;
pub use config::set_default_segments;
pub use controller::ProgressController;
pub use segment::RenderState;
pub use segment::Segment;

/// Width of the bar track used when no explicit width is given.
pub const DEFAULT_BAR_WIDTH: usize = 30;

/// Duration threshold after which a driven bar is highlighted as slow (5 minutes).
pub const SLOW_BAR_THRESHOLD: Duration = Duration::from_secs(300);

/// Duration threshold for borderline slow bars (1 minute).
pub const BORDERLINE_BAR_THRESHOLD: Duration = Duration::from_secs(60);
