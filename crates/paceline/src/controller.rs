//! Controller for driving multiple progress lines on one terminal.
//!
//! This module provides `ProgressController`, a thread-safe manager that
//! repaints a block of progress lines in place. Bars are identified by a
//! caller-chosen ID type, decoupling identity from display text. Terminal
//! I/O failures are contained here; drawing never propagates errors to
//! callers.

use std::fmt;
use std::hash::Hash;
use std::io;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use console::Term;
use scc::HashMap as SccHashMap;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation as _;

use crate::BORDERLINE_BAR_THRESHOLD;
use crate::ProgressBar;
use crate::SLOW_BAR_THRESHOLD;
use crate::config;
use crate::segment::Segment;
use crate::styles::GREEN;
use crate::styles::RED;
use crate::styles::YELLOW;

/// Repaint period of the background ticker thread.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A bar slot with its drawing order position.
struct BarSlot {
    seq: u64,
    bar: RwLock<ProgressBar>,
}

impl BarSlot {
    /// The bar's current line, truncated to the terminal and colored by
    /// completion state and age.
    fn line(&self, max_width: usize) -> String {
        let Ok(bar) = self.bar.read() else {
            return "<N/A>".to_string();
        };

        let line = truncate_line(&bar.render(), max_width);
        if bar.is_complete() {
            GREEN.apply_to(line).to_string()
        } else if bar.elapsed() > SLOW_BAR_THRESHOLD {
            RED.apply_to(line).to_string()
        } else if bar.elapsed() > BORDERLINE_BAR_THRESHOLD {
            YELLOW.apply_to(line).to_string()
        } else {
            line
        }
    }
}

/// A thread-safe controller for a block of progress lines.
///
/// The controller is generic over the ID type, allowing callers to use any
/// hashable type (enums, strings, etc.) to identify bars.
///
/// # Type Parameters
///
/// * `Id` - The type used to identify bars. Must be `Hash + Eq + Clone + Send + Sync`.
///
/// # Example
///
/// ```ignore
/// use paceline::ProgressController;
///
/// #[derive(Debug, Clone, Hash, Eq, PartialEq)]
/// enum TaskId {
///     Fetch,
///     Unpack,
/// }
///
/// let mut ctrl = ProgressController::<TaskId>::new();
/// ctrl.start_ticker();
/// ctrl.start_bar(TaskId::Fetch, 120);
/// ctrl.inc_bar(&TaskId::Fetch, 1);
/// ctrl.remove_bar(&TaskId::Fetch);
/// ```
pub struct ProgressController<Id = String>
where
    Id: Hash + Eq + Clone + Send + Sync + 'static,
{
    /// Terminal the block of lines is painted on.
    term: Term,
    /// Line budget per bar, from the terminal width at construction.
    max_line_width: usize,
    /// Map from ID to bar slot.
    bars: Arc<SccHashMap<Id, BarSlot>>,
    /// Drawing order for newly added bars.
    next_seq: AtomicU64,
    /// Number of lines currently painted on the terminal.
    drawn_lines: Arc<Mutex<usize>>,
    /// Shutdown signal for the ticker thread.
    shutdown: Arc<(Mutex<bool>, Condvar)>,
    /// Handle to the ticker thread.
    ticker: Option<std::thread::JoinHandle<()>>,
}

impl<Id> ProgressController<Id>
where
    Id: Hash + Eq + Clone + Send + Sync + 'static,
{
    /// Creates a new controller painting on stderr.
    ///
    /// The controller starts without a ticker thread. Call `start_ticker()`
    /// to keep ETA/rate fields live between explicit updates.
    pub fn new() -> Self {
        let term = Term::stderr();
        let max_line_width = match term.size().1 {
            0 => usize::MAX,
            width => width as usize,
        };

        ProgressController {
            term,
            max_line_width,
            bars: Arc::new(SccHashMap::new()),
            next_seq: AtomicU64::new(0),
            drawn_lines: Arc::new(Mutex::new(0)),
            shutdown: Arc::new((Mutex::new(false), Condvar::new())),
            ticker: None,
        }
    }

    /// Starts the background ticker thread that repaints the block.
    ///
    /// If already started, this is a no-op.
    pub fn start_ticker(&mut self) {
        if self.ticker.is_some() {
            // Already started
            return;
        }

        let shutdown = Arc::clone(&self.shutdown);
        let bars = Arc::clone(&self.bars);
        let drawn_lines = Arc::clone(&self.drawn_lines);
        let term = self.term.clone();
        let max_line_width = self.max_line_width;

        debug!("starting progress ticker");
        self.ticker = Some(std::thread::spawn(move || {
            loop {
                // Wait for the next tick
                let (lock, cvar) = &*shutdown;
                let Ok(lock) = lock.lock() else {
                    // Lock poisoned so we stop bothering
                    return;
                };

                let shut_down_flag = cvar.wait_timeout(lock, TICK_INTERVAL);
                if let Ok((flag, _)) = shut_down_flag
                    && *flag
                {
                    // Shutdown requested
                    break;
                }

                redraw_block(&term, &bars, &drawn_lines, max_line_width);
            }
        }));
    }

    /// Executes a closure while the block of lines is cleared.
    ///
    /// This allows clean output (e.g. log messages) without progress-line
    /// artifacts. The block is repainted after the closure completes.
    pub fn with_suspended<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let result;
        {
            let Ok(mut drawn) = self.drawn_lines.lock() else {
                return f();
            };
            let _ = self.term.clear_last_lines(*drawn);
            *drawn = 0;
            result = f();
        }
        self.redraw();
        result
    }

    // -------------------------------------------------------------------------
    // Bar operations
    // -------------------------------------------------------------------------

    /// Starts a new bar over `total` items with the process-wide default
    /// segment sequence.
    ///
    /// It is the caller's responsibility to keep `id` unique.
    /// NOTE: if a bar with this ID already exists, this is a no-op.
    pub fn start_bar(&self, id: Id, total: u64) {
        self.start_bar_with(id, total, config::default_segments());
    }

    /// Starts a new bar with an explicit segment sequence.
    ///
    /// NOTE: if a bar with this ID already exists, this is a no-op.
    pub fn start_bar_with(&self, id: Id, total: u64, segments: Vec<Segment>) {
        // Do nothing if already exists
        self.bars.entry_sync(id).or_insert_with(|| {
            debug!(total, "progress bar added");
            BarSlot {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                bar: RwLock::new(ProgressBar::with_segments(total, segments)),
            }
        });
        self.redraw();
    }

    /// Sets a bar's completed count.
    pub fn set_count(&self, id: &Id, count: u64) {
        let _ = self.bars.read_sync(id, |_, slot| {
            let _ = slot.bar.write().map(|mut bar| bar.set_count(count));
        });
        self.redraw();
    }

    /// Advances a bar by `delta` items.
    pub fn inc_bar(&self, id: &Id, delta: u64) {
        let _ = self.bars.read_sync(id, |_, slot| {
            let _ = slot.bar.write().map(|mut bar| bar.inc(delta));
        });
        self.redraw();
    }

    /// Returns the current rendered line for a bar, if it exists.
    pub fn render_bar(&self, id: &Id) -> Option<String> {
        self.bars
            .read_sync(id, |_, slot| {
                slot.bar.read().map(|bar| bar.render()).ok()
            })
            .flatten()
    }

    /// Removes a bar by ID and shrinks the painted block.
    pub fn remove_bar(&self, id: &Id) {
        if self.bars.remove_sync(id).is_some() {
            debug!("progress bar removed");
            self.redraw();
        }
    }

    fn redraw(&self) {
        redraw_block(&self.term, &self.bars, &self.drawn_lines, self.max_line_width);
    }
}

/// Repaints the whole block of lines in insertion order.
fn redraw_block<Id>(
    term: &Term,
    bars: &SccHashMap<Id, BarSlot>,
    drawn_lines: &Mutex<usize>,
    max_line_width: usize,
) where
    Id: Hash + Eq + Clone + Send + Sync + 'static,
{
    let Ok(mut drawn) = drawn_lines.lock() else {
        return;
    };

    let mut lines = Vec::new();
    bars.iter_sync(|_, slot| {
        lines.push((slot.seq, slot.line(max_line_width)));
        true
    });
    lines.sort_unstable_by_key(|(seq, _)| *seq);

    let _ = paint(term, &mut drawn, lines);
}

fn paint(term: &Term, drawn: &mut usize, lines: Vec<(u64, String)>) -> io::Result<()> {
    term.clear_last_lines(*drawn)?;
    *drawn = lines.len();
    for (_, line) in lines {
        term.write_line(&line)?;
    }
    Ok(())
}

/// Truncates a line to `max_len` graphemes, ending in `...` when cut.
fn truncate_line(line: &str, max_len: usize) -> String {
    let graphemes = line.graphemes(true).collect::<Vec<&str>>();
    if graphemes.len() < max_len {
        line.to_string()
    } else {
        graphemes
            .into_iter()
            .take(max_len.saturating_sub(3))
            .chain(std::iter::once("..."))
            .collect::<String>()
    }
}

impl<Id> Default for ProgressController<Id>
where
    Id: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> fmt::Debug for ProgressController<Id>
where
    Id: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressController").finish_non_exhaustive()
    }
}

impl<Id> Drop for ProgressController<Id>
where
    Id: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        // Best-effort attempt to shut down cleanly. If anything goes wrong we
        // just give up quietly.
        let (lock, cvar) = &*self.shutdown;
        let Ok(mut shutdown) = lock.lock() else {
            // Lock poisoned, so we can't proceed
            return;
        };

        *shutdown = true;
        cvar.notify_all();
        drop(shutdown);

        // Wait for the ticker thread to finish
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
    }
}
