//! # Cooperative Execution
//!
//! Parsing is single-threaded. Long-running loops are split into chunks with
//! [`chunked_subtask`]; at every chunk boundary the [`RuntimeContext`] may
//! report [`Progress`] to an observer and checks a [`CancellationToken`].
//! Suspension never happens in the middle of a token.
//!
//! ```rust,no_run
//! use ciftext::task::{CancellationToken, RuntimeContext};
//! use ciftext::ParserConfig;
//!
//! let token = CancellationToken::new();
//! let mut ctx = RuntimeContext::new(ParserConfig::responsive())
//!     .with_cancellation(token.clone())
//!     .with_observer(|p| println!("{}: {:.1}%", p.message, 100.0 * p.fraction()));
//!
//! let text = std::fs::read_to_string("large.cif")?;
//! let file = ciftext::parse_with(&text, &mut ctx)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ParserConfig;


/// A progress snapshot of a running task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// What the task is doing
    pub message: &'static str,
    /// Units done so far (bytes for the parser)
    pub current: usize,
    /// Total units
    pub max: usize,
}

impl Progress {
    /// Completed fraction in `[0, 1]`; `1.0` when there is nothing to do.
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            1.0
        } else {
            (self.current as f64 / self.max as f64).min(1.0)
        }
    }
}

/// Returned when a task noticed a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Task aborted at {current}/{max}")]
pub struct Aborted {
    /// Progress position at the time of the abort
    pub current: usize,
    /// Total units of the task
    pub max: usize,
}

/// A shared flag that requests cancellation of a running task.
///
/// Clones share the same flag, so one clone can be handed to another thread
/// or captured by a progress observer.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Observer called with progress snapshots.
pub type ProgressObserver<'o> = Box<dyn FnMut(&Progress) + 'o>;

/// Per-run state of a cooperative task: configuration, progress observer,
/// and cancellation.
pub struct RuntimeContext<'o> {
    config: ParserConfig,
    cancellation: CancellationToken,
    observer: Option<ProgressObserver<'o>>,
    last_report: Option<Instant>,
    report_count: usize,
}

impl<'o> RuntimeContext<'o> {
    /// Create a context without observer and with a fresh cancellation token.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
            observer: None,
            last_report: None,
            report_count: 0,
        }
    }

    /// Use `token` for cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Send progress reports to `observer`.
    pub fn with_observer(mut self, observer: impl FnMut(&Progress) + 'o) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The configuration of this run.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The cancellation token of this run.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Number of progress reports delivered so far.
    pub fn report_count(&self) -> usize {
        self.report_count
    }

    /// Whether the progress interval has elapsed since the last report.
    pub fn should_update(&self) -> bool {
        match self.last_report {
            None => true,
            Some(at) => at.elapsed() >= self.config.progress_interval,
        }
    }

    /// Yield point: report `progress` if due, then check for cancellation.
    pub fn update(&mut self, progress: Progress) -> Result<(), Aborted> {
        if self.should_update() {
            if let Some(observer) = self.observer.as_mut() {
                observer(&progress);
            }
            self.last_report = Some(Instant::now());
            self.report_count += 1;
        }

        if self.cancellation.is_cancelled() {
            log::debug!("Cancellation observed at {}/{}", progress.current, progress.max);
            return Err(Aborted {
                current: progress.current,
                max: progress.max,
            });
        }
        Ok(())
    }

    /// Deliver a final report regardless of the interval.
    pub fn finish(&mut self, progress: Progress) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&progress);
        }
        self.last_report = Some(Instant::now());
        self.report_count += 1;
    }
}

impl Default for RuntimeContext<'_> {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl std::fmt::Debug for RuntimeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("config", &self.config)
            .field("cancellation", &self.cancellation)
            .field("has_observer", &self.observer.is_some())
            .field("report_count", &self.report_count)
            .finish()
    }
}

/// Run `step` in chunks of `chunk_size` units until it does less than a full chunk.
///
/// `step(chunk_size, state)` returns the number of units it processed. After
/// every full chunk the context gets a yield point with the progress computed
/// by `update`; a cancellation request ends the loop with [`Aborted`].
pub fn chunked_subtask<S>(
    ctx: &mut RuntimeContext<'_>,
    chunk_size: usize,
    state: &mut S,
    mut step: impl FnMut(usize, &mut S) -> usize,
    mut update: impl FnMut(&S) -> Progress,
) -> Result<(), Aborted> {
    let chunk_size = chunk_size.max(1);
    loop {
        let processed = step(chunk_size, state);
        if processed < chunk_size {
            return Ok(());
        }
        ctx.update(update(state))?;
    }
}
