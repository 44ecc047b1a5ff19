//! Parser tuning.

use std::time::Duration;

/// Default number of loop values consumed between two yield points.
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

/// Default minimum time between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for a parse run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Loop values read per chunk before checking for progress and cancellation.
    /// Smaller = faster cancellation, larger = less overhead
    pub chunk_size: usize,

    /// Progress observers are called at most once per interval
    pub progress_interval: Duration,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ParserConfig {
    /// Small chunks and frequent reports, for interactive hosts
    pub fn responsive() -> Self {
        Self {
            chunk_size: 100_000,
            progress_interval: Duration::from_millis(50),
        }
    }

    /// Large chunks and rare reports, for batch processing
    pub fn throughput() -> Self {
        Self {
            chunk_size: 5_000_000,
            progress_interval: Duration::from_secs(1),
        }
    }

    /// Set the chunk size (clamped to at least 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the progress interval
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
