//! Retry policy for ledger I/O.

use std::time::Duration;

use backoff::ExponentialBackoff;

/// Default values for the ledger retry schedule.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(10);

/// The exponential backoff applied to every ledger fetch. The schedule is
/// part of the runtime contract: retries start at 500 ms, grow by 1.5x, cap
/// at 2 s, and give up after 10 s of total elapsed time.
pub fn ledger_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: DEFAULT_INITIAL_INTERVAL,
        randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
        multiplier: DEFAULT_MULTIPLIER,
        max_interval: DEFAULT_MAX_INTERVAL,
        max_elapsed_time: Some(DEFAULT_MAX_ELAPSED_TIME),
        ..ExponentialBackoff::default()
    }
}
