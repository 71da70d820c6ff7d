//! Statistic logging for the [`Solver`](crate::Solver).
//!
//! Statistics are emitted as `PREFIX name=value` lines; logging is off until configured, so
//! library users pay nothing unless they opt in.

use std::fmt::Display;
use std::sync::OnceLock;
use std::time::Duration;

static STATISTIC_PREFIX: OnceLock<&'static str> = OnceLock::new();
static LOG_STATISTICS: OnceLock<bool> = OnceLock::new();

/// Configures the logging of statistics: the prefix put in front of every statistic line, and
/// whether statistics are logged at all. The first configuration wins.
pub fn configure_statistic_logging(prefix: &'static str, log_statistics: bool) {
    let _ = LOG_STATISTICS.get_or_init(|| log_statistics);
    if log_statistics {
        let _ = STATISTIC_PREFIX.get_or_init(|| prefix);
    }
}

/// Logs the statistic `name` with `value` in the format `PREFIX name=value`, if logging has been
/// enabled through [`configure_statistic_logging`].
pub fn log_statistic(name: impl Display, value: impl Display) {
    if *LOG_STATISTICS.get().unwrap_or(&false) {
        println!(
            "{} {name}={value}",
            STATISTIC_PREFIX
                .get()
                .expect("a prefix is configured whenever logging is enabled")
        );
    }
}

/// The cumulative counters a [`Solver`](crate::Solver) maintains across its `solve` calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct SolverStatistics {
    /// The number of solutions produced so far.
    pub num_solutions: u64,
    /// The total time spent inside the search steps.
    pub time_spent: Duration,
}

impl SolverStatistics {
    /// Emits the counters through [`log_statistic`].
    pub fn log(&self) {
        log_statistic("numberOfSolutions", self.num_solutions);
        log_statistic("timeSpentInSearchMs", self.time_spent.as_millis());
    }
}
