use std::time::Duration;

use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub nodes_explored: usize,
    pub nodes_generated: usize,
    pub passes: usize,
    pub backtracks: usize,
    pub max_frontier: usize,
    pub time_us: usize,
}

impl Stats {
    /// Whole microseconds in `duration`, saturating at `usize::MAX`.
    pub(crate) fn micros(duration: Duration) -> usize {
        usize::try_from(duration.as_micros()).unwrap_or(usize::MAX)
    }

    pub(crate) fn print(&self) {
        debug!(
            "Time(microseconds) {:?} Explored nodes {:?} Generated nodes {:?} Passes {:?} Backtracks {:?} Max frontier {:?}",
            self.time_us,
            self.nodes_explored,
            self.nodes_generated,
            self.passes,
            self.backtracks,
            self.max_frontier
        );
    }
}
