mod engine;
mod multigoal;

pub use engine::SearchEngine;
pub use multigoal::MultiGoalSolver;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::algorithm::Algorithm;
use crate::common::Position;
use crate::error::ValidationError;
use crate::map::Grid;

/// Shared flag that stops every search holding a clone of it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Deadline and cancel token checked by the engine before each expansion.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl Budget {
    pub fn new(timeout: Option<Duration>, cancel: CancelToken) -> Self {
        Budget {
            deadline: timeout.map(|timeout| Instant::now() + timeout),
            cancel,
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn is_spent(&self) -> bool {
        self.cancel.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Ceiling for iterative bounds; defaults to the number of grid cells.
    pub max_bound: Option<usize>,
    pub timeout: Option<Duration>,
    pub cancel: CancelToken,
    /// Run the individual and combined searches on blocking worker threads.
    pub parallel: bool,
}

impl SearchOptions {
    pub fn safety_cap(&self, grid: &Grid) -> usize {
        self.max_bound.unwrap_or_else(|| grid.cell_count())
    }
}

/// A validated search request: everything the engine needs and nothing it
/// has to check again.
#[derive(Debug, Clone)]
pub struct Problem {
    pub grid: Arc<Grid>,
    pub start: Position,
    pub goals: Vec<Position>,
    pub algorithm: Algorithm,
    pub depth_limit: Option<usize>,
}

impl Problem {
    pub fn new(
        grid: Grid,
        start: Position,
        goals: Vec<Position>,
        algorithm: Algorithm,
        depth_limit: Option<usize>,
    ) -> Result<Self, ValidationError> {
        if !grid.in_bounds(start) {
            return Err(ValidationError::StartOutOfBounds(start));
        }
        if !grid.is_walkable(start) {
            return Err(ValidationError::StartIsWall(start));
        }
        if goals.is_empty() {
            return Err(ValidationError::EmptyGoals);
        }
        for (index, &goal) in goals.iter().enumerate() {
            if !grid.in_bounds(goal) {
                return Err(ValidationError::GoalOutOfBounds { index, goal });
            }
            if !grid.is_walkable(goal) {
                return Err(ValidationError::GoalIsWall { index, goal });
            }
        }
        if algorithm.requires_bound() && depth_limit.is_none() {
            return Err(ValidationError::MissingBound(algorithm));
        }

        Ok(Problem {
            grid: Arc::new(grid),
            start,
            goals,
            algorithm,
            depth_limit,
        })
    }
}
