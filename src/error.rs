use thiserror::Error;

use crate::algorithm::Algorithm;
use crate::common::Position;

/// Input rejected before any search runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("grid is malformed: {0}")]
    MalformedGrid(String),

    #[error("start position {0:?} is out of bounds")]
    StartOutOfBounds(Position),

    #[error("start position {0:?} is a wall")]
    StartIsWall(Position),

    #[error("goal {index} position {goal:?} is out of bounds")]
    GoalOutOfBounds { index: usize, goal: Position },

    #[error("goal {index} position {goal:?} is a wall")]
    GoalIsWall { index: usize, goal: Position },

    #[error("at least one goal is required")]
    EmptyGoals,

    #[error("algorithm '{0}' requires a depth limit")]
    MissingBound(Algorithm),

    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Failure to load a maze text file.
#[derive(Error, Debug)]
pub enum MazeFileError {
    #[error("cannot read maze file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("maze dimension {0} is outside [5, 50]")]
    DimensionOutOfRange(usize),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Failure of a whole multi-goal solve.
#[derive(Error, Debug)]
pub enum SolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("search worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
