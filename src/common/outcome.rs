use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    GoalFound,
    /// Frontier ran dry without pruning anything; the goal is unreachable.
    Exhausted,
    /// A depth or cost bound cut the search off at its final value.
    BoundExceeded,
    /// Cancel token or deadline fired.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::GoalFound => "goal_found",
            Termination::Exhausted => "exhausted",
            Termination::BoundExceeded => "bound_exceeded",
            Termination::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Result of one engine run against one goal set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub success: bool,
    pub termination: Termination,
    /// Start to goal, empty on failure.
    pub path: Vec<Position>,
    /// Positions in the exact order they were popped, across all passes.
    pub explored_order: Vec<Position>,
    pub nodes_explored: usize,
    pub elapsed: Duration,
    pub reached_goal: Option<Position>,
    /// Last depth or cost bound used by bounded strategies.
    pub final_bound: Option<usize>,
    pub passes: usize,
    /// Depth to positions first seen at that depth, for depth-based strategies.
    pub visited_by_depth: Option<BTreeMap<usize, Vec<Position>>>,
}

impl SearchOutcome {
    /// Number of moves along the path.
    pub fn path_length(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// One goal of a multi-goal request together with its own search.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalOutcome {
    pub goal: Position,
    pub outcome: SearchOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiGoalResult {
    /// In caller-supplied goal order.
    pub individual: Vec<GoalOutcome>,
    /// Search that accepts any goal and stops at the first one reached.
    pub combined: SearchOutcome,
    pub total_path_length: usize,
    pub total_explored: usize,
    pub elapsed: Duration,
}

impl MultiGoalResult {
    pub fn new(individual: Vec<GoalOutcome>, combined: SearchOutcome, elapsed: Duration) -> Self {
        let total_path_length = individual
            .iter()
            .map(|entry| entry.outcome.path_length())
            .sum();
        let total_explored = individual
            .iter()
            .map(|entry| entry.outcome.nodes_explored)
            .sum::<usize>()
            + combined.nodes_explored;

        MultiGoalResult {
            individual,
            combined,
            total_path_length,
            total_explored,
            elapsed,
        }
    }

    pub fn success(&self) -> bool {
        self.combined.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path: Vec<Position>, nodes_explored: usize) -> SearchOutcome {
        SearchOutcome {
            success: !path.is_empty(),
            termination: if path.is_empty() {
                Termination::Exhausted
            } else {
                Termination::GoalFound
            },
            reached_goal: path.last().copied(),
            path,
            explored_order: Vec::new(),
            nodes_explored,
            elapsed: Duration::ZERO,
            final_bound: None,
            passes: 1,
            visited_by_depth: None,
        }
    }

    #[test]
    fn test_path_length_counts_moves() {
        assert_eq!(outcome(vec![(0, 0), (0, 1), (1, 1)], 3).path_length(), 2);
        assert_eq!(outcome(vec![(0, 0)], 1).path_length(), 0);
        assert_eq!(outcome(Vec::new(), 4).path_length(), 0);
    }

    #[test]
    fn test_multi_goal_totals() {
        let individual = vec![
            GoalOutcome {
                goal: (0, 1),
                outcome: outcome(vec![(0, 0), (0, 1)], 2),
            },
            GoalOutcome {
                goal: (1, 1),
                outcome: outcome(vec![(0, 0), (0, 1), (1, 1)], 5),
            },
        ];
        let combined = outcome(vec![(0, 0), (0, 1)], 2);
        let result = MultiGoalResult::new(individual, combined, Duration::from_millis(3));

        assert_eq!(result.total_path_length, 3);
        assert_eq!(result.total_explored, 9);
        assert!(result.success());
    }

    #[test]
    fn test_termination_serializes_snake_case() {
        let json = serde_json::to_string(&Termination::BoundExceeded).unwrap();
        assert_eq!(json, "\"bound_exceeded\"");
    }
}
