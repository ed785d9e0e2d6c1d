mod node;
mod outcome;

pub use node::{reconstruct_path, SearchNode};
pub use outcome::{GoalOutcome, MultiGoalResult, SearchOutcome, Termination};

use std::collections::HashSet;

/// `(x, y)`, with `x` the column and `y` the row.
pub type Position = (usize, usize);

pub fn manhattan_distance(a: Position, b: Position) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Acceptance targets of one search. Membership is a set test; the ordered
/// list is only kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalSet {
    goals: Vec<Position>,
    members: HashSet<Position>,
}

impl GoalSet {
    pub fn new(goals: Vec<Position>) -> Self {
        let members = goals.iter().copied().collect();
        GoalSet { goals, members }
    }

    pub fn single(goal: Position) -> Self {
        GoalSet::new(vec![goal])
    }

    pub fn contains(&self, position: Position) -> bool {
        self.members.contains(&position)
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    /// Manhattan distance to the closest goal; admissible for the whole set.
    pub fn heuristic(&self, position: Position) -> usize {
        self.goals
            .iter()
            .map(|&goal| manhattan_distance(position, goal))
            .min()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(manhattan_distance((0, 0), (3, 4)), 7);
        assert_eq!(manhattan_distance((5, 1), (2, 3)), 5);
        assert_eq!(manhattan_distance((2, 2), (2, 2)), 0);
    }

    #[test]
    fn test_goal_set_heuristic_uses_closest_goal() {
        let goals = GoalSet::new(vec![(5, 5), (2, 2)]);
        assert_eq!(goals.heuristic((0, 0)), 4);
        assert_eq!(goals.heuristic((5, 4)), 1);
        assert!(goals.contains((2, 2)));
        assert!(!goals.contains((0, 0)));
        assert_eq!(goals.goals(), &[(5, 5), (2, 2)]);
    }
}
