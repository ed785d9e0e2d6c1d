use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::frontier::{FrontierOrder, Revisit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "bfs")]
    Bfs,
    #[serde(rename = "dfs")]
    Dfs,
    #[serde(rename = "gbfs")]
    GreedyBestFirst,
    #[serde(rename = "as")]
    AStar,
    #[serde(rename = "backtracking")]
    Backtracking,
    #[serde(rename = "depthlimited")]
    DepthLimited,
    #[serde(rename = "ids")]
    IterativeDeepening,
    #[serde(rename = "idas")]
    IterativeDeepeningAStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::GreedyBestFirst,
        Algorithm::AStar,
        Algorithm::Backtracking,
        Algorithm::DepthLimited,
        Algorithm::IterativeDeepening,
        Algorithm::IterativeDeepeningAStar,
    ];

    /// Selector used on the wire and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::GreedyBestFirst => "gbfs",
            Algorithm::AStar => "as",
            Algorithm::Backtracking => "backtracking",
            Algorithm::DepthLimited => "depthlimited",
            Algorithm::IterativeDeepening => "ids",
            Algorithm::IterativeDeepeningAStar => "idas",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::Bfs => "Breadth-First Search",
            Algorithm::Dfs => "Depth-First Search",
            Algorithm::GreedyBestFirst => "Greedy Best-First Search",
            Algorithm::AStar => "A* Search",
            Algorithm::Backtracking => "Backtracking Search",
            Algorithm::DepthLimited => "Depth-Limited Search",
            Algorithm::IterativeDeepening => "Iterative Deepening Depth-First Search",
            Algorithm::IterativeDeepeningAStar => "Iterative Deepening A* Search",
        }
    }

    pub fn requires_bound(&self) -> bool {
        matches!(
            self,
            Algorithm::DepthLimited
                | Algorithm::IterativeDeepening
                | Algorithm::IterativeDeepeningAStar
        )
    }

    /// Strategies whose trace is also reported layer by layer.
    pub fn is_depth_based(&self) -> bool {
        self.requires_bound()
    }

    /// Resolves the policy object for this algorithm. `safety_cap` bounds the
    /// iterative strategies no matter how large the caller's limit is.
    pub fn strategy(
        &self,
        depth_limit: Option<usize>,
        safety_cap: usize,
    ) -> Result<Strategy, ValidationError> {
        let bound = if self.requires_bound() {
            Some(depth_limit.ok_or(ValidationError::MissingBound(*self))?)
        } else {
            None
        };

        let (order, revisit, deepening) = match (self, bound) {
            (Algorithm::Bfs, _) => (FrontierOrder::Fifo, Revisit::Never, Deepening::None),
            (Algorithm::Dfs, _) => (FrontierOrder::Lifo, Revisit::Never, Deepening::None),
            (Algorithm::GreedyBestFirst, _) => {
                (FrontierOrder::Heuristic, Revisit::Never, Deepening::None)
            }
            (Algorithm::AStar, _) => (
                FrontierOrder::CostPlusHeuristic,
                Revisit::OnLowerCost,
                Deepening::None,
            ),
            (Algorithm::Backtracking, _) => {
                (FrontierOrder::Backtrack, Revisit::OnExpand, Deepening::None)
            }
            (Algorithm::DepthLimited, Some(limit)) => (
                FrontierOrder::Descend,
                Revisit::OnLowerCost,
                Deepening::DepthLimit(limit),
            ),
            (Algorithm::IterativeDeepening, Some(limit)) => (
                FrontierOrder::Descend,
                Revisit::OnLowerCost,
                Deepening::IterativeDepth {
                    max: limit.min(safety_cap),
                },
            ),
            (Algorithm::IterativeDeepeningAStar, Some(limit)) => (
                FrontierOrder::Descend,
                Revisit::OnLowerCost,
                Deepening::IterativeCost {
                    max: limit.min(safety_cap),
                },
            ),
            (_, None) => return Err(ValidationError::MissingBound(*self)),
        };

        Ok(Strategy {
            algorithm: *self,
            order,
            revisit,
            deepening,
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == s)
            .ok_or_else(|| ValidationError::UnknownAlgorithm(s.to_string()))
    }
}

/// How bounds are applied across the passes of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deepening {
    None,
    /// One pass; nodes at this depth are goal-tested but not expanded.
    DepthLimit(usize),
    /// Passes with depth bounds `0..=max`.
    IterativeDepth { max: usize },
    /// Passes with `cost + heuristic` bounds starting at the root's heuristic,
    /// each next bound being the smallest value pruned by the previous pass.
    IterativeCost { max: usize },
}

/// Everything that distinguishes one algorithm from another, resolved once
/// before the search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub algorithm: Algorithm,
    pub order: FrontierOrder,
    pub revisit: Revisit,
    pub deepening: Deepening,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>(), Ok(algorithm));
        }
        assert_eq!(
            "astar".parse::<Algorithm>(),
            Err(ValidationError::UnknownAlgorithm("astar".to_string()))
        );
    }

    #[test]
    fn test_serde_names() {
        let algorithm: Algorithm = serde_json::from_str("\"as\"").unwrap();
        assert_eq!(algorithm, Algorithm::AStar);
        assert_eq!(
            serde_json::to_string(&Algorithm::IterativeDeepeningAStar).unwrap(),
            "\"idas\""
        );
    }

    #[test]
    fn test_bound_required() {
        for algorithm in [
            Algorithm::DepthLimited,
            Algorithm::IterativeDeepening,
            Algorithm::IterativeDeepeningAStar,
        ] {
            assert_eq!(
                algorithm.strategy(None, 100),
                Err(ValidationError::MissingBound(algorithm))
            );
        }
        assert!(Algorithm::Bfs.strategy(None, 100).is_ok());
    }

    #[test]
    fn test_iterative_bounds_are_capped() {
        let strategy = Algorithm::IterativeDeepening
            .strategy(Some(10_000_000), 25)
            .unwrap();
        assert_eq!(strategy.deepening, Deepening::IterativeDepth { max: 25 });

        let strategy = Algorithm::IterativeDeepeningAStar
            .strategy(Some(7), 25)
            .unwrap();
        assert_eq!(strategy.deepening, Deepening::IterativeCost { max: 7 });

        let strategy = Algorithm::DepthLimited.strategy(Some(40), 25).unwrap();
        assert_eq!(strategy.deepening, Deepening::DepthLimit(40));
    }

    #[test]
    fn test_policy_table() {
        let strategy = Algorithm::Bfs.strategy(None, 1).unwrap();
        assert_eq!(strategy.order, FrontierOrder::Fifo);
        assert_eq!(strategy.revisit, Revisit::Never);

        let strategy = Algorithm::AStar.strategy(None, 1).unwrap();
        assert_eq!(strategy.order, FrontierOrder::CostPlusHeuristic);
        assert_eq!(strategy.revisit, Revisit::OnLowerCost);

        let strategy = Algorithm::Backtracking.strategy(None, 1).unwrap();
        assert_eq!(strategy.order, FrontierOrder::Backtrack);
        assert_eq!(strategy.revisit, Revisit::OnExpand);

        let strategy = Algorithm::Dfs.strategy(None, 1).unwrap();
        assert_eq!(strategy.order, FrontierOrder::Lifo);

        for algorithm in [
            Algorithm::DepthLimited,
            Algorithm::IterativeDeepening,
            Algorithm::IterativeDeepeningAStar,
        ] {
            let strategy = algorithm.strategy(Some(4), 10).unwrap();
            assert_eq!(strategy.order, FrontierOrder::Descend, "{algorithm}");
            assert_eq!(strategy.revisit, Revisit::OnLowerCost, "{algorithm}");
        }
    }
}
