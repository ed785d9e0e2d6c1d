use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument};

use super::{Budget, Problem, SearchEngine, SearchOptions};
use crate::algorithm::Strategy;
use crate::common::{GoalOutcome, GoalSet, MultiGoalResult, Position, SearchOutcome};
use crate::error::{SolveError, ValidationError};
use crate::map::Grid;

/// Runs one search per goal plus one combined search over the whole goal set.
pub struct MultiGoalSolver {
    problem: Problem,
    strategy: Strategy,
    options: SearchOptions,
}

impl MultiGoalSolver {
    pub fn new(problem: Problem, options: SearchOptions) -> Result<Self, ValidationError> {
        let strategy = problem
            .algorithm
            .strategy(problem.depth_limit, options.safety_cap(&problem.grid))?;
        Ok(MultiGoalSolver {
            problem,
            strategy,
            options,
        })
    }

    #[instrument(skip_all, name = "multi_goal", fields(algorithm = %self.problem.algorithm, goals = self.problem.goals.len(), parallel = self.options.parallel), level = "debug")]
    pub async fn solve(&self) -> Result<MultiGoalResult, SolveError> {
        let total_solve_start_time = Instant::now();
        let budget = Budget::new(self.options.timeout, self.options.cancel.clone());
        let start = self.problem.start;

        let (individual, combined) = if self.options.parallel {
            let handles: Vec<(Position, JoinHandle<SearchOutcome>)> = self
                .problem
                .goals
                .iter()
                .map(|&goal| {
                    let handle =
                        self.spawn_search(start, GoalSet::single(goal), budget.clone());
                    (goal, handle)
                })
                .collect();
            let combined_handle =
                self.spawn_search(start, GoalSet::new(self.problem.goals.clone()), budget);

            let mut individual = Vec::with_capacity(handles.len());
            for (goal, handle) in handles {
                let outcome = handle.await.map_err(|err| self.abort_searches(err))?;
                individual.push(GoalOutcome { goal, outcome });
            }
            let combined = combined_handle
                .await
                .map_err(|err| self.abort_searches(err))?;
            (individual, combined)
        } else {
            let grid = &self.problem.grid;
            let individual = self
                .problem
                .goals
                .iter()
                .map(|&goal| GoalOutcome {
                    goal,
                    outcome: run_search(
                        grid,
                        start,
                        GoalSet::single(goal),
                        self.strategy,
                        budget.clone(),
                    ),
                })
                .collect();
            let combined = run_search(
                grid,
                start,
                GoalSet::new(self.problem.goals.clone()),
                self.strategy,
                budget,
            );
            (individual, combined)
        };

        let result = MultiGoalResult::new(individual, combined, total_solve_start_time.elapsed());
        info!(
            "{} solved {} goal(s): combined {} reaching {:?}, path length {}, explored {}, total explored {}, time {:?}",
            self.problem.algorithm,
            self.problem.goals.len(),
            result.combined.termination,
            result.combined.reached_goal,
            result.combined.path_length(),
            result.combined.nodes_explored,
            result.total_explored,
            result.elapsed
        );
        Ok(result)
    }

    /// Stops the searches still running on worker threads.
    fn abort_searches(&self, err: JoinError) -> JoinError {
        error!("search worker failed: {err}");
        self.options.cancel.cancel();
        err
    }

    fn spawn_search(
        &self,
        start: Position,
        goals: GoalSet,
        budget: Budget,
    ) -> JoinHandle<SearchOutcome> {
        let grid = Arc::clone(&self.problem.grid);
        let strategy = self.strategy;
        tokio::task::spawn_blocking(move || run_search(&grid, start, goals, strategy, budget))
    }
}

fn run_search(
    grid: &Grid,
    start: Position,
    goals: GoalSet,
    strategy: Strategy,
    budget: Budget,
) -> SearchOutcome {
    SearchEngine::new(grid, start, goals, strategy, budget).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Algorithm;
    use crate::common::{manhattan_distance, Termination};
    use crate::solver::CancelToken;

    fn open_problem(algorithm: Algorithm, goals: Vec<Position>) -> Problem {
        let grid = Grid::from_walls(6, 6, []).unwrap();
        let depth_limit = algorithm.requires_bound().then_some(36);
        Problem::new(grid, (0, 0), goals, algorithm, depth_limit).unwrap()
    }

    fn parallel() -> SearchOptions {
        SearchOptions {
            parallel: true,
            ..SearchOptions::default()
        }
    }

    fn assert_path_reaches(path: &[Position], start: Position, goal: Position) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert_eq!(manhattan_distance(pair[0], pair[1]), 1);
        }
    }

    #[tokio::test]
    async fn test_combined_reaches_closer_goal() {
        for algorithm in [Algorithm::Bfs, Algorithm::AStar] {
            let problem = open_problem(algorithm, vec![(2, 2), (5, 4)]);
            let solver = MultiGoalSolver::new(problem, parallel()).unwrap();
            let result = solver.solve().await.unwrap();

            assert!(result.success());
            assert_eq!(result.combined.reached_goal, Some((2, 2)));
            assert_eq!(result.combined.path_length(), 4);

            assert_eq!(result.individual.len(), 2);
            assert_eq!(result.individual[0].goal, (2, 2));
            assert_eq!(result.individual[1].goal, (5, 4));
            for entry in &result.individual {
                assert!(entry.outcome.success);
                assert_path_reaches(&entry.outcome.path, (0, 0), entry.goal);
            }
            assert_eq!(result.individual[1].outcome.path_length(), 9);
            assert_eq!(result.total_path_length, 13);
        }
    }

    #[tokio::test]
    async fn test_goal_order_only_affects_reporting() {
        let problem = open_problem(Algorithm::Bfs, vec![(5, 4), (2, 2)]);
        let result = MultiGoalSolver::new(problem, parallel())
            .unwrap()
            .solve()
            .await
            .unwrap();

        assert_eq!(result.combined.reached_goal, Some((2, 2)));
        assert_eq!(result.individual[0].goal, (5, 4));
        assert_eq!(result.individual[1].goal, (2, 2));
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        for algorithm in Algorithm::ALL {
            let goals = vec![(3, 1), (5, 5), (0, 4)];
            let sequential = MultiGoalSolver::new(
                open_problem(algorithm, goals.clone()),
                SearchOptions::default(),
            )
            .unwrap()
            .solve()
            .await
            .unwrap();
            let concurrent = MultiGoalSolver::new(open_problem(algorithm, goals), parallel())
                .unwrap()
                .solve()
                .await
                .unwrap();

            assert_eq!(sequential.combined.path, concurrent.combined.path);
            assert_eq!(
                sequential.combined.explored_order,
                concurrent.combined.explored_order
            );
            for (left, right) in sequential.individual.iter().zip(&concurrent.individual) {
                assert_eq!(left.goal, right.goal);
                assert_eq!(left.outcome.explored_order, right.outcome.explored_order);
            }
            assert_eq!(sequential.total_explored, concurrent.total_explored);
        }
    }

    #[tokio::test]
    async fn test_totals() {
        let problem = open_problem(Algorithm::Bfs, vec![(1, 0), (0, 2)]);
        let result = MultiGoalSolver::new(problem, SearchOptions::default())
            .unwrap()
            .solve()
            .await
            .unwrap();

        let individual_explored: usize = result
            .individual
            .iter()
            .map(|entry| entry.outcome.nodes_explored)
            .sum();
        assert_eq!(
            result.total_explored,
            individual_explored + result.combined.nodes_explored
        );
        assert_eq!(result.total_path_length, 3);
    }

    #[tokio::test]
    async fn test_unreachable_goal_is_not_an_error() {
        let grid = Grid::from_walls(5, 5, [(3, 4), (4, 3)]).unwrap();
        let problem = Problem::new(grid, (0, 0), vec![(4, 4), (1, 1)], Algorithm::Dfs, None).unwrap();
        let result = MultiGoalSolver::new(problem, parallel())
            .unwrap()
            .solve()
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.combined.reached_goal, Some((1, 1)));
        assert!(!result.individual[0].outcome.success);
        assert_eq!(result.individual[0].outcome.termination, Termination::Exhausted);
        assert!(result.individual[1].outcome.success);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let options = SearchOptions {
            cancel,
            parallel: true,
            ..SearchOptions::default()
        };
        let problem = open_problem(Algorithm::IterativeDeepening, vec![(5, 5)]);
        let result = MultiGoalSolver::new(problem, options)
            .unwrap()
            .solve()
            .await
            .unwrap();

        assert!(!result.success());
        assert_eq!(result.combined.termination, Termination::Cancelled);
        assert_eq!(result.individual[0].outcome.termination, Termination::Cancelled);
    }

    #[tokio::test]
    async fn test_failed_worker_cancels_remaining_searches() {
        let cancel = CancelToken::new();
        let options = SearchOptions {
            cancel: cancel.clone(),
            parallel: true,
            ..SearchOptions::default()
        };
        let solver =
            MultiGoalSolver::new(open_problem(Algorithm::Bfs, vec![(5, 5)]), options).unwrap();

        let err = tokio::task::spawn_blocking(|| panic!("worker crashed"))
            .await
            .unwrap_err();
        let err = solver.abort_searches(err);

        assert!(err.is_panic());
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_max_bound_option_caps_iterative_search() {
        let options = SearchOptions {
            max_bound: Some(3),
            ..SearchOptions::default()
        };
        let solver =
            MultiGoalSolver::new(open_problem(Algorithm::IterativeDeepening, vec![(5, 5)]), options)
                .unwrap();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(solver.solve()).unwrap();

        assert!(!result.success());
        assert_eq!(result.combined.termination, Termination::BoundExceeded);
        assert_eq!(result.combined.final_bound, Some(3));
    }
}
