use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, instrument, trace};

use super::Budget;
use crate::algorithm::{Deepening, Strategy};
use crate::common::{
    reconstruct_path, GoalSet, Position, SearchNode, SearchOutcome, Termination,
};
use crate::frontier::Frontier;
use crate::map::Grid;
use crate::stat::Stats;

#[derive(Debug, Clone, Copy)]
enum Limit {
    None,
    /// Nodes at this depth are not expanded.
    Depth(usize),
    /// Children whose `cost + heuristic` exceeds this are not pushed.
    Cost(usize),
}

#[derive(Debug)]
enum PassResult {
    Found(Rc<SearchNode>),
    Exhausted,
    /// Something was cut off by the limit; carries the smallest
    /// `cost + heuristic` among the cut-off children.
    Pruned { next_bound: usize },
    Cancelled,
}

/// Explored order accumulated over every pass of one search.
#[derive(Debug)]
struct Trace {
    explored_order: Vec<Position>,
    layers: Option<BTreeMap<usize, Vec<Position>>>,
    seen: HashSet<(usize, Position)>,
}

impl Trace {
    fn new(track_layers: bool) -> Self {
        Trace {
            explored_order: Vec::new(),
            layers: track_layers.then(BTreeMap::new),
            seen: HashSet::new(),
        }
    }

    fn record(&mut self, node: &SearchNode) {
        self.explored_order.push(node.position);
        if let Some(layers) = self.layers.as_mut() {
            if self.seen.insert((node.depth, node.position)) {
                layers.entry(node.depth).or_default().push(node.position);
            }
        }
    }
}

/// Runs one strategy from one start against one goal set.
pub struct SearchEngine<'a> {
    grid: &'a Grid,
    start: Position,
    goals: GoalSet,
    strategy: Strategy,
    budget: Budget,
    stats: Stats,
}

impl<'a> SearchEngine<'a> {
    /// `start` and `goals` are expected to be validated against `grid`.
    pub fn new(
        grid: &'a Grid,
        start: Position,
        goals: GoalSet,
        strategy: Strategy,
        budget: Budget,
    ) -> Self {
        SearchEngine {
            grid,
            start,
            goals,
            strategy,
            budget,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    #[instrument(skip_all, name = "search", fields(algorithm = %self.strategy.algorithm, start = ?self.start, goals = ?self.goals.goals()), level = "debug")]
    pub fn run(&mut self) -> SearchOutcome {
        let search_start_time = Instant::now();
        let mut frontier = Frontier::new(self.strategy.order, self.strategy.revisit);
        let mut trace = Trace::new(self.strategy.algorithm.is_depth_based());
        let mut final_bound = None;

        let result = match self.strategy.deepening {
            Deepening::None => self.run_pass(&mut frontier, Limit::None, &mut trace),
            Deepening::DepthLimit(limit) => {
                final_bound = Some(limit);
                self.run_pass(&mut frontier, Limit::Depth(limit), &mut trace)
            }
            Deepening::IterativeDepth { max } => {
                let mut bound = 0;
                loop {
                    debug!("depth bound {bound}");
                    final_bound = Some(bound);
                    match self.run_pass(&mut frontier, Limit::Depth(bound), &mut trace) {
                        PassResult::Pruned { .. } if bound < max => bound += 1,
                        result => break result,
                    }
                }
            }
            Deepening::IterativeCost { max } => {
                let mut bound = self.goals.heuristic(self.start);
                let mut result = PassResult::Pruned { next_bound: bound };
                while bound <= max {
                    debug!("cost bound {bound}");
                    final_bound = Some(bound);
                    result = self.run_pass(&mut frontier, Limit::Cost(bound), &mut trace);
                    match result {
                        PassResult::Pruned { next_bound } => bound = next_bound,
                        _ => break,
                    }
                }
                result
            }
        };

        self.stats.backtracks = frontier.backtracks();
        self.stats.max_frontier = frontier.max_len();

        let (termination, goal_node) = match result {
            PassResult::Found(node) => (Termination::GoalFound, Some(node)),
            PassResult::Exhausted => (Termination::Exhausted, None),
            PassResult::Pruned { .. } => (Termination::BoundExceeded, None),
            PassResult::Cancelled => (Termination::Cancelled, None),
        };
        let path = reconstruct_path(goal_node.as_deref());

        let elapsed = search_start_time.elapsed();
        self.stats.time_us = Stats::micros(elapsed);
        self.stats.print();
        debug!("search finished: {termination}, path length {}", path.len().saturating_sub(1));

        SearchOutcome {
            success: goal_node.is_some(),
            termination,
            reached_goal: goal_node.as_ref().map(|node| node.position),
            path,
            nodes_explored: trace.explored_order.len(),
            explored_order: trace.explored_order,
            elapsed,
            final_bound,
            passes: self.stats.passes,
            visited_by_depth: trace.layers,
        }
    }

    fn run_pass(&mut self, frontier: &mut Frontier, limit: Limit, trace: &mut Trace) -> PassResult {
        self.stats.passes += 1;
        frontier.reset();
        frontier.push(SearchNode::root(self.start, &self.goals));

        // Children cut off by the limit, as (position, cost, cost + heuristic).
        let mut pruned: Vec<(Position, usize, usize)> = Vec::new();

        while let Some(node) = frontier.pop() {
            if self.budget.is_spent() {
                debug!("search cancelled after {} nodes", self.stats.nodes_explored);
                return PassResult::Cancelled;
            }

            trace!("expand node: {:?} depth {} f {}", node.position, node.depth, node.f_cost());
            trace.record(&node);
            self.stats.nodes_explored += 1;

            if self.goals.contains(node.position) {
                return PassResult::Found(node);
            }

            let children = SearchNode::expand(&node, self.grid, &self.goals, |position, cost| {
                frontier.admits(position, cost)
            });

            let children = match limit {
                Limit::None => children,
                Limit::Depth(max_depth) if node.depth >= max_depth => {
                    pruned.extend(
                        children
                            .iter()
                            .map(|child| (child.position, child.cost, child.f_cost())),
                    );
                    continue;
                }
                Limit::Depth(_) => children,
                Limit::Cost(bound) => {
                    let (within, beyond): (Vec<_>, Vec<_>) = children
                        .into_iter()
                        .partition(|child| child.f_cost() <= bound);
                    pruned.extend(
                        beyond
                            .iter()
                            .map(|child| (child.position, child.cost, child.f_cost())),
                    );
                    within
                }
            };

            self.stats.nodes_generated += frontier.push_children(children);
        }

        // A cut-off only matters if the pass never reached that position as
        // cheaply some other way.
        let next_bound = pruned
            .into_iter()
            .filter(|&(position, cost, _)| {
                frontier
                    .reached_cost(position)
                    .map_or(true, |best| best > cost)
            })
            .map(|(_, _, f_cost)| f_cost)
            .min();

        match next_bound {
            Some(next_bound) => PassResult::Pruned { next_bound },
            None => PassResult::Exhausted,
        }
    }
}
