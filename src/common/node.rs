use std::rc::Rc;

use super::{GoalSet, Position};
use crate::map::Grid;

/// Search-tree node. Each node owns a single upward link, so the tree of one
/// search is rooted at the start node and can never form a cycle.
#[derive(Debug)]
pub struct SearchNode {
    pub position: Position,
    pub parent: Option<Rc<SearchNode>>,
    pub depth: usize,
    pub cost: usize,
    pub heuristic: usize,
}

impl SearchNode {
    pub fn root(start: Position, goals: &GoalSet) -> Rc<Self> {
        Rc::new(SearchNode {
            position: start,
            parent: None,
            depth: 0,
            cost: 0,
            heuristic: goals.heuristic(start),
        })
    }

    pub fn f_cost(&self) -> usize {
        self.cost + self.heuristic
    }

    /// Children for every walkable neighbor that `admit(position, cost)`
    /// accepts, in up, left, down, right order.
    pub fn expand(
        node: &Rc<SearchNode>,
        grid: &Grid,
        goals: &GoalSet,
        mut admit: impl FnMut(Position, usize) -> bool,
    ) -> Vec<Rc<SearchNode>> {
        let cost = node.cost + 1; // Unit edge cost.
        grid.neighbors(node.position)
            .into_iter()
            .filter(|&neighbor| admit(neighbor, cost))
            .map(|neighbor| {
                Rc::new(SearchNode {
                    position: neighbor,
                    parent: Some(Rc::clone(node)),
                    depth: node.depth + 1,
                    cost,
                    heuristic: goals.heuristic(neighbor),
                })
            })
            .collect()
    }

    /// Ancestors from this node up to the root, this node first.
    pub fn ancestors(&self) -> impl Iterator<Item = &SearchNode> {
        std::iter::successors(Some(self), |node| node.parent.as_deref())
    }
}

// Deep chains (long DFS branches) would otherwise be freed recursively.
impl Drop for SearchNode {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            match Rc::try_unwrap(node) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Start-to-node positions, empty when there is no node.
pub fn reconstruct_path(node: Option<&SearchNode>) -> Vec<Position> {
    let Some(node) = node else {
        return Vec::new();
    };
    let mut path: Vec<Position> = node.ancestors().map(|node| node.position).collect();
    path.reverse();
    path
}
