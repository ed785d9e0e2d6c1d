use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use tracing::trace;

use crate::common::{Position, SearchNode};

/// Order in which pushed nodes come back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierOrder {
    Fifo,
    Lifo,
    /// LIFO where each batch of siblings is pushed in reverse, so the first
    /// neighbor is descended into first.
    Descend,
    /// `Descend` with the current path kept as an explicit trail that is
    /// unwound on dead ends.
    Backtrack,
    /// Lowest heuristic first, insertion order on ties.
    Heuristic,
    /// Lowest `cost + heuristic` first, insertion order on ties.
    CostPlusHeuristic,
}

/// When a position that was already seen may enter the frontier again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revisit {
    /// Reached on push; later candidates for the same position are dropped.
    Never,
    /// Reached on pop; duplicates may queue up and are discarded once the
    /// position has been expanded.
    OnExpand,
    /// Re-pushed only when reached through a strictly cheaper route. Entries
    /// made obsolete by a cheaper one are discarded on pop.
    OnLowerCost,
}

// Priority list wrapper
#[derive(Debug)]
struct PriorityEntry {
    priority: usize,
    sequence: usize,
    node: Rc<SearchNode>,
}

impl PartialEq for PriorityEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for PriorityEntry {}

impl PartialOrd for PriorityEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            // Earlier insertion wins ties, which keeps the order stable.
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

#[derive(Debug)]
enum OpenList {
    Queue(VecDeque<Rc<SearchNode>>),
    Stack(Vec<Rc<SearchNode>>),
    Priority(BTreeSet<PriorityEntry>),
}

/// Not-yet-expanded nodes plus the reached set of one search pass.
#[derive(Debug)]
pub struct Frontier {
    order: FrontierOrder,
    revisit: Revisit,
    open: OpenList,
    reached: HashMap<Position, usize>,
    sequence: usize,
    trail: Vec<Position>,
    backtracks: usize,
    max_len: usize,
}

impl Frontier {
    pub fn new(order: FrontierOrder, revisit: Revisit) -> Self {
        Frontier {
            order,
            revisit,
            open: Self::empty_list(order),
            reached: HashMap::new(),
            sequence: 0,
            trail: Vec::new(),
            backtracks: 0,
            max_len: 0,
        }
    }

    fn empty_list(order: FrontierOrder) -> OpenList {
        match order {
            FrontierOrder::Fifo => OpenList::Queue(VecDeque::new()),
            FrontierOrder::Lifo | FrontierOrder::Descend | FrontierOrder::Backtrack => {
                OpenList::Stack(Vec::new())
            }
            FrontierOrder::Heuristic | FrontierOrder::CostPlusHeuristic => {
                OpenList::Priority(BTreeSet::new())
            }
        }
    }

    /// Clears open nodes and the reached set for a fresh pass. Counters survive.
    pub fn reset(&mut self) {
        self.open = Self::empty_list(self.order);
        self.reached.clear();
        self.trail.clear();
    }

    /// Whether a candidate at `position` reached with `cost` would be accepted.
    pub fn admits(&self, position: Position, cost: usize) -> bool {
        match self.revisit {
            Revisit::Never | Revisit::OnExpand => !self.reached.contains_key(&position),
            Revisit::OnLowerCost => self
                .reached
                .get(&position)
                .map_or(true, |&best| cost < best),
        }
    }

    /// Pushes `node` if the duplicate policy admits it.
    pub fn push(&mut self, node: Rc<SearchNode>) -> bool {
        if !self.admits(node.position, node.cost) {
            return false;
        }
        if self.revisit != Revisit::OnExpand {
            self.reached.insert(node.position, node.cost);
        }

        let sequence = self.sequence;
        self.sequence += 1;
        match &mut self.open {
            OpenList::Queue(queue) => queue.push_back(node),
            OpenList::Stack(stack) => stack.push(node),
            OpenList::Priority(open) => {
                let priority = match self.order {
                    FrontierOrder::Heuristic => node.heuristic,
                    _ => node.f_cost(),
                };
                open.insert(PriorityEntry {
                    priority,
                    sequence,
                    node,
                });
            }
        }
        self.max_len = self.max_len.max(self.len());
        true
    }

    /// Pushes the children of one expansion, honoring the backtracking order.
    pub fn push_children(&mut self, mut children: Vec<Rc<SearchNode>>) -> usize {
        if matches!(self.order, FrontierOrder::Descend | FrontierOrder::Backtrack) {
            children.reverse();
        }
        children
            .into_iter()
            .map(|child| self.push(child))
            .filter(|&pushed| pushed)
            .count()
    }

    /// Next node per the ordering policy, skipping entries made obsolete.
    pub fn pop(&mut self) -> Option<Rc<SearchNode>> {
        loop {
            let node = match &mut self.open {
                OpenList::Queue(queue) => queue.pop_front(),
                OpenList::Stack(stack) => stack.pop(),
                OpenList::Priority(open) => open.pop_first().map(|entry| entry.node),
            }?;

            match self.revisit {
                Revisit::Never => {}
                Revisit::OnExpand => {
                    if self.reached.contains_key(&node.position) {
                        continue;
                    }
                    self.reached.insert(node.position, node.cost);
                }
                Revisit::OnLowerCost => {
                    if self
                        .reached
                        .get(&node.position)
                        .is_some_and(|&best| node.cost > best)
                    {
                        continue;
                    }
                }
            }

            if self.order == FrontierOrder::Backtrack {
                self.unwind_to(node.depth);
                self.trail.push(node.position);
            }
            return Some(node);
        }
    }

    fn unwind_to(&mut self, depth: usize) {
        if self.trail.len() > depth {
            let removed = self.trail.len() - depth;
            trace!("dead end, unwinding {removed} node(s) to depth {depth}");
            self.backtracks += removed;
            self.trail.truncate(depth);
        }
    }

    /// Whether `position` has been reached in this pass.
    pub fn contains(&self, position: Position) -> bool {
        self.reached.contains_key(&position)
    }

    /// Cheapest cost `position` has been reached with in this pass.
    pub fn reached_cost(&self, position: Position) -> Option<usize> {
        self.reached.get(&position).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match &self.open {
            OpenList::Queue(queue) => queue.len(),
            OpenList::Stack(stack) => stack.len(),
            OpenList::Priority(open) => open.len(),
        }
    }

    /// Current root-to-node trail of a backtracking frontier.
    pub fn trail(&self) -> &[Position] {
        &self.trail
    }

    pub fn backtracks(&self) -> usize {
        self.backtracks
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
