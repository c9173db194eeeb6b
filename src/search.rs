// Copyright 2021 by Michael Thies <mail@mhthies.de>
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except in compliance with
// the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! Generic frontier-based state-space search.
//!
//! The four strategies (depth-first, breadth-first, uniform-cost, A*) share
//! one skeleton: a frontier of open states, an explored set keyed by a
//! canonical state fingerprint, and counters. They differ only in the
//! frontier discipline and the priority key, so each strategy supplies a
//! concrete `Frontier` while goal testing, bookkeeping and deadline sampling
//! live in `search()` once.
//!
//! The search is single-threaded and synchronous. For a fixed state space
//! and strategy the sequence of expansions is fully deterministic: the
//! best-first frontier breaks priority ties by insertion sequence and the
//! LIFO frontier preserves successor enumeration order.

use log::debug;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Frontier discipline selection for `search()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DepthFirst,
    BreadthFirst,
    UniformCost,
    AStar,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Strategy::DepthFirst => "dfs",
            Strategy::BreadthFirst => "bfs",
            Strategy::UniformCost => "ucs",
            Strategy::AStar => "astar",
        };
        write!(f, "{}", token)
    }
}

/// A problem formulated for the generic search: initial state, goal test and
/// successor generation. `key` must return a canonical fingerprint such that
/// two states reached via different orderings compare equal; the engine uses
/// it for the explored set.
///
/// `heuristic` is the A* extension hook. The default is the trivial
/// admissible bound of 0, which makes A* equivalent to uniform-cost search.
pub trait StateSpace {
    type State: Clone;
    type Action: fmt::Debug;
    type Key: Eq + Hash;

    fn initial(&self) -> Self::State;
    fn is_goal(&self, state: &Self::State) -> bool;
    /// Successors of a state in enumeration order, each with the action taken
    /// and its step cost.
    fn successors(&self, state: &Self::State) -> Vec<(Self::Action, Self::State, u64)>;
    fn key(&self, state: &Self::State) -> Self::Key;
    fn heuristic(&self, _state: &Self::State) -> u64 {
        0
    }
}

/// Result of a single search run.
#[derive(Debug)]
pub enum Outcome<S> {
    /// A goal state was reached.
    Solved { state: S, cost: u64 },
    /// The frontier emptied without reaching a goal state. This proves that
    /// no goal is reachable; it is a normal termination, not an error.
    Exhausted,
    /// The deadline fired between expansions before the search finished.
    DeadlineExceeded,
}

/// Counters collected during a search run and returned alongside the
/// outcome.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of states popped from the frontier.
    pub iterations: u32,
    /// Number of states whose successors were generated.
    pub expanded: u32,
    /// Peak number of states in the frontier at any point.
    pub max_frontier_size: usize,
    /// Total wall time of the run.
    pub total_time: Duration,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Search statistics:
Popped states:      {: >8}
Expanded states:    {: >8}
Peak frontier size: {: >8}

Total time: {:.3}s\n",
            self.iterations,
            self.expanded,
            self.max_frontier_size,
            self.total_time.as_millis() as f32 / 1000f32,
        )
    }
}

struct Node<S> {
    state: S,
    cost: u64,
}

/// The open list. Strategies differ only in how pushed nodes are ordered for
/// popping; the priority is ignored by the unordered disciplines.
trait Frontier<S> {
    fn push(&mut self, node: Node<S>, priority: u64);
    /// Push one expansion's successors, in enumeration order.
    fn extend(&mut self, batch: Vec<(Node<S>, u64)>) {
        for (node, priority) in batch {
            self.push(node, priority);
        }
    }
    fn pop(&mut self) -> Option<Node<S>>;
    fn len(&self) -> usize;
}

struct LifoFrontier<S> {
    nodes: Vec<Node<S>>,
}

impl<S> LifoFrontier<S> {
    fn new() -> Self {
        LifoFrontier { nodes: Vec::new() }
    }
}

impl<S> Frontier<S> for LifoFrontier<S> {
    fn push(&mut self, node: Node<S>, _priority: u64) {
        self.nodes.push(node);
    }

    /// Successor batches go onto the stack in reverse, so the first successor
    /// in enumeration order is popped first.
    fn extend(&mut self, batch: Vec<(Node<S>, u64)>) {
        for (node, _) in batch.into_iter().rev() {
            self.nodes.push(node);
        }
    }

    fn pop(&mut self) -> Option<Node<S>> {
        self.nodes.pop()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

struct FifoFrontier<S> {
    nodes: VecDeque<Node<S>>,
}

impl<S> FifoFrontier<S> {
    fn new() -> Self {
        FifoFrontier {
            nodes: VecDeque::new(),
        }
    }
}

impl<S> Frontier<S> for FifoFrontier<S> {
    fn push(&mut self, node: Node<S>, _priority: u64) {
        self.nodes.push_back(node);
    }

    fn pop(&mut self) -> Option<Node<S>> {
        self.nodes.pop_front()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Min-priority frontier for uniform-cost search and A*. Ties in the priority
/// key are broken by insertion sequence, which keeps runs reproducible.
struct BestFirstFrontier<S> {
    heap: BinaryHeap<RankedNode<S>>,
    next_seq: u64,
}

impl<S> BestFirstFrontier<S> {
    fn new() -> Self {
        BestFirstFrontier {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<S> Frontier<S> for BestFirstFrontier<S> {
    fn push(&mut self, node: Node<S>, priority: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(RankedNode {
            priority,
            seq,
            node,
        });
    }

    fn pop(&mut self) -> Option<Node<S>> {
        self.heap.pop().map(|ranked| ranked.node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

struct RankedNode<S> {
    priority: u64,
    seq: u64,
    node: Node<S>,
}

impl<S> PartialEq for RankedNode<S> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<S> Eq for RankedNode<S> {}

impl<S> PartialOrd for RankedNode<S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for RankedNode<S> {
    /// Reversed comparison on (priority, seq): `BinaryHeap` is a max-heap,
    /// so the smallest priority (earliest inserted on ties) pops first.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn priority<P: StateSpace>(space: &P, strategy: Strategy, node: &Node<P::State>) -> u64 {
    match strategy {
        Strategy::DepthFirst | Strategy::BreadthFirst => 0,
        Strategy::UniformCost => node.cost,
        Strategy::AStar => node.cost + space.heuristic(&node.state),
    }
}

/// Run one search to the first goal state (or frontier exhaustion, or the
/// deadline). Each expansion pops one state, tests the goal and pushes every
/// not-yet-explored successor once. The deadline, if any, is sampled between
/// expansions; there is no other interruption mechanism.
pub fn search<P: StateSpace>(
    space: &P,
    strategy: Strategy,
    deadline: Option<Instant>,
) -> (Outcome<P::State>, Statistics) {
    let mut frontier: Box<dyn Frontier<P::State>> = match strategy {
        Strategy::DepthFirst => Box::new(LifoFrontier::new()),
        Strategy::BreadthFirst => Box::new(FifoFrontier::new()),
        Strategy::UniformCost | Strategy::AStar => Box::new(BestFirstFrontier::new()),
    };
    let mut explored: HashSet<P::Key> = HashSet::new();
    let mut statistics = Statistics::default();
    let tic = Instant::now();

    let initial = Node {
        state: space.initial(),
        cost: 0,
    };
    let initial_priority = priority(space, strategy, &initial);
    frontier.push(initial, initial_priority);
    statistics.max_frontier_size = 1;

    let outcome = loop {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                break Outcome::DeadlineExceeded;
            }
        }
        let node = match frontier.pop() {
            Some(node) => node,
            None => break Outcome::Exhausted,
        };
        statistics.iterations += 1;

        let key = space.key(&node.state);
        if explored.contains(&key) {
            // Reached again via a different assignment ordering.
            continue;
        }
        if space.is_goal(&node.state) {
            break Outcome::Solved {
                state: node.state,
                cost: node.cost,
            };
        }
        explored.insert(key);
        statistics.expanded += 1;

        let batch: Vec<(Node<P::State>, u64)> = space
            .successors(&node.state)
            .into_iter()
            .filter(|(_, child, _)| !explored.contains(&space.key(child)))
            .map(|(action, child, step_cost)| {
                debug!("Pushing successor {:?}", action);
                let child_node = Node {
                    state: child,
                    cost: node.cost + step_cost,
                };
                let child_priority = priority(space, strategy, &child_node);
                (child_node, child_priority)
            })
            .collect();
        frontier.extend(batch);
        statistics.max_frontier_size = statistics.max_frontier_size.max(frontier.len());
    };

    statistics.total_time = tic.elapsed();
    (outcome, statistics)
}
