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

//! A specialization of the generic search engine from `search` for the
//! weekly-timetable constraint-satisfaction problem.
//!
//! A state is the ordered list of assignments taken so far. Successors extend
//! a state by one assignment for a single event picked by the variable
//! selector (minimum remaining values, or plain declaration order), ranging
//! over the event's pre-computed domain filtered by the binary constraint
//! checker. Two events conflict only when they share a timeslot *and* their
//! week sets intersect; then teacher, audience and room must be pairwise
//! distinct.

use crate::domain::DomainTable;
use crate::model::{Problem, StrategyChoice};
use crate::search::{self, Outcome, StateSpace, Statistics, Strategy};
use crate::{Assignment, Schedule};
use log::info;
use std::fmt::Write;
use std::time::Instant;


/// How a single solver run ended. Failure (exhausted frontier or empty unary
/// domain) and timeout are normal terminations, reported in the solution
/// document, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Success,
    Failure,
    Timeout,
}

impl SolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Success => "success",
            SolveStatus::Failure => "failure",
            SolveStatus::Timeout => "timeout",
        }
    }
}

/// Result of running one strategy to its first solution (or exhaustion or
/// the deadline).
#[derive(Debug)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub status: SolveStatus,
    pub schedule: Option<Schedule>,
    pub cost: Option<u64>,
    pub statistics: Statistics,
}

/// Map a config-level strategy choice to an engine strategy. `All` has no
/// single engine counterpart; it is handled by `solve_all`.
pub fn engine_strategy(choice: StrategyChoice) -> Option<Strategy> {
    match choice {
        StrategyChoice::Dfs => Some(Strategy::DepthFirst),
        StrategyChoice::Bfs => Some(Strategy::BreadthFirst),
        StrategyChoice::Ucs => Some(Strategy::UniformCost),
        StrategyChoice::Astar => Some(Strategy::AStar),
        StrategyChoice::All => None,
    }
}

/// Run one strategy over the pre-computed domains.
pub fn solve(
    problem: &Problem,
    domains: &DomainTable,
    strategy: Strategy,
    use_mrv: bool,
    deadline: Option<Instant>,
) -> StrategyReport {
    let space = ScheduleSpace {
        problem,
        domains,
        use_mrv,
    };
    let (outcome, statistics) = search::search(&space, strategy, deadline);
    match outcome {
        Outcome::Solved { state, cost } => StrategyReport {
            strategy,
            status: SolveStatus::Success,
            schedule: Some(state),
            cost: Some(cost),
            statistics,
        },
        Outcome::Exhausted => StrategyReport {
            strategy,
            status: SolveStatus::Failure,
            schedule: None,
            cost: None,
            statistics,
        },
        Outcome::DeadlineExceeded => StrategyReport {
            strategy,
            status: SolveStatus::Timeout,
            schedule: None,
            cost: None,
            statistics,
        },
    }
}

/// Comparison mode: run every strategy sequentially on the same pre-computed
/// domains, each with fresh per-run state.
pub fn solve_all(
    problem: &Problem,
    domains: &DomainTable,
    use_mrv: bool,
    deadline: Option<Instant>,
) -> Vec<StrategyReport> {
    [
        Strategy::DepthFirst,
        Strategy::BreadthFirst,
        Strategy::UniformCost,
        Strategy::AStar,
    ]
    .iter()
    .map(|&strategy| {
        info!("Running {} ...", strategy);
        solve(problem, domains, strategy, use_mrv, deadline)
    })
    .collect()
}

/// Render the comparison-mode metrics side by side.
pub fn format_comparison(reports: &[StrategyReport]) -> String {
    let mut result = String::new();
    writeln!(
        result,
        "{: <8} {: <8} {: >10} {: >10} {: >12} {: >8} {: >10}",
        "strategy", "status", "iterations", "expanded", "max frontier", "cost", "time"
    )
    .unwrap();
    for report in reports {
        let cost = report
            .cost
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            result,
            "{: <8} {: <8} {: >10} {: >10} {: >12} {: >8} {: >9.3}s",
            report.strategy.to_string(),
            report.status.as_str(),
            report.statistics.iterations,
            report.statistics.expanded,
            report.statistics.max_frontier_size,
            cost,
            report.statistics.total_time.as_millis() as f32 / 1000f32,
        )
        .unwrap();
    }
    result
}

/// The timetable CSP formulated as a `search::StateSpace`.
pub struct ScheduleSpace<'p> {
    problem: &'p Problem,
    domains: &'p DomainTable,
    use_mrv: bool,
}

impl<'p> ScheduleSpace<'p> {
    pub fn new(problem: &'p Problem, domains: &'p DomainTable, use_mrv: bool) -> Self {
        ScheduleSpace {
            problem,
            domains,
            use_mrv,
        }
    }

    /// Binary constraint check: may `event` be placed at (slot, room) on top
    /// of the partial schedule? Only assignments in the same slot with
    /// intersecting week sets can conflict.
    fn compatible(&self, state: &Schedule, event: usize, slot: usize, room: usize) -> bool {
        let weeks = &self.problem.events[event].weeks;
        let teacher = self.problem.events[event].teacher;
        let audience = &self.problem.events[event].audience;
        for assignment in state {
            if assignment.slot != slot {
                continue;
            }
            let other = &self.problem.events[assignment.event];
            if !weeks.intersects(&other.weeks) {
                continue;
            }
            if assignment.room == room {
                return false;
            }
            if other.teacher == teacher {
                return false;
            }
            if audience.iter().any(|group| other.audience.contains(group)) {
                return false;
            }
        }
        true
    }

    /// The event's compatible candidates: domain entries that also pass the
    /// binary checks against the current partial schedule, in domain order.
    fn candidates(&self, state: &Schedule, event: usize) -> Vec<(usize, usize)> {
        self.domains
            .domain(event)
            .candidates
            .iter()
            .copied()
            .filter(|&(slot, room)| self.compatible(state, event, slot, room))
            .collect()
    }

    fn has_candidate(&self, state: &Schedule, event: usize) -> bool {
        self.domains
            .domain(event)
            .candidates
            .iter()
            .any(|&(slot, room)| self.compatible(state, event, slot, room))
    }

    fn unassigned(&self, state: &Schedule) -> Vec<usize> {
        let mut assigned = vec![false; self.problem.events.len()];
        for assignment in state {
            assigned[assignment.event] = true;
        }
        (0..self.problem.events.len())
            .filter(|&event| !assigned[event])
            .collect()
    }

    /// Variable selection: the event to branch on next, with its compatible
    /// candidates. Returns None if the state is a dead end (some unassigned
    /// event has no compatible candidate left) or complete.
    fn select_event(&self, state: &Schedule) -> Option<(usize, Vec<(usize, usize)>)> {
        let unassigned = self.unassigned(state);
        if unassigned.is_empty() {
            return None;
        }
        if self.use_mrv {
            // Strictly-less comparison keeps ties on declaration order.
            let mut best: Option<(usize, Vec<(usize, usize)>)> = None;
            for &event in &unassigned {
                let candidates = self.candidates(state, event);
                if candidates.is_empty() {
                    return None;
                }
                match &best {
                    Some((_, best_candidates)) if candidates.len() >= best_candidates.len() => {}
                    _ => best = Some((event, candidates)),
                }
            }
            best
        } else {
            // Plain declaration order, but a dead end anywhere still prunes
            // the whole subtree.
            if unassigned
                .iter()
                .skip(1)
                .any(|&event| !self.has_candidate(state, event))
            {
                return None;
            }
            let event = unassigned[0];
            let candidates = self.candidates(state, event);
            if candidates.is_empty() {
                return None;
            }
            Some((event, candidates))
        }
    }
}

impl<'p> StateSpace for ScheduleSpace<'p> {
    type State = Schedule;
    type Action = Assignment;
    /// Canonical fingerprint: the assignment set sorted by event index, so
    /// two branches reaching the same partial schedule in different orders
    /// compare equal.
    type Key = Schedule;

    fn initial(&self) -> Schedule {
        Vec::new()
    }

    fn is_goal(&self, state: &Schedule) -> bool {
        state.len() == self.problem.events.len()
    }

    fn successors(&self, state: &Schedule) -> Vec<(Assignment, Schedule, u64)> {
        let (event, candidates) = match self.select_event(state) {
            Some(selection) => selection,
            None => return Vec::new(),
        };
        candidates
            .into_iter()
            .map(|(slot, room)| {
                let assignment = Assignment { event, slot, room };
                let mut child = state.clone();
                child.push(assignment);
                (assignment, child, 1)
            })
            .collect()
    }

    fn key(&self, state: &Schedule) -> Schedule {
        let mut key = state.clone();
        key.sort();
        key
    }
}
