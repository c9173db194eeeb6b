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

//! Pre-computation of per-event (timeslot, room) candidate domains.
//!
//! For every event, all unary placement rules (those testable without
//! reference to other assignments) are evaluated once over the full
//! slot × room grid. The search only ever enumerates the resulting candidate
//! lists; the binary constraint checker never re-tests unary rules. An event
//! whose domain comes out empty makes the whole problem infeasible, so the
//! table records which rule excluded its candidates for diagnostics.

use crate::model::Problem;
use itertools::iproduct;
use log::debug;
use ndarray::Array2;
use std::fmt;

/// The unary placement rules, in the order they are checked per candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryRule {
    SlotDuration,
    AllowedSlots,
    TeacherAvailability,
    GroupAvailability,
    RoomAvailability,
    RoomCapacity,
}

const ALL_RULES: [UnaryRule; 6] = [
    UnaryRule::SlotDuration,
    UnaryRule::AllowedSlots,
    UnaryRule::TeacherAvailability,
    UnaryRule::GroupAvailability,
    UnaryRule::RoomAvailability,
    UnaryRule::RoomCapacity,
];

impl fmt::Display for UnaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnaryRule::SlotDuration => "slot duration",
            UnaryRule::AllowedSlots => "allowed-slots whitelist",
            UnaryRule::TeacherAvailability => "teacher availability",
            UnaryRule::GroupAvailability => "group availability",
            UnaryRule::RoomAvailability => "room availability",
            UnaryRule::RoomCapacity => "room capacity",
        };
        write!(f, "{}", name)
    }
}

/// The pre-computed domain of one event.
#[derive(Debug)]
pub struct EventDomain {
    /// Candidate (slot, room) pairs, slots in declared order, rooms in
    /// declared order within each slot. This is the successor enumeration
    /// order of the search.
    pub candidates: Vec<(usize, usize)>,
    /// Membership mask over the slot × room grid, for O(1) lookups.
    mask: Array2<bool>,
    /// Sum of the audience's group sizes.
    pub demand: u32,
    /// `max(demand, min_room_capacity)` of the event's module.
    pub required_capacity: u32,
    /// Number of candidates excluded per rule (first failing rule counts).
    excluded: [u32; 6],
}

impl EventDomain {
    pub fn size(&self) -> usize {
        self.candidates.len()
    }

    pub fn permits(&self, slot: usize, room: usize) -> bool {
        self.mask[[slot, room]]
    }
}

/// Diagnostic for an event whose unary domain is empty. The search is not
/// started when any of these exist.
#[derive(Debug)]
pub struct EmptyDomain {
    pub event: usize,
    pub event_id: String,
    /// The rule that excluded the most candidates.
    pub dominant_rule: UnaryRule,
    pub excluded: [u32; 6],
}

impl fmt::Display for EmptyDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: u32 = self.excluded.iter().sum();
        write!(
            f,
            "event \"{}\" has no feasible (timeslot, room) pair; \
             dominant exclusion: {} ({} of {} candidates)",
            self.event_id,
            self.dominant_rule,
            self.excluded[self.dominant_rule as usize],
            total,
        )
    }
}

/// Per-event candidate domains plus the numbers MRV needs.
#[derive(Debug)]
pub struct DomainTable {
    domains: Vec<EventDomain>,
}

impl DomainTable {
    pub fn domain(&self, event: usize) -> &EventDomain {
        &self.domains[event]
    }

    /// Diagnostics for all events with an empty domain, in event order.
    pub fn infeasible(&self, problem: &Problem) -> Vec<EmptyDomain> {
        self.domains
            .iter()
            .enumerate()
            .filter(|(_, domain)| domain.candidates.is_empty())
            .map(|(event, domain)| {
                let dominant_rule = *ALL_RULES
                    .iter()
                    .max_by_key(|rule| domain.excluded[**rule as usize])
                    .unwrap();
                EmptyDomain {
                    event,
                    event_id: problem.events[event].id.clone(),
                    dominant_rule,
                    excluded: domain.excluded,
                }
            })
            .collect()
    }
}

/// Evaluate the unary rules for every event over the full slot × room grid.
pub fn precompute(problem: &Problem) -> DomainTable {
    let num_slots = problem.slots.len();
    let num_rooms = problem.rooms.len();

    let domains = problem
        .events
        .iter()
        .map(|event| {
            let demand = problem.demand(event.index);
            let required_capacity = problem.required_capacity(event.index);

            let mut candidates = Vec::new();
            let mut mask = Array2::from_elem([num_slots, num_rooms], false);
            let mut excluded = [0u32; 6];

            for (slot, room) in iproduct!(0..num_slots, 0..num_rooms) {
                let failed = first_failing_rule(problem, event.index, slot, room, required_capacity);
                match failed {
                    Some(rule) => excluded[rule as usize] += 1,
                    None => {
                        candidates.push((slot, room));
                        mask[[slot, room]] = true;
                    }
                }
            }

            debug!(
                "Domain of event \"{}\": {} of {} candidates",
                event.id,
                candidates.len(),
                num_slots * num_rooms
            );

            EventDomain {
                candidates,
                mask,
                demand,
                required_capacity,
                excluded,
            }
        })
        .collect();

    DomainTable { domains }
}

fn first_failing_rule(
    problem: &Problem,
    event: usize,
    slot: usize,
    room: usize,
    required_capacity: u32,
) -> Option<UnaryRule> {
    let event = &problem.events[event];
    if problem.slots[slot].duration_min != event.duration_min {
        return Some(UnaryRule::SlotDuration);
    }
    if let Some(allowed) = &event.allowed_slots {
        if !allowed.contains(&slot) {
            return Some(UnaryRule::AllowedSlots);
        }
    }
    if !problem.teachers[event.teacher].available[slot] {
        return Some(UnaryRule::TeacherAvailability);
    }
    if event
        .audience
        .iter()
        .any(|&group| !problem.groups[group].available[slot])
    {
        return Some(UnaryRule::GroupAvailability);
    }
    if !problem.rooms[room].available[slot] {
        return Some(UnaryRule::RoomAvailability);
    }
    if problem.rooms[room].capacity < required_capacity {
        return Some(UnaryRule::RoomCapacity);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::input;
    use crate::model::Problem;

    fn build_problem(json: &str) -> Problem {
        Problem::build(input::read(json.as_bytes()).unwrap()).unwrap()
    }

    fn capacity_doc(room_capacities: &[u32], min_room_capacity: u32) -> String {
        let rooms = room_capacities
            .iter()
            .enumerate()
            .map(|(i, c)| format!(r#"{{"id": "R{}", "capacity": {}}}"#, i + 1, c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"{{
                "timeslots": [
                    {{"id": "Mon_08", "day": "Mon", "start": "08:00", "end": "10:00", "duration_min": 120}},
                    {{"id": "Tue_08", "day": "Tue", "start": "08:00", "end": "09:00", "duration_min": 60}}
                ],
                "rooms": [{}],
                "teachers": [{{"id": "T1", "available": ["Mon_08", "Tue_08"]}}],
                "sessions": [{{
                    "id": "S1",
                    "groups": [{{"id": "G1", "size": 20}}],
                    "modules": [{{
                        "id": "M1",
                        "min_room_capacity": {},
                        "events": [{{
                            "id": "E1",
                            "teacher_id": "T1",
                            "duration_min": 120,
                            "audience": {{"type": "all_groups"}}
                        }}]
                    }}]
                }}]
            }}"#,
            rooms, min_room_capacity
        )
    }

    #[test]
    fn test_duration_and_capacity_rules() {
        // Demand is 20 but min_room_capacity is 50: the 40-seat room is
        // excluded even though it would hold the audience.
        let problem = build_problem(&capacity_doc(&[40, 60], 50));
        let table = precompute(&problem);
        let domain = table.domain(0);
        assert_eq!(domain.demand, 20);
        assert_eq!(domain.required_capacity, 50);
        // Only the 120-minute slot survives the duration rule; only the
        // 60-seat room survives the capacity rule.
        assert_eq!(domain.candidates, vec![(0, 1)]);
        assert!(domain.permits(0, 1));
        assert!(!domain.permits(0, 0));
        assert!(!domain.permits(1, 1));
        assert!(table.infeasible(&problem).is_empty());
    }

    #[test]
    fn test_empty_whitelist_yields_empty_domain() {
        let json = capacity_doc(&[60], 0).replace(
            r#""audience": {"type": "all_groups"}"#,
            r#""audience": {"type": "all_groups"}, "allowed_slots": []"#,
        );
        let problem = build_problem(&json);
        let table = precompute(&problem);
        assert_eq!(table.domain(0).size(), 0);

        let infeasible = table.infeasible(&problem);
        assert_eq!(infeasible.len(), 1);
        assert_eq!(infeasible[0].event_id, "E1");
        assert_eq!(infeasible[0].dominant_rule, UnaryRule::AllowedSlots);
    }

    #[test]
    fn test_unavailable_teacher_yields_empty_domain() {
        let json = capacity_doc(&[60], 0).replace(
            r#""teachers": [{"id": "T1", "available": ["Mon_08", "Tue_08"]}]"#,
            r#""teachers": [{"id": "T1"}]"#,
        );
        let problem = build_problem(&json);
        let table = precompute(&problem);

        let infeasible = table.infeasible(&problem);
        assert_eq!(infeasible.len(), 1);
        assert_eq!(infeasible[0].dominant_rule, UnaryRule::TeacherAvailability);
    }

    #[test]
    fn test_candidates_are_slot_major_in_declared_order() {
        let json = capacity_doc(&[60, 60], 0).replace(
            r#"{"id": "Tue_08", "day": "Tue", "start": "08:00", "end": "09:00", "duration_min": 60}"#,
            r#"{"id": "Tue_08", "day": "Tue", "start": "08:00", "end": "10:00", "duration_min": 120}"#,
        );
        let problem = build_problem(&json);
        let table = precompute(&problem);
        assert_eq!(
            table.domain(0).candidates,
            vec![(0, 0), (0, 1), (1, 0), (1, 1)]
        );
    }
}
