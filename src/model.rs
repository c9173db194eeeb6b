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

//! Typed problem model and input validation.
//!
//! The raw document from `io::input` is checked against every structural
//! invariant exactly once, here. Downstream code treats the resulting
//! `Problem` as preconditions: all cross-references are resolved to vector
//! indices, availability lists are normalized to per-slot flags, week
//! specifications to `weeks::WeekSet` bitmasks and audiences to resolved
//! group index lists. The model is never mutated after `build` returns.

use crate::io::input::{RawAudience, RawDocument, RawWeeks};
use crate::weeks::WeekSet;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semester length assumed when the config omits `weeks_total`.
pub const DEFAULT_WEEKS_TOTAL: u32 = 16;

/// A validation error. Every variant names the offending entity and the rule
/// it violates; these errors are fatal and surface before any search starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("weeks_total must be at least 1, got {0}")]
    WeeksTotalZero(u32),
    #[error("{kind} id must be a non-empty string")]
    EmptyId { kind: &'static str },
    #[error("duplicate {kind} id \"{id}\"")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{context}: unknown {kind} \"{id}\"")]
    UnknownReference {
        context: String,
        kind: &'static str,
        id: String,
    },
    #[error("timeslot \"{id}\": cannot parse time \"{value}\" (expected HH:MM)")]
    BadTime { id: String, value: String },
    #[error(
        "timeslot \"{id}\": {start}-{end} spans {actual} minutes but duration_min is {declared}"
    )]
    SlotDurationMismatch {
        id: String,
        start: String,
        end: String,
        actual: i64,
        declared: u32,
    },
    #[error("{context}: week {week} is outside 1..={weeks_total}")]
    WeekOutOfRange {
        context: String,
        week: u32,
        weeks_total: u32,
    },
    #[error("{context}: cannot parse week range \"{value}\" (expected \"a-b\" with a <= b)")]
    BadWeekRange { context: String, value: String },
    #[error(
        "event \"{id}\": allowed slot \"{slot}\" lasts {slot_duration} minutes but the event lasts {event_duration}"
    )]
    AllowedSlotDurationMismatch {
        id: String,
        slot: String,
        slot_duration: u32,
        event_duration: u32,
    },
    #[error("event \"{id}\": audience group list is empty")]
    EmptyAudience { id: String },
    #[error("event \"{id}\": group \"{group}\" belongs to a different session")]
    AudienceOutsideSession { id: String, group: String },
}

/// Day of week of a timeslot, spelled exactly as in the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The search strategy requested in the config (or on the command line).
/// `All` runs every engine strategy sequentially and compares their metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    Dfs,
    Bfs,
    Ucs,
    Astar,
    All,
}

impl fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            StrategyChoice::Dfs => "dfs",
            StrategyChoice::Bfs => "bfs",
            StrategyChoice::Ucs => "ucs",
            StrategyChoice::Astar => "astar",
            StrategyChoice::All => "all",
        };
        write!(f, "{}", token)
    }
}

impl FromStr for StrategyChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dfs" => Ok(StrategyChoice::Dfs),
            "bfs" => Ok(StrategyChoice::Bfs),
            "ucs" => Ok(StrategyChoice::Ucs),
            "astar" => Ok(StrategyChoice::Astar),
            "all" => Ok(StrategyChoice::All),
            other => Err(format!(
                "unknown strategy \"{}\" (expected dfs, bfs, ucs, astar or all)",
                other
            )),
        }
    }
}

/// Resolved solver configuration with all defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub week_name: String,
    pub weeks_total: u32,
    pub strategy: StrategyChoice,
    pub use_mrv: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub id: String,
    pub day: Day,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration_min: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub index: usize,
    pub id: String,
    pub capacity: u32,
    /// Per-slot availability flag. A room without an availability list is
    /// available everywhere.
    pub available: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    pub index: usize,
    pub id: String,
    /// Per-slot availability flag. A teacher without an availability list is
    /// available nowhere (the opposite default of rooms, per the input
    /// contract).
    pub available: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub index: usize,
    pub id: String,
    pub session: usize,
    pub size: u32,
    pub available: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub index: usize,
    pub id: String,
    /// Group indices in declaration order.
    pub groups: Vec<usize>,
    /// Module indices in declaration order.
    pub modules: Vec<usize>,
    /// Event indices of all modules, flattened in declaration order.
    pub events: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub index: usize,
    pub id: String,
    pub session: usize,
    /// Informational passthrough for the solution document; never used for
    /// feasibility decisions.
    pub hours_per_week: Option<f64>,
    pub min_room_capacity: u32,
    /// Default week set inherited by events that specify none.
    pub weeks: WeekSet,
    pub events: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub index: usize,
    pub id: String,
    pub session: usize,
    pub module: usize,
    pub teacher: usize,
    pub duration_min: u32,
    /// Resolved audience: group indices, deduplicated, in declaration order.
    pub audience: Vec<usize>,
    /// Slot whitelist, if one was specified. `Some(vec![])` is a valid empty
    /// whitelist which makes the event unschedulable.
    pub allowed_slots: Option<Vec<usize>>,
    /// Effective week set: the event's own if specified, else the module's.
    pub weeks: WeekSet,
}

/// The validated, immutable problem description shared by every component.
#[derive(Debug, PartialEq)]
pub struct Problem {
    pub config: Config,
    pub slots: Vec<Slot>,
    pub rooms: Vec<Room>,
    pub teachers: Vec<Teacher>,
    pub sessions: Vec<Session>,
    pub groups: Vec<Group>,
    pub modules: Vec<Module>,
    pub events: Vec<Event>,
    event_index: HashMap<String, usize>,
}

impl Problem {
    /// Validate a raw input document and build the resolved model.
    pub fn build(raw: RawDocument) -> Result<Problem, ModelError> {
        let weeks_total = raw.config.weeks_total.unwrap_or(DEFAULT_WEEKS_TOTAL);
        if weeks_total < 1 {
            return Err(ModelError::WeeksTotalZero(weeks_total));
        }
        let config = Config {
            week_name: raw.config.week_name.unwrap_or_default(),
            weeks_total,
            strategy: raw.config.strategy.unwrap_or(StrategyChoice::Dfs),
            use_mrv: raw.config.use_mrv.unwrap_or(true),
        };

        // Timeslots
        let mut slots = Vec::with_capacity(raw.timeslots.len());
        let mut slot_index = HashMap::new();
        for raw_slot in raw.timeslots {
            let index = slots.len();
            check_id("timeslot", &raw_slot.id, index, &mut slot_index)?;
            let start = parse_time(&raw_slot.id, &raw_slot.start)?;
            let end = parse_time(&raw_slot.id, &raw_slot.end)?;
            let actual = (end - start).num_minutes();
            if actual <= 0 || actual != i64::from(raw_slot.duration_min) {
                return Err(ModelError::SlotDurationMismatch {
                    id: raw_slot.id,
                    start: raw_slot.start,
                    end: raw_slot.end,
                    actual,
                    declared: raw_slot.duration_min,
                });
            }
            slots.push(Slot {
                index,
                id: raw_slot.id,
                day: raw_slot.day,
                start,
                end,
                duration_min: raw_slot.duration_min,
            });
        }

        // Rooms: no availability list means always available.
        let mut rooms = Vec::with_capacity(raw.rooms.len());
        let mut room_index = HashMap::new();
        for raw_room in raw.rooms {
            let index = rooms.len();
            check_id("room", &raw_room.id, index, &mut room_index)?;
            let available = resolve_availability(
                raw_room.available.as_deref(),
                &slot_index,
                slots.len(),
                true,
                &format!("room \"{}\" availability", raw_room.id),
            )?;
            rooms.push(Room {
                index,
                id: raw_room.id,
                capacity: raw_room.capacity,
                available,
            });
        }

        // Teachers: no availability list means never available.
        let mut teachers = Vec::with_capacity(raw.teachers.len());
        let mut teacher_index = HashMap::new();
        for raw_teacher in raw.teachers {
            let index = teachers.len();
            check_id("teacher", &raw_teacher.id, index, &mut teacher_index)?;
            let available = resolve_availability(
                raw_teacher.available.as_deref(),
                &slot_index,
                slots.len(),
                false,
                &format!("teacher \"{}\" availability", raw_teacher.id),
            )?;
            teachers.push(Teacher {
                index,
                id: raw_teacher.id,
                available,
            });
        }

        // Sessions with their groups, modules and events
        let mut sessions = Vec::with_capacity(raw.sessions.len());
        let mut session_index = HashMap::new();
        let mut groups = Vec::new();
        let mut group_index = HashMap::new();
        let mut modules = Vec::new();
        let mut module_index = HashMap::new();
        let mut events = Vec::new();
        let mut event_index = HashMap::new();

        for raw_session in raw.sessions {
            let session_idx = sessions.len();
            check_id("session", &raw_session.id, session_idx, &mut session_index)?;

            let mut session_groups = Vec::with_capacity(raw_session.groups.len());
            for raw_group in raw_session.groups {
                let index = groups.len();
                check_id("group", &raw_group.id, index, &mut group_index)?;
                let available = resolve_availability(
                    raw_group.available.as_deref(),
                    &slot_index,
                    slots.len(),
                    true,
                    &format!("group \"{}\" availability", raw_group.id),
                )?;
                groups.push(Group {
                    index,
                    id: raw_group.id,
                    session: session_idx,
                    size: raw_group.size,
                    available,
                });
                session_groups.push(index);
            }

            let mut session_modules = Vec::with_capacity(raw_session.modules.len());
            let mut session_events = Vec::new();
            for raw_module in raw_session.modules {
                let module_idx = modules.len();
                check_id("module", &raw_module.id, module_idx, &mut module_index)?;
                let module_weeks = match &raw_module.weeks {
                    Some(spec) => resolve_weeks(
                        spec,
                        weeks_total,
                        &format!("module \"{}\"", raw_module.id),
                    )?,
                    None => WeekSet::all(weeks_total),
                };

                let mut module_events = Vec::with_capacity(raw_module.events.len());
                for raw_event in raw_module.events {
                    let event_idx = events.len();
                    check_id("event", &raw_event.id, event_idx, &mut event_index)?;

                    let teacher = *teacher_index.get(&raw_event.teacher_id).ok_or_else(|| {
                        ModelError::UnknownReference {
                            context: format!("event \"{}\"", raw_event.id),
                            kind: "teacher",
                            id: raw_event.teacher_id.clone(),
                        }
                    })?;

                    let audience = resolve_audience(
                        &raw_event.audience,
                        &raw_event.id,
                        &session_groups,
                        &groups,
                        &group_index,
                        session_idx,
                    )?;

                    let allowed_slots = match &raw_event.allowed_slots {
                        None => None,
                        Some(ids) => {
                            let mut resolved = Vec::with_capacity(ids.len());
                            for slot_id in ids {
                                let slot = *slot_index.get(slot_id).ok_or_else(|| {
                                    ModelError::UnknownReference {
                                        context: format!(
                                            "event \"{}\" allowed_slots",
                                            raw_event.id
                                        ),
                                        kind: "timeslot",
                                        id: slot_id.clone(),
                                    }
                                })?;
                                if slots[slot].duration_min != raw_event.duration_min {
                                    return Err(ModelError::AllowedSlotDurationMismatch {
                                        id: raw_event.id,
                                        slot: slot_id.clone(),
                                        slot_duration: slots[slot].duration_min,
                                        event_duration: raw_event.duration_min,
                                    });
                                }
                                resolved.push(slot);
                            }
                            Some(resolved)
                        }
                    };

                    let weeks = match &raw_event.weeks {
                        Some(spec) => resolve_weeks(
                            spec,
                            weeks_total,
                            &format!("event \"{}\"", raw_event.id),
                        )?,
                        None => module_weeks.clone(),
                    };

                    events.push(Event {
                        index: event_idx,
                        id: raw_event.id,
                        session: session_idx,
                        module: module_idx,
                        teacher,
                        duration_min: raw_event.duration_min,
                        audience,
                        allowed_slots,
                        weeks,
                    });
                    module_events.push(event_idx);
                    session_events.push(event_idx);
                }

                modules.push(Module {
                    index: module_idx,
                    id: raw_module.id,
                    session: session_idx,
                    hours_per_week: raw_module.hours_per_week,
                    min_room_capacity: raw_module.min_room_capacity.unwrap_or(0),
                    weeks: module_weeks,
                    events: module_events,
                });
                session_modules.push(module_idx);
            }

            sessions.push(Session {
                index: session_idx,
                id: raw_session.id,
                groups: session_groups,
                modules: session_modules,
                events: session_events,
            });
        }

        Ok(Problem {
            config,
            slots,
            rooms,
            teachers,
            sessions,
            groups,
            modules,
            events,
            event_index,
        })
    }

    pub fn event_by_id(&self, id: &str) -> Option<usize> {
        self.event_index.get(id).copied()
    }

    /// Sum of the audience's group sizes.
    pub fn demand(&self, event: usize) -> u32 {
        self.events[event]
            .audience
            .iter()
            .map(|&g| self.groups[g].size)
            .sum()
    }

    /// `max(demand, min_room_capacity)` of the event's module.
    pub fn required_capacity(&self, event: usize) -> u32 {
        let module = &self.modules[self.events[event].module];
        self.demand(event).max(module.min_room_capacity)
    }
}

fn check_id(
    kind: &'static str,
    id: &str,
    index: usize,
    map: &mut HashMap<String, usize>,
) -> Result<(), ModelError> {
    if id.is_empty() {
        return Err(ModelError::EmptyId { kind });
    }
    if map.insert(id.to_string(), index).is_some() {
        return Err(ModelError::DuplicateId {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn parse_time(slot_id: &str, value: &str) -> Result<NaiveTime, ModelError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ModelError::BadTime {
        id: slot_id.to_string(),
        value: value.to_string(),
    })
}

/// Normalize an optional availability list to one flag per timeslot. An
/// absent or empty list yields `default` everywhere.
fn resolve_availability(
    ids: Option<&[String]>,
    slot_index: &HashMap<String, usize>,
    num_slots: usize,
    default: bool,
    context: &str,
) -> Result<Vec<bool>, ModelError> {
    match ids {
        None => Ok(vec![default; num_slots]),
        Some(ids) if ids.is_empty() => Ok(vec![default; num_slots]),
        Some(ids) => {
            let mut available = vec![false; num_slots];
            for id in ids {
                let slot = *slot_index
                    .get(id)
                    .ok_or_else(|| ModelError::UnknownReference {
                        context: context.to_string(),
                        kind: "timeslot",
                        id: id.clone(),
                    })?;
                available[slot] = true;
            }
            Ok(available)
        }
    }
}

/// Expand a week specification into a bitmask, checking bounds.
fn resolve_weeks(
    spec: &RawWeeks,
    weeks_total: u32,
    context: &str,
) -> Result<WeekSet, ModelError> {
    match spec {
        RawWeeks::All => Ok(WeekSet::all(weeks_total)),
        RawWeeks::List { values } => {
            WeekSet::from_list(weeks_total, values).map_err(|week| ModelError::WeekOutOfRange {
                context: context.to_string(),
                week,
                weeks_total,
            })
        }
        RawWeeks::Ranges { values } => {
            let mut set = WeekSet::empty(weeks_total);
            for value in values {
                let (from, to) = parse_range(value).ok_or_else(|| ModelError::BadWeekRange {
                    context: context.to_string(),
                    value: value.clone(),
                })?;
                for week in from..=to {
                    if !set.insert(week) {
                        return Err(ModelError::WeekOutOfRange {
                            context: context.to_string(),
                            week,
                            weeks_total,
                        });
                    }
                }
            }
            Ok(set)
        }
    }
}

fn parse_range(value: &str) -> Option<(u32, u32)> {
    let (from, to) = value.split_once('-')?;
    let from: u32 = from.trim().parse().ok()?;
    let to: u32 = to.trim().parse().ok()?;
    if from <= to {
        Some((from, to))
    } else {
        None
    }
}

/// Resolve the audience variant to a deduplicated list of group indices in
/// declaration order.
fn resolve_audience(
    audience: &RawAudience,
    event_id: &str,
    session_groups: &[usize],
    groups: &[Group],
    group_index: &HashMap<String, usize>,
    session: usize,
) -> Result<Vec<usize>, ModelError> {
    match audience {
        RawAudience::AllGroups => Ok(session_groups.to_vec()),
        RawAudience::Groups { group_ids } => {
            let mut resolved = Vec::with_capacity(group_ids.len());
            for id in group_ids {
                let group = *group_index
                    .get(id)
                    .ok_or_else(|| ModelError::UnknownReference {
                        context: format!("event \"{}\" audience", event_id),
                        kind: "group",
                        id: id.clone(),
                    })?;
                if groups[group].session != session {
                    return Err(ModelError::AudienceOutsideSession {
                        id: event_id.to_string(),
                        group: id.clone(),
                    });
                }
                if !resolved.contains(&group) {
                    resolved.push(group);
                }
            }
            if resolved.is_empty() {
                return Err(ModelError::EmptyAudience {
                    id: event_id.to_string(),
                });
            }
            Ok(resolved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::input;

    fn build_from_json(json: &str) -> Result<Problem, ModelError> {
        Problem::build(input::read(json.as_bytes()).unwrap())
    }

    fn two_slot_doc() -> String {
        r#"{
            "config": {"weeks_total": 16},
            "timeslots": [
                {"id": "Mon_08", "day": "Mon", "start": "08:00", "end": "10:00", "duration_min": 120},
                {"id": "Mon_10", "day": "Mon", "start": "10:00", "end": "12:00", "duration_min": 120}
            ],
            "rooms": [{"id": "R1", "capacity": 30}],
            "teachers": [{"id": "T1", "available": ["Mon_08", "Mon_10"]}],
            "sessions": [{
                "id": "S1",
                "groups": [
                    {"id": "G1", "size": 10},
                    {"id": "G2", "size": 15}
                ],
                "modules": [{
                    "id": "M1",
                    "weeks": {"mode": "ranges", "values": ["1-8"]},
                    "events": [{
                        "id": "E1",
                        "teacher_id": "T1",
                        "duration_min": 120,
                        "audience": {"type": "all_groups"}
                    }]
                }]
            }]
        }"#
        .to_string()
    }

    #[test]
    fn test_build_resolves_references() {
        let problem = build_from_json(&two_slot_doc()).unwrap();
        assert_eq!(problem.config.weeks_total, 16);
        assert_eq!(problem.config.strategy, StrategyChoice::Dfs);
        assert!(problem.config.use_mrv);
        assert_eq!(problem.config.week_name, "");

        assert_eq!(problem.slots.len(), 2);
        assert_eq!(problem.events.len(), 1);
        let event = &problem.events[0];
        assert_eq!(event.teacher, 0);
        assert_eq!(event.audience, vec![0, 1]);
        assert_eq!(event.session, 0);
        assert_eq!(event.module, 0);
        // Event inherits the module's week set.
        assert_eq!(event.weeks.to_sorted_list(), (1..=8).collect::<Vec<_>>());
        assert_eq!(problem.demand(0), 25);
        assert_eq!(problem.required_capacity(0), 25);
        assert_eq!(problem.event_by_id("E1"), Some(0));
        assert_eq!(problem.event_by_id("E9"), None);
        assert_eq!(problem.sessions[0].events, vec![0]);
    }

    #[test]
    fn test_availability_defaults_are_asymmetric() {
        let problem = build_from_json(&two_slot_doc()).unwrap();
        // Room without a list: always available.
        assert_eq!(problem.rooms[0].available, vec![true, true]);
        // Groups without a list: always available.
        assert_eq!(problem.groups[0].available, vec![true, true]);

        let json = two_slot_doc().replace(
            r#""teachers": [{"id": "T1", "available": ["Mon_08", "Mon_10"]}]"#,
            r#""teachers": [{"id": "T1"}]"#,
        );
        let problem = build_from_json(&json).unwrap();
        // Teacher without a list: never available.
        assert_eq!(problem.teachers[0].available, vec![false, false]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = two_slot_doc().replace("Mon_10", "Mon_08");
        assert_eq!(
            build_from_json(&json),
            Err(ModelError::DuplicateId {
                kind: "timeslot",
                id: "Mon_08".into()
            })
        );
    }

    #[test]
    fn test_unknown_teacher_rejected() {
        let json = two_slot_doc().replace(r#""teacher_id": "T1""#, r#""teacher_id": "T9""#);
        assert_eq!(
            build_from_json(&json),
            Err(ModelError::UnknownReference {
                context: "event \"E1\"".into(),
                kind: "teacher",
                id: "T9".into()
            })
        );
    }

    #[test]
    fn test_weeks_total_zero_rejected() {
        let json = two_slot_doc().replace(r#""weeks_total": 16"#, r#""weeks_total": 0"#);
        assert_eq!(build_from_json(&json), Err(ModelError::WeeksTotalZero(0)));
    }

    #[test]
    fn test_week_out_of_range_rejected() {
        let json = two_slot_doc().replace(r#"["1-8"]"#, r#"["1-17"]"#);
        assert_eq!(
            build_from_json(&json),
            Err(ModelError::WeekOutOfRange {
                context: "module \"M1\"".into(),
                week: 17,
                weeks_total: 16
            })
        );
    }

    #[test]
    fn test_bad_week_range_rejected() {
        let json = two_slot_doc().replace(r#"["1-8"]"#, r#"["8-1"]"#);
        assert_eq!(
            build_from_json(&json),
            Err(ModelError::BadWeekRange {
                context: "module \"M1\"".into(),
                value: "8-1".into()
            })
        );
    }

    #[test]
    fn test_slot_duration_mismatch_rejected() {
        let json = two_slot_doc().replace(
            r#"{"id": "Mon_10", "day": "Mon", "start": "10:00", "end": "12:00", "duration_min": 120}"#,
            r#"{"id": "Mon_10", "day": "Mon", "start": "10:00", "end": "12:00", "duration_min": 90}"#,
        );
        assert!(matches!(
            build_from_json(&json),
            Err(ModelError::SlotDurationMismatch { actual: 120, declared: 90, .. })
        ));
    }

    #[test]
    fn test_allowed_slot_duration_mismatch_rejected() {
        let json = two_slot_doc().replace(
            r#""audience": {"type": "all_groups"}"#,
            r#""audience": {"type": "all_groups"}, "allowed_slots": ["Short"]"#,
        );
        let json = json.replace(
            r#"{"id": "Mon_10", "day": "Mon", "start": "10:00", "end": "12:00", "duration_min": 120}"#,
            r#"{"id": "Mon_10", "day": "Mon", "start": "10:00", "end": "12:00", "duration_min": 120},
               {"id": "Short", "day": "Tue", "start": "08:00", "end": "09:00", "duration_min": 60}"#,
        );
        assert_eq!(
            build_from_json(&json),
            Err(ModelError::AllowedSlotDurationMismatch {
                id: "E1".into(),
                slot: "Short".into(),
                slot_duration: 60,
                event_duration: 120
            })
        );
    }

    #[test]
    fn test_explicit_audience_dedup_and_session_check() {
        let json = two_slot_doc().replace(
            r#""audience": {"type": "all_groups"}"#,
            r#""audience": {"type": "groups", "group_ids": ["G2", "G2", "G1"]}"#,
        );
        let problem = build_from_json(&json).unwrap();
        assert_eq!(problem.events[0].audience, vec![1, 0]);

        let json = two_slot_doc().replace(
            r#""audience": {"type": "all_groups"}"#,
            r#""audience": {"type": "groups", "group_ids": []}"#,
        );
        assert_eq!(
            build_from_json(&json),
            Err(ModelError::EmptyAudience { id: "E1".into() })
        );
    }

    #[test]
    fn test_event_weeks_override_module_weeks() {
        let json = two_slot_doc().replace(
            r#""audience": {"type": "all_groups"}"#,
            r#""audience": {"type": "all_groups"}, "weeks": {"mode": "list", "values": [9, 11]}"#,
        );
        let problem = build_from_json(&json).unwrap();
        assert_eq!(problem.events[0].weeks.to_sorted_list(), vec![9, 11]);
    }

    #[test]
    fn test_empty_allowed_slots_is_kept_as_empty_whitelist() {
        let json = two_slot_doc().replace(
            r#""audience": {"type": "all_groups"}"#,
            r#""audience": {"type": "all_groups"}, "allowed_slots": []"#,
        );
        let problem = build_from_json(&json).unwrap();
        assert_eq!(problem.events[0].allowed_slots, Some(vec![]));
    }
}
