
//! Serialization of the solution document.
//!
//! The document carries a `meta` header describing the run and one record
//! per scheduled assignment, denormalized with everything a renderer needs
//! (ids, weeks, durations, capacity numbers), so consumers never have to go
//! back to the input document.

use crate::csp::SolveStatus;
use crate::model::{Problem, StrategyChoice};
use crate::Schedule;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SolutionDocument {
    pub meta: Meta,
    pub assignments: Vec<AssignmentRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub week_name: String,
    pub weeks_total: u32,
    pub strategy: String,
    pub use_mrv: bool,
    pub status: String,
    pub events_total: usize,
    pub events_scheduled: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRecord {
    pub event_id: String,
    pub session_id: String,
    pub module_id: String,
    pub teacher_id: String,
    pub group_ids: Vec<String>,
    pub timeslot_id: String,
    pub room_id: String,
    /// Weeks the event runs on, ascending.
    pub weeks: Vec<u32>,
    pub duration_min: u32,
    pub duration_hours: f64,
    /// Informational passthrough; null if the module did not declare it.
    pub module_hours_per_week: Option<f64>,
    pub demand: u32,
    pub min_room_capacity: u32,
    pub required_capacity: u32,
    pub room_capacity: u32,
}

/// Assemble the solution document for one finished run. On failure or
/// timeout the assignment list is empty.
pub fn build_document(
    problem: &Problem,
    strategy: StrategyChoice,
    status: SolveStatus,
    schedule: Option<&Schedule>,
) -> SolutionDocument {
    let scheduled: Schedule = match (status, schedule) {
        (SolveStatus::Success, Some(schedule)) => {
            // Event declaration order, the canonical order of the document.
            let mut sorted = schedule.clone();
            sorted.sort();
            sorted
        }
        _ => Vec::new(),
    };
    let assignments: Vec<AssignmentRecord> = scheduled
        .iter()
        .map(|assignment| {
            let event = &problem.events[assignment.event];
            let module = &problem.modules[event.module];
            let room = &problem.rooms[assignment.room];
            AssignmentRecord {
                event_id: event.id.clone(),
                session_id: problem.sessions[event.session].id.clone(),
                module_id: module.id.clone(),
                teacher_id: problem.teachers[event.teacher].id.clone(),
                group_ids: event
                    .audience
                    .iter()
                    .map(|&g| problem.groups[g].id.clone())
                    .collect(),
                timeslot_id: problem.slots[assignment.slot].id.clone(),
                room_id: room.id.clone(),
                weeks: event.weeks.to_sorted_list(),
                duration_min: event.duration_min,
                duration_hours: f64::from(event.duration_min) / 60.0,
                module_hours_per_week: module.hours_per_week,
                demand: problem.demand(event.index),
                min_room_capacity: module.min_room_capacity,
                required_capacity: problem.required_capacity(event.index),
                room_capacity: room.capacity,
            }
        })
        .collect();

    SolutionDocument {
        meta: Meta {
            week_name: problem.config.week_name.clone(),
            weeks_total: problem.config.weeks_total,
            strategy: strategy.to_string(),
            use_mrv: problem.config.use_mrv,
            status: status.as_str().to_string(),
            events_total: problem.events.len(),
            events_scheduled: assignments.len(),
        },
        assignments,
    }
}

/// Write the solution document as JSON to a Writer (e.g. an output file).
pub fn write<W: std::io::Write>(
    writer: W,
    document: &SolutionDocument,
) -> Result<(), serde_json::Error> {
    serde_json::to_writer(writer, document)
}
