
//! Deserialization of the problem input document.
//!
//! The `Raw*` structs mirror the JSON schema one to one and perform no
//! validation beyond shape: cross-reference resolution, week expansion and
//! every semantic invariant live in `model::Problem::build`, which consumes
//! the `RawDocument` produced here.

use crate::model::{Day, StrategyChoice};
use serde::Deserialize;

/// Top-level shape of the input document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub config: RawConfig,
    pub timeslots: Vec<RawTimeslot>,
    pub rooms: Vec<RawRoom>,
    pub teachers: Vec<RawTeacher>,
    pub sessions: Vec<RawSession>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub week_name: Option<String>,
    pub weeks_total: Option<u32>,
    pub strategy: Option<StrategyChoice>,
    pub use_mrv: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTimeslot {
    pub id: String,
    pub day: Day,
    /// Wall-clock start time in "HH:MM" form.
    pub start: String,
    /// Wall-clock end time in "HH:MM" form.
    pub end: String,
    pub duration_min: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRoom {
    pub id: String,
    pub capacity: u32,
    /// Timeslot ids on which the room may be used. Absent or empty means the
    /// room is always available.
    pub available: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeacher {
    pub id: String,
    /// Timeslot ids on which the teacher can teach. Absent or empty means the
    /// teacher is never available. This is deliberately the opposite default
    /// of rooms.
    pub available: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSession {
    pub id: String,
    pub groups: Vec<RawGroup>,
    pub modules: Vec<RawModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    pub id: String,
    pub size: u32,
    pub available: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModule {
    pub id: String,
    /// Informational passthrough; never used for feasibility decisions.
    pub hours_per_week: Option<f64>,
    pub min_room_capacity: Option<u32>,
    /// Default week set, inherited by events that specify none.
    pub weeks: Option<RawWeeks>,
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub teacher_id: String,
    pub duration_min: u32,
    pub audience: RawAudience,
    /// Slot whitelist. An explicitly empty list is an empty whitelist (the
    /// event becomes unschedulable), distinct from an absent field.
    pub allowed_slots: Option<Vec<String>>,
    pub weeks: Option<RawWeeks>,
}

/// Week-set specification, one of three input modes. All modes are normalized
/// to a `weeks::WeekSet` bitmask during validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RawWeeks {
    All,
    List { values: Vec<u32> },
    Ranges { values: Vec<String> },
}

/// The audience of an event as a tagged variant; resolution to a concrete
/// group list happens once during validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawAudience {
    AllGroups,
    Groups { group_ids: Vec<String> },
}

/// Read a problem input document from a reader (e.g. an input file).
pub fn read<R: std::io::Read>(reader: R) -> Result<RawDocument, serde_json::Error> {
    serde_json::from_reader(reader)
}
