
pub mod csp;
pub mod domain;
pub mod io;
pub mod model;
pub mod search;
pub mod weeks;

use serde::{Deserialize, Serialize};

/// A single scheduling decision: one event placed into a (timeslot, room) pair.
///
/// All three fields are indices into the `model::Problem` entity vectors (in
/// declaration order), not the textual ids of the input document. The derived
/// ordering sorts by event first, which is the canonical order used for state
/// fingerprints and for the assignment list of the solution document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub event: usize,
    pub slot: usize,
    pub room: usize,
}

/// A (partial or complete) schedule: the ordered list of assignments taken so
/// far, oldest first.
pub type Schedule = Vec<Assignment>;
