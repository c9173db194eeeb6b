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

pub mod input;
pub mod output;

use crate::model::Problem;
use crate::weeks::WeekSet;
use crate::Schedule;
use std::fmt::Write;

/// Format the calculated schedule into a human readable String (e.g. to
/// print it to stdout).
///
/// The output format will look like
/// ```text
/// ===== Mon 08:00-10:00 (Mon_08-10) =====
/// - E1: module M1, teacher T1, room R1, groups G1+G2, weeks 1-8
///
/// ===== Mon 10:00-12:00 (Mon_10-12) =====
/// …
/// ```
pub fn format_schedule(problem: &Problem, schedule: &Schedule) -> String {
    let mut result = String::new();
    for slot in problem.slots.iter() {
        write!(
            result,
            "\n===== {} {}-{} ({}) =====\n",
            slot.day,
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M"),
            slot.id
        )
        .unwrap();
        for assignment in schedule.iter().filter(|a| a.slot == slot.index) {
            let event = &problem.events[assignment.event];
            let groups = event
                .audience
                .iter()
                .map(|&g| problem.groups[g].id.as_str())
                .collect::<Vec<&str>>()
                .join("+");
            writeln!(
                result,
                "- {}: module {}, teacher {}, room {}, groups {}, weeks {}",
                event.id,
                problem.modules[event.module].id,
                problem.teachers[event.teacher].id,
                problem.rooms[assignment.room].id,
                groups,
                format_weeks(&event.weeks),
            )
            .unwrap();
        }
    }

    result
}

/// Render a week set as a compact range list, e.g. "1-8,10".
pub fn format_weeks(weeks: &WeekSet) -> String {
    let list = weeks.to_sorted_list();
    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < list.len() {
        let from = list[i];
        let mut to = from;
        while i + 1 < list.len() && list[i + 1] == to + 1 {
            to = list[i + 1];
            i += 1;
        }
        if from == to {
            parts.push(from.to_string());
        } else {
            parts.push(format!("{}-{}", from, to));
        }
        i += 1;
    }
    parts.join(",")
}

pub fn debug_list_of_events(problem: &Problem) -> String {
    problem
        .events
        .iter()
        .map(|e| format!("{:02} {}", e.index, e.id))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Assert that a validated problem model is consistent (in terms of the
/// entities' indexes and cross referencing indexes)
pub fn assert_model_consistency(problem: &Problem) {
    let num_slots = problem.slots.len();
    for (i, slot) in problem.slots.iter().enumerate() {
        assert_eq!(i, slot.index, "Index of {}. slot is {}", i, slot.index);
    }
    for (i, room) in problem.rooms.iter().enumerate() {
        assert_eq!(i, room.index, "Index of {}. room is {}", i, room.index);
        assert_eq!(num_slots, room.available.len());
    }
    for (i, teacher) in problem.teachers.iter().enumerate() {
        assert_eq!(i, teacher.index);
        assert_eq!(num_slots, teacher.available.len());
    }
    for (i, group) in problem.groups.iter().enumerate() {
        assert_eq!(i, group.index);
        assert!(group.session < problem.sessions.len());
        assert_eq!(num_slots, group.available.len());
    }
    for (i, event) in problem.events.iter().enumerate() {
        assert_eq!(i, event.index, "Index of {}. event is {}", i, event.index);
        assert!(event.teacher < problem.teachers.len());
        assert!(event.module < problem.modules.len());
        assert!(event.session < problem.sessions.len());
        for &group in event.audience.iter() {
            assert!(group < problem.groups.len());
            assert_eq!(
                problem.groups[group].session, event.session,
                "Audience of event {} crosses sessions",
                event.id
            );
        }
        if let Some(allowed) = &event.allowed_slots {
            for &slot in allowed.iter() {
                assert!(slot < num_slots);
            }
        }
        assert_eq!(problem.config.weeks_total, event.weeks.weeks_total());
    }
}
