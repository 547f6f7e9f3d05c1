use std::collections::HashMap;

use serde::Serialize;
use types::{Assignment, Instance, Session, Violation, ViolationKind};

use crate::collision::CollisionIndex;
use crate::constraints::{Compatibility, CostBound};

/// Latest hour used by any placed session. `None` for an empty schedule.
pub fn makespan(assignments: &[Assignment]) -> Option<u32> {
    assignments.iter().map(|a| a.timeslot.hour).max()
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Report {
    pub cost: Option<u32>,
    pub violations: Vec<Violation>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn explain(inst: &Instance, assignments: &[Assignment]) -> Report {
    let collisions = CollisionIndex::build(&inst.associations);
    Report {
        cost: makespan(assignments),
        violations: verify(inst, &collisions, assignments),
    }
}

/// Checks a full schedule against every hard constraint.
pub fn verify(
    inst: &Instance,
    collisions: &CollisionIndex,
    assignments: &[Assignment],
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut placed: HashMap<&Session, usize> = HashMap::new();
    for a in assignments {
        *placed.entry(&a.session).or_default() += 1;
    }
    for s in &inst.sessions {
        match placed.get(s).copied().unwrap_or(0) {
            0 => violations.push(violation(
                ViolationKind::Unscheduled,
                vec![s.clone()],
                serde_json::json!({}),
            )),
            1 => {}
            n => violations.push(violation(
                ViolationKind::Duplicate,
                vec![s.clone()],
                serde_json::json!({ "count": n }),
            )),
        }
    }

    let known_sessions: std::collections::HashSet<&Session> = inst.sessions.iter().collect();
    let times = inst.timeslot_set();
    let rooms = inst.room_set();
    for a in assignments {
        if !known_sessions.contains(&a.session) {
            violations.push(violation(
                ViolationKind::UnknownSession,
                vec![a.session.clone()],
                serde_json::json!({}),
            ));
        }
        if !times.contains(&a.timeslot) {
            violations.push(violation(
                ViolationKind::UnknownTimeslot,
                vec![a.session.clone()],
                serde_json::json!({ "timeslot": a.timeslot.to_string() }),
            ));
        }
        if !rooms.contains(&a.room) {
            violations.push(violation(
                ViolationKind::UnknownRoom,
                vec![a.session.clone()],
                serde_json::json!({ "room": a.room.0 }),
            ));
        }
    }

    let rules = Compatibility::new(collisions, CostBound::Unbounded);
    for (i, a) in assignments.iter().enumerate() {
        for b in &assignments[i + 1..] {
            if a.session == b.session {
                continue;
            }
            let Some(kind) = rules
                .broken_rule(&a.session, &a.timeslot, &a.room, &b.session, &b.timeslot, &b.room)
                .and_then(|r| r.violation_kind())
            else {
                continue;
            };
            let details = match kind {
                ViolationKind::RoomClash => serde_json::json!({
                    "timeslot": a.timeslot.to_string(),
                    "room": a.room.0,
                }),
                ViolationKind::ClassClash => serde_json::json!({
                    "timeslot": a.timeslot.to_string(),
                    "classes": collisions
                        .shared_classes(&a.session.course, &b.session.course)
                        .iter()
                        .map(|c| c.0.as_str())
                        .collect::<Vec<_>>(),
                }),
                _ => serde_json::json!({
                    "days": [a.timeslot.day.token(), b.timeslot.day.token()],
                }),
            };
            violations.push(violation(kind, vec![a.session.clone(), b.session.clone()], details));
        }
    }

    violations
}

fn violation(kind: ViolationKind, sessions: Vec<Session>, details: serde_json::Value) -> Violation {
    Violation {
        r#type: kind,
        sessions,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Association, Day, TimeSlot};

    fn instance() -> Instance {
        Instance {
            timeslots: vec![
                TimeSlot::new(Day::Mon, 9),
                TimeSlot::new(Day::Tue, 9),
                TimeSlot::new(Day::Mon, 11),
            ],
            rooms: vec!["R1".into(), "R2".into()],
            classes: vec!["C1".into()],
            sessions: vec![
                Session::new("Math", "L", "1"),
                Session::new("Math", "L", "2"),
                Session::new("Phys", "L", "1"),
            ],
            associations: vec![Association::new("C1", "Math"), Association::new("C1", "Phys")],
        }
    }

    fn place(s: &Session, day: Day, hour: u32, room: &str) -> Assignment {
        Assignment {
            session: s.clone(),
            timeslot: TimeSlot::new(day, hour),
            room: room.into(),
        }
    }

    fn kinds(r: &Report) -> Vec<ViolationKind> {
        r.violations.iter().map(|v| v.r#type).collect()
    }

    #[test]
    fn makespan_is_latest_hour() {
        let inst = instance();
        let a = vec![
            place(&inst.sessions[0], Day::Mon, 9, "R1"),
            place(&inst.sessions[1], Day::Tue, 9, "R1"),
            place(&inst.sessions[2], Day::Mon, 11, "R1"),
        ];
        assert_eq!(makespan(&a), Some(11));
        assert_eq!(makespan(&[]), None);
    }

    #[test]
    fn valid_schedule_has_no_violations() {
        let inst = instance();
        let a = vec![
            place(&inst.sessions[0], Day::Mon, 9, "R1"),
            place(&inst.sessions[1], Day::Tue, 9, "R1"),
            place(&inst.sessions[2], Day::Mon, 11, "R1"),
        ];
        let report = explain(&inst, &a);
        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(report.cost, Some(11));
    }

    #[test]
    fn reports_clashes_and_ordering() {
        let inst = instance();
        let a = vec![
            place(&inst.sessions[0], Day::Tue, 9, "R1"),
            place(&inst.sessions[1], Day::Mon, 9, "R1"),
            place(&inst.sessions[2], Day::Mon, 9, "R2"),
        ];
        let report = explain(&inst, &a);
        let k = kinds(&report);
        assert!(k.contains(&ViolationKind::IndexOrder));
        assert!(k.contains(&ViolationKind::ClassClash));
        let clash = report
            .violations
            .iter()
            .find(|v| v.r#type == ViolationKind::ClassClash)
            .unwrap();
        assert_eq!(clash.details["classes"], serde_json::json!(["C1"]));
    }

    #[test]
    fn reports_missing_unknown_and_duplicates() {
        let inst = instance();
        let a = vec![
            place(&inst.sessions[0], Day::Mon, 9, "R1"),
            place(&inst.sessions[0], Day::Tue, 9, "R1"),
            place(&Session::new("Bio", "L", "1"), Day::Fri, 8, "R9"),
        ];
        let k = kinds(&explain(&inst, &a));
        assert!(k.contains(&ViolationKind::Duplicate));
        assert!(k.contains(&ViolationKind::Unscheduled));
        assert!(k.contains(&ViolationKind::UnknownSession));
        assert!(k.contains(&ViolationKind::UnknownTimeslot));
        assert!(k.contains(&ViolationKind::UnknownRoom));
    }
}
