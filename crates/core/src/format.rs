//! Line-oriented text format for instances and solutions.
//!
//! ```text
//! T Mon,9 Tue,9
//! R R1
//! S C1
//! W Math,L,1 Math,L,2
//! A C1,Math
//! ```
//!
//! Each line opens with a label token which is skipped.

use thiserror::Error;
use types::{Assignment, Association, ClassId, Day, Instance, RoomId, Session, TimeSlot};

const LINES: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected 5 lines (timeslots, rooms, classes, sessions, associations), found {0}")]
    LineCount(usize),
    #[error("line {line}: `{token}` should have {expected} comma-separated fields")]
    Tuple {
        line: usize,
        token: String,
        expected: usize,
    },
    #[error("line {line}: unknown day `{token}`")]
    UnknownDay { line: usize, token: String },
    #[error("line {line}: hour `{token}` is not a non-negative integer")]
    Hour { line: usize, token: String },
}

pub fn parse_instance(text: &str) -> Result<Instance, FormatError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.len() != LINES {
        return Err(FormatError::LineCount(lines.len()));
    }

    let timeslots = items(lines[0])
        .map(|tok| {
            let [day, hour] = fields::<2>(1, tok)?;
            let day = Day::from_token(day).ok_or_else(|| FormatError::UnknownDay {
                line: 1,
                token: day.to_string(),
            })?;
            let hour = hour.parse::<u32>().map_err(|_| FormatError::Hour {
                line: 1,
                token: hour.to_string(),
            })?;
            Ok(TimeSlot::new(day, hour))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rooms = items(lines[1]).map(RoomId::from).collect();
    let classes = items(lines[2]).map(ClassId::from).collect();

    let sessions = items(lines[3])
        .map(|tok| {
            let [course, kind, index] = fields::<3>(4, tok)?;
            Ok(Session::new(course, kind, index))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let associations = items(lines[4])
        .map(|tok| {
            let [class, course] = fields::<2>(5, tok)?;
            Ok(Association::new(class, course))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Instance {
        timeslots,
        rooms,
        classes,
        sessions,
        associations,
    })
}

fn items(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace().skip(1)
}

fn fields<const N: usize>(line: usize, token: &str) -> Result<[&str; N], FormatError> {
    let parts: Vec<&str> = token.split(',').collect();
    parts.try_into().map_err(|_| FormatError::Tuple {
        line,
        token: token.to_string(),
        expected: N,
    })
}

/// Renders a schedule one session per line, or `None` when there is none.
pub fn render_solution(assignments: Option<&[Assignment]>) -> String {
    match assignments {
        None => "None".to_string(),
        Some(list) => {
            let mut out = String::new();
            for a in list {
                out.push_str(&a.to_string());
                out.push('\n');
            }
            out
        }
    }
}
