pub mod collision;
pub mod constraints;
pub mod format;
pub mod scoring;

use std::collections::HashSet;

use thiserror::Error;

pub use collision::CollisionIndex;
pub use constraints::{Compatibility, CostBound, Rule};
pub use format::{parse_instance, render_solution, FormatError};
pub use types::{
    Assignment, Association, ClassId, CourseId, Day, Instance, RoomId, Session, SolveEnvelope,
    SolveParams, SolveResult, SolveStatus, TimeSlot,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid instance: {}", .0.join("; "))]
    Problems(Vec<String>),
}

impl ValidationError {
    pub fn problems(&self) -> &[String] {
        match self {
            ValidationError::Problems(list) => list,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name}: {s}"));
            }
        }
    }
    chk_unique("timeslot", inst.timeslots.iter(), &mut errors);
    chk_unique("room", inst.rooms.iter(), &mut errors);
    chk_unique("class", inst.classes.iter(), &mut errors);
    chk_unique("session", inst.sessions.iter(), &mut errors);

    let classes: HashSet<_> = inst.classes.iter().collect();
    for a in &inst.associations {
        if !classes.contains(&a.class) {
            errors.push(format!(
                "association {},{} references missing class {}",
                a.class, a.course, a.class
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Problems(errors))
    }
}

/// Parses the text format and validates the result.
pub fn load(text: &str) -> Result<Instance, LoadError> {
    let inst = parse_instance(text)?;
    validate(&inst)?;
    tracing::debug!(
        timeslots = inst.timeslots.len(),
        rooms = inst.rooms.len(),
        sessions = inst.sessions.len(),
        "instance loaded"
    );
    Ok(inst)
}

pub trait Solver: Send + Sync + 'static {
    fn solve(&self, env: &SolveEnvelope) -> anyhow::Result<SolveResult>;
}
