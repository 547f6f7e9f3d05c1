use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(RoomId);
id_newtype!(ClassId);
id_newtype!(CourseId);
id_newtype!(SessionKind);

/// Teaching day. Declaration order is the weekly order.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    /// Position in the week, starting at 1 for Monday.
    pub const fn rank(self) -> u8 {
        match self {
            Day::Mon => 1,
            Day::Tue => 2,
            Day::Wed => 3,
            Day::Thu => 4,
            Day::Fri => 5,
        }
    }

    pub const fn token(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
        }
    }

    pub fn from_token(s: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.token() == s)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
pub struct TimeSlot {
    pub day: Day,
    pub hour: u32,
}

impl TimeSlot {
    pub fn new(day: Day, hour: u32) -> Self {
        Self { day, hour }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.day, self.hour)
    }
}

/// One weekly occurrence of a course session kind.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
pub struct Session {
    pub course: CourseId,
    pub kind: SessionKind,
    pub index: String,
}

impl Session {
    pub fn new(course: &str, kind: &str, index: &str) -> Self {
        Self {
            course: course.into(),
            kind: kind.into(),
            index: index.to_string(),
        }
    }

    /// Whether both sessions are occurrences of the same course kind.
    pub fn same_series(&self, other: &Session) -> bool {
        self.course == other.course && self.kind == other.kind
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.course, self.kind, self.index)
    }
}

/// Enrollment of a class in a course.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
pub struct Association {
    pub class: ClassId,
    pub course: CourseId,
}

impl Association {
    pub fn new(class: &str, course: &str) -> Self {
        Self {
            class: class.into(),
            course: course.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Instance {
    pub timeslots: Vec<TimeSlot>,
    pub rooms: Vec<RoomId>,
    pub classes: Vec<ClassId>,
    pub sessions: Vec<Session>,
    pub associations: Vec<Association>,
}

impl Instance {
    pub fn timeslot_set(&self) -> HashSet<&TimeSlot> {
        self.timeslots.iter().collect()
    }

    pub fn room_set(&self) -> HashSet<&RoomId> {
        self.rooms.iter().collect()
    }
}

/// A session placed at a time slot in a room.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct Assignment {
    pub session: Session,
    pub timeslot: TimeSlot,
    pub room: RoomId,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.session, self.timeslot, self.room)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolveParams {
    #[serde(default = "default_optimize")]
    pub optimize: bool,
    #[serde(default)]
    pub step_limit: Option<u64>,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

fn default_optimize() -> bool {
    true
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            optimize: true,
            step_limit: None,
            time_limit_ms: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveEnvelope {
    pub instance: Instance,
    #[serde(default)]
    pub params: SolveParams,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// Schedule found and no cheaper one exists.
    Optimal,
    /// Schedule found, optimality not proven.
    Feasible,
    Infeasible,
    /// Budget ran out before any schedule was found.
    Overtime,
}

impl SolveStatus {
    pub fn has_schedule(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub cost: Option<u32>,
    pub assignments: Vec<Assignment>,
    pub stats: serde_json::Value,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Unscheduled,
    Duplicate,
    UnknownSession,
    UnknownTimeslot,
    UnknownRoom,
    RoomClash,
    ClassClash,
    SameDayRepeat,
    IndexOrder,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Violation {
    pub r#type: ViolationKind,
    pub sessions: Vec<Session>,
    pub details: serde_json::Value,
}
