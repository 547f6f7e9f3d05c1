//! Pairwise compatibility of two placed sessions.
//!
//! Rules are checked in a fixed precedence and the first broken one is
//! reported. The schedule verifier and the search predicate both go through
//! [`Compatibility::broken_rule`].

use std::cmp::Ordering;

use crate::collision::CollisionIndex;
use types::{RoomId, Session, TimeSlot, ViolationKind};

/// Upper limit on the hour any session may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CostBound {
    #[default]
    Unbounded,
    AtMost(u32),
}

impl CostBound {
    pub fn admits(self, hour: u32) -> bool {
        match self {
            CostBound::Unbounded => true,
            CostBound::AtMost(limit) => hour <= limit,
        }
    }

    /// The bound admitting only schedules strictly cheaper than `cost`.
    /// `None` when `cost` is already the smallest representable hour.
    pub fn below(cost: u32) -> Option<CostBound> {
        cost.checked_sub(1).map(CostBound::AtMost)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    Bound,
    RoomClash,
    ClassClash,
    SameDayRepeat,
    IndexOrder,
}

impl Rule {
    /// The bound is an optimization device, not a hard constraint, so it
    /// has no violation counterpart.
    pub fn violation_kind(self) -> Option<ViolationKind> {
        match self {
            Rule::Bound => None,
            Rule::RoomClash => Some(ViolationKind::RoomClash),
            Rule::ClassClash => Some(ViolationKind::ClassClash),
            Rule::SameDayRepeat => Some(ViolationKind::SameDayRepeat),
            Rule::IndexOrder => Some(ViolationKind::IndexOrder),
        }
    }
}

/// Total order on occurrence indices: integers first, numerically, then
/// everything else lexically. Integers of equal value fall back to text
/// order, so only identical strings compare equal.
pub fn index_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Compatibility<'a> {
    collisions: &'a CollisionIndex,
    bound: CostBound,
}

impl<'a> Compatibility<'a> {
    pub fn new(collisions: &'a CollisionIndex, bound: CostBound) -> Self {
        Self { collisions, bound }
    }

    pub fn bound(&self) -> CostBound {
        self.bound
    }

    pub fn broken_rule(
        &self,
        a: &Session,
        at: &TimeSlot,
        ar: &RoomId,
        b: &Session,
        bt: &TimeSlot,
        br: &RoomId,
    ) -> Option<Rule> {
        if !self.bound.admits(at.hour) || !self.bound.admits(bt.hour) {
            return Some(Rule::Bound);
        }

        if at == bt {
            if ar == br {
                return Some(Rule::RoomClash);
            }
            if self.collisions.collides(&a.course, &b.course) {
                return Some(Rule::ClassClash);
            }
        }

        if a.same_series(b) {
            if at.day == bt.day {
                return Some(Rule::SameDayRepeat);
            }
            let by_index = index_order(&a.index, &b.index);
            let by_day = at.day.rank().cmp(&bt.day.rank());
            if by_index != Ordering::Equal && by_index != by_day {
                return Some(Rule::IndexOrder);
            }
        }

        None
    }

    pub fn compatible(
        &self,
        a: &Session,
        at: &TimeSlot,
        ar: &RoomId,
        b: &Session,
        bt: &TimeSlot,
        br: &RoomId,
    ) -> bool {
        self.broken_rule(a, at, ar, b, bt, br).is_none()
    }
}
