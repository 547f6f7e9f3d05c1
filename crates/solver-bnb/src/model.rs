use std::sync::Arc;

use sched_core::{scoring, CollisionIndex, Compatibility, CostBound};
use solver_csp::{complete_graph, Csp, CspError};
use types::{Assignment, Instance, RoomId, Session, TimeSlot};

/// Solver-facing view of an instance, derived once and reused by every
/// optimization round.
///
/// Variables are session indices and values are indices into
/// [`ProblemModel::placements`].
pub struct ProblemModel<'a> {
    inst: &'a Instance,
    placements: Vec<(TimeSlot, RoomId)>,
    collisions: CollisionIndex,
    neighbors: Arc<[Vec<usize>]>,
}

impl<'a> ProblemModel<'a> {
    pub fn build(inst: &'a Instance) -> Self {
        // earlier hours first so the first schedule found already leans early
        let mut timeslots = inst.timeslots.clone();
        timeslots.sort_by_key(|t| t.hour);

        let placements = timeslots
            .iter()
            .flat_map(|t| inst.rooms.iter().map(move |r| (*t, r.clone())))
            .collect::<Vec<_>>();

        let model = Self {
            inst,
            placements,
            collisions: CollisionIndex::build(&inst.associations),
            neighbors: complete_graph(inst.sessions.len()).into(),
        };
        tracing::debug!(
            sessions = model.sessions().len(),
            placements = model.placements.len(),
            courses = model.collisions.course_count(),
            "model built"
        );
        model
    }

    pub fn sessions(&self) -> &'a [Session] {
        &self.inst.sessions
    }

    pub fn placements(&self) -> &[(TimeSlot, RoomId)] {
        &self.placements
    }

    pub fn collisions(&self) -> &CollisionIndex {
        &self.collisions
    }

    /// The search problem under `bound`.
    ///
    /// Besides gating pairs inside the predicate, the bound also trims the
    /// domains so that a session without neighbors honors it too.
    pub fn csp(
        &self,
        bound: CostBound,
    ) -> Result<Csp<usize, impl Fn(usize, &usize, usize, &usize) -> bool + '_>, CspError> {
        let domain: Vec<usize> = self
            .placements
            .iter()
            .enumerate()
            .filter(|(_, (t, _))| bound.admits(t.hour))
            .map(|(i, _)| i)
            .collect();
        let domains = vec![domain; self.sessions().len()];

        let sessions = self.sessions();
        let placements = &self.placements;
        let rules = Compatibility::new(&self.collisions, bound);
        let constraint = move |a: usize, pa: &usize, b: usize, pb: &usize| {
            let (ta, ra) = &placements[*pa];
            let (tb, rb) = &placements[*pb];
            rules.compatible(&sessions[a], ta, ra, &sessions[b], tb, rb)
        };

        Csp::new(domains, Arc::clone(&self.neighbors), constraint)
    }

    /// Turns solver values back into assignments, in session order.
    pub fn decode(&self, values: &[usize]) -> Vec<Assignment> {
        self.sessions()
            .iter()
            .zip(values)
            .map(|(s, &p)| {
                let (timeslot, room) = &self.placements[p];
                Assignment {
                    session: s.clone(),
                    timeslot: *timeslot,
                    room: room.clone(),
                }
            })
            .collect()
    }

    pub fn cost(&self, values: &[usize]) -> Option<u32> {
        scoring::makespan(&self.decode(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solver_csp::{Outcome, SearchConfig};
    use types::{Association, Day};

    fn instance() -> Instance {
        Instance {
            timeslots: vec![
                TimeSlot::new(Day::Tue, 11),
                TimeSlot::new(Day::Mon, 9),
                TimeSlot::new(Day::Wed, 9),
            ],
            rooms: vec!["R1".into(), "R2".into()],
            classes: vec!["C1".into()],
            sessions: vec![Session::new("Math", "L", "1")],
            associations: vec![Association::new("C1", "Math")],
        }
    }

    #[test]
    fn placements_are_hour_sorted_and_stable() {
        let inst = instance();
        let model = ProblemModel::build(&inst);
        let order: Vec<String> = model
            .placements()
            .iter()
            .map(|(t, r)| format!("{t} {r}"))
            .collect();
        assert_eq!(
            order,
            vec!["Mon,9 R1", "Mon,9 R2", "Wed,9 R1", "Wed,9 R2", "Tue,11 R1", "Tue,11 R2"]
        );
    }

    #[test]
    fn unbounded_domain_is_full_cross_product() {
        let inst = instance();
        let model = ProblemModel::build(&inst);
        let csp = model.csp(CostBound::Unbounded).unwrap();
        assert_eq!(csp.domain(0), &[0, 1, 2, 3, 4, 5]);
        assert!(csp.neighbors(0).is_empty());
    }

    #[test]
    fn bound_applies_to_a_lone_session() {
        let inst = instance();
        let model = ProblemModel::build(&inst);
        let csp = model.csp(CostBound::AtMost(10)).unwrap();
        assert_eq!(csp.domain(0).len(), 4);
        let Outcome::Solved(values) = csp.solve(&SearchConfig::default()).outcome else {
            panic!("expected a schedule");
        };
        assert_eq!(model.cost(&values), Some(9));

        let csp = model.csp(CostBound::AtMost(8)).unwrap();
        assert_eq!(csp.solve(&SearchConfig::default()).outcome, Outcome::Unsatisfiable);
    }

    #[test]
    fn decode_keeps_session_order() {
        let inst = instance();
        let model = ProblemModel::build(&inst);
        let a = model.decode(&[4]);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].to_string(), "Math,L,1 Tue,11 R1");
    }
}
