use proptest::prelude::*;
use proptest::sample::subsequence;
use sched_core::{
    scoring, Assignment, Association, Day, Instance, RoomId, Session, SolveEnvelope, SolveParams,
    SolveStatus, Solver, TimeSlot,
};
use solver_bnb::BnbSolver;

fn all_slots() -> Vec<TimeSlot> {
    Day::ALL
        .iter()
        .flat_map(|&d| [8, 9, 10].map(|h| TimeSlot::new(d, h)))
        .collect()
}

fn all_sessions() -> Vec<Session> {
    let mut out = Vec::new();
    for course in ["Math", "Phys"] {
        for kind in ["L", "T"] {
            for index in ["1", "2"] {
                out.push(Session::new(course, kind, index));
            }
        }
    }
    out
}

prop_compose! {
    fn instances()(
        timeslots in subsequence(all_slots(), 1..=5).prop_shuffle(),
        rooms in 1usize..=2,
        sessions in subsequence(all_sessions(), 0..=4).prop_shuffle(),
        enrolled in proptest::collection::vec(any::<bool>(), 4),
    ) -> Instance {
        let mut associations = Vec::new();
        for (i, (class, course)) in [("C1", "Math"), ("C1", "Phys"), ("C2", "Math"), ("C2", "Phys")]
            .into_iter()
            .enumerate()
        {
            if enrolled[i] {
                associations.push(Association::new(class, course));
            }
        }
        Instance {
            timeslots,
            rooms: ["R1", "R2"][..rooms].iter().map(|&r| r.into()).collect(),
            classes: vec!["C1".into(), "C2".into()],
            sessions,
            associations,
        }
    }
}

/// Hard constraints for one pair of placements, written directly against
/// the instance rather than through the solver's predicate. Indices in these
/// instances are always small integers.
fn pair_ok(
    inst: &Instance,
    a: &Session,
    at: &TimeSlot,
    ar: &RoomId,
    b: &Session,
    bt: &TimeSlot,
    br: &RoomId,
) -> bool {
    if at == bt {
        if ar == br {
            return false;
        }
        let shares_class = inst.associations.iter().any(|x| {
            x.course == a.course
                && inst
                    .associations
                    .iter()
                    .any(|y| y.course == b.course && y.class == x.class)
        });
        if shares_class {
            return false;
        }
    }
    if a.course == b.course && a.kind == b.kind {
        if at.day == bt.day {
            return false;
        }
        let ai: u32 = a.index.parse().unwrap();
        let bi: u32 = b.index.parse().unwrap();
        if (ai < bi) != (at.day.rank() < bt.day.rank()) {
            return false;
        }
    }
    true
}

fn schedule_ok(inst: &Instance, assignments: &[Assignment]) -> bool {
    assignments.len() == inst.sessions.len()
        && assignments.iter().zip(&inst.sessions).all(|(a, s)| {
            &a.session == s && inst.timeslots.contains(&a.timeslot) && inst.rooms.contains(&a.room)
        })
        && assignments.iter().enumerate().all(|(i, a)| {
            assignments[i + 1..].iter().all(|b| {
                pair_ok(inst, &a.session, &a.timeslot, &a.room, &b.session, &b.timeslot, &b.room)
            })
        })
}

/// Cheapest makespan over every complete placement, `Some(None)` for an
/// empty session list, `None` when nothing is feasible.
fn brute_force_cost(inst: &Instance) -> Option<Option<u32>> {
    let placements: Vec<_> = inst
        .timeslots
        .iter()
        .flat_map(|t| inst.rooms.iter().map(move |r| (*t, r.clone())))
        .collect();

    fn walk(
        depth: usize,
        chosen: &mut Vec<usize>,
        inst: &Instance,
        placements: &[(TimeSlot, RoomId)],
        best: &mut Option<Option<u32>>,
    ) {
        if depth == inst.sessions.len() {
            let cost = chosen.iter().map(|&p| placements[p].0.hour).max();
            if best.map_or(true, |b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        for p in 0..placements.len() {
            let (t, r) = &placements[p];
            let ok = chosen.iter().enumerate().all(|(other, &q)| {
                let (ot, or) = &placements[q];
                pair_ok(inst, &inst.sessions[depth], t, r, &inst.sessions[other], ot, or)
            });
            if ok {
                chosen.push(p);
                walk(depth + 1, chosen, inst, placements, best);
                chosen.pop();
            }
        }
    }

    let mut best = None;
    walk(0, &mut Vec::new(), inst, &placements, &mut best);
    best
}

fn solve(instance: &Instance) -> sched_core::SolveResult {
    BnbSolver::new()
        .solve(&SolveEnvelope {
            instance: instance.clone(),
            params: SolveParams::default(),
        })
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn matches_exhaustive_minimum(inst in instances()) {
        let res = solve(&inst);
        match brute_force_cost(&inst) {
            None => prop_assert_eq!(res.status, SolveStatus::Infeasible),
            Some(cost) => {
                prop_assert_eq!(res.status, SolveStatus::Optimal);
                prop_assert_eq!(res.cost, cost);
                prop_assert_eq!(res.assignments.len(), inst.sessions.len());
                prop_assert!(
                    schedule_ok(&inst, &res.assignments),
                    "bad schedule: {:?}",
                    res.assignments
                );
                let report = scoring::explain(&inst, &res.assignments);
                prop_assert!(report.is_valid(), "violations: {:?}", report.violations);
            }
        }
    }

    #[test]
    fn repeated_runs_agree(inst in instances()) {
        let first = solve(&inst);
        let second = solve(&inst);
        prop_assert_eq!(first.status, second.status);
        prop_assert_eq!(first.assignments, second.assignments);
    }
}
