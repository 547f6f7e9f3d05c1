use std::time::Instant;

use crate::{BinaryConstraint, Csp, Inference, Outcome, SearchConfig, SearchReport, SearchStats, VariableOrder};

/// How often the wall clock is consulted, in steps.
const CLOCK_EVERY: u64 = 256;

/// Current domains plus the trail needed to restore them.
struct State {
    alive: Vec<Vec<bool>>,
    remaining: Vec<usize>,
    assigned: Vec<Option<usize>>,
    unassigned: usize,
    trail: Vec<(usize, usize)>,
}

impl State {
    fn new(domain_sizes: impl Iterator<Item = usize>) -> Self {
        let sizes: Vec<usize> = domain_sizes.collect();
        Self {
            alive: sizes.iter().map(|&n| vec![true; n]).collect(),
            remaining: sizes.clone(),
            assigned: vec![None; sizes.len()],
            unassigned: sizes.len(),
            trail: Vec::new(),
        }
    }

    fn assign(&mut self, var: usize, val: usize) {
        debug_assert!(self.assigned[var].is_none());
        self.assigned[var] = Some(val);
        self.unassigned -= 1;
    }

    fn unassign(&mut self, var: usize) {
        if self.assigned[var].take().is_some() {
            self.unassigned += 1;
        }
    }

    fn prune(&mut self, var: usize, val: usize) {
        self.alive[var][val] = false;
        self.remaining[var] -= 1;
        self.trail.push((var, val));
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let Some((var, val)) = self.trail.pop() else {
                break;
            };
            self.alive[var][val] = true;
            self.remaining[var] += 1;
        }
    }

    fn alive_values(&self, var: usize) -> Vec<usize> {
        self.alive[var]
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
            .collect()
    }
}

/// One decision level: the variable being tried and what is left to try.
struct Frame {
    var: usize,
    candidates: Vec<usize>,
    next: usize,
    mark: usize,
}

pub(crate) fn run<V, C>(csp: &Csp<V, C>, config: &SearchConfig) -> SearchReport<V>
where
    V: Clone,
    C: BinaryConstraint<V>,
{
    let mut state = State::new(csp.domains.iter().map(Vec::len));
    let mut stats = SearchStats::default();
    let mut stack: Vec<Frame> = Vec::new();

    'descend: loop {
        let Some(var) = select_variable(csp, &state, config) else {
            let values = state
                .assigned
                .iter()
                .enumerate()
                .map(|(var, val)| val.map(|v| csp.domains[var][v].clone()))
                .collect::<Option<Vec<V>>>();
            let outcome = match values {
                Some(values) => Outcome::Solved(values),
                None => Outcome::Unsatisfiable,
            };
            return SearchReport { outcome, stats };
        };
        stack.push(Frame {
            var,
            candidates: state.alive_values(var),
            next: 0,
            mark: state.trail.len(),
        });

        loop {
            let Some(frame) = stack.last_mut() else {
                return SearchReport {
                    outcome: Outcome::Unsatisfiable,
                    stats,
                };
            };
            state.unassign(frame.var);
            state.undo_to(frame.mark);

            while frame.next < frame.candidates.len() {
                let val = frame.candidates[frame.next];
                frame.next += 1;
                stats.steps += 1;
                if out_of_budget(config, &stats) {
                    return SearchReport {
                        outcome: Outcome::Overtime,
                        stats,
                    };
                }

                if !consistent(csp, &state, frame.var, val) {
                    continue;
                }
                state.assign(frame.var, val);
                if config.inference == Inference::ForwardChecking
                    && !forward_check(csp, &mut state, &mut stats, frame.var, val)
                {
                    state.unassign(frame.var);
                    state.undo_to(frame.mark);
                    continue;
                }
                continue 'descend;
            }

            stack.pop();
            stats.backtracks += 1;
        }
    }
}

fn out_of_budget(config: &SearchConfig, stats: &SearchStats) -> bool {
    if config.max_steps.is_some_and(|max| stats.steps > max) {
        return true;
    }
    match config.deadline {
        Some(deadline) if stats.steps % CLOCK_EVERY == 0 => Instant::now() >= deadline,
        _ => false,
    }
}

fn select_variable<V, C>(csp: &Csp<V, C>, state: &State, config: &SearchConfig) -> Option<usize>
where
    V: Clone,
    C: BinaryConstraint<V>,
{
    if state.unassigned == 0 {
        return None;
    }
    let mut open = (0..csp.len()).filter(|&v| state.assigned[v].is_none());
    match config.order {
        VariableOrder::Static => open.next(),
        VariableOrder::Mrv => open.min_by_key(|&v| legal_values(csp, state, config, v)),
    }
}

/// Remaining values under forward checking; otherwise values consistent
/// with the current partial assignment.
fn legal_values<V, C>(csp: &Csp<V, C>, state: &State, config: &SearchConfig, var: usize) -> usize
where
    V: Clone,
    C: BinaryConstraint<V>,
{
    match config.inference {
        Inference::ForwardChecking => state.remaining[var],
        Inference::None => state
            .alive_values(var)
            .into_iter()
            .filter(|&val| consistent(csp, state, var, val))
            .count(),
    }
}

fn consistent<V, C>(csp: &Csp<V, C>, state: &State, var: usize, val: usize) -> bool
where
    V: Clone,
    C: BinaryConstraint<V>,
{
    let value = &csp.domains[var][val];
    csp.neighbors[var].iter().all(|&nb| match state.assigned[nb] {
        Some(nv) => csp.constraint.compatible(var, value, nb, &csp.domains[nb][nv]),
        None => true,
    })
}

fn forward_check<V, C>(
    csp: &Csp<V, C>,
    state: &mut State,
    stats: &mut SearchStats,
    var: usize,
    val: usize,
) -> bool
where
    V: Clone,
    C: BinaryConstraint<V>,
{
    let value = &csp.domains[var][val];
    for &nb in &csp.neighbors[var] {
        if state.assigned[nb].is_some() {
            continue;
        }
        for b in 0..csp.domains[nb].len() {
            if state.alive[nb][b] && !csp.constraint.compatible(var, value, nb, &csp.domains[nb][b]) {
                state.prune(nb, b);
                stats.pruned += 1;
            }
        }
        if state.remaining[nb] == 0 {
            return false;
        }
    }
    true
}
