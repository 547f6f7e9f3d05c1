//! Finite-domain binary constraint satisfaction.
//!
//! Variables are dense indices `0..n`. Each variable owns an ordered value
//! list, the neighbor relation says which pairs are checked, and a single
//! [`BinaryConstraint`] decides whether two placed values may coexist.
//!
//! [`Csp::solve`] runs depth-first backtracking on an explicit stack with a
//! pluggable variable order and inference step.

mod search;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

/// Pairwise compatibility of two (variable, value) placements.
///
/// The search may call it with either argument order for a pair, so
/// implementations are expected to be symmetric.
pub trait BinaryConstraint<V> {
    fn compatible(&self, a: usize, va: &V, b: usize, vb: &V) -> bool;
}

impl<V, F> BinaryConstraint<V> for F
where
    F: Fn(usize, &V, usize, &V) -> bool,
{
    fn compatible(&self, a: usize, va: &V, b: usize, vb: &V) -> bool {
        self(a, va, b, vb)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CspError {
    #[error("{domains} domains but {neighbors} neighbor lists")]
    NeighborCount { domains: usize, neighbors: usize },
    #[error("variable {var} lists unknown neighbor {neighbor}")]
    UnknownNeighbor { var: usize, neighbor: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VariableOrder {
    /// Lowest-index unassigned variable first.
    Static,
    /// Fewest remaining legal values first, ties to the lowest index.
    #[default]
    Mrv,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Inference {
    None,
    /// Prune neighbor values that conflict with each new placement.
    #[default]
    ForwardChecking,
}

#[derive(Clone, Debug, Default)]
pub struct SearchConfig {
    pub order: VariableOrder,
    pub inference: Inference,
    /// Maximum number of value trials.
    pub max_steps: Option<u64>,
    pub deadline: Option<Instant>,
}

impl SearchConfig {
    pub fn with_order(mut self, order: VariableOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_inference(mut self, inference: Inference) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<V> {
    /// One value per variable, in variable order.
    Solved(Vec<V>),
    Unsatisfiable,
    /// The step or time budget ran out first.
    Overtime,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub steps: u64,
    pub backtracks: u64,
    pub pruned: u64,
}

#[derive(Clone, Debug)]
pub struct SearchReport<V> {
    pub outcome: Outcome<V>,
    pub stats: SearchStats,
}

pub struct Csp<V, C> {
    domains: Vec<Vec<V>>,
    neighbors: Arc<[Vec<usize>]>,
    constraint: C,
}

impl<V, C> Csp<V, C>
where
    V: Clone,
    C: BinaryConstraint<V>,
{
    /// The neighbor lists may be shared between problems that differ only
    /// in domains or constraint.
    pub fn new(
        domains: Vec<Vec<V>>,
        neighbors: impl Into<Arc<[Vec<usize>]>>,
        constraint: C,
    ) -> Result<Self, CspError> {
        let neighbors = neighbors.into();
        if domains.len() != neighbors.len() {
            return Err(CspError::NeighborCount {
                domains: domains.len(),
                neighbors: neighbors.len(),
            });
        }
        for (var, list) in neighbors.iter().enumerate() {
            if let Some(&neighbor) = list.iter().find(|&&n| n >= domains.len() || n == var) {
                return Err(CspError::UnknownNeighbor { var, neighbor });
            }
        }
        Ok(Self {
            domains,
            neighbors,
            constraint,
        })
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domain(&self, var: usize) -> &[V] {
        &self.domains[var]
    }

    pub fn neighbors(&self, var: usize) -> &[usize] {
        &self.neighbors[var]
    }

    pub fn solve(&self, config: &SearchConfig) -> SearchReport<V> {
        let report = search::run(self, config);
        tracing::trace!(
            steps = report.stats.steps,
            backtracks = report.stats.backtracks,
            pruned = report.stats.pruned,
            solved = matches!(report.outcome, Outcome::Solved(_)),
            "search finished"
        );
        report
    }
}

/// Every variable neighbors every other one.
pub fn complete_graph(n: usize) -> Vec<Vec<usize>> {
    (0..n)
        .map(|v| (0..n).filter(|&u| u != v).collect())
        .collect()
}
