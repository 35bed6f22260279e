//! The pricing oracle: given dual prices, find a stable set whose total price
//! exceeds one (a column with negative reduced cost), or report that none was
//! found.
//!
//! Cheap greedy heuristics run first, in a configurable order, and the first
//! result over the threshold wins. If none qualifies, the heaviest greedy
//! result is optionally polished by one-swap local search, and finally the
//! exact branch-and-reduce search runs under an iteration budget.

use std::fmt::Display;

use clap::ValueEnum;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, trace};

use crate::{
    column::{Column, DualPrices, WeightedSet},
    graph::ColGraph,
    heuristics::{improve, Heuristic},
    mwss::{ExactMode, MwssSearch},
};

/// Parallelization strategy for the greedy phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ParallelMode {
    /// Run heuristics one after another, stopping at the first success.
    None,
    /// Run all heuristics concurrently, then accept the first success in the
    /// configured order. Results are identical to `None`.
    Heuristics,
}

/// Which part of the oracle produced a column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PricingSource {
    Heuristic(Heuristic),
    LocalSearch,
    Exact,
}

impl Display for PricingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingSource::Heuristic(Heuristic::DynamicSurplus) => write!(f, "DynSurplus"),
            PricingSource::Heuristic(Heuristic::StaticSurplus) => write!(f, "StatSurplus"),
            PricingSource::Heuristic(Heuristic::MaxWeight) => write!(f, "MaxWeight"),
            PricingSource::LocalSearch => write!(f, "LocalSearch"),
            PricingSource::Exact => write!(f, "ExactMWSS"),
        }
    }
}

/// A column with negative reduced cost.
#[derive(Debug, Clone)]
pub struct PricedColumn {
    pub column: Column,
    /// Total dual price of the column; always above `1 + epsilon`.
    pub weight: f64,
    pub source: PricingSource,
}

impl PricedColumn {
    fn new(set: &WeightedSet, source: PricingSource) -> Self {
        Self {
            column: set.to_column(),
            weight: set.weight,
            source,
        }
    }
}

/// Tunables of the pricing oracle.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Tolerance for dual clamping and for the `weight > 1 + epsilon` test.
    pub epsilon: f64,
    /// Heuristics to try, in order.
    pub heuristics: Vec<Heuristic>,
    /// Polish the best greedy set before falling back to the exact search.
    pub local_search: bool,
    /// Maximum number of states the exact search may visit.
    pub exact_budget: usize,
    pub exact_mode: ExactMode,
    pub parallel: ParallelMode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            heuristics: Heuristic::ALL.to_vec(),
            local_search: true,
            exact_budget: 200_000,
            exact_mode: ExactMode::FirstViolating,
            parallel: ParallelMode::None,
        }
    }
}

/// Pricing over a fixed graph.
pub struct PricingOracle<'a> {
    graph: &'a ColGraph,
    config: PricingConfig,
}

impl<'a> PricingOracle<'a> {
    pub fn new(graph: &'a ColGraph, config: PricingConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Weight a stable set must exceed to be a useful column.
    pub fn threshold(&self) -> f64 {
        1.0 + self.config.epsilon
    }

    /// Return a stable set heavier than [`Self::threshold`] under `duals`, or
    /// `None` if neither the heuristics nor the budgeted exact search find one.
    pub fn price(&self, duals: &DualPrices) -> Option<PricedColumn> {
        let threshold = self.threshold();

        let best = match self.config.parallel {
            ParallelMode::None => {
                let mut best: Option<WeightedSet> = None;
                for &h in &self.config.heuristics {
                    let set = h.find(self.graph, duals);
                    trace!(heuristic = ?h, weight = set.weight, size = set.vertices.len());
                    if set.weight > threshold {
                        return Some(PricedColumn::new(&set, PricingSource::Heuristic(h)));
                    }
                    if best.as_ref().map_or(true, |b| set.weight > b.weight) {
                        best = Some(set);
                    }
                }
                best
            }
            ParallelMode::Heuristics => {
                let sets: Vec<(Heuristic, WeightedSet)> = self
                    .config
                    .heuristics
                    .par_iter()
                    .map(|&h| (h, h.find(self.graph, duals)))
                    .collect();
                if let Some((h, set)) = sets.iter().find(|(_, set)| set.weight > threshold) {
                    return Some(PricedColumn::new(set, PricingSource::Heuristic(*h)));
                }
                sets.into_iter()
                    .map(|(_, set)| set)
                    .reduce(|best, set| if set.weight > best.weight { set } else { best })
            }
        };

        if self.config.local_search {
            if let Some(set) = best {
                let improved = improve(self.graph, duals, set, self.config.epsilon);
                trace!(weight = improved.weight, "local search");
                if improved.weight > threshold {
                    return Some(PricedColumn::new(&improved, PricingSource::LocalSearch));
                }
            }
        }

        let outcome = MwssSearch::new(
            self.graph,
            duals,
            threshold,
            self.config.exact_budget,
            self.config.exact_mode,
        )
        .run();
        debug!(
            iterations = outcome.iterations,
            exhausted = outcome.budget_exhausted,
            "exact search finished"
        );

        outcome
            .best
            .filter(|set| set.weight > threshold)
            .map(|set| PricedColumn::new(&set, PricingSource::Exact))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn star() -> (ColGraph, DualPrices) {
        (
            ColGraph::from_edges(4, [(0, 1), (0, 2), (0, 3)]),
            DualPrices::clamped(&[0.7, 0.4, 0.4, 0.4], 1e-6),
        )
    }

    #[test]
    fn triangle_with_unit_duals_prices_out() {
        let g = ColGraph::from_edges(3, [(0, 1), (1, 2), (0, 2)]);
        let duals = DualPrices::clamped(&[1.0, 1.0, 1.0], 1e-6);
        let oracle = PricingOracle::new(&g, PricingConfig::default());
        assert!(oracle.price(&duals).is_none());
    }

    #[test]
    fn first_heuristic_over_threshold_wins() {
        let g = ColGraph::from_edges(4, [(0, 1), (1, 2), (2, 3)]);
        let duals = DualPrices::clamped(&[0.6, 0.0, 0.6, 0.0], 1e-6);
        let oracle = PricingOracle::new(&g, PricingConfig::default());
        let priced = oracle.price(&duals).unwrap();
        assert_eq!(priced.source, PricingSource::Heuristic(Heuristic::DynamicSurplus));
        assert_eq!(priced.column, Column::new([0, 2]));
        assert!((priced.weight - 1.2).abs() < 1e-12);
    }

    #[test]
    fn local_search_rescues_a_weak_heuristic() {
        let (g, duals) = star();
        let config = PricingConfig {
            heuristics: vec![Heuristic::MaxWeight],
            ..PricingConfig::default()
        };
        let priced = PricingOracle::new(&g, config).price(&duals).unwrap();
        assert_eq!(priced.source, PricingSource::LocalSearch);
        assert_eq!(priced.column, Column::new([1, 2, 3]));
    }

    #[test]
    fn exact_search_is_the_last_resort() {
        let (g, duals) = star();
        let config = PricingConfig {
            heuristics: vec![Heuristic::MaxWeight],
            local_search: false,
            ..PricingConfig::default()
        };
        let priced = PricingOracle::new(&g, config).price(&duals).unwrap();
        assert_eq!(priced.source, PricingSource::Exact);
        assert_eq!(priced.column, Column::new([1, 2, 3]));
        assert!(priced.weight > 1.0);
    }

    #[test]
    fn starved_exact_search_reports_nothing() {
        let (g, duals) = star();
        let config = PricingConfig {
            heuristics: vec![],
            local_search: false,
            exact_budget: 2,
            ..PricingConfig::default()
        };
        assert!(PricingOracle::new(&g, config).price(&duals).is_none());
    }

    #[test]
    fn parallel_heuristics_agree_with_sequential() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..25 {
            let n = 14;
            let mut edges = Vec::new();
            for u in 0..n {
                for v in u + 1..n {
                    if rng.random_bool(0.3) {
                        edges.push((u, v));
                    }
                }
            }
            let g = ColGraph::from_edges(n, edges);
            let raw: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..0.5)).collect();
            let duals = DualPrices::clamped(&raw, 1e-6);

            let sequential = PricingOracle::new(&g, PricingConfig::default()).price(&duals);
            let parallel = PricingOracle::new(
                &g,
                PricingConfig {
                    parallel: ParallelMode::Heuristics,
                    ..PricingConfig::default()
                },
            )
            .price(&duals);

            match (sequential, parallel) {
                (None, None) => {}
                (Some(s), Some(p)) => {
                    assert_eq!(s.column, p.column);
                    assert_eq!(s.source, p.source);
                    assert!(g.is_stable(s.column.vertices()));
                }
                (s, p) => panic!("sequential {s:?} != parallel {p:?}"),
            }
        }
    }
}
