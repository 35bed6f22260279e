//! Exact branch-and-reduce search for heavy stable sets.
//!
//! The search state is a partial stable set `S` and a set `F` of free
//! vertices that may still join it. At each step the heaviest free vertex `v`
//! is either included (reducing `F` by the closed neighborhood of `v`) or
//! excluded (reducing `F` by `v` alone); the include branch is explored first.
//! The recursion is unrolled onto an explicit stack, whose depth is bounded by
//! twice the number of positive-price vertices.
//!
//! Each visited state costs one unit of the iteration budget. When the budget
//! runs out the search stops and reports what it has, so an exhausted search
//! that found nothing is not a proof that no heavy stable set exists.

use bit_set::BitSet;
use clap::ValueEnum;
use tracing::debug;

use crate::{
    column::{DualPrices, WeightedSet},
    graph::ColGraph,
};

/// Stopping rule for the exact search.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum ExactMode {
    /// Stop at the first stable set heavier than the threshold.
    FirstViolating,
    /// Search to completion (pruning with `w(S) + w(F) <= best`) and return a
    /// maximum-weight stable set.
    Optimal,
}

/// Result of one exact search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// In `FirstViolating` mode, the violating set if one was found. In
    /// `Optimal` mode, the heaviest set seen (the true maximum unless the
    /// budget ran out).
    pub best: Option<WeightedSet>,
    /// Number of states visited.
    pub iterations: usize,
    /// Whether the search stopped because the budget ran out.
    pub budget_exhausted: bool,
}

/// Mutable state threaded through one search.
struct SearchContext {
    best: Option<WeightedSet>,
    iterations: usize,
    budget_exhausted: bool,
}

impl SearchContext {
    fn best_weight(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |b| b.weight)
    }
}

struct Frame {
    chosen: WeightedSet,
    free: BitSet,
    free_weight: f64,
}

/// Exact maximum-weight stable set search over the positive-price vertices.
pub struct MwssSearch<'a> {
    graph: &'a ColGraph,
    duals: &'a DualPrices,
    threshold: f64,
    budget: usize,
    mode: ExactMode,
}

impl<'a> MwssSearch<'a> {
    /// A search for stable sets heavier than `threshold`, visiting at most
    /// `budget` states.
    pub fn new(
        graph: &'a ColGraph,
        duals: &'a DualPrices,
        threshold: f64,
        budget: usize,
        mode: ExactMode,
    ) -> Self {
        Self {
            graph,
            duals,
            threshold,
            budget,
            mode,
        }
    }

    pub fn run(&self) -> SearchOutcome {
        let mut ctx = SearchContext {
            best: None,
            iterations: 0,
            budget_exhausted: false,
        };

        let free = self.duals.relevant();
        let mut stack = vec![Frame {
            chosen: WeightedSet::empty(),
            free_weight: self.duals.weight_of(free.iter()),
            free,
        }];

        while let Some(frame) = stack.pop() {
            ctx.iterations += 1;
            if ctx.iterations > self.budget {
                ctx.iterations -= 1;
                ctx.budget_exhausted = true;
                debug!(
                    budget = self.budget,
                    best = ctx.best_weight(),
                    "exact search budget exhausted"
                );
                break;
            }

            match self.mode {
                ExactMode::FirstViolating => {
                    if frame.chosen.weight > self.threshold {
                        ctx.best = Some(frame.chosen);
                        break;
                    }
                }
                ExactMode::Optimal => {
                    if frame.chosen.weight > ctx.best_weight() {
                        ctx.best = Some(frame.chosen.clone());
                    }
                    if frame.chosen.weight + frame.free_weight <= ctx.best_weight() {
                        continue;
                    }
                }
            }

            let Some(v) = self.heaviest(&frame.free) else {
                continue;
            };
            let (include, exclude) = self.branch(frame, v);
            stack.push(exclude);
            stack.push(include);
        }

        SearchOutcome {
            best: ctx.best,
            iterations: ctx.iterations,
            budget_exhausted: ctx.budget_exhausted,
        }
    }

    /// The heaviest vertex of `free`, lowest id on ties.
    fn heaviest(&self, free: &BitSet) -> Option<usize> {
        free.iter().fold(None, |best, v| match best {
            Some(u) if self.duals.weight(u) >= self.duals.weight(v) => Some(u),
            _ => Some(v),
        })
    }

    /// Split `frame` on `v` into its include and exclude children.
    fn branch(&self, frame: Frame, v: usize) -> (Frame, Frame) {
        let mut excluded_free = frame.free.clone();
        excluded_free.remove(v);
        let exclude = Frame {
            chosen: frame.chosen.clone(),
            free_weight: self.duals.weight_of(excluded_free.iter()),
            free: excluded_free,
        };

        let mut included_free = frame.free;
        included_free.remove(v);
        included_free.difference_with(self.graph.neighbors(v));
        let mut chosen = frame.chosen;
        chosen.vertices.insert(v);
        chosen.weight += self.duals.weight(v);
        let include = Frame {
            chosen,
            free_weight: self.duals.weight_of(included_free.iter()),
            free: included_free,
        };

        (include, exclude)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    /// Maximum stable-set weight by enumerating every vertex subset.
    fn brute_force_max(graph: &ColGraph, duals: &DualPrices) -> f64 {
        let n = graph.len();
        (0u32..1 << n)
            .filter_map(|mask| {
                let vs: Vec<usize> = (0..n).filter(|&v| mask & (1 << v) != 0).collect();
                graph.is_stable(&vs).then(|| duals.weight_of(vs))
            })
            .fold(0.0, f64::max)
    }

    fn random_instance(rng: &mut StdRng, n: usize, p: f64) -> (ColGraph, DualPrices) {
        let mut edges = Vec::new();
        for u in 0..n {
            for v in u + 1..n {
                if rng.random_bool(p) {
                    edges.push((u, v));
                }
            }
        }
        let raw: Vec<f64> = (0..n)
            .map(|_| {
                if rng.random_bool(0.2) {
                    0.0
                } else {
                    rng.random_range(0.0..0.6)
                }
            })
            .collect();
        (ColGraph::from_edges(n, edges), DualPrices::clamped(&raw, 1e-6))
    }

    #[test]
    fn optimal_mode_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for n in [1, 5, 9, 12, 15] {
            for p in [0.2, 0.5, 0.8] {
                let (g, duals) = random_instance(&mut rng, n, p);
                let outcome = MwssSearch::new(&g, &duals, 1.0, usize::MAX, ExactMode::Optimal).run();
                assert!(!outcome.budget_exhausted);

                let expected = brute_force_max(&g, &duals);
                let found = outcome.best.as_ref().map_or(0.0, |b| b.weight);
                assert!((found - expected).abs() < 1e-9, "n={n} p={p}: {found} != {expected}");

                if let Some(best) = outcome.best {
                    let vs: Vec<usize> = best.vertices.iter().collect();
                    assert!(g.is_stable(&vs));
                    assert!((duals.weight_of(vs) - best.weight).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn first_violating_finds_a_set_iff_one_exists() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..40 {
            let (g, duals) = random_instance(&mut rng, 10, 0.4);
            let threshold = 1.0 + 1e-6;
            let outcome =
                MwssSearch::new(&g, &duals, threshold, usize::MAX, ExactMode::FirstViolating).run();
            let exists = brute_force_max(&g, &duals) > threshold;
            match outcome.best {
                Some(set) => {
                    assert!(exists);
                    assert!(set.weight > threshold);
                    let vs: Vec<usize> = set.vertices.iter().collect();
                    assert!(g.is_stable(&vs));
                }
                None => assert!(!exists),
            }
        }
    }

    #[test]
    fn triangle_with_unit_prices_has_no_violating_set() {
        let g = ColGraph::from_edges(3, [(0, 1), (1, 2), (0, 2)]);
        let duals = DualPrices::clamped(&[1.0, 1.0, 1.0], 1e-6);
        let outcome = MwssSearch::new(&g, &duals, 1.0 + 1e-6, 1000, ExactMode::FirstViolating).run();
        assert!(outcome.best.is_none());
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn include_branch_is_explored_first() {
        // Path 0-1-2: the heaviest vertex 1 is taken first and is not enough,
        // so the search backtracks into the exclude branch and finds {0, 2}.
        let g = ColGraph::from_edges(3, [(0, 1), (1, 2)]);
        let duals = DualPrices::clamped(&[0.6, 0.9, 0.6], 1e-6);
        let outcome = MwssSearch::new(&g, &duals, 1.0, 1000, ExactMode::FirstViolating).run();
        let best = outcome.best.unwrap();
        assert_eq!(best.vertices.iter().collect::<Vec<_>>(), vec![0, 2]);
        // root, {1}, exclude 1, {0}, {0, 2}
        assert_eq!(outcome.iterations, 5);
    }

    #[test]
    fn budget_bounds_the_search() {
        let g = ColGraph::from_edges(3, [(0, 1), (1, 2)]);
        let duals = DualPrices::clamped(&[0.6, 0.9, 0.6], 1e-6);
        let outcome = MwssSearch::new(&g, &duals, 1.0, 3, ExactMode::FirstViolating).run();
        assert!(outcome.best.is_none());
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn no_positive_prices() {
        let g = ColGraph::new(4);
        let duals = DualPrices::clamped(&[0.0; 4], 1e-6);
        for mode in [ExactMode::FirstViolating, ExactMode::Optimal] {
            let outcome = MwssSearch::new(&g, &duals, 1.0, 10, mode).run();
            assert!(outcome.best.is_none());
            assert_eq!(outcome.iterations, 1);
        }
    }
}
