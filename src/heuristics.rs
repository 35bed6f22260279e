//! Greedy pricing heuristics for the maximum-weight stable set problem.
//!
//! Every heuristic maps `(dual prices, graph)` to a stable set and its weight.
//! Only vertices with a positive price take part. Ties are always broken the
//! same way so that runs are reproducible: by score, then by price, then by
//! ascending vertex id.

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::{
    column::{DualPrices, WeightedSet},
    graph::ColGraph,
};

/// Greedy strategy for building a heavy stable set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Heuristic {
    /// Repeatedly take the vertex maximizing its price minus the prices of its
    /// neighbors that are still candidates, then drop it and its neighbors
    /// from the candidates. Scores are recomputed every round.
    DynamicSurplus,
    /// Like `DynamicSurplus`, but the surplus is computed once against all
    /// positive-price vertices, and vertices are scanned in that fixed order.
    StaticSurplus,
    /// Scan vertices by price, largest first.
    MaxWeight,
}

impl Heuristic {
    /// The default pricing order.
    pub const ALL: [Heuristic; 3] = [
        Heuristic::DynamicSurplus,
        Heuristic::StaticSurplus,
        Heuristic::MaxWeight,
    ];

    /// Build a stable set over the positive-price vertices of `duals`.
    pub fn find(&self, graph: &ColGraph, duals: &DualPrices) -> WeightedSet {
        match self {
            Heuristic::DynamicSurplus => dynamic_surplus(graph, duals),
            Heuristic::StaticSurplus => static_surplus(graph, duals),
            Heuristic::MaxWeight => max_weight(graph, duals),
        }
    }
}

/// Descending by `key`, then by price, then ascending by id.
fn by_key_then_price(duals: &DualPrices, key: &[f64], a: usize, b: usize) -> Ordering {
    key[b]
        .total_cmp(&key[a])
        .then(duals.weight(b).total_cmp(&duals.weight(a)))
        .then(a.cmp(&b))
}

/// Add each vertex of `order` that has no neighbor among those already taken.
fn greedy_scan(
    graph: &ColGraph,
    duals: &DualPrices,
    order: impl IntoIterator<Item = usize>,
) -> WeightedSet {
    let mut set = WeightedSet::empty();
    for v in order {
        if graph.is_compatible(v, &set.vertices) {
            set.vertices.insert(v);
            set.weight += duals.weight(v);
        }
    }
    set
}

fn max_weight(graph: &ColGraph, duals: &DualPrices) -> WeightedSet {
    let mut order: Vec<usize> = duals.relevant().iter().collect();
    order.sort_by(|&a, &b| by_key_then_price(duals, duals.values(), a, b));
    greedy_scan(graph, duals, order)
}

fn static_surplus(graph: &ColGraph, duals: &DualPrices) -> WeightedSet {
    let relevant = duals.relevant();
    let mut score = vec![0.0; graph.len()];
    for v in relevant.iter() {
        score[v] = duals.weight(v)
            - duals.weight_of(graph.neighbors(v).intersection(&relevant));
    }

    let mut order: Vec<usize> = relevant.iter().collect();
    order.sort_by(|&a, &b| by_key_then_price(duals, &score, a, b));
    greedy_scan(graph, duals, order)
}

fn dynamic_surplus(graph: &ColGraph, duals: &DualPrices) -> WeightedSet {
    let mut remaining = duals.relevant();
    let mut set = WeightedSet::empty();

    loop {
        let mut best: Option<(usize, f64)> = None;
        for v in remaining.iter() {
            let score = duals.weight(v)
                - duals.weight_of(graph.neighbors(v).intersection(&remaining));
            let better = match best {
                None => true,
                Some((u, best_score)) => {
                    score
                        .total_cmp(&best_score)
                        .then(duals.weight(v).total_cmp(&duals.weight(u)))
                        == Ordering::Greater
                }
            };
            if better {
                best = Some((v, score));
            }
        }

        let Some((v, _)) = best else {
            break;
        };
        set.vertices.insert(v);
        set.weight += duals.weight(v);
        remaining.remove(v);
        remaining.difference_with(graph.neighbors(v));
    }

    set
}

/// One-swap local search. For each `u` in the set, collect (greedily, by
/// price) positive-price neighbors of `u` that are compatible with the rest of
/// the set and with each other; if they outweigh `u` by more than `epsilon`,
/// swap them in and start over. Stops when no swap helps.
pub fn improve(
    graph: &ColGraph,
    duals: &DualPrices,
    mut set: WeightedSet,
    epsilon: f64,
) -> WeightedSet {
    let relevant = duals.relevant();

    loop {
        let swap = set.vertices.iter().find_map(|u| {
            let mut rest = set.vertices.clone();
            rest.remove(u);

            let mut candidates: Vec<usize> = graph
                .neighbors(u)
                .intersection(&relevant)
                .filter(|&c| graph.is_compatible(c, &rest))
                .collect();
            candidates.sort_by(|&a, &b| by_key_then_price(duals, duals.values(), a, b));

            let swap_in = greedy_scan(graph, duals, candidates);
            (swap_in.weight > duals.weight(u) + epsilon).then(|| {
                rest.union_with(&swap_in.vertices);
                rest
            })
        });

        match swap {
            Some(vertices) => {
                set = WeightedSet {
                    weight: duals.weight_of(vertices.iter()),
                    vertices,
                }
            }
            None => return set,
        }
    }
}
