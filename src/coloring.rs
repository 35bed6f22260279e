//! Warm start for the master problem: a feasible coloring whose color classes
//! become the initial columns.

use bit_set::BitSet;

use crate::{column::Column, graph::ColGraph};

/// First-fit greedy coloring. Vertices are visited by degree, largest first
/// (ties by ascending id), and each is placed in the first color class that
/// contains none of its neighbors. Every class is a stable set and every
/// vertex lands in exactly one class.
pub fn first_fit(graph: &ColGraph) -> Vec<Column> {
    let mut order: Vec<usize> = (0..graph.len()).collect();
    order.sort_by_key(|&v| (std::cmp::Reverse(graph.degree(v)), v));

    let mut classes: Vec<BitSet> = Vec::new();
    for v in order {
        match classes.iter_mut().find(|class| graph.is_compatible(v, class)) {
            Some(class) => {
                class.insert(v);
            }
            None => {
                let mut class = BitSet::with_capacity(graph.len());
                class.insert(v);
                classes.push(class);
            }
        }
    }

    classes.iter().map(Column::from_bitset).collect()
}
