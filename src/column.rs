//! Columns of the master problem and the dual prices that drive pricing.

use std::fmt::Display;

use bit_set::BitSet;

/// Dual values above this are treated as a degenerate (unbounded) dual and
/// clamped to zero.
pub const DUAL_SENTINEL: f64 = 1e15;

/// A stable set used as a master column. Every column costs one unit (one
/// color). Vertices are kept sorted and deduplicated; columns are never
/// mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    vertices: Vec<usize>,
}

impl Column {
    /// Build a column from any collection of vertices.
    pub fn new(vertices: impl IntoIterator<Item = usize>) -> Self {
        let mut vertices: Vec<usize> = vertices.into_iter().collect();
        vertices.sort_unstable();
        vertices.dedup();
        Self { vertices }
    }

    pub fn from_bitset(set: &BitSet) -> Self {
        Self {
            vertices: set.iter().collect(),
        }
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, v: usize) -> bool {
        self.vertices.binary_search(&v).is_ok()
    }

    /// Objective coefficient in the master problem.
    pub fn cost(&self) -> f64 {
        1.0
    }
}

impl Display for Column {
    /// Writes the column as space-separated 1-based vertex ids, the numbering
    /// used by DIMACS files.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", v + 1)?;
        }
        Ok(())
    }
}

/// A candidate stable set together with its total dual price.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSet {
    pub vertices: BitSet,
    pub weight: f64,
}

impl WeightedSet {
    pub fn empty() -> Self {
        Self {
            vertices: BitSet::new(),
            weight: 0.0,
        }
    }

    /// Freeze this set into a master column.
    pub fn to_column(&self) -> Column {
        Column::from_bitset(&self.vertices)
    }
}

/// One non-negative price per vertex, cleaned of solver noise.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPrices {
    values: Vec<f64>,
}

impl DualPrices {
    /// Clamp raw LP duals: values at or below `epsilon` (including negative
    /// noise), non-finite values, and values above [`DUAL_SENTINEL`] become 0.
    pub fn clamped(raw: &[f64], epsilon: f64) -> Self {
        Self {
            values: raw
                .iter()
                .map(|&pi| {
                    if !pi.is_finite() || pi <= epsilon || pi > DUAL_SENTINEL {
                        0.0
                    } else {
                        pi
                    }
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Price of vertex `v`.
    pub fn weight(&self, v: usize) -> f64 {
        self.values[v]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Vertices with a strictly positive price. Zero-price vertices cannot
    /// improve a column's reduced cost.
    pub fn relevant(&self) -> BitSet {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &pi)| pi > 0.0)
            .map(|(v, _)| v)
            .collect()
    }

    /// Total price of `vertices`.
    pub fn weight_of(&self, vertices: impl IntoIterator<Item = usize>) -> f64 {
        vertices.into_iter().map(|v| self.values[v]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_is_sorted_and_deduplicated() {
        let c = Column::new([3, 1, 3, 0]);
        assert_eq!(c.vertices(), &[0, 1, 3]);
        assert!(c.contains(3));
        assert!(!c.contains(2));
        assert_eq!(c.cost(), 1.0);
        assert_eq!(c.to_string(), "1 2 4");
    }

    #[test]
    fn duals_are_clamped() {
        let raw = [0.5, -1e-9, 1e-7, 2e15, f64::NAN, 1.0];
        let duals = DualPrices::clamped(&raw, 1e-6);
        assert_eq!(duals.values(), &[0.5, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(duals.relevant().iter().collect::<Vec<_>>(), vec![0, 5]);
        assert!((duals.weight_of([0, 5]) - 1.5).abs() < 1e-12);
    }
}
