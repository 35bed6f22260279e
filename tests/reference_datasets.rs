//! Check the column-generation bound against known fractional chromatic
//! numbers of the reference graphs in data/.

use std::path::Path;

use csv::Reader;

use fractional_coloring::{
    colgen::{ColumnGeneration, ColumnGenerationConfig, Termination},
    heuristics::Heuristic,
    loader,
    mwss::ExactMode,
    pricing::{ParallelMode, PricingConfig},
};

const TOLERANCE: f64 = 1e-4;

fn load_reference() -> Vec<(String, f64)> {
    // Set up CSV reader for data/reference.csv.
    let mut reader = Reader::from_path(Path::new("data").join("reference.csv"))
        .expect("data/reference.csv does not exist.");

    // Load (graph file, fractional chromatic number) records.
    reader
        .records()
        .map(|result| {
            let record = result.expect("reference.csv is malformed.");
            let value = record[1]
                .parse::<f64>()
                .expect("non-numeric fractional chromatic number");
            (record[0].to_string(), value)
        })
        .collect()
}

fn test_reference_dataset(pricing: PricingConfig) {
    // Run the driver on every reference graph, tracking wrong bounds.
    let mut incorrect: Vec<(String, f64, f64)> = Vec::new();
    for (name, expected) in load_reference() {
        let path = Path::new("data").join(&name);
        let graph = loader::load(&path).unwrap_or_else(|e| panic!("failed to load {name}: {e}"));

        let config = ColumnGenerationConfig {
            pricing: pricing.clone(),
            ..ColumnGenerationConfig::default()
        };
        let result = ColumnGeneration::new(&graph, config)
            .run()
            .unwrap_or_else(|e| panic!("column generation failed on {name}: {e}"));

        assert_eq!(result.termination, Termination::PricingOptimal, "{name}");
        for column in &result.columns {
            assert!(graph.is_stable(column.vertices()), "{name}: {column} is not stable");
        }
        if (result.objective - expected).abs() > TOLERANCE {
            incorrect.push((name, result.objective, expected));
        }
    }

    // If there are incorrect bounds, report and fail the test.
    let mut error_details = String::new();
    for (name, found, expected) in &incorrect {
        error_details.push_str(&format!("{name}: bound {found} != {expected} (ground truth)\n"));
    }
    assert!(incorrect.is_empty(), "{}", error_details);
}

#[test]
fn reference_default() {
    test_reference_dataset(PricingConfig::default());
}

#[test]
fn reference_exact_optimal() {
    test_reference_dataset(PricingConfig {
        exact_mode: ExactMode::Optimal,
        ..PricingConfig::default()
    });
}

#[test]
fn reference_exact_only() {
    test_reference_dataset(PricingConfig {
        heuristics: vec![],
        local_search: false,
        ..PricingConfig::default()
    });
}

#[test]
fn reference_max_weight_no_local_search() {
    test_reference_dataset(PricingConfig {
        heuristics: vec![Heuristic::MaxWeight],
        local_search: false,
        ..PricingConfig::default()
    });
}

#[test]
fn reference_parallel_heuristics() {
    test_reference_dataset(PricingConfig {
        parallel: ParallelMode::Heuristics,
        ..PricingConfig::default()
    });
}

#[test]
fn binary_and_text_formats_agree() {
    let text = loader::load(&Path::new("data").join("petersen.col")).unwrap();
    let binary = loader::load(&Path::new("data").join("petersen.col.b")).unwrap();
    assert_eq!(text.len(), binary.len());
    assert_eq!(text.edges().collect::<Vec<_>>(), binary.edges().collect::<Vec<_>>());
}
