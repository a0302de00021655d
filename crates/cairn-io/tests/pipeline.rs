//! End-to-end integration tests: CSV -> fit -> evaluate.

use std::path::{Path, PathBuf};

use cairn_io::{IoError, SampleReader};
use cairn_tree::{CairnTreeConfig, Label, SearchStrategy, evaluate};

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn fit_and_evaluate_round_trip() {
    // Three well-separated groups labelled 2, 5 and 9; one blank line in the file.
    let train = SampleReader::new(&fixture_path("train_30x4.csv"))
        .read()
        .expect("fixture should parse");
    let test = SampleReader::new(&fixture_path("test_15x4.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(train.len(), 30);
    assert_eq!(test.len(), 15);
    assert!(train.iter().all(|s| s.features().len() == 4));

    let tree = CairnTreeConfig::new().fit(&train).unwrap();
    assert_eq!(tree.labels(), &[Label::new(2), Label::new(5), Label::new(9)]);
    assert_eq!(tree.n_features(), 4);

    let evaluation = evaluate(&tree, &test).unwrap();
    assert_eq!(evaluation.correct, 15);
    assert_eq!(evaluation.incorrect, 0);
    assert!((evaluation.fitness() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn strategies_agree_on_fixture() {
    let train = SampleReader::new(&fixture_path("train_30x4.csv"))
        .read()
        .unwrap();
    let parallel = CairnTreeConfig::new().fit(&train).unwrap();
    let sequential = CairnTreeConfig::new()
        .with_search_strategy(SearchStrategy::Sequential)
        .fit(&train)
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn row_limit_applies_before_fit() {
    let train = SampleReader::new(&fixture_path("train_30x4.csv"))
        .with_max_rows(Some(9))
        .read()
        .unwrap();
    assert_eq!(train.len(), 9);

    let tree = CairnTreeConfig::new().fit(&train).unwrap();
    assert_eq!(tree.root().n_samples(), 9);
}

#[test]
fn missing_file_surfaces_io_error() {
    let err = SampleReader::new(&fixture_path("does_not_exist.csv"))
        .read()
        .unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));
    assert!(err.to_string().contains("does_not_exist.csv"));
}
