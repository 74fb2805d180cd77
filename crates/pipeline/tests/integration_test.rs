//! Integration tests for the pipeline.
//!
//! These tests write a ratings file to disk and drive full renders through
//! RatingPipeline, checking the page contents and the caching behaviour.

use pipeline::{CacheStats, PageInputs, PageState, RatingPipeline};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn write_ratings(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "user_id,product_id,rating").unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

fn scenario_file() -> NamedTempFile {
    write_ratings(&["u1,p1,5", "u1,p2,3", "u2,p1,4", "u2,p2,x"])
}

#[test]
fn test_idle_render() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let view = pipeline.render(&PageInputs::default()).unwrap();

    assert_eq!(view.state, PageState::Idle);
    assert_eq!(view.state.prediction_line(), None);

    // The invalid "x" row is gone, the rest keep file order
    let users: Vec<&str> = view.sample.rows.iter().map(|r| r.cells[0].as_str()).collect();
    assert_eq!(users, vec!["u1", "u1", "u2"]);
    assert_eq!(view.sample.rows[2].cells[2], "4.0");
}

#[test]
fn test_one_empty_input_skips_prediction() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let view = pipeline.render(&PageInputs::new("", "p1")).unwrap();
    assert_eq!(view.state, PageState::Idle);

    let view = pipeline.render(&PageInputs::new("u1", "")).unwrap();
    assert_eq!(view.state, PageState::Idle);
}

#[test]
fn test_unseen_product_predicts_global_mean() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let view = pipeline.render(&PageInputs::new("u2", "p3")).unwrap();

    assert_eq!(
        view.state.prediction_line().as_deref(),
        Some("Predicted rating for user u2 on product p3: 4.00")
    );
}

#[test]
fn test_unseen_user_predicts_global_mean() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let prediction = pipeline.predict("nobody", "p1").unwrap();

    assert!(prediction.was_impossible());
    assert!((prediction.estimate - 4.0).abs() < 1e-9);
}

#[test]
fn test_known_pair_uses_neighbours() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let view = pipeline.render(&PageInputs::new("u2", "p2")).unwrap();

    match view.state {
        PageState::PredictionReady(prediction) => {
            assert!(!prediction.was_impossible());
            assert!((1.0..=5.0).contains(&prediction.estimate));
        }
        PageState::Idle => panic!("both inputs were provided"),
    }
}

#[test]
fn test_popularity_chart() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let view = pipeline.render(&PageInputs::default()).unwrap();

    // Fewer than ten products: all shown, no padding
    let bars: Vec<(&str, usize)> = view
        .popular
        .iter()
        .map(|p| (p.product_id.as_str(), p.count))
        .collect();
    assert_eq!(bars, vec![("p1", 2), ("p2", 1)]);
}

#[test]
fn test_renders_reuse_cached_table_and_model() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let first = pipeline.load_data().unwrap();
    let second = pipeline.load_data().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    for _ in 0..3 {
        pipeline.render(&PageInputs::new("u1", "p2")).unwrap();
    }
    assert_eq!(pipeline.table_cache_stats().misses, 1);
    assert_eq!(pipeline.model_cache_stats(), CacheStats { hits: 2, misses: 1 });
}

#[test]
fn test_changed_file_is_reloaded() {
    let mut file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let before = pipeline.load_data().unwrap();
    assert_eq!(before.len(), 3);

    writeln!(file, "u3,p3,2").unwrap();
    file.flush().unwrap();

    let after = pipeline.load_data().unwrap();
    assert_eq!(after.len(), 4);
    assert_eq!(pipeline.table_cache_stats().misses, 2);

    let view = pipeline.render(&PageInputs::new("u2", "p9")).unwrap();
    assert_eq!(
        view.state.prediction_line().as_deref(),
        Some("Predicted rating for user u2 on product p9: 3.50")
    );
}

#[test]
fn test_changed_file_evicts_stale_entries() {
    let mut file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());
    pipeline.render(&PageInputs::default()).unwrap();

    writeln!(file, "u3,p3,2").unwrap();
    file.flush().unwrap();
    pipeline.render(&PageInputs::default()).unwrap();

    assert_eq!(pipeline.table_cache_stats().misses, 2);
    assert_eq!(pipeline.model_cache_stats().misses, 2);
    assert_eq!(pipeline.cached_tables(), 1);
    assert_eq!(pipeline.cached_models(), 1);
}

#[test]
fn test_invalidate_forces_reload() {
    let file = scenario_file();
    let pipeline = RatingPipeline::new(file.path());

    let first = pipeline.load_data().unwrap();
    pipeline.invalidate();
    let second = pipeline.load_data().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
}
