//! The RatingPipeline runs Loader -> Trainer -> Presenter for one render.
//!
//! Loading and training are memoised for the life of the process:
//! - tables are keyed by the source file's fingerprint (path, size, mtime)
//! - models are keyed by the digest of the table they were fitted on
//!
//! Editing the input file changes its fingerprint, so the next render reloads
//! it; retraining only happens if the cleaned contents actually changed.
//! Only the newest table per path and the newest model are kept.

use crate::cache::{CacheStats, MemoCache};
use crate::page::{PageInputs, PageState, PageView, POPULAR_LIMIT, SAMPLE_ROWS, SampleTable};
use data_loader::{RatingTable, Result, SourceFingerprint, TableDigest};
use recommender::{KnnBasic, Prediction};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// A cleaned table together with its content digest, computed once at load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    table: RatingTable,
    digest: TableDigest,
}

impl LoadedTable {
    pub fn new(table: RatingTable) -> Self {
        let digest = table.digest();
        Self { table, digest }
    }

    pub fn table(&self) -> &RatingTable {
        &self.table
    }

    pub fn digest(&self) -> TableDigest {
        self.digest
    }
}

impl Deref for LoadedTable {
    type Target = RatingTable;

    fn deref(&self) -> &RatingTable {
        &self.table
    }
}

pub struct RatingPipeline {
    data_path: PathBuf,
    tables: MemoCache<SourceFingerprint, LoadedTable>,
    models: MemoCache<TableDigest, KnnBasic>,
}

impl RatingPipeline {
    /// Create a pipeline over the ratings file at `data_path`.
    ///
    /// Nothing is read until the first render.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            tables: MemoCache::new("tables"),
            models: MemoCache::new("models"),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Load and clean the ratings file, reusing the cached table when the
    /// file is unchanged
    pub fn load_data(&self) -> Result<Arc<LoadedTable>> {
        let fingerprint = SourceFingerprint::of(&self.data_path)?;
        let table = self.tables.get_or_try_insert_with(fingerprint.clone(), || {
            RatingTable::load_from_file(&self.data_path).map(LoadedTable::new)
        })?;

        // Older versions of this file can never be hit again
        self.tables
            .retain(|key| key.path != fingerprint.path || *key == fingerprint);
        Ok(table)
    }

    /// Fit the model on the whole table, reusing a model fitted on
    /// identical contents
    pub fn train_model(&self, table: &LoadedTable) -> Arc<KnnBasic> {
        let digest = table.digest();
        debug!(%digest, "Resolving model");
        let model = self.models.get_or_insert_with(digest, || KnnBasic::fit(table));
        self.models.retain(|key| *key == digest);
        model
    }

    /// Load, train and predict for a single pair
    pub fn predict(&self, user_id: &str, product_id: &str) -> Result<Prediction> {
        let table = self.load_data()?;
        let model = self.train_model(&table);
        Ok(model.predict(user_id, product_id))
    }

    /// Run the whole pipeline for one render
    #[instrument(skip(self), fields(path = %self.data_path.display()))]
    pub fn render(&self, inputs: &PageInputs) -> Result<PageView> {
        let start_time = Instant::now();

        let table = self.load_data()?;
        let sample = SampleTable::from_table(&table, SAMPLE_ROWS);

        let model = self.train_model(&table);

        let state = match inputs.prediction_request() {
            Some((user_id, product_id)) => {
                PageState::PredictionReady(model.predict(user_id, product_id))
            }
            None => PageState::Idle,
        };

        let popular = table.popularity(POPULAR_LIMIT);

        info!(
            predicted = matches!(state, PageState::PredictionReady(_)),
            "Rendered page in {:.2?}",
            start_time.elapsed()
        );

        Ok(PageView {
            inputs: inputs.clone(),
            sample,
            state,
            popular,
        })
    }

    /// Forget every cached table and model
    pub fn invalidate(&self) {
        self.tables.clear();
        self.models.clear();
    }

    pub fn table_cache_stats(&self) -> CacheStats {
        self.tables.stats()
    }

    pub fn model_cache_stats(&self) -> CacheStats {
        self.models.stats()
    }

    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn cached_models(&self) -> usize {
        self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::DataLoadError;

    #[test]
    fn test_missing_file_fails_every_render() {
        let pipeline = RatingPipeline::new("definitely/missing.csv");

        let err = pipeline.render(&PageInputs::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::FileAccess { .. }));
        assert!(pipeline.render(&PageInputs::default()).is_err());
    }

    #[test]
    fn test_train_model_reuses_equal_tables() {
        let pipeline = RatingPipeline::new("unused.csv");
        let a = LoadedTable::new(RatingTable::from_triples(vec![("u1", "p1", 5.0), ("u2", "p1", 3.0)]));
        let b = LoadedTable::new(a.table().clone());

        let first = pipeline.train_model(&a);
        let second = pipeline.train_model(&b);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(pipeline.model_cache_stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_loaded_table_digest_matches_contents() {
        let table = RatingTable::from_triples(vec![("u1", "p1", 5.0), ("u1", "p2", 3.0)]);
        let loaded = LoadedTable::new(table.clone());

        assert_eq!(loaded.digest(), table.digest());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.table(), &table);
    }

    #[test]
    fn test_new_table_replaces_old_model() {
        let pipeline = RatingPipeline::new("unused.csv");
        let a = LoadedTable::new(RatingTable::from_triples(vec![("u1", "p1", 5.0)]));
        let b = LoadedTable::new(RatingTable::from_triples(vec![("u1", "p1", 2.0)]));

        pipeline.train_model(&a);
        pipeline.train_model(&b);

        assert_eq!(pipeline.cached_models(), 1);
        assert_eq!(pipeline.model_cache_stats(), CacheStats { hits: 0, misses: 2 });
    }
}
