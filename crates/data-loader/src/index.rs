//! Loading a `RatingTable` from disk and the aggregate queries over it.
//!
//! - `load_from_file`: parse + clean in one step
//! - `popularity`: most-rated products, stable on ties
//! - `global_mean`: average rating over every kept row

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{info, instrument};

impl RatingTable {
    /// Load and clean a ratings CSV.
    ///
    /// Rows whose rating is not a number on the 1-5 scale are removed.
    /// Fails with `FileAccess` when the file cannot be opened.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let table = parser::parse_ratings(path)?;

        info!(
            "Loaded {} ratings ({} of {} rows dropped)",
            table.len(),
            table.dropped_rows(),
            table.source_rows()
        );
        Ok(table)
    }

    /// The `limit` most frequently rated products, highest count first.
    ///
    /// Products with equal counts keep the order in which they first appear
    /// in the table. Rows with an empty product id are not counted.
    pub fn popularity(&self, limit: usize) -> Vec<PopularityCount> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<PopularityCount> = Vec::new();

        for record in &self.records {
            if record.product_id.is_empty() {
                continue;
            }
            match positions.entry(record.product_id.as_str()) {
                Entry::Occupied(entry) => counts[*entry.get()].count += 1,
                Entry::Vacant(entry) => {
                    entry.insert(counts.len());
                    counts.push(PopularityCount {
                        product_id: record.product_id.clone(),
                        count: 1,
                    });
                }
            }
        }

        // `sort_by` is stable, so ties stay in first-occurrence order
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        counts
    }

    /// Average of every rating in the table, `None` when empty
    pub fn global_mean(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let total: f64 = self.records.iter().map(|r| r.rating).sum();
        Some(total / self.records.len() as f64)
    }
}
