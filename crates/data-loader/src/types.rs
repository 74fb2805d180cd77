//! Core domain types for the product ratings dataset.
//!
//! - Type aliases for the opaque identifiers (UserId, ProductId)
//! - `RatingRecord` / `RatingTable` for the cleaned rows
//! - `SourceFingerprint` / `TableDigest` used as cache keys upstream
//! - `PopularityCount` for the "most rated products" ranking

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{DataLoadError, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a user, taken verbatim from the input file
pub type UserId = String;

/// Identifier of a product, taken verbatim from the input file
pub type ProductId = String;

// =============================================================================
// Rating scale
// =============================================================================

/// Closed interval of valid rating values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub lower: f64,
    pub upper: f64,
}

/// The 1-5 star scale used by the dataset
pub const RATING_SCALE: RatingScale = RatingScale {
    lower: 1.0,
    upper: 5.0,
};

impl RatingScale {
    /// True for finite values inside the scale
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }

    /// Clamp a value onto the scale
    pub fn clip(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }

    /// Middle of the scale
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        RATING_SCALE
    }
}

// =============================================================================
// Rating rows
// =============================================================================

/// One cleaned row of the input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// Zero-based position of the row among the data rows of the file
    pub row: usize,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Numeric rating, always inside `RATING_SCALE`
    pub rating: f64,
    /// Every raw field of the input row, in column order
    pub fields: Vec<String>,
}

impl RatingRecord {
    /// Build a record that only carries the three rating columns
    pub fn new(row: usize, user_id: impl Into<UserId>, product_id: impl Into<ProductId>, rating: f64) -> Self {
        let user_id = user_id.into();
        let product_id = product_id.into();
        let fields = vec![user_id.clone(), product_id.clone(), format_rating(rating)];
        Self {
            row,
            user_id,
            product_id,
            rating,
            fields,
        }
    }
}

/// Format a rating the way the sample table shows it ("5.0", "4.2")
pub fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{:.1}", rating)
    } else {
        rating.to_string()
    }
}

/// The cleaned ratings dataset.
///
/// Rows are kept in file order. Every row has a valid numeric rating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatingTable {
    pub(crate) columns: Vec<String>,
    pub(crate) rating_column: usize,
    pub(crate) records: Vec<RatingRecord>,
    /// Number of data rows read from the source, including dropped ones
    pub(crate) source_rows: usize,
}

impl RatingTable {
    /// Creates an empty table with the given header
    pub fn with_columns(columns: Vec<String>, rating_column: usize) -> Self {
        Self {
            columns,
            rating_column,
            records: Vec::new(),
            source_rows: 0,
        }
    }

    /// Builds a three-column table from (user, product, rating) triples.
    ///
    /// Triples whose rating falls outside the scale are dropped, as they
    /// would be when parsed from a file.
    pub fn from_triples<U, P>(triples: impl IntoIterator<Item = (U, P, f64)>) -> Self
    where
        U: Into<UserId>,
        P: Into<ProductId>,
    {
        let columns = vec!["user_id".to_string(), "product_id".to_string(), "rating".to_string()];
        let mut table = Self::with_columns(columns, 2);
        for (row, (user_id, product_id, rating)) in triples.into_iter().enumerate() {
            table.source_rows += 1;
            if RATING_SCALE.contains(rating) {
                table.records.push(RatingRecord::new(row, user_id, product_id, rating));
            }
        }
        table
    }

    /// Append a cleaned record
    pub fn push(&mut self, record: RatingRecord) {
        self.source_rows = self.source_rows.max(record.row + 1);
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatingRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` rows (fewer if the table is shorter)
    pub fn head(&self, n: usize) -> &[RatingRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Rows read from the source before cleaning
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    /// Rows discarded because their rating was missing or invalid
    pub fn dropped_rows(&self) -> usize {
        self.source_rows.saturating_sub(self.records.len())
    }

    /// Display cells for a record: its raw fields, with the rating column
    /// replaced by the cleaned numeric value
    pub fn display_cells(&self, record: &RatingRecord) -> Vec<String> {
        let mut cells: Vec<String> = (0..self.columns.len())
            .map(|idx| record.fields.get(idx).cloned().unwrap_or_default())
            .collect();
        if let Some(cell) = cells.get_mut(self.rating_column) {
            *cell = format_rating(record.rating);
        }
        cells
    }

    /// Content digest over the (user, product, rating) triples
    pub fn digest(&self) -> TableDigest {
        let mut hasher = Sha256::new();
        for record in &self.records {
            hasher.update((record.user_id.len() as u64).to_le_bytes());
            hasher.update(record.user_id.as_bytes());
            hasher.update((record.product_id.len() as u64).to_le_bytes());
            hasher.update(record.product_id.as_bytes());
            hasher.update(record.rating.to_bits().to_le_bytes());
        }
        TableDigest(hasher.finalize().into())
    }
}

// =============================================================================
// Cache keys
// =============================================================================

/// Identity of a source file: where it is, how big it is, when it changed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// Inspect a file's metadata without reading it
    pub fn of(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let metadata =
            std::fs::metadata(path).map_err(|e| DataLoadError::file_access(&display, e))?;
        let path = std::fs::canonicalize(path).map_err(|e| DataLoadError::file_access(&display, e))?;
        Ok(Self {
            path,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// SHA-256 digest of a table's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableDigest(pub [u8; 32]);

impl fmt::Display for TableDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Number of ratings a product received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityCount {
    pub product_id: ProductId,
    pub count: usize,
}
