//! # Data Loader Crate
//!
//! This crate loads and cleans the product ratings dataset.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingRecord, RatingTable, PopularityCount)
//! - **parser**: Parse the ratings CSV, coercing the rating column
//! - **index**: Load from disk and aggregate queries (popularity, mean)
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingTable;
//! use std::path::Path;
//!
//! let table = RatingTable::load_from_file(Path::new("amazon.csv"))?;
//!
//! for product in table.popularity(10) {
//!     println!("{}: {}", product.product_id, product.count);
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    UserId,
    ProductId,
    // Core types
    RatingRecord,
    RatingTable,
    RatingScale,
    PopularityCount,
    // Cache keys
    SourceFingerprint,
    TableDigest,
    // Constants and helpers
    RATING_SCALE,
    format_rating,
};
