//! The cached Loader -> Trainer -> Presenter pipeline.
//!
//! This crate provides:
//! - MemoCache, a process-wide memo map keyed by input identity
//! - RatingPipeline, which loads the ratings file, fits the model and builds
//!   one page per call, reusing cached tables and models
//! - The page model (PageInputs, PageState, PageView) that front-ends render
//!
//! ## Architecture
//! Every render runs the same stages top to bottom:
//! 1. Load the ratings file and digest it (cached by file fingerprint)
//! 2. Fit the KNN model on the whole table (cached by table digest)
//! 3. Predict, if both inputs are filled in
//! 4. Count the most rated products
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{PageInputs, RatingPipeline};
//!
//! let pipeline = RatingPipeline::new("amazon.csv");
//! let view = pipeline.render(&PageInputs::new("AG3D6O4STAQKAY2UVGEUV46KN35Q", "B07JW9H4J1"))?;
//!
//! if let Some(line) = view.state.prediction_line() {
//!     println!("{}", line);
//! }
//! ```

pub mod cache;
pub mod page;
pub mod rating_pipeline;

// Re-export main types
pub use cache::{CacheStats, MemoCache};
pub use page::{PageInputs, PageState, PageView, SampleRow, SampleTable, format_prediction};
pub use rating_pipeline::{LoadedTable, RatingPipeline};
