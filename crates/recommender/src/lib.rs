//! # Recommender Crate
//!
//! User-based collaborative filtering for rating prediction.
//!
//! ## Components
//!
//! ### Trainset
//! Maps raw user/product ids to dense inner ids and indexes every rating
//! by user and by item.
//!
//! ### Similarity
//! Cosine similarity between users over their co-rated items, computed
//! row by row in parallel with Rayon.
//!
//! ### KnnBasic
//! Predicts a rating as the similarity-weighted mean of the k = 40 most
//! similar users who rated the item. Cold users or items fall back to the
//! global mean rating.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingTable;
//! use recommender::KnnBasic;
//!
//! let table = RatingTable::load_from_file("amazon.csv".as_ref())?;
//! let model = KnnBasic::fit(&table);
//!
//! let prediction = model.predict("AG3D6O4STAQKAY2UVGEUV46KN35Q", "B07JW9H4J1");
//! println!("{:.2}", prediction.estimate);
//! ```

// Public modules
pub mod trainset;
pub mod similarity;
pub mod knn;

// Re-export commonly used types
pub use knn::{DEFAULT_K, ImpossibleReason, KnnBasic, KnnOptions, Prediction};
pub use similarity::{SimilarityMatrix, cosine_user_based};
pub use trainset::{InnerId, Trainset};
