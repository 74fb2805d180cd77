//! KNN Basic - user-based neighbourhood rating prediction
//!
//! "Users similar to you rated this product ..."
//!
//! ## Algorithm
//! To estimate the rating of user `u` for item `i`:
//! 1. Take every user `v` who rated `i`, paired with that rating
//! 2. Keep the `k` with the highest `sim(u, v)` (stable on ties)
//! 3. Drop neighbours whose similarity is not positive
//! 4. Estimate = Σ sim · r / Σ sim
//!
//! If `u` or `i` never appeared in training, or no neighbour survives step 3,
//! the estimate falls back to the global mean rating. The final value is
//! always clipped to the rating scale, so prediction never fails.

use crate::similarity::{SimilarityMatrix, cosine_user_based};
use crate::trainset::{InnerId, Trainset};
use data_loader::{ProductId, RatingTable, UserId};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Number of neighbours used when predicting
pub const DEFAULT_K: usize = 40;

/// Minimum contributing neighbours for a neighbourhood estimate
pub const DEFAULT_MIN_K: usize = 1;

/// Neighbourhood parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnOptions {
    pub k: usize,
    pub min_k: usize,
}

impl Default for KnnOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            min_k: DEFAULT_MIN_K,
        }
    }
}

/// Why a neighbourhood estimate could not be made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpossibleReason {
    #[error("User is unknown.")]
    UnknownUser,

    #[error("Item is unknown.")]
    UnknownItem,

    #[error("Not enough neighbors.")]
    NotEnoughNeighbours,
}

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Estimated rating, inside the rating scale
    pub estimate: f64,
    /// Neighbours that contributed to the estimate
    pub actual_k: usize,
    /// Set when the estimate is the global-mean fallback
    pub impossible: Option<ImpossibleReason>,
}

impl Prediction {
    pub fn was_impossible(&self) -> bool {
        self.impossible.is_some()
    }
}

/// A fitted user-based KNN model.
///
/// Fitting is deterministic: the same table always yields the same
/// similarities and therefore the same predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnBasic {
    trainset: Trainset,
    similarities: SimilarityMatrix,
    options: KnnOptions,
}

impl KnnBasic {
    /// Fit with the default neighbourhood (k = 40)
    pub fn fit(table: &RatingTable) -> Self {
        Self::fit_with(table, KnnOptions::default())
    }

    /// Fit on every row of `table`
    #[instrument(skip(table), fields(ratings = table.len()))]
    pub fn fit_with(table: &RatingTable, options: KnnOptions) -> Self {
        let trainset = Trainset::build_full(table);
        let similarities = cosine_user_based(&trainset);

        info!(
            "Fitted KNN model on {} users, {} products, {} ratings",
            trainset.n_users(),
            trainset.n_items(),
            trainset.n_ratings()
        );

        Self {
            trainset,
            similarities,
            options,
        }
    }

    pub fn trainset(&self) -> &Trainset {
        &self.trainset
    }

    pub fn similarities(&self) -> &SimilarityMatrix {
        &self.similarities
    }

    pub fn options(&self) -> KnnOptions {
        self.options
    }

    /// Predict the rating `user_id` would give `product_id`
    #[instrument(level = "debug", skip(self))]
    pub fn predict(&self, user_id: &str, product_id: &str) -> Prediction {
        let scale = self.trainset.scale();

        let outcome = match (
            self.trainset.inner_user(user_id),
            self.trainset.inner_item(product_id),
        ) {
            (None, _) => Err(ImpossibleReason::UnknownUser),
            (_, None) => Err(ImpossibleReason::UnknownItem),
            (Some(u), Some(i)) => self.estimate(u, i),
        };

        let (estimate, actual_k, impossible) = match outcome {
            Ok((estimate, actual_k)) => (estimate, actual_k, None),
            Err(reason) => {
                debug!("Falling back to global mean: {}", reason);
                (self.trainset.global_mean(), 0, Some(reason))
            }
        };

        Prediction {
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            estimate: scale.clip(estimate),
            actual_k,
            impossible,
        }
    }

    fn estimate(&self, u: InnerId, i: InnerId) -> Result<(f64, usize), ImpossibleReason> {
        let mut neighbours: Vec<(f64, f64)> = self
            .trainset
            .item_ratings(i)
            .iter()
            .map(|&(v, r)| (self.similarities.get(u, v), r))
            .collect();

        // Stable sort: equal similarities keep their rating order
        neighbours.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut sum_sim = 0.0;
        let mut sum_ratings = 0.0;
        let mut actual_k = 0;
        for &(sim, rating) in neighbours.iter().take(self.options.k) {
            if sim > 0.0 {
                sum_sim += sim;
                sum_ratings += sim * rating;
                actual_k += 1;
            }
        }

        if actual_k < self.options.min_k || sum_sim <= 0.0 {
            return Err(ImpossibleReason::NotEnoughNeighbours);
        }
        Ok((sum_ratings / sum_sim, actual_k))
    }
}
