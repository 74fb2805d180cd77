//! User-user cosine similarity
//!
//! For two users `u` and `v`, all sums run over the items both of them rated:
//!
//! ```text
//! sim(u, v) = Σ r_ui · r_vi / sqrt(Σ r_ui² · Σ r_vi²)
//! ```
//!
//! Pairs with no co-rated item are absent (similarity 0). A user's
//! similarity with itself is 1.
//!
//! Rows are independent, so each one is computed on its own Rayon task.
//! Within a row the accumulation order is fixed by the trainset, which keeps
//! the result bit-for-bit reproducible.

use crate::trainset::{InnerId, Trainset};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Sparse symmetric similarity matrix between users
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimilarityMatrix {
    rows: Vec<HashMap<InnerId, f64>>,
}

impl SimilarityMatrix {
    /// Similarity between two users. Unknown pairs are 0, the diagonal is 1.
    pub fn get(&self, a: InnerId, b: InnerId) -> f64 {
        if a == b {
            return 1.0;
        }
        self.rows
            .get(a)
            .and_then(|row| row.get(&b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of users covered
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stored (non-diagonal) entries, counting each pair from both sides
    pub fn stored_pairs(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }
}

/// Running sums for one (u, v) pair
#[derive(Default)]
struct PairSums {
    prods: f64,
    sq_self: f64,
    sq_other: f64,
}

/// Compute cosine similarity between every pair of users sharing an item
#[instrument(skip_all, fields(users = trainset.n_users()))]
pub fn cosine_user_based(trainset: &Trainset) -> SimilarityMatrix {
    let rows: Vec<HashMap<InnerId, f64>> = (0..trainset.n_users())
        .into_par_iter()
        .map(|u| similarity_row(trainset, u))
        .collect();

    let matrix = SimilarityMatrix { rows };
    debug!("Computed {} similarity entries", matrix.stored_pairs());
    matrix
}

fn similarity_row(trainset: &Trainset, u: InnerId) -> HashMap<InnerId, f64> {
    let mut sums: HashMap<InnerId, PairSums> = HashMap::new();

    for &(item, r_u) in trainset.user_ratings(u) {
        for &(v, r_v) in trainset.item_ratings(item) {
            if v == u {
                continue;
            }
            let entry = sums.entry(v).or_default();
            entry.prods += r_u * r_v;
            entry.sq_self += r_u * r_u;
            entry.sq_other += r_v * r_v;
        }
    }

    sums.into_iter()
        .map(|(v, s)| {
            let denom = (s.sq_self * s.sq_other).sqrt();
            let sim = if denom > 0.0 { s.prods / denom } else { 0.0 };
            (v, sim)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingTable;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_cosine_over_co_rated_items() {
        let table = RatingTable::from_triples(vec![
            ("u1", "p1", 5.0),
            ("u1", "p2", 3.0),
            ("u2", "p1", 4.0),
            ("u2", "p2", 1.0),
            ("u2", "p3", 5.0), // not co-rated, ignored
            ("u3", "p4", 2.0),
        ]);
        let trainset = Trainset::build_full(&table);
        let sims = cosine_user_based(&trainset);

        let expected = (5.0 * 4.0 + 3.0 * 1.0) / ((25.0f64 + 9.0) * (16.0 + 1.0)).sqrt();
        assert!(approx(sims.get(0, 1), expected));
        assert!(approx(sims.get(1, 0), expected));

        // No overlap
        assert_eq!(sims.get(0, 2), 0.0);
        // Diagonal
        assert_eq!(sims.get(2, 2), 1.0);
    }

    #[test]
    fn test_single_co_rated_item_is_fully_similar() {
        let table = RatingTable::from_triples(vec![("u1", "p1", 5.0), ("u2", "p1", 1.0)]);
        let sims = cosine_user_based(&Trainset::build_full(&table));

        assert!(approx(sims.get(0, 1), 1.0));
    }

    #[test]
    fn test_deterministic() {
        let table = RatingTable::from_triples(
            (0..60).map(|n| (format!("u{}", n % 7), format!("p{}", n % 11), 1.0 + (n % 5) as f64)),
        );
        let trainset = Trainset::build_full(&table);

        assert_eq!(cosine_user_based(&trainset), cosine_user_based(&trainset));
    }
}
