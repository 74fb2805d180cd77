//! Training set built from a `RatingTable`
//!
//! Raw user and product ids are mapped to dense inner ids in order of first
//! appearance. Ratings are then indexed both ways:
//! - per user: the items they rated
//! - per item: the users who rated it
//!
//! Every row of the table participates; nothing is held out.

use data_loader::{ProductId, RatingScale, RatingTable, UserId};
use std::collections::HashMap;

/// Dense index of a user or item inside a `Trainset`
pub type InnerId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Trainset {
    user_index: HashMap<UserId, InnerId>,
    item_index: HashMap<ProductId, InnerId>,

    /// `user_ratings[u]` = every (item, rating) given by user `u`
    user_ratings: Vec<Vec<(InnerId, f64)>>,
    /// `item_ratings[i]` = every (user, rating) received by item `i`
    item_ratings: Vec<Vec<(InnerId, f64)>>,

    n_ratings: usize,
    global_mean: f64,
    scale: RatingScale,
}

impl Trainset {
    /// Build a training set from every row of the table
    pub fn build_full(table: &RatingTable) -> Self {
        let mut trainset = Self {
            user_index: HashMap::new(),
            item_index: HashMap::new(),
            user_ratings: Vec::new(),
            item_ratings: Vec::new(),
            n_ratings: 0,
            global_mean: 0.0,
            scale: RatingScale::default(),
        };

        let mut total = 0.0;
        for record in table.iter() {
            let u = trainset.intern_user(&record.user_id);
            let i = trainset.intern_item(&record.product_id);
            // Duplicate (user, item) rows are kept, each one counts
            trainset.user_ratings[u].push((i, record.rating));
            trainset.item_ratings[i].push((u, record.rating));
            total += record.rating;
            trainset.n_ratings += 1;
        }

        // An empty training set has no mean; use the middle of the scale
        trainset.global_mean = if trainset.n_ratings > 0 {
            total / trainset.n_ratings as f64
        } else {
            trainset.scale.midpoint()
        };
        trainset
    }

    fn intern_user(&mut self, raw: &str) -> InnerId {
        if let Some(&inner) = self.user_index.get(raw) {
            return inner;
        }
        let inner = self.user_index.len();
        self.user_index.insert(raw.to_string(), inner);
        self.user_ratings.push(Vec::new());
        inner
    }

    fn intern_item(&mut self, raw: &str) -> InnerId {
        if let Some(&inner) = self.item_index.get(raw) {
            return inner;
        }
        let inner = self.item_index.len();
        self.item_index.insert(raw.to_string(), inner);
        self.item_ratings.push(Vec::new());
        inner
    }

    pub fn inner_user(&self, raw: &str) -> Option<InnerId> {
        self.user_index.get(raw).copied()
    }

    pub fn inner_item(&self, raw: &str) -> Option<InnerId> {
        self.item_index.get(raw).copied()
    }

    pub fn user_ratings(&self, user: InnerId) -> &[(InnerId, f64)] {
        self.user_ratings
            .get(user)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn item_ratings(&self, item: InnerId) -> &[(InnerId, f64)] {
        self.item_ratings
            .get(item)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn n_users(&self) -> usize {
        self.user_index.len()
    }

    pub fn n_items(&self) -> usize {
        self.item_index.len()
    }

    pub fn n_ratings(&self) -> usize {
        self.n_ratings
    }

    /// Mean of all ratings (scale midpoint when there are none)
    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }
}
