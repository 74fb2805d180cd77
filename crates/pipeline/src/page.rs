//! The page model: what one render of the app contains.
//!
//! This is the widget tree as data. Turning it into HTML (or terminal
//! output) is the caller's business.

use data_loader::{PopularityCount, RatingTable};
use recommender::Prediction;
use serde::Deserialize;

pub const TITLE: &str = "Personalized Recommendation System for Online Shopping";
pub const DESCRIPTION: &str =
    "This app provides personalized product recommendations based on user preferences.";
pub const SAMPLE_HEADING: &str = "Sample Data";
pub const USER_PROMPT: &str = "Enter User ID";
pub const PRODUCT_PROMPT: &str = "Enter Product ID (for rating prediction)";
pub const POPULAR_HEADING: &str = "Top 10 Popular Products";

/// Rows shown in the sample table
pub const SAMPLE_ROWS: usize = 5;

/// Bars shown in the popularity chart
pub const POPULAR_LIMIT: usize = 10;

/// Current values of the two text inputs. Empty means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageInputs {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub product_id: String,
}

impl PageInputs {
    pub fn new(user_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            product_id: product_id.into(),
        }
    }

    /// The (user, product) pair to predict, if both inputs were provided
    pub fn prediction_request(&self) -> Option<(&str, &str)> {
        if self.user_id.is_empty() || self.product_id.is_empty() {
            None
        } else {
            Some((&self.user_id, &self.product_id))
        }
    }
}

/// The two states of a render
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    /// At least one input is empty; no prediction is made
    Idle,
    /// Both inputs were given and a prediction was made
    PredictionReady(Prediction),
}

impl PageState {
    /// The prediction sentence, when there is one
    pub fn prediction_line(&self) -> Option<String> {
        match self {
            PageState::Idle => None,
            PageState::PredictionReady(prediction) => Some(format_prediction(prediction)),
        }
    }
}

/// "Predicted rating for user {user} on product {product}: {value:.2}"
pub fn format_prediction(prediction: &Prediction) -> String {
    format!(
        "Predicted rating for user {} on product {}: {:.2}",
        prediction.user_id, prediction.product_id, prediction.estimate
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    /// Position of the row in the source file
    pub row: usize,
    pub cells: Vec<String>,
}

/// The first rows of the cleaned table, every column included
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleTable {
    pub columns: Vec<String>,
    pub rows: Vec<SampleRow>,
}

impl SampleTable {
    pub fn from_table(table: &RatingTable, n: usize) -> Self {
        let rows = table
            .head(n)
            .iter()
            .map(|record| SampleRow {
                row: record.row,
                cells: table.display_cells(record),
            })
            .collect();
        Self {
            columns: table.columns().to_vec(),
            rows,
        }
    }
}

/// Everything one render shows, in display order
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub inputs: PageInputs,
    pub sample: SampleTable,
    pub state: PageState,
    pub popular: Vec<PopularityCount>,
}
