//! Parser for ratings CSV files.
//!
//! The file needs a header row with at least `user_id`, `product_id` and
//! `rating`. Extra columns are carried along untouched. The rating field is
//! coerced to a number; rows where that fails are dropped, not reported.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const USER_COLUMN: &str = "user_id";
pub const PRODUCT_COLUMN: &str = "product_id";
pub const RATING_COLUMN: &str = "rating";

/// Coerce a raw rating field to a number.
///
/// Returns `None` for anything that is not a finite number on the rating
/// scale: empty cells, text, `NaN`, `inf`, `0`, `7.5`...
///
/// Example: " 4.2 " -> Some(4.2)
///          "|"     -> None
pub fn coerce_rating(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    RATING_SCALE.contains(value).then_some(value)
}

/// Parse a ratings file from disk
pub fn parse_ratings(path: &Path) -> Result<RatingTable> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| DataLoadError::file_access(&source, e))?;
    parse_ratings_from_reader(file, &source)
}

/// Parse ratings from any reader. `source` is only used in error messages.
pub fn parse_ratings_from_reader<R: Read>(reader: R, source: &str) -> Result<RatingTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()
        .map_err(|e| DataLoadError::csv(source, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let user_idx = column_index(&columns, USER_COLUMN, source)?;
    let product_idx = column_index(&columns, PRODUCT_COLUMN, source)?;
    let rating_idx = column_index(&columns, RATING_COLUMN, source)?;

    let mut table = RatingTable::with_columns(columns, rating_idx);
    let mut rows = 0;

    for (row, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| DataLoadError::csv(source, e))?;
        rows = row + 1;

        // Short rows simply lack the field; treat that like an empty cell
        let Some(rating) = record.get(rating_idx).and_then(coerce_rating) else {
            continue;
        };

        table.push(RatingRecord {
            row,
            user_id: record.get(user_idx).unwrap_or_default().to_string(),
            product_id: record.get(product_idx).unwrap_or_default().to_string(),
            rating,
            fields: record.iter().map(str::to_string).collect(),
        });
    }
    table.source_rows = rows;

    debug!(
        source,
        rows,
        kept = table.len(),
        dropped = table.dropped_rows(),
        "Parsed ratings"
    );
    Ok(table)
}

fn column_index(columns: &[String], name: &str, source: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| DataLoadError::MissingColumn {
            column: name.to_string(),
            path: source.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<RatingTable> {
        parse_ratings_from_reader(content.as_bytes(), "inline.csv")
    }

    #[test]
    fn test_coerce_rating() {
        assert_eq!(coerce_rating("4"), Some(4.0));
        assert_eq!(coerce_rating(" 4.2 "), Some(4.2));
        assert_eq!(coerce_rating("1"), Some(1.0));
        assert_eq!(coerce_rating("5.0"), Some(5.0));
        assert_eq!(coerce_rating("x"), None);
        assert_eq!(coerce_rating("|"), None);
        assert_eq!(coerce_rating(""), None);
        assert_eq!(coerce_rating("NaN"), None);
        assert_eq!(coerce_rating("inf"), None);
        assert_eq!(coerce_rating("0"), None);
        assert_eq!(coerce_rating("5.5"), None);
    }

    #[test]
    fn test_drops_invalid_ratings_in_order() {
        let table = parse("user_id,product_id,rating\nu1,p1,5\nu1,p2,3\nu2,p1,4\nu2,p2,x\n").unwrap();

        let triples: Vec<(&str, &str, f64)> = table
            .iter()
            .map(|r| (r.user_id.as_str(), r.product_id.as_str(), r.rating))
            .collect();
        assert_eq!(triples, vec![("u1", "p1", 5.0), ("u1", "p2", 3.0), ("u2", "p1", 4.0)]);
        assert_eq!(table.source_rows(), 4);
        assert_eq!(table.dropped_rows(), 1);
    }

    #[test]
    fn test_keeps_extra_columns_and_row_positions() {
        let table = parse(
            "product_id,product_name,rating,user_id\n\
             B01,\"Cable, USB-C\",4.2,AG1\n\
             B02,Charger,,AG2\n\
             B03,Adapter,3,AG3\n",
        )
        .unwrap();

        assert_eq!(table.columns(), &["product_id", "product_name", "rating", "user_id"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].fields[1], "Cable, USB-C");
        assert_eq!(table.records()[1].row, 2);
        assert_eq!(table.records()[1].user_id, "AG3");
        assert_eq!(table.display_cells(&table.records()[1])[2], "3.0");
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let table = parse("user_id,product_id,rating\nu1,p1\nu2,p2,2\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].user_id, "u2");
    }

    #[test]
    fn test_missing_column() {
        let err = parse("user_id,item_id,rating\nu1,p1,5\n").unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { ref column, .. } if column == "product_id"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_ratings(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileAccess { .. }));
    }
}
