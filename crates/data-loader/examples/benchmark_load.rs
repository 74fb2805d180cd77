use data_loader::RatingTable;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("amazon.csv"));

    println!("Loading ratings from {}...\n", path.display());

    let start = Instant::now();
    let table = RatingTable::load_from_file(&path)
        .expect("Failed to load ratings");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Rows read: {}", table.source_rows());
    println!("Ratings kept: {}", table.len());
    println!("Rows dropped: {}", table.dropped_rows());
    println!("\nPerformance: {:.0} rows/second",
             table.source_rows() as f64 / elapsed.as_secs_f64());
}
