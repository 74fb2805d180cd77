use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::PopularityCount;
use pipeline::{format_prediction, RatingPipeline};
use server::config::{DEFAULT_DATA_PATH, DEFAULT_HOST, DEFAULT_PORT};
use server::ServerConfig;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// shop-recs - product rating prediction with user-based KNN
#[derive(Parser)]
#[command(name = "shop-recs")]
#[command(about = "Personalized product recommendations using collaborative filtering", long_about = None)]
struct Cli {
    /// Path to the ratings CSV (needs user_id, product_id and rating columns)
    #[arg(short, long, default_value = DEFAULT_DATA_PATH, global = true)]
    data: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web page (default)
    Serve {
        /// Address to bind
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Predict the rating a user would give a product
    Predict {
        /// User ID to predict for
        #[arg(long)]
        user_id: String,

        /// Product ID to predict
        #[arg(long)]
        product_id: String,
    },

    /// Show the most rated products
    Popular {
        /// Number of products to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        None => handle_serve(cli.data, DEFAULT_HOST.to_string(), DEFAULT_PORT).await?,
        Some(Commands::Serve { host, port }) => handle_serve(cli.data, host, port).await?,
        Some(Commands::Predict {
            user_id,
            product_id,
        }) => handle_predict(cli.data, &user_id, &product_id)?,
        Some(Commands::Popular { limit }) => handle_popular(cli.data, limit)?,
    }

    Ok(())
}

/// Handle the 'serve' command
async fn handle_serve(data_path: PathBuf, host: String, port: u16) -> Result<()> {
    let config = ServerConfig {
        host,
        port,
        data_path,
    };
    println!(
        "{} Serving {} at http://{}",
        "✓".green(),
        config.data_path.display(),
        config.bind_addr()
    );
    server::serve(config).await
}

/// Handle the 'predict' command
fn handle_predict(data_path: PathBuf, user_id: &str, product_id: &str) -> Result<()> {
    let pipeline = RatingPipeline::new(data_path);

    let start = Instant::now();
    let prediction = pipeline
        .predict(user_id, product_id)
        .with_context(|| format!("Failed to load ratings from {}", pipeline.data_path().display()))?;

    println!("{}", format_prediction(&prediction).bold());
    match prediction.impossible {
        Some(reason) => println!(
            "{}Fell back to the global mean ({})",
            "• ".yellow(),
            reason
        ),
        None => println!(
            "{}Based on {} similar users",
            "• ".cyan(),
            prediction.actual_k
        ),
    }
    info!(
        user_id,
        product_id,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Prediction finished"
    );
    Ok(())
}

/// Handle the 'popular' command
fn handle_popular(data_path: PathBuf, limit: usize) -> Result<()> {
    let pipeline = RatingPipeline::new(data_path);
    let start = Instant::now();
    let table = pipeline
        .load_data()
        .with_context(|| format!("Failed to load ratings from {}", pipeline.data_path().display()))?;
    info!(
        ratings = table.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Ratings loaded"
    );

    println!(
        "{}",
        format!("Top {} Popular Products:", limit).bold().blue()
    );
    print_popular(&table.popularity(limit));
    Ok(())
}

/// Helper function to print the popularity ranking with a text bar
fn print_popular(popular: &[PopularityCount]) {
    let max = popular.iter().map(|p| p.count).max().unwrap_or(0);
    let width = popular.iter().map(|p| p.product_id.len()).max().unwrap_or(0);

    for (idx, product) in popular.iter().enumerate() {
        let bar_len = if max == 0 { 0 } else { product.count * 40 / max };
        println!(
            "{:>2}. {:<width$} {:>5} {}",
            (idx + 1).to_string().green(),
            product.product_id,
            product.count,
            "█".repeat(bar_len.max(1)).blue(),
            width = width
        );
    }
}
