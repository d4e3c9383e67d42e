use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use engine::catalog::load_catalog;
use engine::{NumericColumn, PreferenceQuery, RecommendConfig, Recommender, SimilarityConfig, TokenizerMode, VehicleView};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recommend")]
#[command(about = "Recommend vehicle models from a catalog file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank catalog models against a set of preferences
    Query {
        /// Catalog file (.csv or .jsonl)
        #[arg(long, default_value = "./sample_data/vehicles.csv")]
        catalog: String,
        /// Budget in catalog price units
        #[arg(long, default_value_t = 15.0)]
        budget: f64,
        /// Required seating capacity
        #[arg(long, default_value_t = 4)]
        seating: u32,
        /// Minimum mileage
        #[arg(long, default_value_t = 15.0)]
        mileage: f64,
        /// Engine type substring, or "Any"
        #[arg(long, default_value = "Any")]
        engine_type: String,
        /// Seed for the tie-break jitter
        #[arg(long)]
        seed: Option<u64>,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Lowercased word tokens for the similarity index
        #[arg(long, default_value_t = false)]
        word_tokens: bool,
    },
    /// Show scaler ranges and similarity index statistics
    Inspect {
        #[arg(long, default_value = "./sample_data/vehicles.csv")]
        catalog: String,
        /// List the models most similar to this catalog row
        #[arg(long)]
        similar: Option<usize>,
        #[arg(long, default_value_t = 5)]
        k: usize,
        #[arg(long, default_value_t = false)]
        word_tokens: bool,
    },
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    query: &'a PreferenceQuery,
    total_matches: usize,
    results: Vec<VehicleView>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { catalog, budget, seating, mileage, engine_type, seed, json, word_tokens } => {
            let rec = build(&catalog, word_tokens)?;
            let query = PreferenceQuery::new(budget, seating, mileage, engine_type);
            run_query(&rec, &query, seed, json)
        }
        Commands::Inspect { catalog, similar, k, word_tokens } => {
            let rec = build(&catalog, word_tokens)?;
            inspect(&rec, similar, k)
        }
    }
}

fn build(catalog: &str, word_tokens: bool) -> Result<Recommender> {
    let records = load_catalog(catalog)?;
    let tokenizer = if word_tokens { TokenizerMode::Word } else { TokenizerMode::Whitespace };
    Ok(Recommender::build(records, RecommendConfig::default(), SimilarityConfig { tokenizer }))
}

fn run_query(rec: &Recommender, query: &PreferenceQuery, seed: Option<u64>, json: bool) -> Result<()> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let (total_matches, ranked) = rec.recommend_with_total(query, &mut rng);
    let results: Vec<VehicleView> = ranked.iter().map(VehicleView::from).collect();
    tracing::info!(total_matches, returned = results.len(), "query complete");

    if json {
        let out = QueryOutput { query, total_matches, results };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No matching cars found. Try adjusting your preferences.");
        return Ok(());
    }
    for v in &results {
        println!("## {}", v.model_name);
        println!("Price: {:.2}", v.price);
        println!("Mileage: {:.1}", v.mileage);
        println!("Seating: {}", v.seating);
        println!("Engine Type: {}", v.engine_type);
        println!("Features: {}", v.features);
        println!("Score: {:.3}", v.score.unwrap_or_default());
        println!("---");
    }
    Ok(())
}

fn inspect(rec: &Recommender, similar: Option<usize>, k: usize) -> Result<()> {
    println!("records: {}", rec.catalog().len());
    println!("vocabulary: {} terms", rec.counts().num_terms());
    for column in NumericColumn::ALL {
        let range = rec.params().range(column);
        let note = if range.is_degenerate() { " (constant)" } else { "" };
        println!("{:<10} min={:<10} max={}{}", column.header(), range.min, range.max, note);
    }

    if let Some(i) = similar {
        let base = rec.vehicle(i).ok_or_else(|| anyhow!("no catalog row {i}"))?;
        println!("most similar to {}:", base.model_name);
        for (j, sim) in rec.similarity().most_similar(i, k) {
            if let Some(v) = rec.vehicle(j) {
                println!("  {:.3}  {}", sim, v.model_name);
            }
        }
    }
    Ok(())
}
