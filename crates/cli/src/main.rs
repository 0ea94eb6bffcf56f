use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{CREDITS_FILE, MOVIES_FILE, MalformedRowPolicy};
use server::{
    CatalogModel, CatalogSource, DuplicateTitlePolicy, ModelConfig, MovieRecommendation,
    PosterClient, QueryError, RecommendationService, DEFAULT_K,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cinematch - content-based movie recommendations
#[derive(Parser)]
#[command(name = "cinematch")]
#[command(about = "Recommend movies similar to a title from genres, cast, crew, keywords and overview", long_about = None)]
struct Cli {
    /// Directory holding tmdb_5000_movies.csv and tmdb_5000_credits.csv
    #[arg(short, long, default_value = "data/tmdb")]
    data_dir: PathBuf,

    /// Movies table (overrides the file inside --data-dir)
    #[arg(long)]
    movies: Option<PathBuf>,

    /// Credits table (overrides the file inside --data-dir)
    #[arg(long)]
    credits: Option<PathBuf>,

    /// Maximum vocabulary size
    #[arg(long, default_value = "5000")]
    max_vocab: usize,

    /// Top-billed cast members kept per movie
    #[arg(long, default_value = "3")]
    cast_limit: usize,

    /// Disable stemming of tag tokens
    #[arg(long)]
    no_stem: bool,

    /// How to resolve a title shared by several movies
    #[arg(long, value_enum, default_value_t = DuplicateTitles::FirstMatch)]
    duplicate_titles: DuplicateTitles,

    /// Skip rows with malformed metadata instead of failing the build
    #[arg(long)]
    skip_malformed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DuplicateTitles {
    FirstMatch,
    Reject,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movies similar to a title
    Recommend {
        /// Movie title (case-insensitive exact match)
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_K)]
        limit: usize,

        /// Look up poster URLs for the results
        #[arg(long)]
        posters: bool,

        /// TMDB API key used for poster lookups
        #[arg(long, env = "TMDB_API_KEY")]
        tmdb_api_key: Option<String>,

        /// Timeout for each poster request, in seconds
        #[arg(long, default_value = "5")]
        poster_timeout: u64,
    },

    /// Search for movies by title
    Search {
        /// Title fragment (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Maximum number of matches to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show the tag text and strongest features of a movie
    Inspect {
        /// Movie title (case-insensitive exact match)
        #[arg(long)]
        title: String,

        /// Number of vocabulary terms to show
        #[arg(long, default_value = "15")]
        terms: usize,
    },

    /// Run benchmark to test query latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        ModelConfig::default()
            .with_max_vocab(self.max_vocab)
            .with_cast_limit(self.cast_limit)
            .with_stemming(!self.no_stem)
            .with_duplicate_titles(match self.duplicate_titles {
                DuplicateTitles::FirstMatch => DuplicateTitlePolicy::FirstMatch,
                DuplicateTitles::Reject => DuplicateTitlePolicy::Reject,
            })
            .with_malformed_rows(if self.skip_malformed {
                MalformedRowPolicy::Skip
            } else {
                MalformedRowPolicy::Fail
            })
    }

    fn catalog_source(&self) -> CatalogSource {
        match (&self.movies, &self.credits) {
            (None, None) => CatalogSource::Directory(self.data_dir.clone()),
            (movies, credits) => CatalogSource::Files {
                movies: movies.clone().unwrap_or_else(|| self.data_dir.join(MOVIES_FILE)),
                credits: credits.clone().unwrap_or_else(|| self.data_dir.join(CREDITS_FILE)),
            },
        }
    }
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
    let mut service = RecommendationService::new(cli.catalog_source(), cli.model_config());

    if let Commands::Recommend {
        posters: true,
        tmdb_api_key,
        poster_timeout,
        ..
    } = &cli.command
    {
        let Some(key) = tmdb_api_key else {
            bail!("--posters needs a TMDB API key (--tmdb-api-key or TMDB_API_KEY)");
        };
        let client = PosterClient::new(key.clone(), Duration::from_secs(*poster_timeout))?;
        service = service.with_posters(client);
    }

    // Build the model (this may take a moment)
    println!("Building recommendation model from {}...", cli.data_dir.display());
    let start = Instant::now();
    let model = service
        .model()
        .await
        .context("Failed to build the recommendation model")?;
    println!(
        "{} Model ready: {} movies, {} terms in {:?}",
        "✓".green(),
        model.len(),
        model.vocabulary().len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend { title, limit, .. } => handle_recommend(&service, &title, limit).await?,
        Commands::Search { title, limit } => handle_search(&model, &title, limit),
        Commands::Inspect { title, terms } => handle_inspect(&model, &title, terms),
        Commands::Benchmark { requests } => handle_benchmark(&service, model, requests).await?,
    }

    Ok(())
}

/// Print a query error as a user-facing message, or pass other errors on
fn report_query_error(err: anyhow::Error) -> Result<()> {
    match err.downcast_ref::<QueryError>() {
        Some(query_error) => {
            println!("{} {}", "✗".red(), query_error);
            Ok(())
        }
        None => Err(err),
    }
}

/// Handle the 'recommend' command
async fn handle_recommend(service: &RecommendationService, title: &str, limit: usize) -> Result<()> {
    match service.get_recommendations(title, limit).await {
        Ok(recommendations) => {
            print_recommendations(title, &recommendations);
            Ok(())
        }
        Err(err) => report_query_error(err),
    }
}

/// Handle the 'search' command
fn handle_search(model: &CatalogModel, title: &str, limit: usize) {
    let matches = model.search(title, limit);
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matching titles)");
    }
    for movie in matches {
        println!("  {}: {}", movie.id.to_string().cyan(), movie.title);
    }
}

/// Handle the 'inspect' command
fn handle_inspect(model: &CatalogModel, title: &str, terms: usize) {
    let row = match model.find_row(title) {
        Ok(row) => row,
        Err(err) => {
            println!("{} {}", "✗".red(), err);
            return;
        }
    };
    let Some(movie) = model.movie(row) else {
        return;
    };

    println!("{}", format!("{} (id {})", movie.title, movie.id).bold().blue());
    println!("{}Catalog row: {}", "• ".green(), row);
    println!("{}Tag text: {}", "• ".green(), movie.tag_text);
    println!("Top terms:");
    for (term, count) in model.top_terms(row, terms) {
        println!("  - {} x{}", term, count);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: &RecommendationService,
    model: Arc<CatalogModel>,
    requests: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    // Pick random catalog titles, skipping ones shared by several rows
    let candidates = unambiguous_titles(model.movies().iter().map(|m| m.title.as_str()));
    if candidates.is_empty() {
        bail!("No catalog title maps to a single movie");
    }
    let titles: Vec<String> = (0..requests)
        .map(|_| candidates[rand::random::<u32>() as usize % candidates.len()].to_string())
        .collect();

    // Use tokio::spawn to make concurrent requests
    let wall = Instant::now();
    let mut handles = vec![];
    for title in titles {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            service.get_recommendations(&title, DEFAULT_K).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = vec![];
    let mut query_errors = 0usize;
    for handle in handles {
        match handle.await? {
            Ok(elapsed) => timings.push(elapsed),
            Err(err) if err.downcast_ref::<QueryError>().is_some() => {
                tracing::debug!("Benchmark query failed: {}", err);
                query_errors += 1;
            }
            Err(err) => return Err(err),
        }
    }
    let wall_time = wall.elapsed();

    if timings.is_empty() {
        bail!("All {} benchmark queries failed", query_errors);
    }

    let total: Duration = timings.iter().sum();
    let avg_latency = total / (timings.len() as u32);
    timings.sort();

    println!("Benchmark results:");
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Query errors: {}", query_errors);
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / wall_time.as_secs_f64()
    );

    Ok(())
}

/// Titles that name exactly one catalog row, in row order
fn unambiguous_titles<'a>(titles: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let titles: Vec<&str> = titles.collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for title in &titles {
        *counts.entry(*title).or_default() += 1;
    }
    titles.into_iter().filter(|t| counts[t] == 1).collect()
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = (sorted.len() as f64 * p) as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[MovieRecommendation]) {
    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} (id {}) - Similarity: {:.3}",
            (rank + 1).to_string().green(),
            rec.title,
            rec.movie_id,
            rec.score
        );
        if let Some(url) = &rec.poster_url {
            println!("   Poster: {}", url);
        }
    }
}
