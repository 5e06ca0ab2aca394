use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{EntityStore, MovieId, User, UserId};
use engine::recommend::{rank_neighbors, ScoredMovie};
use engine::{
    EngineConfig, PipelineSummary, RecommendationPipeline, DEFAULT_COMPAT_CEILING,
    DEFAULT_MIN_COMPAT_SCORE, DEFAULT_MIN_RATING, DEFAULT_TOP_K,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendations from user compatibility scores", long_about = None)]
struct Cli {
    /// Directory containing movies.csv and ratings.csv
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Score of two users who agree exactly on every shared movie
    #[arg(long, global = true, default_value_t = DEFAULT_COMPAT_CEILING)]
    ceiling: f32,

    /// Minimum compatibility for a neighbor to contribute
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_COMPAT_SCORE)]
    min_compat: f32,

    /// Minimum neighbor rating for a movie to be considered
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_RATING)]
    min_rating: f32,

    /// Number of recommendations kept per user
    #[arg(long, global = true, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Never recommend a movie the user has already rated
    #[arg(long, global = true)]
    exclude_rated: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Show the score behind each recommendation
        #[arg(long)]
        explain: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a user's ratings
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,

        /// Number of ratings to list (all when omitted)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the users most compatible with a user
    Compat {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,

        /// Number of users to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Show dataset counts and pass timings
    Stats,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_compat_ceiling(self.ceiling)
            .with_min_compat_score(self.min_compat)
            .with_min_rating(self.min_rating)
            .with_top_k(self.top_k)
            .with_exclude_rated(self.exclude_rated)
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Reject bad knobs before spending time on loading
    let pipeline = RecommendationPipeline::new(cli.engine_config())
        .context("Invalid engine configuration")?;

    let start = Instant::now();
    let mut store = EntityStore::load_from_files(&cli.data_dir)
        .with_context(|| format!("Failed to load dataset from {}", cli.data_dir.display()))?;
    info!("Loaded dataset in {:?}", start.elapsed());

    let summary = pipeline
        .run(&mut store)
        .context("Failed to compute recommendations")?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user_id,
            explain,
            json,
        } => handle_recommend(&store, &pipeline, user_id, explain, json)?,
        Commands::User { user_id, limit } => handle_user(&store, user_id, limit)?,
        Commands::Compat { user_id, limit } => handle_compat(&store, user_id, limit)?,
        Commands::Search { title } => handle_search(&store, &title),
        Commands::Stats => handle_stats(&store, &summary),
    }

    Ok(())
}

/// JSON body of `recommend --json`
#[derive(Serialize)]
struct RecommendationReport<'a> {
    user_id: UserId,
    recommendations: Vec<TitledRecommendation<'a>>,
}

#[derive(Serialize)]
struct TitledRecommendation<'a> {
    #[serde(flatten)]
    scored: ScoredMovie,
    title: &'a str,
}

/// Handle the 'recommend' command
fn handle_recommend(
    store: &EntityStore,
    pipeline: &RecommendationPipeline,
    user_id: UserId,
    explain: bool,
    json: bool,
) -> Result<()> {
    let user = store
        .get_user(user_id)
        .with_context(|| format!("User {} not found", user_id))?;

    // Scores are recomputed from the installed compatibility map; the ids
    // match `user.recommendations()`.
    let scored = if explain || json {
        pipeline
            .recommendation_engine()
            .scored_recommendations_for(store, user_id)?
    } else {
        Vec::new()
    };

    if json {
        let recommendations = scored
            .iter()
            .map(|&rec| -> Result<TitledRecommendation> {
                let title = store.get_movie(rec.movie_id)?.title.as_str();
                Ok(TitledRecommendation { scored: rec, title })
            })
            .collect::<Result<Vec<_>>>()?;
        let report = RecommendationReport {
            user_id,
            recommendations,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Movie Recommendations for user {}:", user_id).bold().blue()
    );
    if user.recommendations().is_empty() {
        println!("  (no sufficiently compatible users)");
        return Ok(());
    }
    for (rank, &movie_id) in user.recommendations().iter().enumerate() {
        let movie = store.get_movie(movie_id)?;
        print!("{}. {}", (rank + 1).to_string().green(), movie.title);
        if explain {
            if let Some(rec) = scored.iter().find(|rec| rec.movie_id == movie_id) {
                print!(" - Score: {:.2}", rec.score);
            }
            if user.has_rated(movie_id) {
                print!(" {}", "(already rated)".dimmed());
            }
        }
        println!();
    }
    Ok(())
}

/// A user's ratings, highest first (ties: lower movie id first)
fn ratings_by_score(user: &User, limit: Option<usize>) -> Vec<(MovieId, f32)> {
    let mut ratings: Vec<(MovieId, f32)> = user
        .movie_ratings()
        .iter()
        .map(|(&movie_id, &rating)| (movie_id, rating))
        .collect();
    ratings.sort_by(|a, b| b.1.total_cmp(&a.1));
    ratings.truncate(limit.unwrap_or(usize::MAX));
    ratings
}

/// Handle the 'user' command
fn handle_user(store: &EntityStore, user_id: UserId, limit: Option<usize>) -> Result<()> {
    let user = store
        .get_user(user_id)
        .with_context(|| format!("User {} not found", user_id))?;
    let ratings = user.movie_ratings();

    println!("{}", format!("User ID: {}", user_id).bold().blue());

    let num_ratings = ratings.len();
    let avg_rating = if num_ratings > 0 {
        ratings.values().sum::<f32>() / num_ratings as f32
    } else {
        0.0
    };
    println!("{}Number of ratings: {}", "• ".cyan(), num_ratings);
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);
    println!("{}Compatible users: {}", "• ".cyan(), user.user_compats().len());
    println!("{}Recommendations: {}", "• ".cyan(), user.recommendations().len());

    println!("Ratings:");
    for (movie_id, rating) in ratings_by_score(user, limit) {
        let movie = store.get_movie(movie_id)?;
        println!("  - {} (Rating: {})", movie.title, rating);
    }
    Ok(())
}

/// Handle the 'compat' command
fn handle_compat(store: &EntityStore, user_id: UserId, limit: usize) -> Result<()> {
    let user = store
        .get_user(user_id)
        .with_context(|| format!("User {} not found", user_id))?;

    println!(
        "{}",
        format!("Users most compatible with user {}:", user_id).bold().blue()
    );
    for (neighbor_id, score) in rank_neighbors(user.user_compats()).into_iter().take(limit) {
        let neighbor = store.get_user(neighbor_id)?;
        let shared = user
            .rated_movies()
            .filter(|&movie_id| neighbor.has_rated(movie_id))
            .count();
        println!(
            "  - User {} - Score: {:.3} ({} shared movies)",
            neighbor_id.to_string().green(),
            score,
            shared
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(store: &EntityStore, title: &str) {
    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for movie in store.search_titles(title).into_iter().take(20) {
        println!(
            "{}: {} ({} ratings)",
            movie.id,
            movie.title,
            movie.user_ratings().len()
        );
    }
}

/// Handle the 'stats' command
fn handle_stats(store: &EntityStore, summary: &PipelineSummary) {
    let (users, movies, ratings) = store.counts();
    println!("{}", "Dataset:".bold().blue());
    println!("{}Users: {}", "• ".cyan(), users);
    println!("{}Movies: {}", "• ".cyan(), movies);
    println!("{}Ratings: {}", "• ".cyan(), ratings);

    println!("{}", "Compatibility pass:".bold().blue());
    println!("{}Pairs scored: {}", "• ".cyan(), summary.compatibility.pairs_scored);
    println!("{}Pairs excluded: {}", "• ".cyan(), summary.compatibility.pairs_excluded);
    println!("{}Time: {:?}", "• ".cyan(), summary.compatibility_elapsed);

    println!("{}", "Recommendation pass:".bold().blue());
    println!(
        "{}Recommendations written: {}",
        "• ".cyan(),
        summary.recommendation.recommendations_written
    );
    println!(
        "{}Users without recommendations: {}",
        "• ".cyan(),
        summary.recommendation.users_without_recommendations
    );
    println!("{}Time: {:?}", "• ".cyan(), summary.recommendation_elapsed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, Rating};

    fn store_with_ratings(ratings: &[(UserId, MovieId, f32)]) -> EntityStore {
        let mut store = EntityStore::new();
        for &(user_id, movie_id, rating) in ratings {
            if !store.movie_exists(movie_id) {
                store.add_movie(Movie::new(movie_id, format!("Movie {}", movie_id)));
            }
            store.ingest_rating(Rating { user_id, movie_id, rating }).unwrap();
        }
        store
    }

    #[test]
    fn test_ratings_listed_in_full_by_default() {
        let ratings: Vec<(UserId, MovieId, f32)> =
            (1..=15).map(|movie_id| (1, movie_id, 0.5 + (movie_id % 10) as f32 * 0.5)).collect();
        let store = store_with_ratings(&ratings);
        let user = store.get_user(1).unwrap();

        let listed = ratings_by_score(user, None);

        assert_eq!(listed.len(), 15);
        assert!(listed.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    }

    #[test]
    fn test_ratings_limit_keeps_highest() {
        let store = store_with_ratings(&[(1, 10, 3.0), (1, 11, 5.0), (1, 12, 4.0), (1, 13, 5.0)]);
        let user = store.get_user(1).unwrap();

        assert_eq!(ratings_by_score(user, Some(2)), vec![(11, 5.0), (13, 5.0)]);
        assert!(ratings_by_score(user, Some(0)).is_empty());
    }

    #[test]
    fn test_recommendation_report_json_shape() {
        let report = RecommendationReport {
            user_id: 1,
            recommendations: vec![TitledRecommendation {
                scored: ScoredMovie {
                    movie_id: 7,
                    score: 22.5,
                },
                title: "Heat (1995)",
            }],
        };

        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["user_id"], 1);
        assert_eq!(value["recommendations"][0]["movie_id"], 7);
        assert_eq!(value["recommendations"][0]["score"], 22.5);
        assert_eq!(value["recommendations"][0]["title"], "Heat (1995)");
    }
}
