//! # Data Loader Crate
//!
//! This crate owns the in-memory user/movie graph the recommender runs over,
//! and loads it from a MovieLens-style CSV dataset.
//!
//! ## Main Components
//!
//! - **types**: Domain types (User, Movie, Rating) and the rating scale
//! - **store**: `EntityStore`, the id-keyed collection of users and movies
//!   and the only writer of the bidirectional rating index
//! - **parser**: Parse `movies.csv` / `ratings.csv` into Rust structs
//! - **index**: Build and validate an `EntityStore` from parsed records
//! - **error**: Error types for lookups and loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::EntityStore;
//! use std::path::Path;
//!
//! let store = EntityStore::load_from_files(Path::new("data"))?;
//!
//! let user = store.get_user(1)?;
//! let movie = store.get_movie(318)?;
//! println!("User {} rated {} movies", user.id, user.movie_ratings().len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod store;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{MOVIES_FILE, RATINGS_FILE};
pub use store::EntityStore;
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    User,
    Movie,
    Rating,
    // Rating scale
    MIN_RATING,
    MAX_RATING,
    is_valid_rating,
};
