//! # Engine Crate
//!
//! Compatibility-based collaborative filtering over an
//! [`EntityStore`](data_loader::EntityStore).
//!
//! ## Components
//!
//! ### Compatibility pass
//! For each user, every other user who rated at least one of the same movies
//! is scored `ceiling - mean |rating difference|` over the shared movies.
//!
//! ### Recommendation pass
//! For each user, ratings of sufficiently compatible neighbors are weighted
//! by compatibility, ranked, de-duplicated and capped.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::EntityStore;
//! use engine::{EngineConfig, RecommendationPipeline};
//!
//! let mut store = EntityStore::load_from_files(Path::new("data"))?;
//!
//! let pipeline = RecommendationPipeline::new(EngineConfig::default())?;
//! pipeline.run(&mut store)?;
//!
//! let user = store.get_user(1)?;
//! println!("{:?}", user.recommendations());
//! ```

pub mod compatibility;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod recommend;

// Re-export main types
pub use compatibility::{
    CompatibilityEngine, CompatibilitySummary, UserCompatibilities, compatibility_score,
};
pub use config::{
    DEFAULT_COMPAT_CEILING, DEFAULT_MIN_COMPAT_SCORE, DEFAULT_MIN_RATING, DEFAULT_TOP_K,
    EngineConfig,
};
pub use error::{EngineError, Result};
pub use pipeline::{PipelineSummary, RecommendationPipeline};
pub use recommend::{RecommendationEngine, RecommendationSummary, ScoredMovie};
