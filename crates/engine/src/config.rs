//! Engine configuration.
//!
//! All knobs of both passes live in [`EngineConfig`]. The defaults are the
//! values the recommender has always shipped with; `with_*` methods override
//! them one at a time. A config is checked by [`EngineConfig::validate`]
//! when an engine is built from it, so a bad value is rejected before any
//! user is touched.

use crate::error::{EngineError, Result};
use data_loader::{MAX_RATING, MIN_RATING};

/// Score two users get when they agree exactly on every shared movie
pub const DEFAULT_COMPAT_CEILING: f32 = 5.0;

/// Neighbors scoring below this do not contribute recommendations
pub const DEFAULT_MIN_COMPAT_SCORE: f32 = 4.0;

/// Neighbor ratings below this are not turned into candidates
pub const DEFAULT_MIN_RATING: f32 = 4.0;

/// Length cap of each user's recommendation list
pub const DEFAULT_TOP_K: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// `K` in `score = K - mean |r_u - r_v|`
    pub compat_ceiling: f32,
    /// Minimum compatibility for a neighbor to count
    pub min_compat_score: f32,
    /// Minimum neighbor rating for a movie to become a candidate
    pub min_rating: f32,
    /// Maximum number of recommendations kept per user
    pub top_k: usize,
    /// Drop candidates the user has already rated
    pub exclude_rated: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compat_ceiling: DEFAULT_COMPAT_CEILING,
            min_compat_score: DEFAULT_MIN_COMPAT_SCORE,
            min_rating: DEFAULT_MIN_RATING,
            top_k: DEFAULT_TOP_K,
            exclude_rated: false,
        }
    }
}

impl EngineConfig {
    /// Configure the compatibility ceiling (default: 5.0)
    pub fn with_compat_ceiling(mut self, ceiling: f32) -> Self {
        self.compat_ceiling = ceiling;
        self
    }

    /// Configure the neighbor cut-off (default: 4.0)
    pub fn with_min_compat_score(mut self, score: f32) -> Self {
        self.min_compat_score = score;
        self
    }

    /// Configure the rating cut-off (default: 4.0)
    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = rating;
        self
    }

    /// Configure the recommendation list length (default: 12)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Exclude movies the user already rated (default: false)
    pub fn with_exclude_rated(mut self, exclude: bool) -> Self {
        self.exclude_rated = exclude;
        self
    }

    /// Reject values outside the documented scales.
    ///
    /// - `compat_ceiling` must be finite and positive
    /// - `min_rating` must lie on the rating scale `[0.5, 5.0]`
    /// - `min_compat_score` must lie in the score range
    ///   `[ceiling - 4.5, ceiling]`
    /// - `top_k` must be at least 1
    pub fn validate(&self) -> Result<()> {
        if !self.compat_ceiling.is_finite() || self.compat_ceiling <= 0.0 {
            return Err(invalid(
                "compat_ceiling",
                format!("{} is not a positive finite number", self.compat_ceiling),
            ));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.min_rating) {
            return Err(invalid(
                "min_rating",
                format!("{} is outside [{}, {}]", self.min_rating, MIN_RATING, MAX_RATING),
            ));
        }
        let lowest_score = self.compat_ceiling - (MAX_RATING - MIN_RATING);
        if !(lowest_score..=self.compat_ceiling).contains(&self.min_compat_score) {
            return Err(invalid(
                "min_compat_score",
                format!(
                    "{} is outside [{}, {}]",
                    self.min_compat_score, lowest_score, self.compat_ceiling
                ),
            ));
        }
        if self.top_k == 0 {
            return Err(invalid("top_k", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> EngineError {
    EngineError::InvalidConfig { field, reason }
}
