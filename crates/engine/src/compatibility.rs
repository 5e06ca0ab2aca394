//! Compatibility pass - user-to-user similarity from shared ratings.
//!
//! ## Algorithm
//! For every user `u`:
//! 1. Collect the movies `u` rated
//! 2. Candidate neighbors are every other user who rated any of them
//! 3. For each neighbor `v`, over the movies both rated:
//!    `score = ceiling - mean |rating_u - rating_v|`
//! 4. Install the finished map on `u` in one step
//!
//! The score is symmetric, but each user's map is filled during its own turn,
//! so both directions of every pair are computed and stored.

use crate::config::EngineConfig;
use crate::error::Result;
use data_loader::{EntityStore, MovieId, User, UserId};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Compatibility between `a` and `b` on the movies both rated.
///
/// Returns `None` when they share no movie, where the mean rating gap is
/// undefined.
pub fn compatibility_score(a: &User, b: &User, ceiling: f32) -> Option<f32> {
    // Walk the smaller map; shared ids come out ascending either way
    let (small, large) = if a.movie_ratings().len() <= b.movie_ratings().len() {
        (a, b)
    } else {
        (b, a)
    };

    let mut total_diff = 0.0f32;
    let mut shared = 0usize;
    for (&movie_id, &rating) in small.movie_ratings() {
        if let Some(other) = large.rating_for(movie_id) {
            total_diff += (rating - other).abs();
            shared += 1;
        }
    }

    if shared == 0 {
        return None;
    }
    Some(ceiling - total_diff / shared as f32)
}

/// Scores computed for one user, before they are installed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserCompatibilities {
    pub scores: BTreeMap<UserId, f32>,
    /// Candidates dropped because no movie was actually shared
    pub excluded: usize,
}

/// Totals for one compatibility pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompatibilitySummary {
    pub users_processed: usize,
    pub pairs_scored: usize,
    pub pairs_excluded: usize,
}

/// Computes every user's compatibility map
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityEngine {
    ceiling: f32,
}

impl CompatibilityEngine {
    /// Create an engine scoring against `config.compat_ceiling`
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ceiling: config.compat_ceiling,
        })
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Compute (without storing) the compatibility map of one user
    pub fn compatibilities_for(
        &self,
        store: &EntityStore,
        user_id: UserId,
    ) -> Result<UserCompatibilities> {
        let user = store.get_user(user_id)?;
        let rated: Vec<MovieId> = user.rated_movies().collect();

        let mut candidates = store.users_rating_any_of(&rated)?;
        candidates.remove(&user_id);

        let mut computed = UserCompatibilities::default();
        for neighbor_id in candidates {
            let neighbor = store.get_user(neighbor_id)?;
            match compatibility_score(user, neighbor, self.ceiling) {
                Some(score) => {
                    computed.scores.insert(neighbor_id, score);
                }
                None => {
                    warn!(
                        "User {} listed as candidate for {} without a shared movie, skipping",
                        neighbor_id, user_id
                    );
                    computed.excluded += 1;
                }
            }
        }
        Ok(computed)
    }

    /// Recompute and install the compatibility map of every user.
    ///
    /// Each user's previous map is replaced wholesale, so re-running on
    /// unchanged ratings leaves the store unchanged. If a user fails, the
    /// users processed before it keep their new maps and the failing user
    /// keeps its old one.
    #[instrument(skip(self, store))]
    pub fn run(&self, store: &mut EntityStore) -> Result<CompatibilitySummary> {
        let mut summary = CompatibilitySummary::default();

        for user_id in store.user_ids() {
            let computed = self.compatibilities_for(store, user_id)?;
            debug!(
                "User {}: {} compatible users",
                user_id,
                computed.scores.len()
            );

            summary.users_processed += 1;
            summary.pairs_scored += computed.scores.len();
            summary.pairs_excluded += computed.excluded;
            store.get_user_mut(user_id)?.set_compatibilities(computed.scores);
        }

        info!(
            "Scored {} user pairs across {} users",
            summary.pairs_scored, summary.users_processed
        );
        Ok(summary)
    }
}
