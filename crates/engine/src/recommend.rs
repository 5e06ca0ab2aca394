//! Recommendation pass - neighbor-weighted movie ranking.
//!
//! A movie is recommended to `u` to the extent that users compatible with
//! `u` rated it highly, weighted by how compatible they are.
//!
//! ## Algorithm
//! For every user `u`:
//! 1. Rank neighbors by compatibility, highest first (ties: lower id first)
//! 2. Drop neighbors below `min_compat_score`
//! 3. For each neighbor, emit `(movie, rating * compatibility)` for every
//!    rating at or above `min_rating`
//! 4. Stable-sort all candidates by score, highest first
//! 5. Keep the first occurrence of each movie
//! 6. Keep the top `top_k`
//!
//! Movies `u` already rated stay in the running unless `exclude_rated` is set.

use crate::config::EngineConfig;
use crate::error::Result;
use data_loader::{EntityStore, MovieId, UserId};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument};

/// A candidate movie and its neighbor-weighted score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
}

/// Neighbors ordered by descending compatibility.
///
/// The sort is stable over the ascending-id map, so equal scores keep
/// ascending neighbor id.
pub fn rank_neighbors(compats: &BTreeMap<UserId, f32>) -> Vec<(UserId, f32)> {
    let mut ranked: Vec<(UserId, f32)> = compats.iter().map(|(&id, &score)| (id, score)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Candidates contributed by one neighbor, in ascending movie id
pub fn neighbor_candidates(
    compat_score: f32,
    movie_ratings: &BTreeMap<MovieId, f32>,
    min_rating: f32,
) -> impl Iterator<Item = ScoredMovie> + '_ {
    movie_ratings
        .iter()
        .filter(move |&(_, &rating)| rating >= min_rating)
        .map(move |(&movie_id, &rating)| ScoredMovie {
            movie_id,
            score: rating * compat_score,
        })
}

/// Stable-sort by score, keep the best-scored occurrence of each movie,
/// cap at `top_k`.
pub fn rank_candidates(mut candidates: Vec<ScoredMovie>, top_k: usize) -> Vec<ScoredMovie> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.movie_id))
        .take(top_k)
        .collect()
}

/// Totals for one recommendation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationSummary {
    pub users_processed: usize,
    pub users_without_recommendations: usize,
    pub recommendations_written: usize,
}

/// Turns compatibility maps into recommendation lists
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine; the config is validated here
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked recommendations for one user, with their scores.
    ///
    /// Reads the user's current compatibility map; nothing is stored.
    pub fn scored_recommendations_for(
        &self,
        store: &EntityStore,
        user_id: UserId,
    ) -> Result<Vec<ScoredMovie>> {
        let user = store.get_user(user_id)?;
        let mut candidates = Vec::new();

        for (neighbor_id, compat_score) in rank_neighbors(user.user_compats()) {
            if compat_score < self.config.min_compat_score {
                continue;
            }
            let neighbor = store.get_user(neighbor_id)?;
            candidates.extend(
                neighbor_candidates(compat_score, neighbor.movie_ratings(), self.config.min_rating)
                    .filter(|candidate| {
                        !(self.config.exclude_rated && user.has_rated(candidate.movie_id))
                    }),
            );
        }

        Ok(rank_candidates(candidates, self.config.top_k))
    }

    /// Ranked recommendation ids for one user
    pub fn recommendations_for(&self, store: &EntityStore, user_id: UserId) -> Result<Vec<MovieId>> {
        Ok(self
            .scored_recommendations_for(store, user_id)?
            .into_iter()
            .map(|scored| scored.movie_id)
            .collect())
    }

    /// Recompute and install the recommendation list of every user.
    ///
    /// Run after the compatibility pass. Each list is computed in full before
    /// it replaces the previous one.
    #[instrument(skip(self, store))]
    pub fn run(&self, store: &mut EntityStore) -> Result<RecommendationSummary> {
        let mut summary = RecommendationSummary::default();

        for user_id in store.user_ids() {
            let recommendations = self.recommendations_for(store, user_id)?;
            debug!("User {}: {} recommendations", user_id, recommendations.len());

            summary.users_processed += 1;
            summary.recommendations_written += recommendations.len();
            if recommendations.is_empty() {
                summary.users_without_recommendations += 1;
            }
            store.get_user_mut(user_id)?.set_recommendations(recommendations);
        }

        info!(
            "Wrote {} recommendations for {} users ({} with none)",
            summary.recommendations_written,
            summary.users_processed,
            summary.users_without_recommendations
        );
        Ok(summary)
    }
}
