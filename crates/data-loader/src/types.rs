//! Core domain types for the movie/user rating graph.
//!
//! A [`Movie`] and a [`User`] each hold one side of the rating index:
//! the movie knows who rated it, the user knows what they rated. Both maps
//! are read-only from outside this crate; the only writer is
//! [`EntityStore::record_rating`](crate::EntityStore::record_rating), which
//! keeps the two sides in step.
//!
//! Every per-entity map is a `BTreeMap` so iteration runs in ascending id
//! order. Tie-breaks in the engine passes depend on that order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Lowest rating on the MovieLens half-star scale
pub const MIN_RATING: f32 = 0.5;

/// Highest rating on the MovieLens half-star scale
pub const MAX_RATING: f32 = 5.0;

/// Whether `rating` lies on the documented `[0.5, 5.0]` scale
pub fn is_valid_rating(rating: f32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

// =============================================================================
// Movie
// =============================================================================

/// A catalog entry together with the ratings it has received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Rater id -> rating. Populated only through `EntityStore::record_rating`.
    pub(crate) user_ratings: BTreeMap<UserId, f32>,
}

impl Movie {
    /// Create a movie with no ratings yet
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            user_ratings: BTreeMap::new(),
        }
    }

    /// Every rating this movie has received, keyed by user id
    pub fn user_ratings(&self) -> &BTreeMap<UserId, f32> {
        &self.user_ratings
    }

    /// Ids of the users who rated this movie, ascending
    pub fn raters(&self) -> impl Iterator<Item = UserId> + '_ {
        self.user_ratings.keys().copied()
    }
}

// =============================================================================
// User
// =============================================================================

/// A rater, plus the two outputs the engine computes for them
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Movie id -> rating. Populated only through `EntityStore::record_rating`.
    pub(crate) movie_ratings: BTreeMap<MovieId, f32>,
    /// Other user id -> compatibility score. Never contains `id`.
    user_compats: BTreeMap<UserId, f32>,
    /// Ranked movie ids, no duplicates.
    recommendations: Vec<MovieId>,
}

impl User {
    /// Create a user with empty rating, compatibility and recommendation state
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn movie_ratings(&self) -> &BTreeMap<MovieId, f32> {
        &self.movie_ratings
    }

    /// Ids of the movies this user rated, ascending
    pub fn rated_movies(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.movie_ratings.keys().copied()
    }

    pub fn rating_for(&self, movie_id: MovieId) -> Option<f32> {
        self.movie_ratings.get(&movie_id).copied()
    }

    pub fn has_rated(&self, movie_id: MovieId) -> bool {
        self.movie_ratings.contains_key(&movie_id)
    }

    pub fn user_compats(&self) -> &BTreeMap<UserId, f32> {
        &self.user_compats
    }

    pub fn recommendations(&self) -> &[MovieId] {
        &self.recommendations
    }

    /// Replace the whole compatibility map in one step.
    ///
    /// An entry for the user's own id is dropped, so a user is never listed
    /// as compatible with themselves.
    pub fn set_compatibilities(&mut self, mut compats: BTreeMap<UserId, f32>) {
        compats.remove(&self.id);
        self.user_compats = compats;
    }

    /// Replace the recommendation list, keeping only the first occurrence
    /// of any repeated movie id.
    pub fn set_recommendations(&mut self, recommendations: Vec<MovieId>) {
        let mut seen = HashSet::with_capacity(recommendations.len());
        self.recommendations = recommendations
            .into_iter()
            .filter(|movie_id| seen.insert(*movie_id))
            .collect();
    }
}

// =============================================================================
// Rating
// =============================================================================

/// One row of the rating log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0
    pub rating: f32,
}
