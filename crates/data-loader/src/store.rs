//! EntityStore - the in-memory user/movie graph.
//!
//! The store owns every [`Movie`] and [`User`] record, keyed by id, and is the
//! only mutation surface for both. Ratings are stored twice (user side and
//! movie side) and [`EntityStore::record_rating`] is the single place that
//! writes them.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::{BTreeSet, HashMap};

/// Main data structure that holds all movies and users.
///
/// Lookups by id are O(1). Anything that needs a stable order
/// (`user_ids`, `movie_ids`, `users_rating_any_of`) sorts by id.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) users: HashMap<UserId, User>,
}

impl EntityStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self {
            movies: HashMap::new(),
            users: HashMap::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Upserts
    // -------------------------------------------------------------------------

    /// Insert a movie, replacing any movie already stored under the same id.
    ///
    /// Returns the displaced movie. The replacement carries only its own
    /// `user_ratings`, so re-adding a rated movie detaches it from the raters'
    /// side of the index until ratings are recorded again.
    pub fn add_movie(&mut self, movie: Movie) -> Option<Movie> {
        self.movies.insert(movie.id, movie)
    }

    /// Insert a user, replacing any user already stored under the same id.
    ///
    /// Returns the displaced user.
    pub fn add_user(&mut self, user: User) -> Option<User> {
        self.users.insert(user.id, user)
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn get_movie(&self, id: MovieId) -> Result<&Movie> {
        self.movies.get(&id).ok_or(DataLoadError::UnknownMovie(id))
    }

    pub fn get_user(&self, id: UserId) -> Result<&User> {
        self.users.get(&id).ok_or(DataLoadError::UnknownUser(id))
    }

    /// Mutable access for writing a user's computed outputs
    pub fn get_user_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users.get_mut(&id).ok_or(DataLoadError::UnknownUser(id))
    }

    pub fn user_exists(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    pub fn movie_exists(&self, id: MovieId) -> bool {
        self.movies.contains_key(&id)
    }

    /// Return the user with this id, registering an empty one first if needed
    pub fn find_or_create_user(&mut self, id: UserId) -> &mut User {
        self.users.entry(id).or_insert_with(|| User::new(id))
    }

    /// All user ids, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All movie ids, ascending
    pub fn movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    // -------------------------------------------------------------------------
    // Rating index
    // -------------------------------------------------------------------------

    /// Record `rating` on both sides of the index.
    ///
    /// Both the user and the movie must already be registered; if either is
    /// missing nothing is written. A repeated (user, movie) pair overwrites
    /// the earlier rating on both sides.
    pub fn record_rating(&mut self, user_id: UserId, movie_id: MovieId, rating: f32) -> Result<()> {
        if !self.user_exists(user_id) {
            return Err(DataLoadError::UnknownUser(user_id));
        }
        let movie = self
            .movies
            .get_mut(&movie_id)
            .ok_or(DataLoadError::UnknownMovie(movie_id))?;
        movie.user_ratings.insert(user_id, rating);

        let user = self.get_user_mut(user_id)?;
        user.movie_ratings.insert(movie_id, rating);
        Ok(())
    }

    /// The de-duplicated union of rater ids across `movie_ids`, ascending.
    ///
    /// Every id must be in the store.
    pub fn users_rating_any_of<'a, I>(&self, movie_ids: I) -> Result<BTreeSet<UserId>>
    where
        I: IntoIterator<Item = &'a MovieId>,
    {
        let mut raters = BTreeSet::new();
        for &movie_id in movie_ids {
            raters.extend(self.get_movie(movie_id)?.raters());
        }
        Ok(raters)
    }

    /// Case-insensitive substring search over titles, ordered by movie id
    pub fn search_titles(&self, query: &str) -> Vec<&Movie> {
        let needle = query.to_lowercase();
        let mut hits: Vec<&Movie> = self
            .movies
            .values()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .collect();
        hits.sort_by_key(|movie| movie.id);
        hits
    }

    /// Get counts (users, movies, ratings) for logging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.users.values().map(|u| u.movie_ratings.len()).sum();
        (self.users.len(), self.movies.len(), total_ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_movies(ids: &[MovieId]) -> EntityStore {
        let mut store = EntityStore::new();
        for &id in ids {
            store.add_movie(Movie::new(id, format!("Movie {}", id)));
        }
        store
    }

    #[test]
    fn test_empty_store() {
        let store = EntityStore::new();
        assert_eq!(store.counts(), (0, 0, 0));
        assert!(store.user_ids().is_empty());
    }

    #[test]
    fn test_add_movie_is_upsert() {
        let mut store = EntityStore::new();
        assert!(store.add_movie(Movie::new(1, "Heat (1995)")).is_none());

        let replaced = store.add_movie(Movie::new(1, "Heat (1995) [Director's Cut]"));

        assert_eq!(replaced.map(|m| m.title), Some("Heat (1995)".to_string()));
        assert_eq!(store.get_movie(1).unwrap().title, "Heat (1995) [Director's Cut]");
        assert_eq!(store.counts().1, 1);
    }

    #[test]
    fn test_add_user_is_upsert() {
        let mut store = store_with_movies(&[10]);
        store.find_or_create_user(1);
        store.record_rating(1, 10, 4.0).unwrap();

        let replaced = store.add_user(User::new(1)).unwrap();

        assert_eq!(replaced.rating_for(10), Some(4.0));
        assert!(store.get_user(1).unwrap().movie_ratings().is_empty());
    }

    #[test]
    fn test_lookup_errors() {
        let store = EntityStore::new();
        assert!(matches!(store.get_user(42), Err(DataLoadError::UnknownUser(42))));
        assert!(matches!(store.get_movie(7), Err(DataLoadError::UnknownMovie(7))));
        assert!(!store.user_exists(42));
    }

    #[test]
    fn test_find_or_create_user_is_idempotent() {
        let mut store = store_with_movies(&[10]);
        store.find_or_create_user(5);
        store.record_rating(5, 10, 3.5).unwrap();

        let user = store.find_or_create_user(5);
        assert_eq!(user.rating_for(10), Some(3.5));
        assert_eq!(store.counts().0, 1);
    }

    #[test]
    fn test_record_rating_writes_both_sides() {
        let mut store = store_with_movies(&[10, 11]);
        store.find_or_create_user(1);

        store.record_rating(1, 10, 4.5).unwrap();
        store.record_rating(1, 11, 2.0).unwrap();

        let user = store.get_user(1).unwrap();
        assert_eq!(user.rating_for(10), Some(4.5));
        assert_eq!(user.rating_for(11), Some(2.0));
        assert_eq!(store.get_movie(10).unwrap().user_ratings().get(&1), Some(&4.5));
        assert_eq!(store.get_movie(11).unwrap().user_ratings().get(&1), Some(&2.0));
        assert_eq!(store.counts(), (1, 2, 2));
    }

    #[test]
    fn test_record_rating_rejects_unknown_ids() {
        let mut store = store_with_movies(&[10]);
        store.find_or_create_user(1);

        assert!(matches!(
            store.record_rating(1, 99, 4.0),
            Err(DataLoadError::UnknownMovie(99))
        ));
        assert!(matches!(
            store.record_rating(2, 10, 4.0),
            Err(DataLoadError::UnknownUser(2))
        ));
        // Nothing was written on either side
        assert!(store.get_movie(10).unwrap().user_ratings().is_empty());
        assert!(store.get_user(1).unwrap().movie_ratings().is_empty());
    }

    #[test]
    fn test_users_rating_any_of() {
        let mut store = store_with_movies(&[10, 11, 12]);
        for (user_id, movie_id) in [(3, 10), (1, 10), (1, 11), (2, 11), (4, 12)] {
            store.find_or_create_user(user_id);
            store.record_rating(user_id, movie_id, 4.0).unwrap();
        }

        let raters = store.users_rating_any_of(&[10, 11]).unwrap();
        assert_eq!(raters.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);

        let no_movies: [MovieId; 0] = [];
        assert!(store.users_rating_any_of(&no_movies).unwrap().is_empty());
        assert!(matches!(
            store.users_rating_any_of(&[10, 404]),
            Err(DataLoadError::UnknownMovie(404))
        ));
    }

    #[test]
    fn test_search_titles() {
        let mut store = EntityStore::new();
        store.add_movie(Movie::new(2, "Toy Story 2 (1999)"));
        store.add_movie(Movie::new(1, "Toy Story (1995)"));
        store.add_movie(Movie::new(3, "Heat (1995)"));

        let hits: Vec<MovieId> = store.search_titles("toy story").iter().map(|m| m.id).collect();
        assert_eq!(hits, vec![1, 2]);
        assert!(store.search_titles("alien").is_empty());
    }
}
