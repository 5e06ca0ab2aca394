//! Building an EntityStore from the catalog and rating files.
//!
//! Loading order matters: movies first, then ratings, because every rating
//! row must point at a catalog movie. Users are created the first time they
//! appear as the subject of a rating row.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::store::EntityStore;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info};

/// File name of the movie catalog inside a data directory
pub const MOVIES_FILE: &str = "movies.csv";

/// File name of the rating log inside a data directory
pub const RATINGS_FILE: &str = "ratings.csv";

impl EntityStore {
    /// Load a MovieLens-style dataset from a directory
    ///
    /// Steps:
    /// 1. Parse `movies.csv` and `ratings.csv` in parallel
    /// 2. Insert movies
    /// 3. Replay the rating log through `find_or_create_user` + `record_rating`
    /// 4. Validate the rating index
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading dataset from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);

        // The two files are independent until insertion
        let (movies, ratings) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_ratings(&ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Parsed {} movies, {} ratings", movies.len(), ratings.len());

        let store = Self::from_records(movies, ratings)?;

        let (users, movies, ratings) = store.counts();
        info!(
            "EntityStore built and validated: {} users, {} movies, {} ratings",
            users, movies, ratings
        );
        Ok(store)
    }

    /// Build a store from already-parsed records
    pub fn from_records(movies: Vec<Movie>, ratings: Vec<Rating>) -> Result<Self> {
        let mut store = EntityStore::new();

        for movie in movies {
            if let Some(previous) = store.add_movie(movie) {
                debug!("Movie {} listed twice, keeping the later row", previous.id);
            }
        }

        for rating in ratings {
            store.ingest_rating(rating)?;
        }

        store.validate()?;
        Ok(store)
    }

    /// Apply one rating-log row: register the user if new, then record
    pub fn ingest_rating(&mut self, rating: Rating) -> Result<()> {
        self.find_or_create_user(rating.user_id);
        self.record_rating(rating.user_id, rating.movie_id, rating.rating)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - every movie a user rated exists, and records the same rating back
    /// - every rater a movie lists exists, and records the same rating back
    /// - ratings are on the `[0.5, 5.0]` scale
    pub fn validate(&self) -> Result<()> {
        for user in self.users.values() {
            for (&movie_id, &rating) in &user.movie_ratings {
                let movie = self.get_movie(movie_id)?;
                if movie.user_ratings.get(&user.id) != Some(&rating) {
                    return Err(DataLoadError::InconsistentIndex {
                        user_id: user.id,
                        movie_id,
                    });
                }
                if !is_valid_rating(rating) {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.to_string(),
                    });
                }
            }
        }

        for movie in self.movies.values() {
            for (&user_id, &rating) in &movie.user_ratings {
                let user = self.get_user(user_id)?;
                if user.movie_ratings.get(&movie.id) != Some(&rating) {
                    return Err(DataLoadError::InconsistentIndex {
                        user_id,
                        movie_id: movie.id,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_dataset(dir: &Path, movies: &str, ratings: &str) {
        fs::write(dir.join(MOVIES_FILE), movies).unwrap();
        fs::write(dir.join(RATINGS_FILE), ratings).unwrap();
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(
            dir.path(),
            "movieId,title,genres\n10,Alien (1979),Horror|Sci-Fi\n11,\"Matrix, The (1999)\",Action\n",
            "userId,movieId,rating,timestamp\n1,10,5.0,1\n1,11,4.0,2\n2,10,3.0,3\n",
        );

        let store = EntityStore::load_from_files(dir.path()).unwrap();

        assert_eq!(store.counts(), (2, 2, 3));
        assert_eq!(store.get_movie(11).unwrap().title, "Matrix, The (1999)");
        assert_eq!(store.get_user(2).unwrap().rating_for(10), Some(3.0));
        let raters: Vec<UserId> = store.get_movie(10).unwrap().raters().collect();
        assert_eq!(raters, vec![1, 2]);
    }

    #[test]
    fn test_load_rejects_rating_for_unknown_movie() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(
            dir.path(),
            "movieId,title,genres\n10,Alien (1979),Horror\n",
            "userId,movieId,rating,timestamp\n1,99,5.0,1\n",
        );

        let err = EntityStore::load_from_files(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::UnknownMovie(99)));
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = EntityStore::load_from_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DataLoadError::IoError(_)));
    }

    #[test]
    fn test_validate_detects_one_sided_rating() {
        let mut store = EntityStore::new();
        store.add_movie(Movie::new(10, "Alien (1979)"));
        store.find_or_create_user(1).movie_ratings.insert(10, 4.0);

        let err = store.validate().unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::InconsistentIndex { user_id: 1, movie_id: 10 }
        ));
    }

    #[test]
    fn test_validate_detects_off_scale_rating() {
        let mut store = EntityStore::new();
        store.add_movie(Movie::new(10, "Alien (1979)"));
        store.find_or_create_user(1);
        store.record_rating(1, 10, 9.0).unwrap();

        assert!(matches!(
            store.validate(),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }
}
