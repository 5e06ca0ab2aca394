//! Error types for the data-loader crate.
//!
//! Two families of failure live here:
//! - lookup failures against the [`EntityStore`](crate::EntityStore)
//!   (an id that was never registered)
//! - ingestion failures while reading the movie catalog and rating log

use crate::types::{MovieId, UserId};
use thiserror::Error;

/// Errors raised by the entity store and the CSV loader
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// No user with this id has been registered in the store
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// No movie with this id has been registered in the store
    #[error("Unknown movie: {0}")]
    UnknownMovie(MovieId),

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader could not decode the file
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A row in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The user-side and movie-side rating maps disagree about a rating
    #[error("Rating index out of sync for user {user_id} and movie {movie_id}")]
    InconsistentIndex { user_id: UserId, movie_id: MovieId },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
