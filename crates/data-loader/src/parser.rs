//! Parser for the MovieLens CSV files.
//!
//! - movies.csv: movieId,title,genres
//! - ratings.csv: userId,movieId,rating,timestamp
//!
//! Both files start with a header row. Titles containing commas are quoted
//! (`"American President, The (1995)"`), which is why this goes through the
//! `csv` crate rather than a plain `split(',')`. Columns the engine does not
//! use (genres, timestamp) are ignored.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
}

/// Parse the movie catalog at `path`
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = File::open(path)?;
    parse_movies_from_reader(file, &file_label(path))
}

/// Parse the rating log at `path`
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = File::open(path)?;
    parse_ratings_from_reader(file, &file_label(path))
}

/// Parse a movie catalog from any reader.
///
/// `file` is only used to label errors.
pub fn parse_movies_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<Movie>> {
    let rows: Vec<(usize, MovieRow)> = read_rows(reader, file)?;
    Ok(rows
        .into_iter()
        .map(|(_, row)| Movie::new(row.movie_id, row.title))
        .collect())
}

/// Parse a rating log from any reader.
///
/// Rows with a rating outside `[0.5, 5.0]` are rejected with the line they
/// came from.
pub fn parse_ratings_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<Rating>> {
    let rows: Vec<(usize, RatingRow)> = read_rows(reader, file)?;
    let mut ratings = Vec::with_capacity(rows.len());

    for (line, row) in rows {
        if !is_valid_rating(row.rating) {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: format!("Rating {} outside [{}, {}]", row.rating, MIN_RATING, MAX_RATING),
            });
        }
        ratings.push(Rating {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
        });
    }
    Ok(ratings)
}

/// Deserialize every data row, tagging each with its 1-based line number
fn read_rows<R: Read, T: DeserializeOwned>(reader: R, file: &str) -> Result<Vec<(usize, T)>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers: StringRecord = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let row = record
            .deserialize(Some(&headers))
            .map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: e.to_string(),
            })?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movies_with_quoted_titles() {
        let data = "movieId,title,genres\n\
                    1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
                    11,\"American President, The (1995)\",Comedy|Drama|Romance\n";

        let movies = parse_movies_from_reader(data.as_bytes(), "movies.csv").unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, 1);
        assert_eq!(movies[0].title, "Toy Story (1995)");
        assert_eq!(movies[1].title, "American President, The (1995)");
        assert!(movies[1].user_ratings().is_empty());
    }

    #[test]
    fn test_parse_ratings() {
        let data = "userId,movieId,rating,timestamp\n\
                    1,1,4.0,964982703\n\
                    1,3,0.5,964981247\n";

        let ratings = parse_ratings_from_reader(data.as_bytes(), "ratings.csv").unwrap();

        assert_eq!(
            ratings,
            vec![
                Rating { user_id: 1, movie_id: 1, rating: 4.0 },
                Rating { user_id: 1, movie_id: 3, rating: 0.5 },
            ]
        );
    }

    #[test]
    fn test_parse_ratings_reports_bad_line() {
        let data = "userId,movieId,rating,timestamp\n\
                    1,1,4.0,964982703\n\
                    2,abc,4.0,964982703\n";

        let err = parse_ratings_from_reader(data.as_bytes(), "ratings.csv").unwrap_err();

        match err {
            DataLoadError::ParseError { file, line, .. } => {
                assert_eq!(file, "ratings.csv");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_ratings_rejects_out_of_scale() {
        let data = "userId,movieId,rating,timestamp\n1,1,7.5,964982703\n";

        let err = parse_ratings_from_reader(data.as_bytes(), "ratings.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_movies(Path::new("definitely/not/here/movies.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::IoError(_)));
    }
}
