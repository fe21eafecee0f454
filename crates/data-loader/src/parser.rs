//! Parser for flat ratings files.
//!
//! One rating per line: `userId<sep>movieId<sep>rating[<sep>timestamp...]`
//!
//! The separator is detected per line, which covers the common MovieLens
//! layouts:
//! - `ratings.dat` (1M/10M): `::`
//! - `u.data` (100k): TAB
//! - `ratings.csv` (latest/small): `,` with a header line
//!
//! Anything after the third field is ignored.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Helper function to read a file with ISO-8859-1 encoding (Latin-1)
///
/// MovieLens files are ISO-8859-1, not UTF-8. Every byte maps directly to a
/// Unicode code point, so the conversion cannot fail.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Split a line on whichever supported separator it uses
fn split_fields(line: &str) -> Vec<&str> {
    if line.contains("::") {
        line.split("::").collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split(',').collect()
    }
}

/// Parse a ratings file from disk
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let lines = read_lines_latin1(path)?;
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_ratings_lines(&file, lines.iter().map(String::as_str))
}

/// Parse ratings from already-read lines.
///
/// `file` is only used to label errors.
pub fn parse_ratings_lines<'a>(
    file: &str,
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Rating>> {
    let mut ratings = Vec::new();
    let mut seen_data = false;

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let fields = split_fields(line_trimmed);

        // A header is only tolerated before the first data line
        if !seen_data && is_header(&fields) {
            continue;
        }
        seen_data = true;

        let mut parts = fields.into_iter().map(str::trim);

        let user_id = parts.next().ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing userId".to_string(),
        })?;
        let movie_id = parts.next().ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing movieId".to_string(),
        })?;
        let rating_value = parts.next().ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: line_no,
            reason: "Missing rating".to_string(),
        })?;

        let rating = Rating {
            user_id: user_id.parse().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid userId: {}", e),
            })?,
            movie_id: movie_id.parse().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid movieId: {}", e),
            })?,
            rating: rating_value.parse().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid rating: {}", e),
            })?,
        };

        ratings.push(rating);
    }
    Ok(ratings)
}

/// A header line has a non-numeric first field (e.g. `userId,movieId,...`)
fn is_header(fields: &[&str]) -> bool {
    fields
        .first()
        .map(|first| first.trim().parse::<UserId>().is_err())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_double_colon_lines() {
        let ratings =
            parse_ratings_lines("ratings.dat", ["1::1193::5::978300760", "1::661::3::978302109"])
                .unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0], Rating::new(1, 1193, 5.0));
        assert_eq!(ratings[1], Rating::new(1, 661, 3.0));
    }

    #[test]
    fn test_parse_tab_lines() {
        let ratings = parse_ratings_lines("u.data", ["196\t242\t3\t881250949"]).unwrap();
        assert_eq!(ratings, vec![Rating::new(196, 242, 3.0)]);
    }

    #[test]
    fn test_parse_csv_with_header_and_half_points() {
        let lines = [
            "userId,movieId,rating,timestamp",
            "1,31,2.5,1260759144",
            "",
            "1,1029,3.0,1260759179",
        ];
        let ratings = parse_ratings_lines("ratings.csv", lines).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].rating, 2.5);
    }

    #[test]
    fn test_timestamp_is_optional() {
        let ratings = parse_ratings_lines("ratings.csv", ["7,8,4.5"]).unwrap();
        assert_eq!(ratings, vec![Rating::new(7, 8, 4.5)]);
    }

    #[test]
    fn test_missing_field_reports_line() {
        let err = parse_ratings_lines("ratings.dat", ["1::2::3", "4::5"]).unwrap_err();
        match err {
            DataLoadError::ParseError { line, reason, .. } => {
                assert_eq!(line, 2);
                assert_eq!(reason, "Missing rating");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_header_after_data_is_an_error() {
        let err = parse_ratings_lines("ratings.csv", ["1,2,3.0", "userId,movieId,rating"]);
        assert!(matches!(err, Err(DataLoadError::ParseError { line: 2, .. })));
    }

    #[test]
    fn test_invalid_rating_value() {
        let err = parse_ratings_lines("ratings.csv", ["1,2,great"]);
        assert!(matches!(err, Err(DataLoadError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_ratings(Path::new("/definitely/not/here/ratings.dat"));
        assert!(matches!(err, Err(DataLoadError::FileNotFound { .. })));
    }
}
