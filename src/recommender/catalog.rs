//! Song catalog loaded from CSV.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns every catalog file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["genre", "artist", "song_title", "description"];

/// One row of the music database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub genre: String,
    pub artist: String,
    pub song_title: String,
    /// Free-text description; this is what gets embedded.
    pub description: String,
}

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is missing column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: expected {expected} fields, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unterminated quoted field")]
    UnterminatedQuote,

    #[error("catalog has no header row")]
    Empty,
}

/// Ordered list of songs. Row order is significant: index row `i` refers to
/// song `i`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
}

impl Catalog {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    /// Parse CSV text with a header row.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut rows = parse_csv(text.trim_start_matches('\u{feff}'))?.into_iter();
        let header = rows.next().ok_or(CatalogError::Empty)?;

        let mut positions = [0usize; 4];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(CatalogError::MissingColumn(name))?;
        }

        let mut songs = Vec::new();
        for (i, row) in rows.enumerate() {
            if row.len() == 1 && row[0].trim().is_empty() {
                continue;
            }
            if row.len() != header.len() {
                return Err(CatalogError::RowLength {
                    row: i + 2,
                    expected: header.len(),
                    found: row.len(),
                });
            }
            let field = |p: usize| row[positions[p]].clone();
            songs.push(Song {
                genre: field(0),
                artist: field(1),
                song_title: field(2),
                description: field(3),
            });
        }

        Ok(Self { songs })
    }

    pub fn get(&self, row: usize) -> Option<&Song> {
        self.songs.get(row)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// The texts that get embedded, one per song.
    pub fn descriptions(&self) -> Vec<String> {
        self.songs.iter().map(|s| s.description.clone()).collect()
    }
}

/// RFC 4180 style reader: quoted fields may contain commas, newlines and
/// doubled quotes. Both `\n` and `\r\n` end a record.
fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, CatalogError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CatalogError::UnterminatedQuote);
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "genre,artist,song_title,description,year\n\
        Jazz,Bill Evans,Peace Piece,\"Quiet, meditative piano\",1958\r\n\
        Rock,Queen,Bohemian Rhapsody,\"An \"\"operatic\"\" epic\nin six parts\",1975\n";

    #[test]
    fn test_parse_quoted_fields() {
        let catalog = Catalog::parse(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(0).unwrap();
        assert_eq!(first.artist, "Bill Evans");
        assert_eq!(first.description, "Quiet, meditative piano");

        let second = catalog.get(1).unwrap();
        assert_eq!(second.description, "An \"operatic\" epic\nin six parts");
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let text = "description,song_title,artist,genre\nsoft,Title,Someone,Pop\n";
        let catalog = Catalog::parse(text).unwrap();
        let song = catalog.get(0).unwrap();
        assert_eq!(song.genre, "Pop");
        assert_eq!(song.description, "soft");
    }

    #[test]
    fn test_missing_column() {
        let err = Catalog::parse("genre,artist,description\nPop,A,B\n").unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn("song_title")));
    }

    #[test]
    fn test_ragged_row() {
        let err = Catalog::parse("genre,artist,song_title,description\nPop,A\n").unwrap_err();
        assert!(matches!(err, CatalogError::RowLength { row: 2, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = Catalog::parse("genre,artist,song_title,description\n\"Pop,A,B,C\n").unwrap_err();
        assert!(matches!(err, CatalogError::UnterminatedQuote));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(Catalog::parse(""), Err(CatalogError::Empty)));
    }
}
