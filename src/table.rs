//! Film table loading.
//!
//! Reads the finalized table produced by data preparation: one row per film
//! with the columns `Film, Acteurs, Realisateur, Genre, Annee, Duree, Poster`.
//! Columns are located by header name, so their order does not matter.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Result type for table operations.
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Columns that must be present in the header.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Film", "Acteurs", "Realisateur", "Genre", "Annee", "Duree"];

/// One row of the film table. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRecord {
    /// `Film`
    pub title: Option<String>,
    /// `Acteurs`, separator-joined.
    pub actors: Option<String>,
    /// `Realisateur`
    pub director: Option<String>,
    /// `Genre`, separator-joined.
    pub genres: Option<String>,
    /// `Annee`, kept as text; only an all-digit value becomes a year.
    pub year: Option<String>,
    /// `Duree` in minutes.
    pub duration: Option<i64>,
    /// `Poster` URL. Carried through but not part of the graph.
    pub poster: Option<String>,
}

impl FilmRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_actors(mut self, actors: impl Into<String>) -> Self {
        self.actors = Some(actors.into());
        self
    }

    pub fn with_director(mut self, director: impl Into<String>) -> Self {
        self.director = Some(director.into());
        self
    }

    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = Some(genres.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_poster(mut self, url: impl Into<String>) -> Self {
        self.poster = Some(url.into());
        self
    }
}

/// Maps table columns to record fields.
#[derive(Debug, Default)]
struct ColumnMap {
    title: Option<usize>,
    actors: Option<usize>,
    director: Option<usize>,
    genres: Option<usize>,
    year: Option<usize>,
    duration: Option<usize>,
    poster: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> TableResult<Self> {
        let mut map = Self::default();
        for (i, header) in headers.iter().enumerate() {
            match header.trim_start_matches('\u{feff}') {
                "Film" => map.title = Some(i),
                "Acteurs" => map.actors = Some(i),
                "Realisateur" => map.director = Some(i),
                "Genre" => map.genres = Some(i),
                "Annee" => map.year = Some(i),
                "Duree" => map.duration = Some(i),
                "Poster" => map.poster = Some(i),
                _ => {}
            }
        }

        let found = [
            map.title,
            map.actors,
            map.director,
            map.genres,
            map.year,
            map.duration,
        ];
        if let Some((column, _)) = REQUIRED_COLUMNS
            .iter()
            .zip(found)
            .find(|(_, idx)| idx.is_none())
        {
            return Err(TableError::MissingColumn {
                column: (*column).to_string(),
            });
        }
        Ok(map)
    }

    fn parse_record(&self, record: &csv::StringRecord) -> FilmRecord {
        let get_field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        FilmRecord {
            title: get_field(self.title),
            actors: get_field(self.actors),
            director: get_field(self.director),
            genres: get_field(self.genres),
            year: get_field(self.year),
            duration: get_field(self.duration).and_then(|s| parse_duration(&s)),
            poster: get_field(self.poster),
        }
    }
}

/// Parse a `Duree` cell. Integral floats (`"117.0"`) are accepted since
/// table tools often write integer columns that way; anything else is absent.
fn parse_duration(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Read a film table from any CSV source.
pub fn read_table<R: Read>(reader: R) -> TableResult<Vec<FilmRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| TableError::Malformed {
            message: e.to_string(),
        })?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| TableError::Malformed {
            message: e.to_string(),
        })?;
        rows.push(columns.parse_record(&record));
    }
    tracing::debug!(rows = rows.len(), "film table read");
    Ok(rows)
}

/// Read a film table from a CSV file.
pub fn load_table(path: &Path) -> TableResult<Vec<FilmRecord>> {
    let file = std::fs::File::open(path).map_err(|e| TableError::Open {
        path: path.display().to_string(),
        source: e,
    })?;
    read_table(std::io::BufReader::new(file))
}
