//! Column resolution across vendor header dialects
//!
//! FUGA, Vydia and The Orchard exports (and their Portuguese variants) name
//! the same column differently. Each canonical field carries an ordered alias
//! list; the first alias whose cell is non-empty wins.

use std::collections::HashMap;

/// One decoded CSV row keyed by its original (case-preserved) header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    cells: HashMap<String, String>,
}

impl HeaderRow {
    pub fn new(cells: HashMap<String, String>) -> Self {
        Self { cells }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Canonical stream-event field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Artist,
    Track,
    Isrc,
    Upc,
    Platform,
    Country,
    Date,
    Streams,
}

/// Canonical field → alias priority list
pub const COLUMN_ALIASES: [(Field, &[&str]); 8] = [
    (Field::Artist, &["Artist Name", "artist_name", "Artist", "Artista"]),
    (
        Field::Track,
        &["Track Title", "Recording Name", "track_title", "Título", "Faixa"],
    ),
    (Field::Isrc, &["ISRC", "isrc"]),
    (Field::Upc, &["UPC", "upc"]),
    (
        Field::Platform,
        &["Service", "Platform", "service", "Plataforma", "Serviço"],
    ),
    (
        Field::Country,
        &["Country of Consumption", "Country", "country", "País"],
    ),
    (Field::Date, &["Date", "Stream Date", "date", "Data"]),
    (
        Field::Streams,
        &["Streams", "Quantity", "streams", "Reproduções", "Quantidade"],
    ),
];

impl Field {
    pub fn aliases(self) -> &'static [&'static str] {
        COLUMN_ALIASES
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// Value used when no alias matches
    pub fn default_value(self) -> &'static str {
        match self {
            Field::Streams => "0",
            _ => "",
        }
    }
}

/// First non-empty cell among the field's aliases, untrimmed
///
/// An absent header and an empty cell are the same thing here. A cell of
/// only whitespace is non-empty and therefore stops the search.
pub fn resolve_raw(row: &HeaderRow, field: Field) -> &str {
    field
        .aliases()
        .iter()
        .filter_map(|alias| row.get(alias))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| field.default_value())
}

/// Resolved value with surrounding whitespace removed
pub fn resolve(row: &HeaderRow, field: Field) -> String {
    resolve_raw(row, field).trim().to_string()
}
