//! Artist-format (long) CSV: one row per play event

use serde::Serialize;

use super::columns::{self, Field, HeaderRow};
use super::encoding::{self, DecodeFailure, Encoding};
use super::numeric;

/// Stream event ready to be persisted (no ids yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamEventRecord {
    pub artist_name: String,
    pub track_title: String,
    pub isrc: String,
    pub upc: String,
    pub service: String,
    pub country: String,
    /// `None` when no date alias had a value; a whitespace-only cell is `""`
    pub stream_date: Option<String>,
    pub streams: i64,
}

/// Parsed artist upload
#[derive(Debug, Clone)]
pub struct ArtistBatch {
    pub events: Vec<StreamEventRecord>,
    pub encoding: Encoding,
}

/// Map one header row to an event
///
/// Nothing is filtered: a row with an empty artist still yields an event.
pub fn map_row(row: &HeaderRow) -> StreamEventRecord {
    let raw_date = columns::resolve_raw(row, Field::Date);

    StreamEventRecord {
        artist_name: columns::resolve(row, Field::Artist),
        track_title: columns::resolve(row, Field::Track),
        isrc: columns::resolve(row, Field::Isrc),
        upc: columns::resolve(row, Field::Upc),
        service: columns::resolve(row, Field::Platform),
        country: columns::resolve(row, Field::Country),
        stream_date: (!raw_date.is_empty()).then(|| raw_date.trim().to_string()),
        streams: numeric::normalize(columns::resolve_raw(row, Field::Streams)),
    }
}

/// Decode and map an artist CSV, preserving input row order
pub fn parse_artist_csv(bytes: &[u8]) -> Result<ArtistBatch, DecodeFailure> {
    let decoded = encoding::resolve_records(bytes)?;
    let events = decoded.value.iter().map(map_row).collect();

    Ok(ArtistBatch {
        events,
        encoding: decoded.encoding,
    })
}
