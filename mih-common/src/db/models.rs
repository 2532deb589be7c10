//! Database models

use serde::{Deserialize, Serialize};

/// Seeded source that receives artist-format CSV uploads
pub const ARTIST_SOURCE_ID: i64 = 1;

/// Seeded source that receives device-format CSV uploads
pub const DEVICE_SOURCE_ID: i64 = 2;

/// The two sources every database is seeded with
///
/// The variant decides which event table an ingestion's rows live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedSource {
    Artist,
    Device,
}

impl FixedSource {
    pub fn id(self) -> i64 {
        match self {
            FixedSource::Artist => ARTIST_SOURCE_ID,
            FixedSource::Device => DEVICE_SOURCE_ID,
        }
    }

    pub fn from_id(source_id: i64) -> Option<Self> {
        match source_id {
            ARTIST_SOURCE_ID => Some(FixedSource::Artist),
            DEVICE_SOURCE_ID => Some(FixedSource::Device),
            _ => None,
        }
    }

    /// Event table owned by ingestions of this source
    pub fn event_table(self) -> &'static str {
        match self {
            FixedSource::Artist => "stream_events",
            FixedSource::Device => "device_daily_streams",
        }
    }
}

/// Origin of ingested data (`csv` upload or `api` connector)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Source {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub source_type: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// One upload event, owning a batch of derived rows
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingestion {
    pub id: i64,
    pub source_id: i64,
    pub file_name: String,
    pub ingested_at: String,
    pub total_rows: i64,
}

/// Long-format play event from an artist CSV
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StreamEvent {
    pub id: i64,
    pub ingestion_id: i64,
    pub artist_name: String,
    pub track_title: Option<String>,
    pub isrc: Option<String>,
    pub upc: Option<String>,
    pub service: Option<String>,
    pub country: Option<String>,
    pub stream_date: Option<String>,
    pub streams: i64,
}

/// One (device, day) cell melted out of a device CSV
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceDailyStream {
    pub id: i64,
    pub ingestion_id: i64,
    pub distributor: String,
    pub device_name: String,
    pub day_label: String,
    pub streams: i64,
}

/// Configuration for a future remote API sync (never executed)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Connector {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_url: Option<String>,
    pub auth_type: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
    pub additional_headers: Option<String>,
    pub is_active: bool,
    pub last_sync_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_round_trip_ids() {
        assert_eq!(FixedSource::from_id(1), Some(FixedSource::Artist));
        assert_eq!(FixedSource::from_id(2), Some(FixedSource::Device));
        assert_eq!(FixedSource::from_id(3), None);
        assert_eq!(FixedSource::Device.event_table(), "device_daily_streams");
    }
}
