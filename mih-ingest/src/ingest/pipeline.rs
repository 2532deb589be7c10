//! Upload → parse → persist orchestration for both CSV formats

use mih_common::db::FixedSource;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::uploads::{has_csv_extension, UploadStore};
use super::{artist, device, Encoding, IngestError};
use crate::db::{ledger, sources};

/// Result of a committed artist upload
#[derive(Debug, Clone)]
pub struct ArtistIngestionOutcome {
    pub ingestion_id: i64,
    pub file_name: String,
    pub rows_inserted: usize,
    pub encoding: Encoding,
}

/// Result of a committed device upload
#[derive(Debug, Clone)]
pub struct DeviceIngestionOutcome {
    pub ingestion_id: i64,
    pub file_name: String,
    pub distributor: String,
    pub total_points: usize,
    pub encoding: Encoding,
}

/// Shared ingestion entry point
///
/// Holds the pool and the artifact store handed over at startup; cloned
/// into every request.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    db: SqlitePool,
    uploads: UploadStore,
}

impl IngestionPipeline {
    pub fn new(db: SqlitePool, uploads: UploadStore) -> Self {
        Self { db, uploads }
    }

    /// Ingest an artist-format CSV
    ///
    /// The raw bytes are stored before decoding; a decode failure leaves the
    /// artifact on disk and nothing in the database.
    pub async fn ingest_artist(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<ArtistIngestionOutcome, IngestError> {
        require_csv(original_name)?;
        self.require_active(FixedSource::Artist).await?;

        let saved = self.uploads.save(original_name, bytes).await?;

        let owned = bytes.to_vec();
        let batch = parse_blocking(move || artist::parse_artist_csv(&owned))
            .await
            .map_err(|e| {
                warn!(file = %saved.name, error = %e, "Artist upload could not be decoded");
                e
            })?;
        info!(
            file = %saved.name,
            encoding = batch.encoding.label(),
            rows = batch.events.len(),
            "Artist CSV decoded"
        );

        let ingestion_id = ledger::record_artist_ingestion(&self.db, &saved.name, &batch.events).await?;

        Ok(ArtistIngestionOutcome {
            ingestion_id,
            file_name: saved.name,
            rows_inserted: batch.events.len(),
            encoding: batch.encoding,
        })
    }

    /// Ingest a device-format CSV tagged with its distributor
    pub async fn ingest_device(
        &self,
        original_name: &str,
        distributor: &str,
        bytes: &[u8],
    ) -> Result<DeviceIngestionOutcome, IngestError> {
        require_csv(original_name)?;

        let distributor = distributor.trim();
        if distributor.is_empty() {
            return Err(IngestError::InvalidUpload(
                "distributor must not be empty".to_string(),
            ));
        }

        self.require_active(FixedSource::Device).await?;

        let saved = self.uploads.save(original_name, bytes).await?;

        let owned = bytes.to_vec();
        let batch = parse_blocking(move || device::parse_device_csv(&owned))
            .await
            .map_err(|e| {
                warn!(file = %saved.name, error = %e, "Device upload rejected");
                e
            })?;
        info!(
            file = %saved.name,
            encoding = batch.encoding.label(),
            rows = batch.points.len(),
            distributor,
            "Device CSV decoded"
        );

        let ingestion_id =
            ledger::record_device_ingestion(&self.db, &saved.name, distributor, &batch.points).await?;

        Ok(DeviceIngestionOutcome {
            ingestion_id,
            file_name: saved.name,
            distributor: distributor.to_string(),
            total_points: batch.points.len(),
            encoding: batch.encoding,
        })
    }

    async fn require_active(&self, source: FixedSource) -> Result<(), IngestError> {
        if sources::is_source_active(&self.db, source.id()).await? {
            Ok(())
        } else {
            Err(IngestError::SourceInactive(source.id()))
        }
    }
}

/// Run a decode/parse on the blocking pool
///
/// A failing upload can cost several full decode passes, which must not
/// stall the runtime worker. The caller still awaits the result.
async fn parse_blocking<T, E, F>(parse: F) -> Result<T, IngestError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<IngestError> + Send + 'static,
{
    tokio::task::spawn_blocking(parse)
        .await
        .map_err(|e| {
            IngestError::Common(mih_common::Error::Internal(format!("parse task failed: {}", e)))
        })?
        .map_err(Into::into)
}

fn require_csv(original_name: &str) -> Result<(), IngestError> {
    if has_csv_extension(original_name) {
        Ok(())
    } else {
        Err(IngestError::InvalidUpload(format!(
            "only .csv files are accepted, got '{}'",
            original_name
        )))
    }
}
