//! CSV ingestion pipeline
//!
//! raw bytes → [`UploadStore`] → [`encoding`] → [`columns`] / [`device`]
//! → [`numeric`] → ledger transaction

pub mod artist;
pub mod columns;
pub mod device;
pub mod encoding;
pub mod numeric;
pub mod pipeline;
pub mod uploads;

pub use artist::{parse_artist_csv, ArtistBatch, StreamEventRecord};
pub use device::{parse_device_csv, DeviceBatch, DevicePoint};
pub use encoding::{DecodeFailure, Encoding};
pub use pipeline::{ArtistIngestionOutcome, DeviceIngestionOutcome, IngestionPipeline};
pub use uploads::{SavedUpload, UploadStore};

use thiserror::Error;

/// Pipeline failure
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeFailure),

    /// Device header lacks a label column plus at least one day column
    #[error("device CSV header must have at least 2 columns, found {columns}")]
    MalformedHeader { columns: usize },

    /// Rejected before anything was stored (bad extension, empty distributor)
    #[error("{0}")]
    InvalidUpload(String),

    /// Target source has been switched off
    #[error("source {0} is inactive")]
    SourceInactive(i64),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence failure; the transaction has been rolled back
    #[error(transparent)]
    Common(#[from] mih_common::Error),
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::Common(err.into())
    }
}
