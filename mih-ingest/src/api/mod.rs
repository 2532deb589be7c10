//! HTTP API handlers for mih-ingest

pub mod connectors;
pub mod health;
pub mod ingestions;
pub mod sources;

pub use connectors::connector_routes;
pub use health::health_routes;
pub use ingestions::ingestion_routes;
pub use sources::source_routes;
