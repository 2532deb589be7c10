//! HTTP API handlers for mih-reports

pub mod export;
pub mod health;
pub mod reports;

pub use export::export_routes;
pub use health::health_routes;
pub use reports::report_routes;
