//! Aggregate queries over ingested events
//!
//! `stream_date` and `day_label` are free text. Range bounds are compared
//! as strings, which orders correctly only for `YYYY-MM-DD` labels.

pub mod devices;
pub mod streams;

pub use devices::{
    device_daily_series, streams_by_distributor, top_devices, DayTotal, DeviceTotal,
    DistributorTotal,
};
pub use streams::{
    streams_by_country, streams_by_platform, summary, top_artists, ArtistTotal, CountryTotal,
    PlatformTotal, Summary,
};

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 500;

/// Clamp a requested row limit into `1..=MAX_LIMIT`
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Inclusive `from`/`to` bounds; either side may be open
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    /// Conditions on `column`; blank bounds are ignored
    fn conditions(&self, column: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(from) = self.from.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            out.push((format!("{} >= ", column), from.to_string()));
        }
        if let Some(to) = self.to.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            out.push((format!("{} <= ", column), to.to_string()));
        }
        out
    }
}

/// WHERE clause builder for the optional filters every report takes
#[derive(Debug, Default)]
pub(crate) struct Filters {
    conditions: Vec<(String, String)>,
}

impl Filters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn range(mut self, column: &str, range: &DateRange) -> Self {
        self.conditions.extend(range.conditions(column));
        self
    }

    /// Exact match on `column` when `value` is present and non-blank
    pub(crate) fn equals(mut self, column: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|s| !s.is_empty()) {
            self.conditions.push((format!("{} = ", column), value.to_string()));
        }
        self
    }

    pub(crate) fn push_to(self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for (i, (sql, value)) in self.conditions.into_iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            builder.push(sql).push_bind(value);
        }
    }
}
