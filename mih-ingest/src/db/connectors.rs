//! API connector configuration
//!
//! Connectors are stored settings for remote data sources. Nothing here
//! contacts a remote API.

use chrono::{SecondsFormat, Utc};
use mih_common::db::Connector;
use mih_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

const CONNECTOR_COLUMNS: &str = "id, name, description, base_url, auth_type, \
     api_key, api_secret, client_id, client_secret, token_url, \
     additional_headers, is_active, last_sync_at, created_at, updated_at, notes";

/// Supported authentication schemes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    ApiKey,
    BearerToken,
    BasicAuth,
    #[serde(rename = "oauth2")]
    OAuth2,
    Custom,
}

impl AuthType {
    pub const ALL: [AuthType; 5] = [
        AuthType::ApiKey,
        AuthType::BearerToken,
        AuthType::BasicAuth,
        AuthType::OAuth2,
        AuthType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::ApiKey => "api_key",
            AuthType::BearerToken => "bearer_token",
            AuthType::BasicAuth => "basic_auth",
            AuthType::OAuth2 => "oauth2",
            AuthType::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthType::ApiKey => "API Key",
            AuthType::BearerToken => "Bearer Token",
            AuthType::BasicAuth => "Basic Auth",
            AuthType::OAuth2 => "OAuth 2.0",
            AuthType::Custom => "Custom",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AuthType::ApiKey => "API key sent in a header or query parameter",
            AuthType::BearerToken => "Token sent as Authorization: Bearer {token}",
            AuthType::BasicAuth => "Basic authentication with user and password",
            AuthType::OAuth2 => "OAuth 2.0 flow with client_id and client_secret",
            AuthType::Custom => "Custom headers defined manually",
        }
    }
}

/// Entry of `GET /connectors/auth-types/options`
#[derive(Debug, Clone, Serialize)]
pub struct AuthTypeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub fn auth_type_options() -> Vec<AuthTypeOption> {
    AuthType::ALL
        .iter()
        .map(|t| AuthTypeOption {
            value: t.as_str(),
            label: t.label(),
            description: t.description(),
        })
        .collect()
}

/// Body of a create request
#[derive(Debug, Clone, Deserialize)]
pub struct NewConnector {
    pub name: String,
    pub description: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub auth_type: AuthType,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
    /// JSON object serialized as a string
    pub additional_headers: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub notes: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectorPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_url: Option<String>,
    pub auth_type: Option<AuthType>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
    pub additional_headers: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn not_found(connector_id: i64) -> Error {
    Error::NotFound(format!("Connector {} not found", connector_id))
}

/// All connectors ordered by name
pub async fn list_connectors(pool: &SqlitePool) -> Result<Vec<Connector>> {
    let sql = format!("SELECT {} FROM api_connectors ORDER BY name ASC", CONNECTOR_COLUMNS);
    let connectors = sqlx::query_as::<_, Connector>(&sql).fetch_all(pool).await?;
    Ok(connectors)
}

pub async fn get_connector(pool: &SqlitePool, connector_id: i64) -> Result<Connector> {
    let sql = format!("SELECT {} FROM api_connectors WHERE id = ?", CONNECTOR_COLUMNS);
    sqlx::query_as::<_, Connector>(&sql)
        .bind(connector_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(connector_id))
}

/// Insert a connector and return its id
pub async fn create_connector(pool: &SqlitePool, new: &NewConnector) -> Result<i64> {
    if new.name.trim().is_empty() {
        return Err(Error::InvalidInput("Connector name must not be empty".to_string()));
    }

    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO api_connectors (
            name, description, base_url, auth_type,
            api_key, api_secret, client_id, client_secret, token_url,
            additional_headers, is_active, created_at, updated_at, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.base_url)
    .bind(new.auth_type.as_str())
    .bind(&new.api_key)
    .bind(&new.api_secret)
    .bind(&new.client_id)
    .bind(&new.client_secret)
    .bind(&new.token_url)
    .bind(&new.additional_headers)
    .bind(new.is_active)
    .bind(&now)
    .bind(&now)
    .bind(&new.notes)
    .execute(pool)
    .await?;

    let connector_id = result.last_insert_rowid();
    info!(connector_id, name = %new.name, "Connector created");
    Ok(connector_id)
}

/// Apply the fields present in `patch`; `updated_at` always moves
pub async fn update_connector(
    pool: &SqlitePool,
    connector_id: i64,
    patch: &ConnectorPatch,
) -> Result<Connector> {
    // Existence is checked first so a missing id is a 404 even for an empty patch
    get_connector(pool, connector_id).await?;

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE api_connectors SET ");
    let mut fields = builder.separated(", ");
    let mut changed = 0;

    let text_fields = [
        ("name", &patch.name),
        ("description", &patch.description),
        ("base_url", &patch.base_url),
        ("api_key", &patch.api_key),
        ("api_secret", &patch.api_secret),
        ("client_id", &patch.client_id),
        ("client_secret", &patch.client_secret),
        ("token_url", &patch.token_url),
        ("additional_headers", &patch.additional_headers),
        ("notes", &patch.notes),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            fields.push(format!("{} = ", column)).push_bind_unseparated(value.clone());
            changed += 1;
        }
    }
    if let Some(auth_type) = patch.auth_type {
        fields.push("auth_type = ").push_bind_unseparated(auth_type.as_str());
        changed += 1;
    }
    if let Some(is_active) = patch.is_active {
        fields.push("is_active = ").push_bind_unseparated(is_active);
        changed += 1;
    }

    if changed == 0 {
        return Err(Error::InvalidInput("No fields to update".to_string()));
    }

    fields.push("updated_at = ").push_bind_unseparated(now_rfc3339());
    builder.push(" WHERE id = ").push_bind(connector_id);
    builder.build().execute(pool).await?;

    info!(connector_id, fields = changed, "Connector updated");
    get_connector(pool, connector_id).await
}

/// Delete a connector, returning its name
pub async fn delete_connector(pool: &SqlitePool, connector_id: i64) -> Result<String> {
    let connector = get_connector(pool, connector_id).await?;

    sqlx::query("DELETE FROM api_connectors WHERE id = ?")
        .bind(connector_id)
        .execute(pool)
        .await?;

    info!(connector_id, name = %connector.name, "Connector deleted");
    Ok(connector.name)
}

/// Flip `is_active`; returns the new state
pub async fn toggle_connector(pool: &SqlitePool, connector_id: i64) -> Result<bool> {
    let connector = get_connector(pool, connector_id).await?;
    let is_active = !connector.is_active;

    sqlx::query("UPDATE api_connectors SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(is_active)
        .bind(now_rfc3339())
        .bind(connector_id)
        .execute(pool)
        .await?;

    Ok(is_active)
}
