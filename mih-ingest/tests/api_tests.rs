//! Integration tests for mih-ingest API endpoints

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use helpers::{count_rows, create_test_env, MultipartBody};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_method(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let env = create_test_env().await.unwrap();
    let (status, body) = send(env.router(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mih-ingest");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_upload_artist_csv() {
    let env = create_test_env().await.unwrap();
    let csv = "Artist Name,Track Title,ISRC,UPC,Service,Country,Date,Streams\n\
               Foo,Bar,US1234,000111,Spotify,BR,2024-01-01,1.500\n";

    let request = MultipartBody::new()
        .file("fuga.csv", csv.as_bytes())
        .into_request("/ingestions/upload/artist");
    let (status, body) = send(env.router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rows_inserted"], 1);
    assert_eq!(body["encoding_detected"], "utf-8-sig");
    assert!(body["ingestion_id"].is_i64());

    let streams: i64 = sqlx::query_scalar("SELECT streams FROM stream_events")
        .fetch_one(&env.pool)
        .await
        .unwrap();
    assert_eq!(streams, 1500);
}

#[tokio::test]
async fn test_upload_extension_case_insensitive() {
    let env = create_test_env().await.unwrap();
    let request = MultipartBody::new()
        .file("EXPORT.CSV", b"Artist\nA\n")
        .into_request("/ingestions/upload/artist");

    let (status, _) = send(env.router(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejects_non_csv() {
    let env = create_test_env().await.unwrap();
    let request = MultipartBody::new()
        .file("report.xlsx", b"PK\x03\x04")
        .into_request("/ingestions/upload/artist");

    let (status, body) = send(env.router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(env.saved_uploads().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let env = create_test_env().await.unwrap();
    let request = MultipartBody::new()
        .text("distributor", "FUGA")
        .into_request("/ingestions/upload/device");

    let (status, _) = send(env.router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_device_csv() {
    let env = create_test_env().await.unwrap();
    let request = MultipartBody::new()
        .file("devices.csv", b"device,2024-01-01,2024-01-02\nPlayerX,100,\n")
        .text("distributor", "The Orchard")
        .into_request("/ingestions/upload/device");

    let (status, body) = send(env.router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_points"], 1);
    assert_eq!(body["distributor"], "The Orchard");
    assert_eq!(body["encoding_detected"], "utf-8-sig");
    assert!(body["file_name"].as_str().unwrap().ends_with("_devices.csv"));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_upload_device_bad_header_is_400() {
    let env = create_test_env().await.unwrap();
    let request = MultipartBody::new()
        .file("devices.csv", b"device\nTV\n")
        .text("distributor", "FUGA")
        .into_request("/ingestions/upload/device");

    let (status, body) = send(env.router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("at least 2 columns"));
}

#[tokio::test]
async fn test_list_get_and_delete_ingestions() {
    let env = create_test_env().await.unwrap();
    let first = env.pipeline.ingest_artist("a.csv", b"Artist\nA\n").await.unwrap();
    let second = env
        .pipeline
        .ingest_device("d.csv", "FUGA", b"device,d1\nTV,3\n")
        .await
        .unwrap();

    let (status, body) = send(env.router(), get("/ingestions/")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second.ingestion_id, first.ingestion_id]);

    let (status, body) = send(env.router(), get(&format!("/ingestions/{}", first.ingestion_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["source_id"], 1);

    let (status, body) = send(
        env.router(),
        with_method("DELETE", &format!("/ingestions/{}", second.ingestion_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "deleted_ingestion_id": second.ingestion_id}));
    assert_eq!(count_rows(&env.pool, "device_daily_streams", None).await, 0);
}

#[tokio::test]
async fn test_missing_ingestion_is_404() {
    let env = create_test_env().await.unwrap();

    let (status, body) = send(env.router(), with_method("DELETE", "/ingestions/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(env.router(), get("/ingestions/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sources_list_and_toggle() {
    let env = create_test_env().await.unwrap();

    let (status, body) = send(env.router(), get("/sources/")).await;
    assert_eq!(status, StatusCode::OK);
    let sources = body.as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["id"], 1);
    assert_eq!(sources[0]["type"], "csv");
    assert_eq!(sources[1]["id"], 2);

    let (status, body) = send(env.router(), with_method("POST", "/sources/2/toggle")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    // Uploads into the switched-off source conflict
    let request = MultipartBody::new()
        .file("d.csv", b"device,d1\nTV,1\n")
        .text("distributor", "FUGA")
        .into_request("/ingestions/upload/device");
    let (status, body) = send(env.router(), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(env.router(), get("/sources/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_connectors_crud() {
    let env = create_test_env().await.unwrap();

    let (status, body) = send(
        env.router(),
        json_request(
            "POST",
            "/connectors/",
            json!({"name": "Spotify for Artists", "base_url": "https://example.invalid", "auth_type": "oauth2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(env.router(), get(&format!("/connectors/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auth_type"], "oauth2");
    assert_eq!(body["is_active"], true);
    let created_at = body["updated_at"].as_str().unwrap().to_string();

    let (status, body) = send(
        env.router(),
        json_request("PUT", &format!("/connectors/{}", id), json!({"notes": "quarterly"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "quarterly");
    assert_eq!(body["name"], "Spotify for Artists");
    assert_ne!(body["updated_at"].as_str().unwrap(), created_at);

    let (status, _) = send(
        env.router(),
        json_request("PUT", &format!("/connectors/{}", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        env.router(),
        with_method("POST", &format!("/connectors/{}/toggle", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (_, body) = send(env.router(), get("/connectors/")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(env.router(), with_method("DELETE", &format!("/connectors/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(env.router(), get(&format!("/connectors/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_connector_auth_type_options() {
    let env = create_test_env().await.unwrap();
    let (status, body) = send(env.router(), get("/connectors/auth-types/options")).await;

    assert_eq!(status, StatusCode::OK);
    let values: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["value"].as_str().unwrap())
        .collect();
    assert_eq!(
        values,
        vec!["api_key", "bearer_token", "basic_auth", "oauth2", "custom"]
    );
}
