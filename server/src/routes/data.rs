use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::DATA_CACHE_CONTROL;
use crate::state::AppState;

const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Serve one dataset file from the data directory.
pub async fn get_dataset(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Some(content_type) = dataset_content_type(&filename) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let path = state.data_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(body) => dataset_response(Bytes::from(body), content_type),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(%filename, "dataset not found");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, %filename, "failed to read dataset");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Content type for a servable dataset filename, or None when the name
/// could escape the data directory or has an unsupported extension.
fn dataset_content_type(filename: &str) -> Option<&'static str> {
    if filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\'])
        || filename.contains("..")
    {
        return None;
    }
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "geojson" => Some(GEOJSON_CONTENT_TYPE),
        "json" => Some(JSON_CONTENT_TYPE),
        _ => None,
    }
}

fn dataset_response(body: Bytes, content_type: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(DATA_CACHE_CONTROL),
    );
    response
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    use super::*;

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    fn test_state() -> AppState {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        AppState::new(root.join("testdata"), root.join("missing-dist"))
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(
            dataset_content_type("Water_Bodies.geojson"),
            Some(GEOJSON_CONTENT_TYPE)
        );
        assert_eq!(dataset_content_type("manifest.JSON"), Some(JSON_CONTENT_TYPE));
        assert_eq!(dataset_content_type("notes.txt"), None);
        assert_eq!(dataset_content_type("README"), None);
    }

    #[test]
    fn traversal_names_are_rejected() {
        for name in [
            "",
            ".env",
            ".hidden.geojson",
            "../secrets.json",
            "a/b.geojson",
            "a\\b.geojson",
            "x..geojson",
        ] {
            assert_eq!(dataset_content_type(name), None, "{name:?}");
        }
    }

    #[tokio::test]
    async fn serves_geojson_with_headers() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;

        let response = reqwest::get(format!(
            "http://{addr}/data/Electricity_Transmission_Lines.geojson"
        ))
        .await
        .expect("dataset request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some(GEOJSON_CONTENT_TYPE)
        );
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some(DATA_CACHE_CONTROL)
        );
        let body: serde_json::Value = response.json().await.expect("parse geojson");
        assert_eq!(
            body.get("type").and_then(|v| v.as_str()),
            Some("FeatureCollection")
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn missing_and_unsupported_files_are_not_found() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;
        let client = reqwest::Client::new();

        for path in [
            "/data/Nope.geojson",
            "/data/notes.txt",
            "/data/..%2Fsrc%2Fmain.rs",
        ] {
            let status = client
                .get(format!("http://{addr}{path}"))
                .send()
                .await
                .expect("dataset request")
                .status();
            assert_eq!(status, reqwest::StatusCode::NOT_FOUND, "{path}");
        }

        server_handle.abort();
        let _ = server_handle.await;
    }
}
