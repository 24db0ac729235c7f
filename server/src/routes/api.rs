use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gridatlas_shared::{DatasetDescriptor, DatasetKind};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let features_indexed = state
        .current_index()
        .await
        .map(|index| index.feature_count())
        .unwrap_or(0);
    Json(serde_json::json!({
        "status": "ok",
        "features_indexed": features_indexed,
        "started_at": state.started_at.to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub kind: DatasetKind,
    pub title: &'static str,
    pub url: &'static str,
}

impl From<DatasetDescriptor> for CatalogEntry {
    fn from(descriptor: DatasetDescriptor) -> Self {
        Self {
            kind: descriptor.kind,
            title: descriptor.title,
            url: descriptor.url,
        }
    }
}

/// The overlay catalog in display order.
pub async fn datasets() -> Json<Vec<CatalogEntry>> {
    Json(
        DatasetKind::ALL
            .iter()
            .map(|kind| CatalogEntry::from(kind.descriptor()))
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SiteQuery {
    pub lat: f64,
    pub lon: f64,
}

impl SiteQuery {
    fn validated(self) -> Result<(f64, f64), String> {
        Ok((
            within("lat", self.lat, 90.0)?,
            within("lon", self.lon, 180.0)?,
        ))
    }
}

fn within(name: &str, value: f64, limit: f64) -> Result<f64, String> {
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(format!("`{name}` must be within ±{limit}"))
    }
}

pub async fn site_score(
    State(state): State<AppState>,
    query: Result<Query<SiteQuery>, QueryRejection>,
) -> Response {
    let site = query
        .map_err(|rejection| rejection.body_text())
        .and_then(|Query(query)| query.validated());
    let (lat, lon) = match site {
        Ok(site) => site,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    let Some(index) = state.current_index().await else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "scoring datasets are not loaded yet",
        );
    };

    let score = tokio::task::spawn_blocking(move || index.score(lat, lon)).await;
    match score {
        Ok(score) => Json(score).into_response(),
        Err(e) => {
            tracing::error!(error = %e, lat, lon, "site scoring task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "scoring failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::Arc;

    use gridatlas_shared::SiteScore;

    use super::*;
    use crate::services::dataset_loader;

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

    async fn loaded_state() -> AppState {
        let state = test_state();
        let index = dataset_loader::load_index(&state.data_dir)
            .await
            .expect("load testdata index");
        *state.site_index.write().await = Some(Arc::new(index));
        state
    }

    #[test]
    fn site_query_range_is_checked() {
        let ok = SiteQuery {
            lat: -35.1,
            lon: 147.4,
        };
        assert_eq!(ok.validated(), Ok((-35.1, 147.4)));
        let edge = SiteQuery {
            lat: -90.0,
            lon: 180.0,
        };
        assert!(edge.validated().is_ok());
        for (lat, lon) in [(91.0, 147.0), (0.0, -180.5), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            assert!(SiteQuery { lat, lon }.validated().is_err(), "{lat},{lon}");
        }
    }

    #[tokio::test]
    async fn health_reports_index_size() {
        let (addr, server_handle) = spawn_test_server(loaded_state().await).await;

        let health = reqwest::get(format!("http://{addr}/api/health"))
            .await
            .expect("health request")
            .error_for_status()
            .expect("health status")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");

        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert_eq!(
            health.get("features_indexed").and_then(|v| v.as_u64()),
            Some(5)
        );
        assert!(health.get("started_at").and_then(|v| v.as_str()).is_some());

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn datasets_lists_overlays_in_order() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;

        let catalog = reqwest::get(format!("http://{addr}/api/datasets"))
            .await
            .expect("datasets request")
            .json::<serde_json::Value>()
            .await
            .expect("parse catalog");

        let titles: Vec<&str> = catalog
            .as_array()
            .expect("catalog array")
            .iter()
            .filter_map(|entry| entry.get("title").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(
            titles,
            vec![
                "Major Power Station Data",
                "Transmission Substations Data",
                "Electricity Transmission Lines",
                "Water Bodies",
            ]
        );
        assert_eq!(
            catalog[3].get("url").and_then(|v| v.as_str()),
            Some("/data/Water_Bodies.geojson")
        );
        assert_eq!(
            catalog[0].get("kind").and_then(|v| v.as_str()),
            Some("power_stations")
        );

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn site_score_unavailable_until_loaded() {
        let (addr, server_handle) = spawn_test_server(test_state()).await;

        let response = reqwest::get(format!("http://{addr}/api/site-score?lat=-35&lon=147"))
            .await
            .expect("site-score request");
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn site_score_rejects_bad_coordinates() {
        let (addr, server_handle) = spawn_test_server(loaded_state().await).await;

        let response = reqwest::get(format!("http://{addr}/api/site-score?lat=100&lon=147"))
            .await
            .expect("site-score request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body = response
            .json::<serde_json::Value>()
            .await
            .expect("parse error body");
        assert!(body.get("error").and_then(|v| v.as_str()).is_some());

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn site_score_rejects_malformed_query() {
        let (addr, server_handle) = spawn_test_server(loaded_state().await).await;

        for query in ["lat=-35", "lat=abc&lon=147", ""] {
            let response = reqwest::get(format!("http://{addr}/api/site-score?{query}"))
                .await
                .expect("site-score request");
            assert_eq!(
                response.status(),
                reqwest::StatusCode::BAD_REQUEST,
                "query {query:?}"
            );
            let body = response
                .json::<serde_json::Value>()
                .await
                .expect("parse error body");
            assert!(
                body.get("error").and_then(|v| v.as_str()).is_some(),
                "query {query:?}"
            );
        }

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn site_score_sums_components() {
        let (addr, server_handle) = spawn_test_server(loaded_state().await).await;

        let score = reqwest::get(format!(
            "http://{addr}/api/site-score?lat=-35.1175&lon=147.3707"
        ))
        .await
        .expect("site-score request")
        .error_for_status()
        .expect("site-score status")
        .json::<SiteScore>()
        .await
        .expect("parse site score");

        assert!((score.lat + 35.1175).abs() < 1e-9);
        assert!((score.lon - 147.3707).abs() < 1e-9);
        // Co-located 330 kV substation dominates; Tumut adds a little.
        assert!(score.substation > 330.0 && score.substation < 340.0);
        // The line starts at the site.
        assert!((score.line - 330.0).abs() < 1e-6);
        // Blowering hydro is within range, Eraring coal is not.
        assert!(score.station > 0.0 && score.station < 1000.0);
        assert!((score.total - (score.station + score.substation + score.line)).abs() < 1e-9);

        server_handle.abort();
        let _ = server_handle.await;
    }
}
