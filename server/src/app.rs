use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::{config, routes};

pub(crate) fn build_app(state: AppState) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(state.client_dist_dir.as_path())
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(bundle_cache_headers));

    let app = Router::new()
        .route("/api/health", get(routes::api::health))
        .route("/api/datasets", get(routes::api::datasets))
        .route("/api/site-score", get(routes::api::site_score))
        .route("/data/{filename}", get(routes::data::get_dataset));

    app.layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn bundle_cache_headers(request: Request, next: Next) -> Response {
    let cache_control = cache_control_for_path(request.uri().path());
    let mut response = next.run(request).await;

    if let Some(value) = cache_control.filter(|_| response.status().is_success()) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    match ext {
        "wasm" | "js" | "css" if trunk_hash(stem).is_some() => Some(config::BUNDLE_CACHE_CONTROL),
        "png" | "ico" | "svg" => Some(config::IMAGE_CACHE_CONTROL),
        _ => None,
    }
}

/// The content hash trunk puts in bundle names, as in `index-<hash>` or
/// `gridatlas-client-<hash>_bg`.
fn trunk_hash(stem: &str) -> Option<&str> {
    let stem = stem.strip_suffix("_bg").unwrap_or(stem);
    let (_, hash) = stem.rsplit_once('-')?;
    (hash.len() >= 8 && hash.chars().all(|c| c.is_ascii_hexdigit())).then_some(hash)
}
