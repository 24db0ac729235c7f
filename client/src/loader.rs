use gridatlas_shared::feature::{Decoded, decode_features};
use gridatlas_shared::{LatLng, LoadError, SiteScore};

/// Fetch and decode one GeoJSON dataset. Non-2xx responses are errors.
pub async fn fetch_dataset(url: &str) -> Result<Decoded, LoadError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(LoadError::Http(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;
    Ok(decode_features(&body)?)
}

pub async fn fetch_site_score(site: LatLng) -> Result<SiteScore, LoadError> {
    let url = format!("/api/site-score?lat={}&lon={}", site.lat, site.lng);
    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| LoadError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(LoadError::Http(resp.status()));
    }

    resp.json::<SiteScore>()
        .await
        .map_err(|e| LoadError::Parse(e.to_string()))
}
