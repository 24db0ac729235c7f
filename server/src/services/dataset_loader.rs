use std::path::Path;
use std::sync::Arc;

use gridatlas_shared::feature::{MapFeature, decode_features};
use gridatlas_shared::{DatasetKind, SiteIndex};
use tracing::{debug, info, warn};

use crate::config::dataset_refresh;
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(dataset_refresh());

    // First tick fires immediately.
    loop {
        interval.tick().await;

        match load_index(&state.data_dir).await {
            Ok(index) => {
                let count = index.feature_count();
                *state.site_index.write().await = Some(Arc::new(index));
                info!(features = count, "scoring index refreshed");
            }
            Err(e) => {
                warn!(error = %e, dir = %state.data_dir.display(), "failed to load scoring datasets, keeping previous index");
            }
        }
    }
}

/// Build the scoring index from the station, substation and line datasets.
pub async fn load_index(data_dir: &Path) -> Result<SiteIndex, BoxError> {
    let stations = read_dataset(data_dir, DatasetKind::PowerStations).await?;
    let substations = read_dataset(data_dir, DatasetKind::Substations).await?;
    let lines = read_dataset(data_dir, DatasetKind::TransmissionLines).await?;
    Ok(SiteIndex::from_features(&stations, &substations, &lines))
}

async fn read_dataset(data_dir: &Path, kind: DatasetKind) -> Result<Vec<MapFeature>, BoxError> {
    let path = data_dir.join(kind.file_name());
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let decoded = tokio::task::spawn_blocking(move || decode_features(&body)).await??;
    if decoded.skipped > 0 {
        debug!(dataset = kind.file_name(), skipped = decoded.skipped, "skipped features without usable geometry");
    }
    Ok(decoded.features)
}
