use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gridatlas_shared::SiteIndex;
use tokio::sync::RwLock;

use crate::config::{client_dist_dir, data_dir};

#[derive(Clone)]
pub struct AppState {
    /// Directory the `/data` route and the dataset loader read from.
    pub data_dir: Arc<PathBuf>,
    pub client_dist_dir: Arc<PathBuf>,
    /// Scoring index built from the on-disk datasets. None until the first
    /// successful load.
    pub site_index: Arc<RwLock<Option<Arc<SiteIndex>>>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(data_dir: PathBuf, client_dist_dir: PathBuf) -> Self {
        Self {
            data_dir: Arc::new(data_dir),
            client_dist_dir: Arc::new(client_dist_dir),
            site_index: Arc::new(RwLock::new(None)),
            started_at: Utc::now(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(data_dir(), client_dist_dir())
    }

    pub async fn current_index(&self) -> Option<Arc<SiteIndex>> {
        self.site_index.read().await.as_ref().map(Arc::clone)
    }
}
