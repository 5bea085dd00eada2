use std::sync::Arc;

use crate::config::Config;
use crate::delivery::ArtifactDelivery;
use crate::generation_client::ResumeGenerator;
use crate::wizard::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Default: HttpGenerationClient pointed at GENERATION_SERVICE_URL.
    pub generator: Arc<dyn ResumeGenerator>,
    /// Default: FileSystemDelivery into DOWNLOAD_DIR.
    pub delivery: Arc<dyn ArtifactDelivery>,
}
