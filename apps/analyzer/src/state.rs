use std::sync::Arc;

use crate::config::Config;
use crate::extraction::Extractor;
use crate::profile::SkillProfileStore;
use crate::session::registry::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable extraction backend. Default: `ExtractionClient` over HTTP.
    pub extractor: Arc<dyn Extractor>,
    pub profile: SkillProfileStore,
    pub sessions: SessionRegistry,
    pub config: Config,
}
