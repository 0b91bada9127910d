use std::sync::Arc;

use crate::config::Config;
use crate::drill::layout::PageGeometry;
use crate::drill::worksheet::WorksheetSettings;
use crate::render::AssetLocator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only; each request owns its own generator and RNG.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// A4 portrait with the worksheet margins.
    pub geometry: PageGeometry,
    pub assets: Arc<dyn AssetLocator>,
}

impl AppState {
    pub fn new(config: Config, assets: Arc<dyn AssetLocator>) -> Self {
        AppState {
            config,
            geometry: PageGeometry::a4(),
            assets,
        }
    }

    pub fn worksheet_settings(&self) -> WorksheetSettings {
        WorksheetSettings {
            answer_rows_per_page: self.config.answer_rows_per_page,
            max_sampling_attempts: self.config.max_sampling_attempts,
        }
    }
}
