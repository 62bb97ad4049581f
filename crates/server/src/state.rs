use btagg_core::{Config, SearchService};

/// Shared application state
pub struct AppState {
    config: Config,
    search: SearchService,
}

impl AppState {
    pub fn new(config: Config, search: SearchService) -> Self {
        Self { config, search }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }
}
