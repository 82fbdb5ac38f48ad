// Application state module
// Immutable per-process state shared by every connection

use super::types::{Config, Mode};
use crate::handler::Backend;
use crate::store::FileStore;
use crate::upstream::UpstreamClient;

/// Application state
pub struct AppState {
    pub config: Config,
    pub backend: Backend,
}

impl AppState {
    /// Build the backend selected by `config.mode`
    pub fn new(config: Config) -> std::io::Result<Self> {
        let backend = match config.mode {
            Mode::FileServer => Backend::Local(FileStore::new(&config.storage.root_dir)?),
            Mode::WebProxy => {
                Backend::Upstream(UpstreamClient::new(&config.proxy.upstream_base_url))
            }
        };

        Ok(Self { config, backend })
    }

    pub const fn route_prefix(&self) -> &'static str {
        self.config.mode.route_prefix()
    }
}
