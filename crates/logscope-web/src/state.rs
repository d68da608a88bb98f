//! Shared state for the web server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use logscope_logs::RuleRegistry;

use crate::config::SavedConfig;
use crate::error::WebError;

/// Shared state handed to every request handler.
///
/// The rule registry is built once at startup and never mutated afterwards;
/// everything else a request needs is loaded fresh inside the handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Rule operator table
    registry: Arc<RuleRegistry>,

    /// Path of the rule configuration file, re-read per request
    config_path: PathBuf,

    /// Directory the browsable log directories live under
    root: PathBuf,
}

impl AppState {
    /// Create the server state
    pub fn new(registry: Arc<RuleRegistry>, config_path: PathBuf, root: PathBuf) -> Self {
        Self {
            registry,
            config_path,
            root,
        }
    }

    /// The rule operator table
    pub fn registry(&self) -> Arc<RuleRegistry> {
        self.registry.clone()
    }

    /// Load the current rule configuration from disk
    pub fn load_config(&self) -> Result<SavedConfig, WebError> {
        SavedConfig::load(&self.config_path)
    }

    /// Resolve a directory name from the URL into a path under the root.
    ///
    /// Only plain names are accepted; anything that could escape the root
    /// (separators, parent references, empty names) is rejected.
    pub fn resolve_dir(&self, name: &str) -> Result<PathBuf, WebError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(WebError::InvalidDir(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Directory the server was pointed at
    pub fn root(&self) -> &Path {
        &self.root
    }
}
