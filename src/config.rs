//! Engine configuration.
//!
//! The review limit is injected at engine construction; there is no
//! package-level mutable default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

fn default_review_limit() -> usize {
    20
}

/// Configuration consumed by [`ReviewEngine`](crate::review::ReviewEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of due items served per query.
    #[serde(default = "default_review_limit")]
    pub review_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            review_limit: default_review_limit(),
        }
    }
}

/// Default on-disk location for the engine database
/// (e.g. ~/.local/share/lexis/lexis.db)
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join("lexis").join("lexis.db"))
        .ok_or(EngineError::DataDirNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_review_limit() {
        assert_eq!(EngineConfig::default().review_limit, 20);
    }

    #[test]
    fn test_review_limit_defaults_when_unset() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.review_limit, 20);
    }
}
