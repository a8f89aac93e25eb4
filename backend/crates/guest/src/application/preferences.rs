//! Locale and currency preferences kept in persistent storage

use platform::storage::ResilientStorage;
use serde::{Deserialize, Serialize};

/// Display preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub locale: String,
    pub currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl Preferences {
    /// Load from `storage`, falling back to defaults when absent or unreadable
    pub fn load(storage: &ResilientStorage, key: &str) -> Self {
        let Some(raw) = storage.read(key) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(error = %e, key, "Ignoring corrupt preferences");
                Self::default()
            }
        }
    }

    /// Persist to `storage`, `false` when the write did not happen
    pub fn save(&self, storage: &ResilientStorage, key: &str) -> bool {
        match serde_json::to_string(self) {
            Ok(raw) => storage.write(key, &raw).is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode preferences");
                false
            }
        }
    }
}
