//! Persisted user settings: the optional API key and the custom model list.
//!
//! Settings live under a single key of an origin-scoped key/value area. Every
//! mutation is written through before the call returns. A failed write keeps
//! the in-memory change and reports a [`ClientError::Persistence`]; it is not
//! retried.

use serde::{Deserialize, Serialize};

pub mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};

use crate::{ClientError, Result};

/// Storage key holding the serialized settings
pub const SETTINGS_KEY: &str = "verbatim-ai-settings";

/// Placeholder shown instead of a stored API key
pub const MASKED_API_KEY: &str = "••••••••••••••••";

/// Suggested file name for exported settings
pub const EXPORT_FILE_NAME: &str = "verbatim-ai-settings.json";

const SAVE_FAILED: &str = "Failed to save settings to storage";

/// A user-registered model identifier with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomModel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// OpenRouter API key, empty when unset
    #[serde(default)]
    pub api_key: String,

    /// Custom models in insertion order, unique by id
    #[serde(default)]
    pub custom_models: Vec<CustomModel>,
}

/// Top-level fields that may be merged over existing settings.
/// Absent and `null` fields leave the current value in place.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsPatch {
    #[serde(default)]
    api_key: Option<String>,

    #[serde(default)]
    custom_models: Option<Vec<CustomModel>>,
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn has_custom_model(&self, id: &str) -> bool {
        self.custom_models.iter().any(|m| m.id == id)
    }

    fn merged(&self, patch: SettingsPatch) -> Settings {
        Settings {
            api_key: patch.api_key.unwrap_or_else(|| self.api_key.clone()),
            custom_models: patch
                .custom_models
                .unwrap_or_else(|| self.custom_models.clone()),
        }
    }
}

fn parse_patch(text: &str) -> std::result::Result<SettingsPatch, String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;

    if !value.is_object() {
        return Err("settings document must be a JSON object".to_string());
    }

    let patch: SettingsPatch = serde_json::from_value(value).map_err(|e| e.to_string())?;

    if let Some(models) = &patch.custom_models {
        for (i, model) in models.iter().enumerate() {
            if models[..i].iter().any(|m| m.id == model.id) {
                return Err(format!("duplicate custom model id '{}'", model.id));
            }
        }
    }

    Ok(patch)
}

/// Owner of the current settings and the storage they persist to
pub struct SettingsStore {
    storage: Box<dyn KeyValueStorage>,
    settings: Settings,
}

impl SettingsStore {
    /// Load persisted settings, falling back to defaults on absence or failure
    pub fn load(storage: Box<dyn KeyValueStorage>) -> Self {
        let defaults = Settings::default();

        let settings = match storage.get(SETTINGS_KEY) {
            Ok(Some(saved)) => match parse_patch(&saved) {
                Ok(patch) => defaults.merged(patch),
                Err(e) => {
                    tracing::error!("Failed to load settings: {}", e);
                    defaults
                }
            },
            Ok(None) => defaults,
            Err(e) => {
                tracing::error!("Failed to load settings: {}", e);
                defaults
            }
        };

        Self { storage, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    /// API key as it should be displayed: the placeholder when set, empty otherwise
    pub fn masked_api_key(&self) -> &'static str {
        if self.settings.has_api_key() {
            MASKED_API_KEY
        } else {
            ""
        }
    }

    /// Write the full settings object to storage
    pub fn save(&mut self) -> Result<()> {
        let content = serde_json::to_string(&self.settings).map_err(|e| {
            tracing::error!("Failed to serialize settings: {}", e);
            ClientError::Persistence(SAVE_FAILED.to_string())
        })?;

        self.storage.set(SETTINGS_KEY, &content).map_err(|e| {
            tracing::error!("Failed to save settings: {}", e);
            ClientError::Persistence(SAVE_FAILED.to_string())
        })
    }

    /// Store a new API key. Returns `Ok(false)` without saving when the input
    /// is blank or still the masked placeholder.
    pub fn set_api_key(&mut self, key: &str) -> Result<bool> {
        let key = key.trim();
        if key.is_empty() || key == MASKED_API_KEY {
            return Ok(false);
        }

        self.settings.api_key = key.to_string();
        self.save()?;
        Ok(true)
    }

    pub fn clear_api_key(&mut self) -> Result<()> {
        self.settings.api_key.clear();
        self.save()
    }

    pub fn add_custom_model(&mut self, id: &str, name: &str) -> Result<()> {
        let id = id.trim();
        let name = name.trim();

        if id.is_empty() || name.is_empty() {
            return Err(ClientError::Validation(
                "Please enter both model ID and display name".to_string(),
            ));
        }

        if self.settings.has_custom_model(id) {
            return Err(ClientError::Validation("Model already exists".to_string()));
        }

        self.settings.custom_models.push(CustomModel {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.save()
    }

    /// Remove the model with `id`; absent ids are not an error
    pub fn remove_custom_model(&mut self, id: &str) -> Result<()> {
        self.settings.custom_models.retain(|m| m.id != id);
        self.save()
    }

    /// Replace everything with defaults once `confirm` agrees.
    /// Returns whether the reset happened.
    pub fn reset_all(&mut self, confirm: impl FnOnce() -> bool) -> Result<bool> {
        if !confirm() {
            return Ok(false);
        }

        self.settings = Settings::default();
        self.save()?;
        Ok(true)
    }

    /// Pretty-printed JSON document of the current settings
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.settings)
            .map_err(|e| ClientError::Persistence(format!("Failed to export settings: {}", e)))
    }

    /// Merge the top-level fields of `text` over the current settings.
    /// Invalid documents leave the settings untouched.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let patch = parse_patch(text).map_err(|e| {
            tracing::warn!("Rejected settings import: {}", e);
            ClientError::Parse("Invalid settings file".to_string())
        })?;

        self.settings = self.settings.merged(patch);
        self.save()
    }
}
