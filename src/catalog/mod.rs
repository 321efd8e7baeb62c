//! Selectable model catalog.
//!
//! The catalog is rebuilt from scratch on every refresh: the default model
//! first, then the models listed in the backend's `static/models.md`, then the
//! user's custom models behind a separator. When the remote list cannot be
//! loaded a fixed three-entry list is used instead.

use async_trait::async_trait;
use serde::Serialize;

use crate::gateway::RequestGateway;
use crate::settings::CustomModel;
use crate::Result;

pub const DEFAULT_MODEL_ID: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_MODEL_NAME: &str = "Claude 3.5 Sonnet (Default)";
pub const SEPARATOR_LABEL: &str = "--- Custom Models ---";

/// Display names for well-known ids, matched by substring
const CURATED_NAMES: &[(&str, &str)] = &[
    ("openai/gpt-oss-20b", "GPT OSS 20B (Free)"),
    ("z-ai/glm-4.5-air", "GLM 4.5 Air (Free)"),
    ("qwen/qwen3-coder", "Qwen 3 Coder (Free)"),
    ("moonshotai/kimi-k2", "Kimi K2 (Free)"),
    ("google/gemma-3n-e2b-it", "Gemma 3N E2B IT (Free)"),
    ("deepseek/deepseek-r1-0528", "DeepSeek R1 (Free)"),
];

/// One row of the model picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub selectable: bool,
    pub selected: bool,
}

impl CatalogEntry {
    fn model(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            selectable: true,
            selected: false,
        }
    }

    fn default_model() -> Self {
        Self {
            selected: true,
            ..Self::model(DEFAULT_MODEL_ID, DEFAULT_MODEL_NAME)
        }
    }

    fn separator() -> Self {
        Self {
            id: String::new(),
            name: SEPARATOR_LABEL.to_string(),
            selectable: false,
            selected: false,
        }
    }

    pub fn is_separator(&self) -> bool {
        !self.selectable
    }
}

/// Where the remote model list comes from
#[async_trait]
pub trait ModelListSource: Send + Sync {
    async fn fetch_model_list(&self) -> Result<String>;
}

#[async_trait]
impl ModelListSource for RequestGateway {
    async fn fetch_model_list(&self) -> Result<String> {
        RequestGateway::fetch_model_list(self).await
    }
}

pub struct ModelCatalogBuilder<'a> {
    source: &'a dyn ModelListSource,
}

impl<'a> ModelCatalogBuilder<'a> {
    pub fn new(source: &'a dyn ModelListSource) -> Self {
        Self { source }
    }

    /// Build the full catalog. Never fails: an unreachable model list yields
    /// [`fallback_catalog`], which leaves out custom models.
    pub async fn build(&self, custom_models: &[CustomModel]) -> Vec<CatalogEntry> {
        let text = match self.source.fetch_model_list().await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to load models: {}", e);
                return fallback_catalog();
            }
        };

        let mut entries = vec![CatalogEntry::default_model()];
        entries.extend(parse_model_list(&text));

        if !custom_models.is_empty() {
            entries.push(CatalogEntry::separator());
            entries.extend(
                custom_models
                    .iter()
                    .map(|m| CatalogEntry::model(&m.id, &m.name)),
            );
        }

        tracing::debug!("Built model catalog with {} entries", entries.len());
        entries
    }
}

/// Parse the model list resource: every non-empty line containing a colon
/// contributes the text before its first colon as a model id
pub fn parse_model_list(text: &str) -> Vec<CatalogEntry> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let (id, _description) = line.split_once(':')?;
            let id = id.trim();
            if id.is_empty() {
                return None;
            }
            let name = curated_name(id).unwrap_or(id);
            Some(CatalogEntry::model(id, name))
        })
        .collect()
}

/// Curated display name for an id, if it is a known model
pub fn curated_name(id: &str) -> Option<&'static str> {
    CURATED_NAMES
        .iter()
        .find(|(needle, _)| id.contains(needle))
        .map(|(_, name)| *name)
}

/// Fixed list used when the model list cannot be fetched
pub fn fallback_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::default_model(),
        CatalogEntry::model("anthropic/claude-3-haiku", "Claude 3 Haiku"),
        CatalogEntry::model("openai/gpt-4o-mini", "GPT-4o Mini"),
    ]
}

/// The pre-selected entry of a catalog
pub fn selected_entry(entries: &[CatalogEntry]) -> Option<&CatalogEntry> {
    entries.iter().find(|e| e.selected)
}

/// Whether `id` names a selectable entry of the catalog
pub fn is_selectable(entries: &[CatalogEntry], id: &str) -> bool {
    entries.iter().any(|e| e.selectable && e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;

    struct StaticSource(Result<String>);

    #[async_trait]
    impl ModelListSource for StaticSource {
        async fn fetch_model_list(&self) -> Result<String> {
            self.0.clone()
        }
    }

    fn custom(id: &str, name: &str) -> CustomModel {
        CustomModel {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    const MODELS_MD: &str = "\
openai/gpt-oss-20b:free
z-ai/glm-4.5-air: fast general model

no colon on this line
mistralai/mistral-7b: a small model
";

    #[test]
    fn test_parse_model_list() {
        let entries = parse_model_list(MODELS_MD);
        let pairs: Vec<_> = entries.iter().map(|e| (e.id.as_str(), e.name.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("openai/gpt-oss-20b", "GPT OSS 20B (Free)"),
                ("z-ai/glm-4.5-air", "GLM 4.5 Air (Free)"),
                ("mistralai/mistral-7b", "mistralai/mistral-7b"),
            ]
        );
        assert!(entries.iter().all(|e| e.selectable && !e.selected));
    }

    #[test]
    fn test_curated_name() {
        assert_eq!(curated_name("deepseek/deepseek-r1-0528"), Some("DeepSeek R1 (Free)"));
        assert_eq!(curated_name("unknown/model"), None);
    }

    #[tokio::test]
    async fn test_build_orders_sections() {
        let source = StaticSource(Ok(MODELS_MD.to_string()));
        let custom_models = vec![custom("my/one", "One"), custom("my/two", "Two")];

        let entries = ModelCatalogBuilder::new(&source).build(&custom_models).await;

        assert_eq!(entries[0].id, DEFAULT_MODEL_ID);
        assert!(entries[0].selected);
        assert_eq!(entries.iter().filter(|e| e.selected).count(), 1);

        let sep = entries.iter().position(|e| e.is_separator()).unwrap();
        assert_eq!(sep, 4);
        assert_eq!(entries[sep].name, SEPARATOR_LABEL);
        assert_eq!(entries[sep + 1].id, "my/one");
        assert_eq!(entries[sep + 2].name, "Two");
        assert_eq!(entries.len(), 7);
    }

    #[test]
    fn test_build_without_custom_models_has_no_separator() {
        let source = StaticSource(Ok(MODELS_MD.to_string()));
        let entries = tokio_test::block_on(ModelCatalogBuilder::new(&source).build(&[]));
        assert!(!entries.iter().any(|e| e.is_separator()));
        assert_eq!(entries.len(), 4);
    }

    #[tokio::test]
    async fn test_build_falls_back_when_unreachable() {
        let source = StaticSource(Err(ClientError::Network("down".to_string())));
        let entries = ModelCatalogBuilder::new(&source)
            .build(&[custom("my/one", "One")])
            .await;
        assert_eq!(entries, fallback_catalog());

        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![DEFAULT_MODEL_ID, "anthropic/claude-3-haiku", "openai/gpt-4o-mini"]
        );
    }

    #[test]
    fn test_selection_helpers() {
        let mut entries = fallback_catalog();
        entries.push(CatalogEntry::separator());
        assert_eq!(selected_entry(&entries).unwrap().id, DEFAULT_MODEL_ID);
        assert!(is_selectable(&entries, "openai/gpt-4o-mini"));
        assert!(!is_selectable(&entries, ""));
        assert!(!is_selectable(&entries, "missing"));
    }
}
