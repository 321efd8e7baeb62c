//! Application state and command dispatch.
//!
//! [`App`] is built once at startup and owns every piece of client state.
//! Frontends translate user intents into [`Command`]s and hand them to
//! [`App::dispatch`]; handlers report failures through the notification
//! center instead of returning them.
//!
//! `dispatch` borrows the app mutably across the request, so commands run one
//! at a time and a fetch never overlaps a format. Frontends that need the two
//! requests in flight together drive [`TranscriptSession`] and
//! [`RequestGateway`] directly; the session's busy guards and format tickets
//! keep that interleaving consistent.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

pub mod clipboard;

pub use clipboard::{ClipboardError, ClipboardSink, SystemClipboard};

use crate::catalog::{self, CatalogEntry, ModelCatalogBuilder};
use crate::config::AppConfig;
use crate::gateway::{ReqwestTransport, RequestGateway, MISSING_URL};
use crate::notify::NotificationCenter;
use crate::render::{self, Block};
use crate::session::{TranscriptSession, FORMAT_PLACEHOLDER};
use crate::settings::{FileStorage, SettingsStore};
use crate::{utils, ClientError, ErrorKind, Result};

/// A user intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchTranscript { url: String },
    FormatTranscript,
    SelectModel { id: String },
    RefreshCatalog,
    SaveApiKey { key: String },
    ClearApiKey,
    ToggleApiKeyVisibility,
    AddCustomModel { id: String, name: String },
    RemoveCustomModel { id: String },
    /// `confirmed` is the answer to the reset confirmation prompt
    ResetSettings { confirmed: bool },
    ExportSettings { path: PathBuf },
    ImportSettings { path: PathBuf },
    CopyRaw,
    CopyFormatted,
    DismissError,
}

/// How a dispatched command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Nothing to do, e.g. a blank API key or a declined reset
    Skipped,
    Failed(ErrorKind),
}

pub struct App {
    settings: SettingsStore,
    gateway: RequestGateway,
    session: TranscriptSession,
    notifications: NotificationCenter,
    clipboard: Box<dyn ClipboardSink>,
    catalog: Vec<CatalogEntry>,
    selected_model: String,
    api_key_visible: bool,
}

impl App {
    pub fn new(
        settings: SettingsStore,
        gateway: RequestGateway,
        notifications: NotificationCenter,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            settings,
            gateway,
            session: TranscriptSession::new(),
            notifications,
            clipboard,
            catalog: catalog::fallback_catalog(),
            selected_model: catalog::DEFAULT_MODEL_ID.to_string(),
            api_key_visible: false,
        }
    }

    /// Wire up the real transport, storage and clipboard from configuration
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let base_url = utils::validate_and_normalize_url(&config.backend.base_url)?;
        let origin = utils::origin_of(&base_url);
        let storage_dir = config.storage_dir()?;

        let storage = FileStorage::for_origin(&storage_dir, &origin);
        tracing::debug!("Settings for origin {} stored in {}", origin, storage.path().display());

        let transport = ReqwestTransport::new(base_url, config.request_timeout())
            .context("Failed to create HTTP client")?;

        Ok(Self::new(
            SettingsStore::load(Box::new(storage)),
            RequestGateway::new(Arc::new(transport)),
            NotificationCenter::new(config.error_dismiss(), config.toast_dismiss()),
            Box::new(SystemClipboard::new()),
        ))
    }

    /// Run the handler for `command` to completion, surfacing any failure as
    /// an error notification
    pub async fn dispatch(&mut self, command: Command) -> Outcome {
        tracing::debug!("Dispatching {:?}", command);

        let result = match command {
            Command::FetchTranscript { url } => self.fetch_transcript(&url).await,
            Command::FormatTranscript => self.format_transcript().await,
            Command::SelectModel { id } => self.select_model(&id),
            Command::RefreshCatalog => {
                self.refresh_catalog().await;
                Ok(Outcome::Done)
            }
            Command::SaveApiKey { key } => self.save_api_key(&key),
            Command::ClearApiKey => self.clear_api_key(),
            Command::ToggleApiKeyVisibility => {
                self.api_key_visible = !self.api_key_visible;
                Ok(Outcome::Done)
            }
            Command::AddCustomModel { id, name } => self.add_custom_model(&id, &name).await,
            Command::RemoveCustomModel { id } => self.remove_custom_model(&id).await,
            Command::ResetSettings { confirmed } => self.reset_settings(confirmed).await,
            Command::ExportSettings { path } => self.export_settings(path).await,
            Command::ImportSettings { path } => self.import_settings(path).await,
            Command::CopyRaw => self.copy(CopyTarget::Raw),
            Command::CopyFormatted => self.copy(CopyTarget::Formatted),
            Command::DismissError => {
                self.notifications.dismiss_error();
                Ok(Outcome::Done)
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.notifications.show_error(e.user_message());
                Outcome::Failed(e.kind())
            }
        }
    }

    async fn fetch_transcript(&mut self, url: &str) -> Result<Outcome> {
        if url.trim().is_empty() {
            return Err(ClientError::Validation(MISSING_URL.to_string()));
        }

        self.notifications.dismiss_error();
        self.session.begin_fetch()?;

        let outcome = self.gateway.fetch_transcript(url).await;
        self.session.complete_fetch(&outcome);
        self.session.settle_fetch();

        outcome.map(|_| Outcome::Done)
    }

    async fn format_transcript(&mut self) -> Result<Outcome> {
        let ticket = self.session.begin_format()?;
        self.notifications.dismiss_error();

        let api_key = Some(self.settings.settings().api_key.as_str()).filter(|k| !k.is_empty());
        let outcome = self
            .gateway
            .format_transcript(self.session.raw_transcript(), &self.selected_model, api_key)
            .await;
        self.session.complete_format(ticket, &outcome);
        self.session.settle_format();

        outcome.map(|_| Outcome::Done)
    }

    fn select_model(&mut self, id: &str) -> Result<Outcome> {
        if !catalog::is_selectable(&self.catalog, id) {
            return Err(ClientError::Validation(format!("Unknown model: {}", id)));
        }
        self.selected_model = id.to_string();
        Ok(Outcome::Done)
    }

    /// Rebuild the model catalog; the selection returns to the default entry
    pub async fn refresh_catalog(&mut self) {
        let builder = ModelCatalogBuilder::new(&self.gateway);
        self.catalog = builder.build(&self.settings.settings().custom_models).await;
        self.selected_model = catalog::selected_entry(&self.catalog)
            .map(|e| e.id.clone())
            .unwrap_or_else(|| catalog::DEFAULT_MODEL_ID.to_string());
    }

    fn save_api_key(&mut self, key: &str) -> Result<Outcome> {
        if !self.settings.set_api_key(key)? {
            return Ok(Outcome::Skipped);
        }
        self.api_key_visible = false;
        self.notifications.show_toast("API key saved successfully!");
        Ok(Outcome::Done)
    }

    fn clear_api_key(&mut self) -> Result<Outcome> {
        self.settings.clear_api_key()?;
        self.notifications.show_toast("API key cleared!");
        Ok(Outcome::Done)
    }

    async fn add_custom_model(&mut self, id: &str, name: &str) -> Result<Outcome> {
        let saved = self.settings.add_custom_model(id, name);
        if matches!(saved, Err(ClientError::Validation(_))) {
            return saved.map(|_| Outcome::Done);
        }

        self.refresh_catalog().await;
        saved?;
        self.notifications.show_toast("Model added successfully!");
        Ok(Outcome::Done)
    }

    async fn remove_custom_model(&mut self, id: &str) -> Result<Outcome> {
        let saved = self.settings.remove_custom_model(id);
        self.refresh_catalog().await;
        saved?;
        self.notifications.show_toast("Model removed!");
        Ok(Outcome::Done)
    }

    async fn reset_settings(&mut self, confirmed: bool) -> Result<Outcome> {
        let reset = self.settings.reset_all(|| confirmed);
        if matches!(reset, Ok(false)) {
            return Ok(Outcome::Skipped);
        }

        self.api_key_visible = false;
        self.refresh_catalog().await;
        reset?;
        self.notifications.show_toast("Settings reset successfully!");
        Ok(Outcome::Done)
    }

    async fn export_settings(&mut self, path: PathBuf) -> Result<Outcome> {
        let document = self.settings.export_json()?;

        tokio::fs::write(&path, document).await.map_err(|e| {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            ClientError::Persistence("Failed to export settings".to_string())
        })?;

        self.notifications.show_toast("Settings exported successfully");
        Ok(Outcome::Done)
    }

    async fn import_settings(&mut self, path: PathBuf) -> Result<Outcome> {
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            ClientError::Parse("Invalid settings file".to_string())
        })?;

        let imported = self.settings.import_json(&text);
        if matches!(imported, Err(ClientError::Parse(_))) {
            return imported.map(|_| Outcome::Done);
        }

        self.refresh_catalog().await;
        imported?;
        self.notifications.show_toast("Settings imported successfully");
        Ok(Outcome::Done)
    }

    fn copy(&mut self, target: CopyTarget) -> Result<Outcome> {
        let (label, text) = match target {
            CopyTarget::Raw => ("Raw transcript", self.session.raw_transcript()),
            CopyTarget::Formatted => ("Formatted transcript", self.session.formatted_transcript()),
        };

        if text.is_empty() {
            return Err(ClientError::Validation(format!(
                "No {} to copy",
                label.to_lowercase()
            )));
        }

        let summary = format!(
            "{} copied! {} words, {} characters",
            label,
            utils::count_words(text),
            utils::format_thousands(utils::count_chars(text))
        );

        self.clipboard.set_text(text).map_err(|e| {
            tracing::error!("{}", e);
            ClientError::Persistence("Failed to copy to clipboard".to_string())
        })?;

        self.notifications.show_toast(summary);
        Ok(Outcome::Done)
    }

    pub fn session(&self) -> &TranscriptSession {
        &self.session
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// API key as the settings view shows it
    pub fn api_key_display(&self) -> &str {
        if self.api_key_visible {
            self.settings.settings().api_key.as_str()
        } else {
            self.settings.masked_api_key()
        }
    }

    /// Formatted transcript as HTML markup, or the placeholder prompt when a
    /// raw transcript is waiting to be formatted
    pub fn formatted_html(&self) -> Option<String> {
        if self.session.has_formatted() {
            Some(render::render_html(self.session.formatted_transcript()))
        } else if self.session.has_raw() {
            Some(FORMAT_PLACEHOLDER.to_string())
        } else {
            None
        }
    }

    pub fn formatted_blocks(&self) -> Vec<Block> {
        render::blocks(self.session.formatted_transcript())
    }
}

#[derive(Debug, Clone, Copy)]
enum CopyTarget {
    Raw,
    Formatted,
}
