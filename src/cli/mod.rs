use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::settings::EXPORT_FILE_NAME;

#[derive(Parser)]
#[command(
    name = "verbatim",
    about = "Verbatim AI client - fetch YouTube transcripts and format them with AI models",
    version,
    long_about = "A command-line client for a Verbatim AI backend. Fetches the raw transcript of a YouTube video, optionally reformats it with a selectable AI model, and manages the locally stored API key and custom model list."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "VERBATIM_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a YouTube video, optionally formatting it with AI
    Fetch {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Format the transcript with an AI model after fetching it
        #[arg(short = 'a', long)]
        ai: bool,

        /// Model id to format with (defaults to the catalog's default model)
        #[arg(short, long, value_name = "MODEL", requires = "ai")]
        model: Option<String>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Copy the result to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// List the selectable models
    Models,

    /// Manage the stored API key and custom models
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show the client configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current settings
    Show {
        /// Show the API key instead of the masked placeholder
        #[arg(long)]
        reveal: bool,
    },

    /// Store an OpenRouter API key
    SetKey {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Remove the stored API key
    ClearKey,

    /// Register a custom model
    AddModel {
        /// Model identifier, e.g. openai/gpt-4o
        #[arg(value_name = "ID")]
        id: String,

        /// Display name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Remove a custom model
    RemoveModel {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Clear the API key and all custom models
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the settings to a JSON file
    Export {
        #[arg(value_name = "FILE", default_value = EXPORT_FILE_NAME)]
        path: PathBuf,
    },

    /// Merge settings from a JSON file
    Import {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text for the terminal
    Text,
    /// Markdown as returned by the model
    Markdown,
    /// HTML markup
    Html,
    /// JSON with raw, formatted and block structure
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_with_model() {
        let cli = Cli::parse_from([
            "verbatim", "fetch", "https://youtu.be/abc", "--ai", "--model", "openai/gpt-4o-mini", "-f", "html",
        ]);
        match cli.command {
            Commands::Fetch { url, ai, model, format, .. } => {
                assert_eq!(url, "https://youtu.be/abc");
                assert!(ai);
                assert_eq!(model.as_deref(), Some("openai/gpt-4o-mini"));
                assert_eq!(format, Some(OutputFormat::Html));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_model_requires_ai() {
        assert!(Cli::try_parse_from(["verbatim", "fetch", "u", "--model", "m"]).is_err());
    }

    #[test]
    fn test_export_default_path() {
        let cli = Cli::parse_from(["verbatim", "settings", "export"]);
        match cli.command {
            Commands::Settings { action: SettingsAction::Export { path } } => {
                assert_eq!(path, PathBuf::from(EXPORT_FILE_NAME));
            }
            _ => panic!("expected settings export"),
        }
    }
}
