use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use verbatim_client::app::Outcome;
use verbatim_client::cli::SettingsAction;
use verbatim_client::output::{self, TranscriptOutput};
use verbatim_client::{App, AppConfig, Cli, Command, Commands, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let mut config = AppConfig::load().await?;
    if let Some(base_url) = &cli.base_url {
        config.backend.base_url = base_url.clone();
        config.validate()?;
    }

    match cli.command {
        Commands::Fetch {
            url,
            ai,
            model,
            output,
            format,
            copy,
        } => {
            let mut app = App::from_config(&config)?;
            let format = match format {
                Some(format) => format,
                None => default_format(&config)?,
            };

            tracing::info!("Fetching transcript for URL: {}", url);
            let pb = spinner(cli.quiet, "Fetching transcript...");
            let outcome = app.dispatch(Command::FetchTranscript { url }).await;
            pb.finish_and_clear();
            ensure_done(&app, outcome)?;

            if ai {
                app.refresh_catalog().await;
                if let Some(id) = model {
                    let outcome = app.dispatch(Command::SelectModel { id }).await;
                    ensure_done(&app, outcome)?;
                }

                tracing::info!("Formatting with {}", app.selected_model());
                let pb = spinner(cli.quiet, "Formatting with AI...");
                let outcome = app.dispatch(Command::FormatTranscript).await;
                pb.finish_and_clear();
                ensure_done(&app, outcome)?;
            }

            let session = app.session();
            let result = TranscriptOutput {
                raw_transcript: session.raw_transcript(),
                formatted_transcript: Some(session.formatted_transcript()).filter(|_| session.has_formatted()),
                model: Some(app.selected_model()).filter(|_| session.has_formatted()),
            };

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, &format).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => output::print_to_console(&result, &format)?,
            }

            if copy {
                let command = if app.session().has_formatted() {
                    Command::CopyFormatted
                } else {
                    Command::CopyRaw
                };
                let outcome = app.dispatch(command).await;
                ensure_done(&app, outcome)?;
                print_toast(&app);
            }
        }
        Commands::Models => {
            let mut app = App::from_config(&config)?;
            app.refresh_catalog().await;

            println!("Available models:");
            for entry in app.catalog() {
                if entry.is_separator() {
                    println!("  {}", style(&entry.name).dim());
                } else if entry.selected {
                    println!("  {} {} ({})", style("*").green(), style(&entry.name).bold(), entry.id);
                } else {
                    println!("    {} ({})", entry.name, entry.id);
                }
            }
        }
        Commands::Settings { action } => {
            let mut app = App::from_config(&config)?;
            run_settings(&mut app, action).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.save().await?;
                println!("Configuration saved to: {}", AppConfig::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "verbatim_client=debug" } else { "verbatim_client=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn default_format(config: &AppConfig) -> Result<OutputFormat> {
    <OutputFormat as ValueEnum>::from_str(&config.defaults.output_format, true)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Invalid default output format: {}", config.defaults.output_format))
}

fn spinner(quiet: bool, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Turn a failed dispatch into a process error carrying the banner text
fn ensure_done(app: &App, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Failed(kind) => {
            let message = app
                .notifications()
                .error()
                .map(|n| n.message)
                .unwrap_or_else(|| format!("{:?} error", kind));
            anyhow::bail!(message)
        }
        Outcome::Done | Outcome::Skipped => Ok(()),
    }
}

fn print_toast(app: &App) {
    if let Some(toast) = app.notifications().toast() {
        eprintln!("{} {}", style("✓").green(), toast.message);
    }
}

async fn run_settings(app: &mut App, action: SettingsAction) -> Result<()> {
    let command = match action {
        SettingsAction::Show { reveal } => {
            if reveal {
                app.dispatch(Command::ToggleApiKeyVisibility).await;
            }
            print_settings(app);
            return Ok(());
        }
        SettingsAction::SetKey { key } => Command::SaveApiKey { key },
        SettingsAction::ClearKey => Command::ClearApiKey,
        SettingsAction::AddModel { id, name } => Command::AddCustomModel { id, name },
        SettingsAction::RemoveModel { id } => Command::RemoveCustomModel { id },
        SettingsAction::Reset { yes } => Command::ResetSettings {
            confirmed: yes || confirm_reset()?,
        },
        SettingsAction::Export { path } => Command::ExportSettings { path },
        SettingsAction::Import { path } => Command::ImportSettings { path },
    };

    let export_path = match &command {
        Command::ExportSettings { path } => Some(path.clone()),
        _ => None,
    };

    match app.dispatch(command).await {
        Outcome::Skipped => println!("Nothing changed."),
        outcome => {
            ensure_done(app, outcome)?;
            print_toast(app);
            if let Some(path) = export_path {
                println!("Exported to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_settings(app: &App) {
    let settings = app.settings().settings();
    let key = app.api_key_display();

    println!("Settings:");
    println!("  API Key: {}", if key.is_empty() { "(not set)" } else { key });
    if settings.custom_models.is_empty() {
        println!("  Custom Models: none");
    } else {
        println!("  Custom Models:");
        for model in &settings.custom_models {
            println!("    • {} ({})", model.name, model.id);
        }
    }
}

fn confirm_reset() -> Result<bool> {
    let term = Term::stderr();
    term.write_line("Are you sure you want to reset all settings? This will clear your API key and custom models. [y/N]")?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
