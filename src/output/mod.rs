use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;

pub mod formatters;

pub use formatters::*;

fn render(output: &TranscriptOutput<'_>, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_as_text(output),
        OutputFormat::Markdown => format_as_markdown(output),
        OutputFormat::Html => format_as_html(output),
        OutputFormat::Json => format_as_json(output)?,
    })
}

/// Save transcript output to file
pub async fn save_to_file(output: &TranscriptOutput<'_>, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(output, format)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

/// Print transcript output to console
pub fn print_to_console(output: &TranscriptOutput<'_>, format: &OutputFormat) -> Result<()> {
    println!("{}", render(output, format)?);
    Ok(())
}
