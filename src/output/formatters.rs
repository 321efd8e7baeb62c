use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::render::{self, Block};

/// What a finished run hands to the output layer
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptOutput<'a> {
    pub raw_transcript: &'a str,
    pub formatted_transcript: Option<&'a str>,
    pub model: Option<&'a str>,
}

/// Terminal rendering: typed blocks when formatted, the raw text otherwise
pub fn format_as_text(output: &TranscriptOutput<'_>) -> String {
    let Some(formatted) = output.formatted_transcript else {
        return output.raw_transcript.to_string();
    };

    render::blocks(formatted)
        .iter()
        .map(|block| match block {
            Block::Heading(text) => style(text).bold().underlined().to_string(),
            Block::List(items) => items
                .iter()
                .map(|item| format!("  • {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Paragraph(text) => text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_as_markdown(output: &TranscriptOutput<'_>) -> String {
    output
        .formatted_transcript
        .unwrap_or(output.raw_transcript)
        .to_string()
}

pub fn format_as_html(output: &TranscriptOutput<'_>) -> String {
    match output.formatted_transcript {
        Some(formatted) => render::render_html(formatted),
        None => output.raw_transcript.to_string(),
    }
}

pub fn format_as_json(output: &TranscriptOutput<'_>) -> Result<String> {
    #[derive(Serialize)]
    struct JsonOutput<'a> {
        #[serde(flatten)]
        output: &'a TranscriptOutput<'a>,
        blocks: Vec<Block>,
    }

    let blocks = output
        .formatted_transcript
        .map(render::blocks)
        .unwrap_or_default();

    Ok(serde_json::to_string_pretty(&JsonOutput { output, blocks })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted() -> TranscriptOutput<'static> {
        TranscriptOutput {
            raw_transcript: "hello world",
            formatted_transcript: Some("## Intro\n\nSome text\n* a\n* b"),
            model: Some("anthropic/claude-3.5-sonnet"),
        }
    }

    #[test]
    fn test_text_without_formatting_is_raw() {
        let output = TranscriptOutput {
            raw_transcript: "hello world",
            formatted_transcript: None,
            model: None,
        };
        assert_eq!(format_as_text(&output), "hello world");
        assert_eq!(format_as_markdown(&output), "hello world");
    }

    #[test]
    fn test_text_renders_blocks() {
        console::set_colors_enabled(false);
        assert_eq!(format_as_text(&formatted()), "Intro\n\nSome text\n\n  • a\n  • b");
    }

    #[test]
    fn test_json_includes_blocks() {
        let json: serde_json::Value = serde_json::from_str(&format_as_json(&formatted()).unwrap()).unwrap();
        assert_eq!(json["raw_transcript"], "hello world");
        assert_eq!(json["blocks"][0]["type"], "heading");
        assert_eq!(json["blocks"][2]["content"][1], "b");
    }
}
