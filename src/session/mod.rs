//! Current raw and formatted transcript plus the two request state machines.
//!
//! Fetch and format each move `Idle -> Loading -> Success | Failed` and settle
//! back to `Idle` when their request finishes. A second submit of the same
//! action while it is `Loading` is refused. Fetch and format may overlap.

use crate::{ClientError, Result};

pub const FORMAT_PLACEHOLDER: &str = "Click \"Format with AI\" to process this transcript...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Request lifecycle of one action type
#[derive(Debug, Clone, Copy)]
pub struct ActionMachine {
    state: ActionState,
}

impl Default for ActionMachine {
    fn default() -> Self {
        Self {
            state: ActionState::Idle,
        }
    }
}

impl ActionMachine {
    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ActionState::Loading
    }

    fn begin(&mut self, busy_message: &str) -> Result<()> {
        if self.is_loading() {
            return Err(ClientError::Validation(busy_message.to_string()));
        }
        self.state = ActionState::Loading;
        Ok(())
    }

    fn finish(&mut self, succeeded: bool) {
        self.state = if succeeded {
            ActionState::Success
        } else {
            ActionState::Failed
        };
    }

    fn settle(&mut self) {
        self.state = ActionState::Idle;
    }
}

/// Handle for an in-flight format request, tied to the raw transcript it was
/// started for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTicket {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct TranscriptSession {
    raw_transcript: String,
    formatted_transcript: String,
    generation: u64,
    fetch: ActionMachine,
    format: ActionMachine,
}

impl TranscriptSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_transcript(&self) -> &str {
        &self.raw_transcript
    }

    pub fn formatted_transcript(&self) -> &str {
        &self.formatted_transcript
    }

    pub fn fetch_state(&self) -> ActionState {
        self.fetch.state()
    }

    pub fn format_state(&self) -> ActionState {
        self.format.state()
    }

    pub fn has_raw(&self) -> bool {
        !self.raw_transcript.is_empty()
    }

    pub fn has_formatted(&self) -> bool {
        !self.formatted_transcript.is_empty()
    }

    /// Whether the fetch trigger is enabled
    pub fn can_fetch(&self) -> bool {
        !self.fetch.is_loading()
    }

    /// Whether the format trigger is enabled
    pub fn can_format(&self) -> bool {
        self.has_raw() && !self.format.is_loading()
    }

    pub fn begin_fetch(&mut self) -> Result<()> {
        self.fetch.begin("A transcript request is already in progress")
    }

    /// Apply the outcome of a fetch. Success replaces the raw transcript and
    /// invalidates any formatted one; failure clears the raw transcript.
    pub fn complete_fetch(&mut self, outcome: &Result<String>) {
        match outcome {
            Ok(transcript) => {
                self.raw_transcript = transcript.clone();
                self.formatted_transcript.clear();
                self.generation += 1;
                self.format.settle();
                self.fetch.finish(true);
            }
            Err(_) => {
                self.raw_transcript.clear();
                self.generation += 1;
                self.fetch.finish(false);
            }
        }
    }

    /// Return the fetch trigger to `Idle`
    pub fn settle_fetch(&mut self) {
        self.fetch.settle();
    }

    pub fn begin_format(&mut self) -> Result<FormatTicket> {
        if !self.has_raw() {
            return Err(ClientError::Validation(
                "No transcript available to format".to_string(),
            ));
        }
        self.format.begin("A format request is already in progress")?;
        Ok(FormatTicket {
            generation: self.generation,
        })
    }

    /// Apply the outcome of a format request. Returns whether it was applied;
    /// results for a raw transcript that has since been replaced are dropped.
    pub fn complete_format(&mut self, ticket: FormatTicket, outcome: &Result<String>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("Discarding format result for a replaced transcript");
            return false;
        }

        match outcome {
            Ok(formatted) => {
                self.formatted_transcript = formatted.clone();
                self.format.finish(true);
            }
            Err(_) => self.format.finish(false),
        }
        true
    }

    /// Return the format trigger to `Idle`
    pub fn settle_format(&mut self) {
        self.format.settle();
    }
}
