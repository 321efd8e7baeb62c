use arboard::Clipboard;

#[derive(thiserror::Error, Debug)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(String);

impl From<arboard::Error> for ClipboardError {
    fn from(e: arboard::Error) -> Self {
        ClipboardError(e.to_string())
    }
}

/// Destination for copy actions
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard, opened lazily on first copy
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            self.inner = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text.to_string())?;
        }
        Ok(())
    }
}
