use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(#[source] arboard::Error),
    #[error("clipboard {op} failed: {source}")]
    Access {
        op: &'static str,
        source: arboard::Error,
    },
}

/// System clipboard access. Each call opens a fresh handle, so the type is stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct Clipboard;

impl Clipboard {
    pub fn copy(text: &str) -> Result<(), ClipboardError> {
        let mut cb = arboard::Clipboard::new().map_err(ClipboardError::Unavailable)?;
        cb.set_text(text.to_owned())
            .map_err(|source| ClipboardError::Access { op: "copy", source })?;
        tracing::debug!(stage = "clipboard.copy", chars = text.chars().count());
        Ok(())
    }

    pub fn paste() -> Result<String, ClipboardError> {
        let mut cb = arboard::Clipboard::new().map_err(ClipboardError::Unavailable)?;
        cb.get_text()
            .map_err(|source| ClipboardError::Access { op: "paste", source })
    }
}
