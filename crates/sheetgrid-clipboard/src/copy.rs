//! Copy encoding and the host clipboard seam

use sheetgrid_core::Cell;

/// Data placed on the system clipboard by a copy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClipboardPayload {
    /// `text/plain` flavour
    pub text: String,
    /// `text/html` flavour, identical content
    pub html: String,
}

impl ClipboardPayload {
    /// Payload carrying the same text in both flavours
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            html: text.clone(),
            text,
        }
    }

    /// Payload for a single copied cell: its display value, else its raw value
    pub fn from_cell(cell: &Cell) -> Self {
        Self::new(cell.copy_text())
    }
}

/// System clipboard as seen by the editor
pub trait Clipboard {
    /// Write a copy payload
    fn write(&mut self, payload: ClipboardPayload);

    /// Read plain text for a paste, `None` when the clipboard is empty
    fn read_text(&self) -> Option<String>;
}

/// In-process clipboard for hosts without a system clipboard, and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    payload: Option<ClipboardPayload>,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard pre-filled with plain text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            payload: Some(ClipboardPayload::new(text)),
        }
    }

    /// Last written payload
    pub fn payload(&self) -> Option<&ClipboardPayload> {
        self.payload.as_ref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&mut self, payload: ClipboardPayload) {
        self.payload = Some(payload);
    }

    fn read_text(&self) -> Option<String> {
        self.payload.as_ref().map(|p| p.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetgrid_core::{CellValue, FormulaOutcome};

    #[test]
    fn test_copy_uses_display_value() {
        let cell = Cell::new(CellValue::Formula {
            formula: "=1+1".into(),
            outcome: FormulaOutcome::Number("2".into()),
        });
        let payload = ClipboardPayload::from_cell(&cell);
        assert_eq!(payload.text, "2");
        assert_eq!(payload.html, payload.text);
    }

    #[test]
    fn test_copy_empty_cell() {
        assert_eq!(ClipboardPayload::from_cell(&Cell::EMPTY), ClipboardPayload::new(""));
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read_text(), None);
        clipboard.write(ClipboardPayload::new("x"));
        assert_eq!(clipboard.read_text().as_deref(), Some("x"));
    }
}
