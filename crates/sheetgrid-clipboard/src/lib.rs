//! # sheetgrid-clipboard
//!
//! Clipboard interchange for sheetgrid: single-cell copy payloads, TSV/CSV
//! paste parsing, and CSV output of display grids.

mod copy;
mod error;
mod options;
mod paste;
mod writer;

pub use copy::{Clipboard, ClipboardPayload, MemoryClipboard};
pub use error::{ClipboardError, ClipboardResult};
pub use options::PasteOptions;
pub use paste::{detect_delimiter, parse_clipboard_text};
pub use writer::GridWriter;
