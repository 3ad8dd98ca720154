//! `runchain` - rich-text document chain and layout engine
//!
//! A document is one ordered sequence of styled text runs, a single cursor,
//! and hard and soft line breaks. After every edit a normalize/layout
//! pipeline merges and chunks runs, wraps lines at a configurable width and
//! computes per-item geometry, which painting and hit testing read back.
//! Text measurement, drawing and the clipboard are host collaborators behind
//! traits.
//!
//! # Examples
//!
//! ```
//! use runchain::{DisplayList, EditorController, EditorOptions, MonospaceMeasurer, PaintOptions, paint};
//!
//! let mut editor = EditorController::new(MonospaceMeasurer::new(8.0), EditorOptions::default())?;
//! editor.insert_text("Hello");
//! editor.select_all();
//! editor.toggle_bold();
//!
//! let mut list = DisplayList::new();
//! paint(editor.chain(), &mut list, &PaintOptions::default());
//! assert_eq!(list.texts(), ["Hello"]);
//! # Ok::<(), runchain::Error>(())
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_precision_loss)] // Cell counts to pixel widths
#![allow(clippy::module_name_repetitions)] // Allow chain::DocumentChain etc
#![allow(clippy::missing_errors_doc)] // Error variants are self-describing
#![allow(clippy::missing_panics_doc)] // Indexing is bounds-checked by construction
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::float_cmp)] // Layout tests compare exact monospace positions
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod chain;
pub mod clipboard;
pub mod color;
pub mod controller;
pub mod error;
pub mod event;
pub mod font;
pub mod history;
pub mod input;
pub mod item;
pub mod measure;
pub mod render;

// Re-export core types at crate root
pub use chain::{Alignment, ChainOptions, DocumentChain, ItemPosition, Selection};
pub use color::Rgba;
pub use error::{Error, Result};
pub use event::{
    LogLevel, clear_event_callback, clear_log_callback, emit_event, emit_log, set_event_callback,
    set_log_callback, set_log_level,
};
pub use font::{BaselineShift, FontDescriptor, FontStyle, FontWeight, TextDecoration};
pub use item::{DocumentItem, ItemLayout, LineLayout, TextRun};
pub use measure::{MonospaceMeasurer, TextMeasurer, TextMetrics};

// Re-export editing types
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use controller::{EditorController, EditorOptions};
pub use history::{History, Snapshot};
pub use input::{EditorEvent, NamedKey, Point};

// Re-export painting
pub use render::{DisplayList, DrawCommand, DrawSurface, PaintOptions, PaintStats, Rect, paint};
