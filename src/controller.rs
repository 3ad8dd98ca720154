//! Command layer over a [`DocumentChain`].
//!
//! [`EditorController`] is what a host UI talks to: it turns input events
//! and toolbar commands into chain operations, snapshots the document
//! before destructive edits for undo/redo, moves text through a
//! [`Clipboard`] and keeps the caret blink state.
//!
//! # Examples
//!
//! ```
//! use runchain::{EditorController, EditorEvent, EditorOptions, MonospaceMeasurer, NamedKey};
//!
//! let mut editor = EditorController::new(MonospaceMeasurer::new(8.0), EditorOptions::default())?;
//! for c in "Hi".chars() {
//!     editor.handle_event(EditorEvent::Char(c));
//! }
//! editor.handle_event(EditorEvent::Key(NamedKey::Enter));
//! for c in "Bye".chars() {
//!     editor.handle_event(EditorEvent::Char(c));
//! }
//! assert_eq!(editor.text(), "Hi\nBye");
//!
//! editor.undo();
//! editor.undo();
//! assert_eq!(editor.text(), "Hi");
//! # Ok::<(), runchain::Error>(())
//! ```

use crate::chain::{Alignment, ChainOptions, DocumentChain, Selection, validate_font_size};
use crate::clipboard::Clipboard;
use crate::color::Rgba;
use crate::error::Result;
use crate::event::{LogLevel, emit_log_with};
use crate::font::{BaselineShift, FontDescriptor, FontStyle, FontWeight, TextDecoration};
use crate::history::{DEFAULT_HISTORY_CAPACITY, History};
use crate::input::{EditorEvent, NamedKey, Point};
use crate::measure::TextMeasurer;

/// Editor configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorOptions {
    pub chain: ChainOptions,
    /// Maximum number of undo steps.
    pub history_capacity: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            chain: ChainOptions::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Formatting, history, clipboard and input handling for one document.
#[derive(Debug)]
pub struct EditorController {
    chain: DocumentChain,
    history: History,
    /// Font restored by `clear_formatting`.
    default_font: FontDescriptor,
    /// An undo group for consecutive typed chars is open.
    typing: bool,
    /// Flattened anchor of an active pointer drag.
    drag_anchor: Option<usize>,
    cursor_visible: bool,
}

impl EditorController {
    pub fn new(measurer: impl TextMeasurer + 'static, options: EditorOptions) -> Result<Self> {
        let default_font = options.chain.font.clone();
        Ok(Self {
            chain: DocumentChain::new(measurer, options.chain)?,
            history: History::with_capacity(options.history_capacity),
            default_font,
            typing: false,
            drag_anchor: None,
            cursor_visible: true,
        })
    }

    /// The document, read-only. Paint and hit test against this.
    #[must_use]
    pub const fn chain(&self) -> &DocumentChain {
        &self.chain
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.chain.text()
    }

    /// Replace the whole document with plain text (undoable).
    pub fn set_text(&mut self, text: &str) {
        self.command();
        self.record();
        self.chain.set_text(text);
    }

    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.chain.selection()
    }

    #[must_use]
    pub fn selected_text(&self) -> String {
        self.chain.selected_text()
    }

    // Text entry

    /// Type a char. Consecutive chars share one undo step; `'\n'` acts as
    /// Enter. A selection is replaced.
    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.insert_hard_break();
            return;
        }
        self.cursor_visible = true;
        let replacing = self.chain.selection().is_some();
        if !self.typing || replacing {
            self.record();
        }
        if replacing {
            self.chain.delete_selection();
        }
        self.chain.insert_char(c);
        self.typing = true;
    }

    /// Insert a string as one undo step, replacing any selection.
    pub fn insert_text(&mut self, text: &str) {
        self.command();
        if text.is_empty() {
            return;
        }
        self.record();
        self.chain.delete_selection();
        self.chain.insert_text(text);
    }

    pub fn insert_hard_break(&mut self) {
        self.command();
        self.record();
        self.chain.delete_selection();
        self.chain.insert_hard_break();
    }

    /// Delete the selection, or the char before the cursor.
    pub fn backspace(&mut self) {
        self.command();
        if self.chain.selection().is_some() {
            self.record();
            self.chain.delete_selection();
        } else if self.chain.cursor_position() > 0 {
            self.record();
            self.chain.backspace();
        }
    }

    /// Delete the selection, or the char after the cursor.
    pub fn delete_forward(&mut self) {
        self.command();
        if self.chain.selection().is_some() {
            self.record();
            self.chain.delete_selection();
        } else if self.chain.cursor_position() < self.chain.len_chars() {
            self.record();
            self.chain.delete_forward();
        }
    }

    // Navigation and selection

    pub fn move_left(&mut self) {
        self.command();
        self.chain.move_left();
    }

    pub fn move_right(&mut self) {
        self.command();
        self.chain.move_right();
    }

    pub fn move_up(&mut self) {
        self.command();
        self.chain.move_up();
    }

    pub fn move_down(&mut self) {
        self.command();
        self.chain.move_down();
    }

    pub fn move_to_line_start(&mut self) {
        self.command();
        self.chain.move_to_line_start();
    }

    pub fn move_to_line_end(&mut self) {
        self.command();
        self.chain.move_to_line_end();
    }

    pub fn click_at(&mut self, x: f32, y: f32) {
        self.command();
        self.chain.click_at(x, y);
    }

    pub fn set_selection_range(&mut self, a: usize, b: usize) {
        self.command();
        self.chain.set_selection_range(a, b);
    }

    pub fn clear_selection(&mut self) {
        self.command();
        self.chain.clear_selection();
    }

    pub fn select_all(&mut self) {
        self.command();
        self.chain.select_all();
    }

    pub fn select_word_at(&mut self, x: f32, y: f32) {
        self.command();
        self.chain.select_word_at(x, y);
    }

    pub fn select_line_at(&mut self, x: f32, y: f32) {
        self.command();
        self.chain.select_line_at(x, y);
    }

    // Formatting

    /// Font that typed text will get.
    #[must_use]
    pub const fn current_font(&self) -> &FontDescriptor {
        self.chain.current_font()
    }

    pub fn toggle_bold(&mut self) {
        self.toggle(FontDescriptor::is_bold, |font, on| {
            font.weight = if on { FontWeight::Bold } else { FontWeight::Normal };
        });
    }

    pub fn toggle_italic(&mut self) {
        self.toggle(FontDescriptor::is_italic, |font, on| {
            font.style = if on { FontStyle::Italic } else { FontStyle::Normal };
        });
    }

    pub fn toggle_underline(&mut self) {
        self.toggle(FontDescriptor::is_underline, |font, on| {
            font.decorations.set(TextDecoration::UNDERLINE, on);
        });
    }

    pub fn toggle_strikethrough(&mut self) {
        self.toggle(FontDescriptor::is_strikethrough, |font, on| {
            font.decorations.set(TextDecoration::STRIKETHROUGH, on);
        });
    }

    /// Turning superscript on turns subscript off.
    pub fn toggle_superscript(&mut self) {
        self.toggle(FontDescriptor::is_superscript, |font, on| {
            font.baseline = if on {
                BaselineShift::Superscript
            } else {
                BaselineShift::Normal
            };
        });
    }

    /// Turning subscript on turns superscript off.
    pub fn toggle_subscript(&mut self) {
        self.toggle(FontDescriptor::is_subscript, |font, on| {
            font.baseline = if on {
                BaselineShift::Subscript
            } else {
                BaselineShift::Normal
            };
        });
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.apply_format(|font| font.color = color);
    }

    /// Set the color from CSS hex notation.
    pub fn set_color_hex(&mut self, hex: &str) -> Result<()> {
        let color: Rgba = hex.parse()?;
        self.set_color(color);
        Ok(())
    }

    /// Set the nominal size in pixels. Non-positive or non-finite sizes are
    /// rejected and nothing changes.
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        let size = validate_font_size(size)?;
        self.apply_format(|font| font.size = size);
        Ok(())
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.apply_format(|font| font.family = family.to_string());
    }

    /// Reset to the editor's default font.
    pub fn clear_formatting(&mut self) {
        let default = self.default_font.clone();
        self.apply_format(|font| *font = default.clone());
    }

    /// Align the cursor's paragraph, or every paragraph the selection
    /// touches. Alignment is not part of undo history.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.command();
        let (first, last) = match self.chain.selection() {
            Some(sel) => (
                self.chain.paragraph_at(sel.start),
                self.chain.paragraph_at((sel.end - 1).max(sel.start)),
            ),
            None => {
                let paragraph = self.chain.paragraph_at(self.chain.cursor_position());
                (paragraph, paragraph)
            }
        };
        for paragraph in first..=last {
            self.chain.set_alignment(paragraph, alignment);
        }
    }

    /// Alignment of the cursor's paragraph.
    #[must_use]
    pub fn alignment(&self) -> Alignment {
        self.chain
            .alignment(self.chain.paragraph_at(self.chain.cursor_position()))
    }

    pub fn set_line_spacing(&mut self, spacing: f32) -> Result<()> {
        self.command();
        self.chain.set_line_spacing(spacing)
    }

    pub fn set_wrap_width(&mut self, width: f32) -> Result<()> {
        self.command();
        self.chain.set_wrap_width(width)
    }

    // History

    /// Restore the state before the last edit. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.command();
        let Some(snapshot) = self.history.undo(self.chain.snapshot()) else {
            return false;
        };
        self.chain.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.command();
        let Some(snapshot) = self.history.redo(self.chain.snapshot()) else {
            return false;
        };
        self.chain.restore(snapshot);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // Clipboard

    /// Write the selected text to the clipboard. No-op without a selection.
    pub fn copy(&mut self, clipboard: &mut impl Clipboard) -> Result<()> {
        self.command();
        if self.chain.selection().is_none() {
            return Ok(());
        }
        clipboard.write_text(&self.chain.selected_text())?;
        Ok(())
    }

    /// Copy, then delete the selection once the write succeeded.
    pub fn cut(&mut self, clipboard: &mut impl Clipboard) -> Result<()> {
        self.command();
        if self.chain.selection().is_none() {
            return Ok(());
        }
        clipboard.write_text(&self.chain.selected_text())?;
        self.record();
        self.chain.delete_selection();
        Ok(())
    }

    /// Insert the clipboard text at the cursor, replacing any selection.
    pub fn paste(&mut self, clipboard: &mut impl Clipboard) -> Result<()> {
        self.command();
        let text = clipboard.read_text()?;
        self.insert_text(&text);
        Ok(())
    }

    // Input

    /// Dispatch one input event. Returns whether a redraw is needed.
    pub fn handle_event(&mut self, event: EditorEvent) -> bool {
        match event {
            EditorEvent::Char(c) => self.insert_char(c),
            EditorEvent::Key(key) => self.handle_key(key),
            EditorEvent::PointerDown(Point { x, y }) => {
                self.click_at(x, y);
                self.drag_anchor = Some(self.chain.cursor_position());
            }
            EditorEvent::PointerMove(Point { x, y }) => {
                let Some(anchor) = self.drag_anchor else {
                    return false;
                };
                self.cursor_visible = true;
                self.chain.extend_selection_to(anchor, x, y);
            }
            EditorEvent::PointerUp(Point { x, y }) => {
                let Some(anchor) = self.drag_anchor.take() else {
                    return false;
                };
                self.cursor_visible = true;
                self.chain.extend_selection_to(anchor, x, y);
            }
            EditorEvent::SelectWord(Point { x, y }) => self.select_word_at(x, y),
            EditorEvent::SelectLine(Point { x, y }) => self.select_line_at(x, y),
            EditorEvent::Paste(text) => self.insert_text(&text),
        }
        true
    }

    fn handle_key(&mut self, key: NamedKey) {
        match key {
            NamedKey::Backspace => self.backspace(),
            NamedKey::Delete => self.delete_forward(),
            NamedKey::Enter => self.insert_hard_break(),
            NamedKey::Left => self.move_left(),
            NamedKey::Right => self.move_right(),
            NamedKey::Up => self.move_up(),
            NamedKey::Down => self.move_down(),
            NamedKey::Home => self.move_to_line_start(),
            NamedKey::End => self.move_to_line_end(),
        }
    }

    // Caret blink

    /// Advance the blink timer: flips caret visibility and asks for a
    /// redraw. Document state is never touched.
    pub fn tick(&mut self) -> bool {
        self.cursor_visible = !self.cursor_visible;
        true
    }

    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Every command other than typing closes the typing undo group and
    /// shows the caret.
    fn command(&mut self) {
        self.typing = false;
        self.cursor_visible = true;
    }

    fn record(&mut self) {
        self.history.record(self.chain.snapshot());
    }

    fn toggle<G, S>(&mut self, get: G, set: S)
    where
        G: Fn(&FontDescriptor) -> bool,
        S: Fn(&mut FontDescriptor, bool),
    {
        let enable = match self.chain.selection() {
            Some(sel) => {
                let runs = self.chain.runs_in_range(sel.start, sel.end);
                runs.is_empty() || !runs.iter().all(|run| get(&run.font))
            }
            None => !get(self.chain.current_font()),
        };
        self.apply_format(|font| set(font, enable));
    }

    /// Apply a font update to the selection, or to the current font when
    /// nothing is selected.
    fn apply_format<F>(&mut self, mut update: F)
    where
        F: FnMut(&mut FontDescriptor),
    {
        self.command();
        match self.chain.selection() {
            Some(sel) => {
                self.record();
                self.chain.apply_font_to_range(sel.start, sel.end, update);
            }
            None => {
                let mut font = self.chain.current_font().clone();
                update(&mut font);
                emit_log_with(LogLevel::Debug, || format!("current font: {}", font.css()));
                self.chain.replace_current_font(font);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardError, MemoryClipboard};
    use crate::error::Error;
    use crate::item::DocumentItem;
    use crate::measure::MonospaceMeasurer;

    fn editor() -> EditorController {
        EditorController::new(MonospaceMeasurer::new(8.0), EditorOptions::default()).unwrap()
    }

    fn type_str(editor: &mut EditorController, text: &str) {
        for c in text.chars() {
            editor.handle_event(EditorEvent::Char(c));
        }
    }

    #[test]
    fn test_typing_scenario_undo() {
        let mut editor = editor();
        type_str(&mut editor, "Hi");
        editor.handle_event(EditorEvent::Key(NamedKey::Enter));
        type_str(&mut editor, "Bye");
        assert_eq!(editor.text(), "Hi\nBye");

        assert!(editor.undo());
        assert_eq!(editor.text(), "Hi\n");
        assert!(editor.undo());
        assert_eq!(editor.text(), "Hi");
        assert!(editor.undo());
        assert_eq!(editor.text(), "");
        assert!(!editor.undo());

        assert!(editor.redo());
        assert!(editor.redo());
        assert!(editor.redo());
        assert_eq!(editor.text(), "Hi\nBye");
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_navigation_closes_typing_group() {
        let mut editor = editor();
        type_str(&mut editor, "ab");
        editor.move_left();
        type_str(&mut editor, "X");
        assert_eq!(editor.text(), "aXb");
        editor.undo();
        assert_eq!(editor.text(), "ab");
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut editor = editor();
        editor.set_text("hello world");
        editor.set_selection_range(0, 5);
        type_str(&mut editor, "J");
        assert_eq!(editor.text(), "J world");
        assert!(editor.selection().is_none());
        editor.undo();
        assert_eq!(editor.text(), "hello world");
        assert_eq!(editor.selection(), Selection::new(0, 5));
    }

    #[test]
    fn test_toggle_bold_on_selection() {
        let mut editor = editor();
        editor.set_text("abcdef");
        editor.set_selection_range(1, 3);
        editor.toggle_bold();
        let bold: Vec<bool> = editor
            .chain()
            .items()
            .iter()
            .filter_map(DocumentItem::as_run)
            .map(|run| run.font.is_bold())
            .collect();
        assert_eq!(bold, [false, true, false]);

        // Everything selected is bold, so the toggle clears it.
        editor.toggle_bold();
        assert!(
            editor
                .chain()
                .items()
                .iter()
                .filter_map(DocumentItem::as_run)
                .all(|run| !run.font.is_bold())
        );
        assert_eq!(editor.text(), "abcdef");
    }

    #[test]
    fn test_mixed_selection_toggle_sets_all() {
        let mut editor = editor();
        editor.set_text("abcd");
        editor.set_selection_range(0, 2);
        editor.toggle_italic();
        editor.set_selection_range(0, 4);
        editor.toggle_italic();
        let runs: Vec<_> = editor
            .chain()
            .items()
            .iter()
            .filter_map(DocumentItem::as_run)
            .collect();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].font.is_italic());
    }

    #[test]
    fn test_toggle_without_selection_changes_current_font() {
        let mut editor = editor();
        editor.toggle_bold();
        assert!(editor.current_font().is_bold());
        type_str(&mut editor, "B");
        editor.toggle_bold();
        type_str(&mut editor, "n");
        let runs: Vec<_> = editor
            .chain()
            .items()
            .iter()
            .filter_map(DocumentItem::as_run)
            .collect();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].font.is_bold());
        assert!(!runs[1].font.is_bold());
    }

    #[test]
    fn test_script_toggles_are_exclusive() {
        let mut editor = editor();
        editor.toggle_superscript();
        assert!(editor.current_font().is_superscript());
        editor.toggle_subscript();
        assert!(editor.current_font().is_subscript());
        assert!(!editor.current_font().is_superscript());
        editor.toggle_subscript();
        assert_eq!(editor.current_font().baseline, BaselineShift::Normal);
    }

    #[test]
    fn test_set_font_size_rejects_invalid() {
        let mut editor = editor();
        assert_eq!(editor.set_font_size(0.0), Err(Error::InvalidFontSize(0.0)));
        assert!(editor.set_font_size(-3.0).is_err());
        assert_eq!(editor.current_font().size, 16.0);
        editor.set_font_size(24.0).unwrap();
        assert_eq!(editor.current_font().size, 24.0);
    }

    #[test]
    fn test_color_and_family() {
        let mut editor = editor();
        editor.set_text("ab");
        editor.select_all();
        editor.set_color_hex("#ff0000").unwrap();
        editor.set_font_family("Georgia");
        let run = editor.chain().items()[0].as_run().unwrap().clone();
        assert_eq!(run.font.color, Rgba::RED);
        assert_eq!(run.font.family, "Georgia");
        assert!(editor.set_color_hex("nope").is_err());

        editor.clear_formatting();
        let run = editor.chain().items()[0].as_run().unwrap();
        assert_eq!(run.font, FontDescriptor::default());
    }

    #[test]
    fn test_formatting_is_undoable() {
        let mut editor = editor();
        editor.set_text("ab");
        editor.select_all();
        editor.toggle_underline();
        editor.undo();
        let run = editor.chain().items()[0].as_run().unwrap();
        assert!(!run.font.is_underline());
    }

    #[test]
    fn test_alignment_per_paragraph() {
        let mut editor = editor();
        editor.set_text("one\ntwo\nthree");
        editor.set_alignment(Alignment::Center);
        assert_eq!(editor.chain().alignment(2), Alignment::Center);
        assert_eq!(editor.chain().alignment(0), Alignment::Left);

        editor.set_selection_range(0, 5);
        editor.set_alignment(Alignment::Right);
        assert_eq!(editor.chain().alignment(0), Alignment::Right);
        assert_eq!(editor.chain().alignment(1), Alignment::Right);
        assert_eq!(editor.chain().alignment(2), Alignment::Center);
    }

    #[test]
    fn test_copy_cut_paste() {
        let mut editor = editor();
        let mut clipboard = MemoryClipboard::new();
        editor.set_text("hello world");
        editor.set_selection_range(0, 6);
        editor.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents(), "hello ");
        assert_eq!(editor.text(), "hello world");

        editor.cut(&mut clipboard).unwrap();
        assert_eq!(editor.text(), "world");
        editor.move_to_line_end();
        editor.paste(&mut clipboard).unwrap();
        assert_eq!(editor.text(), "worldhello ");
        editor.undo();
        assert_eq!(editor.text(), "world");
    }

    #[test]
    fn test_clipboard_failure_leaves_document() {
        let mut editor = editor();
        let mut clipboard = MemoryClipboard::with_text("x");
        clipboard.set_failure(Some(ClipboardError::Denied));
        editor.set_text("abc");
        editor.set_selection_range(0, 2);
        let before = editor.chain().snapshot();
        let undo_before = editor.can_undo();

        assert_eq!(
            editor.cut(&mut clipboard),
            Err(Error::Clipboard(ClipboardError::Denied))
        );
        assert!(editor.paste(&mut clipboard).is_err());
        assert_eq!(editor.chain().snapshot(), before);
        assert_eq!(editor.can_undo(), undo_before);
    }

    #[test]
    fn test_pointer_drag_selects() {
        let mut editor = editor();
        editor.set_text("abcdef");
        assert!(editor.handle_event(EditorEvent::PointerDown(Point::new(8.0, 10.0))));
        editor.handle_event(EditorEvent::PointerMove(Point::new(24.0, 10.0)));
        assert_eq!(editor.selected_text(), "bc");
        editor.handle_event(EditorEvent::PointerUp(Point::new(40.0, 10.0)));
        assert_eq!(editor.selected_text(), "bcde");
        // No drag in progress.
        assert!(!editor.handle_event(EditorEvent::PointerMove(Point::new(0.0, 10.0))));
        assert_eq!(editor.selected_text(), "bcde");
    }

    #[test]
    fn test_key_dispatch() {
        let mut editor = editor();
        editor.handle_event(EditorEvent::Paste("ab\ncd".to_string()));
        editor.handle_event(EditorEvent::Key(NamedKey::Home));
        editor.handle_event(EditorEvent::Key(NamedKey::Delete));
        assert_eq!(editor.text(), "ab\nd");
        editor.handle_event(EditorEvent::Key(NamedKey::Up));
        editor.handle_event(EditorEvent::Key(NamedKey::End));
        editor.handle_event(EditorEvent::Key(NamedKey::Backspace));
        assert_eq!(editor.text(), "a\nd");
        editor.handle_event(EditorEvent::Key(NamedKey::Right));
        editor.handle_event(EditorEvent::Key(NamedKey::Down));
        assert_eq!(editor.chain().cursor_position(), 3);
    }

    #[test]
    fn test_blink_only_flips_visibility() {
        let mut editor = editor();
        editor.set_text("abc");
        let before = editor.chain().snapshot();
        assert!(editor.cursor_visible());
        assert!(editor.tick());
        assert!(!editor.cursor_visible());
        assert_eq!(editor.chain().snapshot(), before);
        editor.move_left();
        assert!(editor.cursor_visible());
    }

    #[test]
    fn test_history_capacity_bounds_undo() {
        let options = EditorOptions {
            history_capacity: 2,
            ..EditorOptions::default()
        };
        let mut editor = EditorController::new(MonospaceMeasurer::new(8.0), options).unwrap();
        for text in ["a", "b", "c", "d"] {
            editor.set_text(text);
        }
        assert!(editor.undo());
        assert!(editor.undo());
        assert!(!editor.undo());
        assert_eq!(editor.text(), "b");
    }
}
