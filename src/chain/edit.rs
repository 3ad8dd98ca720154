//! Edit and navigation operations. Each one ends with a layout pass.

use std::mem;

use super::{DocumentChain, ItemPosition, Selection};
use crate::font::FontDescriptor;
use crate::item::{DocumentItem, TextRun, char_to_byte};

impl DocumentChain {
    /// Type one char at the cursor. `'\n'` inserts a hard break and `'\r'`
    /// is ignored.
    pub fn insert_char(&mut self, c: char) {
        self.insert_char_raw(c);
        self.run_pipeline();
    }

    /// Type a string at the cursor with a single layout pass.
    pub fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char_raw(c);
        }
        self.run_pipeline();
    }

    /// Insert a hard break before the cursor.
    pub fn insert_hard_break(&mut self) {
        self.insert_char('\n');
    }

    fn insert_char_raw(&mut self, c: char) {
        self.begin_edit();
        let cursor = self.cursor_index();
        match c {
            '\r' => {}
            '\n' => self.items.insert(cursor, DocumentItem::HardBreak),
            _ => {
                if cursor > 0 {
                    if let DocumentItem::TextRun(run) = &mut self.items[cursor - 1] {
                        if run.font == self.current_font {
                            run.text.push(c);
                            return;
                        }
                    }
                }
                let run = TextRun::new(c.to_string(), self.current_font.clone());
                self.items.insert(cursor, DocumentItem::TextRun(run));
            }
        }
    }

    /// Delete the char or hard break before the cursor. No-op at the start
    /// of the document.
    pub fn backspace(&mut self) {
        self.begin_edit();
        let cursor = self.cursor_index();
        let target = (0..cursor)
            .rev()
            .find(|&i| !matches!(self.items[i], DocumentItem::SoftBreak));
        if let Some(index) = target {
            self.remove_char_at(index, false);
        }
        self.run_pipeline();
    }

    /// Delete the char or hard break after the cursor. No-op at the end of
    /// the document.
    pub fn delete_forward(&mut self) {
        self.begin_edit();
        let cursor = self.cursor_index();
        let target = (cursor + 1..self.items.len())
            .find(|&i| !matches!(self.items[i], DocumentItem::SoftBreak));
        if let Some(index) = target {
            self.remove_char_at(index, true);
        }
        self.run_pipeline();
    }

    /// Remove the first (`front`) or last char of a run, or a hard break.
    /// Emptied runs are left for the pipeline to drop.
    fn remove_char_at(&mut self, index: usize, front: bool) {
        match &mut self.items[index] {
            DocumentItem::TextRun(run) => {
                if front {
                    if !run.text.is_empty() {
                        run.text.remove(0);
                    }
                } else {
                    run.text.pop();
                }
            }
            DocumentItem::HardBreak => {
                self.items.remove(index);
            }
            DocumentItem::Cursor | DocumentItem::SoftBreak => {}
        }
    }

    /// Remove the flattened range `start..end` (either order, clamped) and
    /// put the cursor at its start.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        let len = self.len_chars();
        let (start, end) = (start.min(end).min(len), start.max(end).min(len));
        self.begin_edit();
        if start == end {
            self.run_pipeline();
            return;
        }

        let mut acc = 0;
        let mut kept = Vec::with_capacity(self.items.len());
        for item in mem::take(&mut self.items) {
            match item {
                DocumentItem::TextRun(mut run) => {
                    let run_len = run.char_len();
                    let (a, b) = (acc, acc + run_len);
                    acc = b;
                    if b > start && a < end {
                        let from = char_to_byte(&run.text, start.saturating_sub(a));
                        let to = char_to_byte(&run.text, (end - a).min(run_len));
                        run.text.replace_range(from..to, "");
                    }
                    kept.push(DocumentItem::TextRun(run));
                }
                DocumentItem::HardBreak => {
                    let at = acc;
                    acc += 1;
                    if at < start || at >= end {
                        kept.push(DocumentItem::HardBreak);
                    }
                }
                other => kept.push(other),
            }
        }
        self.items = kept;
        self.place_cursor_flat(start);
        self.run_pipeline();
    }

    /// Delete the selected text, if any. Returns whether anything changed.
    pub fn delete_selection(&mut self) -> bool {
        match self.selection {
            Some(sel) => {
                self.delete_range(sel.start, sel.end);
                true
            }
            None => false,
        }
    }

    /// Move one char left, or collapse an active selection to its start.
    pub fn move_left(&mut self) {
        self.target_x = None;
        if let Some(sel) = self.selection.take() {
            self.place_cursor_flat(sel.start);
        } else {
            let pos = self.cursor_position();
            if pos > 0 {
                self.place_cursor_flat(pos - 1);
            }
        }
        self.run_pipeline();
    }

    /// Move one char right, or collapse an active selection to its end.
    pub fn move_right(&mut self) {
        self.target_x = None;
        if let Some(sel) = self.selection.take() {
            self.place_cursor_flat(sel.end);
        } else {
            let pos = self.cursor_position();
            if pos < self.len_chars() {
                self.place_cursor_flat(pos + 1);
            }
        }
        self.run_pipeline();
    }

    /// Move to the line above, keeping the sticky column.
    pub fn move_up(&mut self) {
        self.move_vertical(true);
    }

    /// Move to the line below, keeping the sticky column.
    pub fn move_down(&mut self) {
        self.move_vertical(false);
    }

    fn move_vertical(&mut self, up: bool) {
        self.selection = None;
        let cursor = self.cursor_index();
        let current_x = self.layout.get(cursor).map_or(0.0, |l| l.pos_x);
        let x = *self.target_x.get_or_insert(current_x);
        let Some(line) = self.line_index_of(cursor) else {
            self.run_pipeline();
            return;
        };

        let target = if up {
            line.checked_sub(1)
        } else {
            Some(line + 1).filter(|&next| next < self.lines.len())
        };
        match target {
            Some(target) => {
                let pos = self.hit_test(x, self.lines[target].baseline);
                self.place_cursor(pos);
            }
            None if up => self.place_cursor_flat(0),
            None => {
                let end = self.len_chars();
                self.place_cursor_flat(end);
            }
        }
        self.run_pipeline();
    }

    /// Move to the start of the cursor's visual line.
    pub fn move_to_line_start(&mut self) {
        self.selection = None;
        self.target_x = None;
        let cursor = self.cursor_index();
        if let Some(line) = self.line_index_of(cursor) {
            let start = self.lines[line].start;
            self.place_cursor(ItemPosition::before(start));
        }
        self.run_pipeline();
    }

    /// Move to the end of the cursor's visual line, before any break.
    pub fn move_to_line_end(&mut self) {
        self.selection = None;
        self.target_x = None;
        let cursor = self.cursor_index();
        if let Some(line) = self.line_index_of(cursor) {
            let pos = self.line_end_position(line);
            self.place_cursor(pos);
        }
        self.run_pipeline();
    }

    /// Place the cursor at the point resolved by hit testing.
    pub fn click_at(&mut self, x: f32, y: f32) {
        self.selection = None;
        self.target_x = None;
        let pos = self.hit_test(x, y);
        self.place_cursor(pos);
        self.run_pipeline();
    }

    /// Update the font of every run inside the flattened range. Runs that
    /// straddle a boundary are split first so text outside keeps its font.
    pub fn apply_font_to_range<F>(&mut self, start: usize, end: usize, mut update: F)
    where
        F: FnMut(&mut FontDescriptor),
    {
        let Some(range) = Selection::new(start, end) else {
            return;
        };
        self.split_at_flat(range.start);
        self.split_at_flat(range.end);
        let mut acc = 0;
        for item in &mut self.items {
            let len = item.flat_len();
            if let DocumentItem::TextRun(run) = item {
                if acc >= range.start && acc + len <= range.end {
                    update(&mut run.font);
                }
            }
            acc += len;
        }
        self.run_pipeline();
    }

    /// Runs that overlap the flattened range.
    #[must_use]
    pub fn runs_in_range(&self, start: usize, end: usize) -> Vec<&TextRun> {
        let (start, end) = (start.min(end), start.max(end));
        let mut acc = 0;
        let mut runs = Vec::new();
        for item in &self.items {
            let len = item.flat_len();
            if let DocumentItem::TextRun(run) = item {
                if acc < end && acc + len > start {
                    runs.push(run);
                }
            }
            acc += len;
        }
        runs
    }

    /// Font of the text just before the cursor in the same paragraph, or
    /// the current font when there is none.
    #[must_use]
    pub fn font_at_cursor(&self) -> &FontDescriptor {
        let cursor = self.find_cursor().unwrap_or(self.items.len());
        self.items[..cursor]
            .iter()
            .rev()
            .take_while(|item| !matches!(item, DocumentItem::HardBreak))
            .find_map(DocumentItem::as_run)
            .map_or(&self.current_font, |run| &run.font)
    }

    /// Paragraph index (hard breaks before it) of a flattened position.
    #[must_use]
    pub fn paragraph_at(&self, pos: usize) -> usize {
        let mut acc = 0;
        let mut paragraph = 0;
        for item in &self.items {
            if acc >= pos {
                break;
            }
            if matches!(item, DocumentItem::HardBreak) {
                paragraph += 1;
            }
            acc += item.flat_len();
        }
        paragraph
    }

    /// Shared prologue of edits: stored positions go stale.
    fn begin_edit(&mut self) {
        self.selection = None;
        self.target_x = None;
        self.caret_after_wrap = false;
    }

    fn line_index_of(&self, index: usize) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| index >= line.start && index < line.end)
    }
}
