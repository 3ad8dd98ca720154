//! Selection state and selection gestures.

use unicode_segmentation::UnicodeSegmentation;

use super::{DocumentChain, ItemPosition, Selection};

impl DocumentChain {
    #[must_use]
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Select between two item positions, in either order.
    pub fn set_selection(
        &mut self,
        start_item: usize,
        start_offset: usize,
        end_item: usize,
        end_offset: usize,
    ) {
        let a = self.flat_position(ItemPosition::new(start_item, start_offset));
        let b = self.flat_position(ItemPosition::new(end_item, end_offset));
        self.selection = Selection::new(a, b);
    }

    /// Select a flattened range, clamped to the document length.
    pub fn set_selection_range(&mut self, a: usize, b: usize) {
        let len = self.len_chars();
        self.selection = Selection::new(a.min(len), b.min(len));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Text of the selection with `'\n'` for hard breaks; empty without one.
    #[must_use]
    pub fn selected_text(&self) -> String {
        self.selection
            .map(|sel| self.text_range(sel.start, sel.end))
            .unwrap_or_default()
    }

    /// Text of a flattened range (either order, clamped).
    #[must_use]
    pub fn text_range(&self, a: usize, b: usize) -> String {
        let (start, end) = (a.min(b), a.max(b));
        self.text().chars().skip(start).take(end - start).collect()
    }

    /// Select the whole document and put the cursor at its end.
    pub fn select_all(&mut self) {
        let len = self.len_chars();
        self.select_and_place(0, len);
    }

    /// Select the word under a point (double click). Word boundaries follow
    /// Unicode segmentation; whitespace and punctuation runs count as words.
    pub fn select_word_at(&mut self, x: f32, y: f32) {
        let pos = self.position_at_point(x, y);
        let text = self.text();
        let Some((start, end)) = word_bounds(&text, pos) else {
            self.selection = None;
            return;
        };
        self.select_and_place(start, end);
    }

    /// Select the hard-break delimited line under a point (triple click),
    /// without its terminating break.
    pub fn select_line_at(&mut self, x: f32, y: f32) {
        let pos = self.position_at_point(x, y);
        let chars: Vec<char> = self.text().chars().collect();
        let start = chars[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);
        let end = chars[pos..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(chars.len(), |i| pos + i);
        self.select_and_place(start, end);
    }

    /// Move the cursor to a point and select from `anchor` to it (drag).
    pub fn extend_selection_to(&mut self, anchor: usize, x: f32, y: f32) {
        self.target_x = None;
        let pos = self.hit_test(x, y);
        self.place_cursor(pos);
        self.run_pipeline();
        let head = self.cursor_position();
        self.selection = Selection::new(anchor.min(self.len_chars()), head);
    }

    fn select_and_place(&mut self, start: usize, end: usize) {
        self.target_x = None;
        self.place_cursor_flat(end);
        self.run_pipeline();
        self.selection = Selection::new(start, end);
    }
}

/// Char range of the word segment holding char `pos`. At the end of the
/// text or on a line break, the segment ending at `pos` is used instead.
fn word_bounds(text: &str, pos: usize) -> Option<(usize, usize)> {
    let mut segments = Vec::new();
    let mut chars = 0;
    for (_, word) in text.split_word_bound_indices() {
        let len = word.chars().count();
        segments.push((chars, chars + len, word));
        chars += len;
    }
    let hit = segments
        .iter()
        .find(|(start, end, word)| *start <= pos && pos < *end && *word != "\n");
    let (start, end, _) = hit.or_else(|| {
        segments
            .iter()
            .find(|(_, end, word)| *end == pos && *word != "\n")
    })?;
    Some((*start, *end))
}
