//! Normalize/layout pipeline.
//!
//! The pipeline is a closed sequence: nothing in here calls back into the
//! public edit API, and every step fully rebuilds what it owns.

use std::{mem, vec};

use super::{Alignment, DocumentChain};
use crate::event::{LAYOUT_PASS, LogLevel, deliver_log, emit_event};
use crate::item::{DocumentItem, ItemLayout, LineLayout, TextRun};
use crate::measure::TextMetrics;

impl DocumentChain {
    /// Run the pipeline without mutating anything first. Running it twice
    /// in a row yields identical items and layout.
    pub fn relayout(&mut self) {
        self.run_pipeline();
    }

    pub(super) fn run_pipeline(&mut self) {
        self.layout.clear();
        self.lines.clear();
        self.items
            .retain(|item| !matches!(item, DocumentItem::SoftBreak));
        self.merge_runs();
        self.items
            .retain(|item| item.as_run().is_none_or(|run| !run.is_empty()));
        self.ensure_single_cursor();
        self.chunk_runs();
        self.layout_x();
        self.layout_y();
        self.apply_alignment();
        self.revision += 1;

        if self.debug {
            deliver_log(LogLevel::Debug, &self.dump());
            emit_event(LAYOUT_PASS, &self.revision.to_string());
        }
    }

    fn merge_runs(&mut self) {
        let mut merged: Vec<DocumentItem> = Vec::with_capacity(self.items.len());
        for item in mem::take(&mut self.items) {
            match item {
                DocumentItem::TextRun(run) => {
                    if let Some(DocumentItem::TextRun(prev)) = merged.last_mut() {
                        if prev.font == run.font {
                            prev.text.push_str(&run.text);
                            continue;
                        }
                    }
                    merged.push(DocumentItem::TextRun(run));
                }
                other => merged.push(other),
            }
        }
        self.items = merged;
    }

    fn ensure_single_cursor(&mut self) {
        let first = self.cursor_index();
        let before = self.items.len();
        let mut seen = 0;
        self.items.retain(|item| {
            if item.is_cursor() {
                seen += 1;
                return seen == 1;
            }
            true
        });
        if self.items.len() != before {
            self.report_violation("extra cursors removed");
        }
        debug_assert_eq!(self.find_cursor(), Some(first));
    }

    fn chunk_runs(&mut self) {
        let mut out = Vec::with_capacity(self.items.len());
        for item in mem::take(&mut self.items) {
            match item {
                DocumentItem::TextRun(run) => {
                    out.extend(chunk_run(run).into_iter().map(DocumentItem::TextRun));
                }
                other => out.push(other),
            }
        }
        self.items = out;
    }

    /// Assign x positions and insert soft breaks where lines overflow.
    ///
    /// The cursor never moves a wrap point: a chunk it splits is measured
    /// and wrapped as one piece of text, and the caret is dropped back in
    /// at its char offset afterwards.
    fn layout_x(&mut self) {
        let wrap = self.wrap_width;
        let mut items = mem::take(&mut self.items).into_iter();
        let mut out = XPass::with_capacity(items.len());

        while let Some(item) = items.next() {
            match item {
                DocumentItem::TextRun(run) => match take_caret_tail(&run, &mut items) {
                    Some(tail) => self.place_split_chunk(&mut out, run, tail, wrap),
                    None => self.place_run(&mut out, run, wrap),
                },
                DocumentItem::Cursor => out.caret(),
                DocumentItem::HardBreak => {
                    out.push(DocumentItem::HardBreak, ItemLayout::default());
                    out.x = 0.0;
                    out.line_has_run = false;
                }
                // Already stripped at the start of the pass.
                DocumentItem::SoftBreak => {}
            }
        }

        self.items = out.items;
        self.layout = out.layout;
    }

    fn place_run(&self, out: &mut XPass, run: TextRun, wrap: f32) {
        let metrics = self.measurer.measure(&run.text, &run.font);
        if metrics.width > wrap {
            if out.line_has_run {
                out.soft_break(self.caret_after_wrap);
            }
            for (i, (piece, metrics)) in self.split_to_fit(run, wrap).into_iter().enumerate() {
                if i > 0 {
                    out.soft_break(false);
                }
                out.run(piece, metrics);
            }
        } else {
            if out.x + metrics.width > wrap {
                out.soft_break(self.caret_after_wrap);
            }
            out.run(run, metrics);
        }
    }

    /// Place a chunk the cursor splits into `head` and `tail`.
    fn place_split_chunk(&self, out: &mut XPass, head: TextRun, tail: TextRun, wrap: f32) {
        let caret = head.char_len();
        let mut chunk = head;
        chunk.text.push_str(&tail.text);
        let metrics = self.measurer.measure(&chunk.text, &chunk.font);

        if metrics.width <= wrap {
            if out.x + metrics.width > wrap {
                out.soft_break(false);
            }
            let tail = chunk.split_off(caret);
            self.place_measured(out, chunk);
            out.caret();
            self.place_measured(out, tail);
            return;
        }

        if out.line_has_run {
            out.soft_break(false);
        }
        // Chars of the chunk left of the caret not placed yet.
        let mut before = caret;
        let mut placed = false;
        for (i, (piece, piece_metrics)) in self.split_to_fit(chunk, wrap).into_iter().enumerate() {
            if i > 0 {
                out.soft_break(false);
                if !placed && before == 0 {
                    // Caret on the wrap point, kept at the start of the new line.
                    out.caret();
                    placed = true;
                }
            }
            let len = piece.char_len();
            if !placed && before > 0 && before < len {
                let mut piece = piece;
                let rest = piece.split_off(before);
                self.place_measured(out, piece);
                out.caret();
                self.place_measured(out, rest);
                placed = true;
            } else {
                out.run(piece, piece_metrics);
                if !placed {
                    before -= len;
                    if before == 0 && !self.caret_after_wrap {
                        out.caret();
                        placed = true;
                    }
                }
            }
        }
        if !placed {
            out.caret();
        }
    }

    fn place_measured(&self, out: &mut XPass, run: TextRun) {
        let metrics = self.measurer.measure(&run.text, &run.font);
        out.run(run, metrics);
    }

    /// Greedily cut a run wider than `wrap` into pieces that each fit. Every
    /// piece takes at least one char so unbreakable glyphs still progress.
    fn split_to_fit(&self, run: TextRun, wrap: f32) -> Vec<(TextRun, TextMetrics)> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut fitted: Option<(usize, TextMetrics)> = None;

        for (byte, ch) in run.text.char_indices() {
            let end = byte + ch.len_utf8();
            let metrics = self.measurer.measure(&run.text[start..end], &run.font);
            if metrics.width > wrap {
                if let Some((fit_end, fit_metrics)) = fitted.take() {
                    pieces.push((
                        TextRun::new(&run.text[start..fit_end], run.font.clone()),
                        fit_metrics,
                    ));
                    start = fit_end;
                    let metrics = self.measurer.measure(&run.text[start..end], &run.font);
                    fitted = Some((end, metrics));
                    continue;
                }
            }
            fitted = Some((end, metrics));
        }
        if let Some((fit_end, fit_metrics)) = fitted {
            pieces.push((
                TextRun::new(&run.text[start..fit_end], run.font.clone()),
                fit_metrics,
            ));
        }
        pieces
    }

    /// Group items into lines and assign baselines and line heights.
    fn layout_y(&mut self) {
        let fallback = self.measurer.measure("", &self.current_font);
        let fallback_size = self.current_font.size;
        let n = self.items.len();
        let mut top = 0.0;
        let mut start = 0;
        let mut paragraph = 0;

        for i in 0..=n {
            if i < n && !self.items[i].is_break() {
                continue;
            }
            // A trailing hard break opens an empty last line with no items.
            if i == n && start == n && n > 0 && !matches!(self.items[n - 1], DocumentItem::HardBreak)
            {
                break;
            }
            let end = if i == n { n } else { i + 1 };

            let mut ascent: f32 = 0.0;
            let mut descent: f32 = 0.0;
            let mut size: f32 = 0.0;
            let mut width = 0.0;
            let mut has_text = false;
            for j in start..end {
                if let DocumentItem::TextRun(run) = &self.items[j] {
                    let l = &self.layout[j];
                    ascent = ascent.max(l.ascent);
                    descent = descent.max(l.descent);
                    size = size.max(run.font.size);
                    width += l.width;
                    has_text = true;
                }
            }
            if !has_text {
                ascent = fallback.ascent;
                descent = fallback.descent;
                size = fallback_size;
            }

            let height = (ascent + descent).max(size) * self.line_spacing;
            let baseline = top + (height - (ascent + descent)) / 2.0 + ascent;

            let mut run_extents: Option<(f32, f32)> = None;
            for j in start..end {
                let l = &mut self.layout[j];
                l.pos_y = baseline;
                l.line_height = height;
                match &self.items[j] {
                    DocumentItem::TextRun(_) => run_extents = Some((l.ascent, l.descent)),
                    DocumentItem::Cursor => {
                        let (a, d) = run_extents.unwrap_or((ascent, descent));
                        l.ascent = a;
                        l.descent = d;
                        l.height = a + d;
                    }
                    DocumentItem::HardBreak | DocumentItem::SoftBreak => {}
                }
            }

            self.lines.push(LineLayout {
                start,
                end,
                top,
                height,
                baseline,
                ascent,
                descent,
                width,
                offset_x: 0.0,
                paragraph,
                has_text,
            });
            if i < n && matches!(self.items[i], DocumentItem::HardBreak) {
                paragraph += 1;
            }
            top += height;
            start = end;
        }
    }

    /// Shift centered and right aligned lines inside the wrap width.
    fn apply_alignment(&mut self) {
        if self.alignments.is_empty() || !self.wrap_width.is_finite() {
            return;
        }
        for line in &mut self.lines {
            let Some(alignment) = self.alignments.get(&line.paragraph) else {
                continue;
            };
            let free = (self.wrap_width - line.width).max(0.0);
            let offset = match alignment {
                Alignment::Left => 0.0,
                Alignment::Center => free / 2.0,
                Alignment::Right => free,
            };
            line.offset_x = offset;
            for l in &mut self.layout[line.start..line.end] {
                l.pos_x += offset;
            }
        }
    }
}

/// Output of the x pass under construction.
struct XPass {
    items: Vec<DocumentItem>,
    layout: Vec<ItemLayout>,
    x: f32,
    line_has_run: bool,
}

impl XPass {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            layout: Vec::with_capacity(capacity),
            x: 0.0,
            line_has_run: false,
        }
    }

    fn push(&mut self, item: DocumentItem, layout: ItemLayout) {
        self.items.push(item);
        self.layout.push(ItemLayout {
            pos_x: self.x,
            ..layout
        });
    }

    fn caret(&mut self) {
        self.push(DocumentItem::Cursor, ItemLayout::default());
    }

    fn run(&mut self, run: TextRun, metrics: TextMetrics) {
        self.push(
            DocumentItem::TextRun(run),
            ItemLayout {
                width: metrics.width,
                ascent: metrics.ascent,
                descent: metrics.descent,
                ..ItemLayout::default()
            },
        );
        self.x += metrics.width;
        self.line_has_run = true;
    }

    /// End the current line. With `carry_caret`, a cursor sitting right
    /// before the break moves onto the new line.
    fn soft_break(&mut self, carry_caret: bool) {
        let caret = if carry_caret && self.items.last().is_some_and(DocumentItem::is_cursor) {
            self.items.pop();
            self.layout.pop();
            true
        } else {
            false
        };
        self.push(DocumentItem::SoftBreak, ItemLayout::default());
        self.x = 0.0;
        self.line_has_run = false;
        if caret {
            self.caret();
        }
    }
}

/// When the cursor splits the chunk ending in `run` (the next run has the
/// same font and whitespace class), consume the cursor and return that run.
fn take_caret_tail(run: &TextRun, rest: &mut vec::IntoIter<DocumentItem>) -> Option<TextRun> {
    let joins = matches!(
        rest.as_slice(),
        [DocumentItem::Cursor, DocumentItem::TextRun(next), ..]
            if next.font == run.font && next.is_whitespace() == run.is_whitespace()
    );
    if !joins {
        return None;
    }
    rest.next();
    match rest.next() {
        Some(DocumentItem::TextRun(next)) => Some(next),
        _ => None,
    }
}

/// Split a run into maximal pieces that are all whitespace or all not.
fn chunk_run(run: TextRun) -> Vec<TextRun> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_ws = None;
    for ch in run.text.chars() {
        let ws = ch.is_whitespace();
        if current_ws.is_some_and(|prev| prev != ws) {
            chunks.push(TextRun::new(mem::take(&mut current), run.font.clone()));
        }
        current_ws = Some(ws);
        current.push(ch);
    }
    if chunks.is_empty() {
        return vec![TextRun::new(current, run.font)];
    }
    chunks.push(TextRun::new(current, run.font));
    chunks
}
