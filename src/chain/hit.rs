//! Point to position resolution.

use super::{DocumentChain, ItemPosition};
use crate::item::{DocumentItem, LineLayout};

impl DocumentChain {
    /// Resolve a point in layout coordinates to an item position.
    ///
    /// Lines own the half-open band `[top, top + height)`, which is the
    /// baseline-centred band extended by half the spacing gap on each side,
    /// so bands tile the document without dead zones. Resolution order:
    ///
    /// 1. a run under the point: the char boundary nearest to `x`;
    /// 2. a text line whose band holds `y`: past the right edge resolves to
    ///    the line end (before its break), anything else to the line start;
    /// 3. an empty line whose band holds `y`: its start;
    /// 4. above the document resolves to its start, below to its end.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> ItemPosition {
        for (_, line) in self.lines_at(y) {
            for index in line.start..line.end {
                let (DocumentItem::TextRun(_), Some(l)) = (&self.items[index], self.layout.get(index))
                else {
                    continue;
                };
                if x >= l.pos_x && x < l.pos_x + l.width {
                    return ItemPosition::new(index, self.offset_in_run(index, x - l.pos_x));
                }
            }
        }

        let mut best: Option<(usize, f32)> = None;
        for (i, line) in self.lines_at(y) {
            if !line.has_text {
                continue;
            }
            let distance = (line.baseline - y).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        if let Some((i, _)) = best {
            let line = &self.lines[i];
            return if x >= self.line_right_edge(line) {
                self.line_end_position(i)
            } else {
                ItemPosition::before(line.start)
            };
        }

        if let Some((_, line)) = self.lines_at(y).next() {
            return ItemPosition::before(line.start);
        }

        match self.lines.first() {
            Some(first) if y >= first.top => ItemPosition::before(self.items.len()),
            _ => ItemPosition::before(0),
        }
    }

    /// [`hit_test`](Self::hit_test) as a flattened char offset.
    #[must_use]
    pub fn position_at_point(&self, x: f32, y: f32) -> usize {
        self.flat_position(self.hit_test(x, y))
    }

    /// Position at the end of visual line `line`, before a terminating
    /// break.
    pub(super) fn line_end_position(&self, line: usize) -> ItemPosition {
        let l = &self.lines[line];
        if l.end > l.start && self.items[l.end - 1].is_break() {
            ItemPosition::before(l.end - 1)
        } else {
            ItemPosition::before(l.end)
        }
    }

    fn lines_at(&self, y: f32) -> impl Iterator<Item = (usize, &LineLayout)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(move |(_, line)| line.contains_y(y))
    }

    fn line_right_edge(&self, line: &LineLayout) -> f32 {
        (line.start..line.end)
            .filter(|&i| self.items[i].as_run().is_some())
            .filter_map(|i| self.layout.get(i))
            .map(|l| l.pos_x + l.width)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Char offset in run `index` nearest to `dx` pixels from its left edge.
    /// Each char rounds at its midpoint.
    fn offset_in_run(&self, index: usize, dx: f32) -> usize {
        let Some(run) = self.items[index].as_run() else {
            return 0;
        };
        let mut prefix = 0.0;
        for (offset, (byte, ch)) in run.text.char_indices().enumerate() {
            let end = byte + ch.len_utf8();
            let next = self.measurer.measure(&run.text[..end], &run.font).width;
            if dx < (prefix + next) / 2.0 {
                return offset;
            }
            prefix = next;
        }
        run.char_len()
    }
}
