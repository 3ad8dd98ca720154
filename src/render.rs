//! Painting computed layout onto a drawing surface.
//!
//! [`paint`] only reads post-layout state: it never measures text for
//! placement and never mutates the chain. The host supplies a
//! [`DrawSurface`] (a canvas 2D context, a GPU text renderer, ...);
//! [`DisplayList`] records the calls instead, for tests and diffing.
//!
//! Draw order per frame: selection highlights, then text with its
//! decorations, then the caret.

use crate::chain::DocumentChain;
use crate::color::Rgba;
use crate::font::FontDescriptor;
use crate::input::Point;
use crate::item::{DocumentItem, ItemLayout, LineLayout, TextRun, char_to_byte};

/// An axis-aligned rectangle in layout coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Compute intersection with another rectangle.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 > x1 && y2 > y1 {
            Some(Self::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Check if this rectangle is empty (zero area).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Drawing primitives a host must provide.
pub trait DrawSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    /// Draw `text` with its baseline at `y`, in the font's color.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontDescriptor);
    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba);
}

/// Paint configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintOptions {
    pub selection_color: Rgba,
    pub cursor_color: Rgba,
    pub cursor_width: f32,
    /// Draw the caret (hosts pass the blink state here).
    pub show_cursor: bool,
    /// Stroke width of underline and strikethrough.
    pub decoration_width: f32,
    /// Lines entirely outside this rectangle are skipped.
    pub viewport: Option<Rect>,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            selection_color: Rgba::new(0x33, 0x99, 0xff, 0x66),
            cursor_color: Rgba::BLACK,
            cursor_width: 1.0,
            show_cursor: true,
            decoration_width: 1.0,
            viewport: None,
        }
    }
}

/// Counters from one paint call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub lines: usize,
    pub runs: usize,
    pub selection_rects: usize,
    pub decorations: usize,
    pub cursor_drawn: bool,
}

/// Paint the chain's current layout.
pub fn paint(
    chain: &DocumentChain,
    surface: &mut impl DrawSurface,
    options: &PaintOptions,
) -> PaintStats {
    let mut stats = PaintStats::default();
    let items = chain.items();
    let layouts = chain.layouts();
    let visible = |line: &LineLayout| {
        options
            .viewport
            .is_none_or(|viewport| line.top < viewport.bottom() && line.bottom() > viewport.y)
    };

    if let Some(selection) = chain.selection() {
        for line in chain.lines().iter().filter(|line| visible(line)) {
            let mut flat = chain.flat_start_of(line.start);
            for index in line.start..line.end {
                let item = &items[index];
                let len = item.flat_len();
                if let (DocumentItem::TextRun(run), Some(l)) = (item, layouts.get(index)) {
                    let from = selection.start.max(flat);
                    let to = selection.end.min(flat + len);
                    if from < to {
                        let x0 = l.pos_x + prefix_width(chain, run, from - flat);
                        let x1 = l.pos_x + prefix_width(chain, run, to - flat);
                        surface.fill_rect(
                            Rect::new(x0, line.top, x1 - x0, line.height),
                            options.selection_color,
                        );
                        stats.selection_rects += 1;
                    }
                }
                flat += len;
            }
        }
    }

    for line in chain.lines().iter().filter(|line| visible(line)) {
        stats.lines += 1;
        for index in line.start..line.end {
            let (DocumentItem::TextRun(run), Some(l)) = (&items[index], layouts.get(index)) else {
                continue;
            };
            let baseline = l.pos_y + run.font.baseline_offset();
            surface.fill_text(&run.text, l.pos_x, baseline, &run.font);
            stats.runs += 1;
            stats.decorations += paint_decorations(surface, run, l, baseline, options);
        }
    }

    if options.show_cursor {
        let cursor = chain
            .find_cursor()
            .and_then(|index| layouts.get(index).map(|l| (index, l)));
        if let Some((index, l)) = cursor {
            let on_screen = chain
                .lines()
                .iter()
                .find(|line| index >= line.start && index < line.end)
                .is_some_and(|line| visible(line));
            if on_screen {
                surface.stroke_line(
                    Point::new(l.pos_x, l.pos_y - l.ascent),
                    Point::new(l.pos_x, l.pos_y + l.descent),
                    options.cursor_width,
                    options.cursor_color,
                );
                stats.cursor_drawn = true;
            }
        }
    }

    stats
}

fn paint_decorations(
    surface: &mut impl DrawSurface,
    run: &TextRun,
    l: &ItemLayout,
    baseline: f32,
    options: &PaintOptions,
) -> usize {
    let mut drawn = 0;
    let mut line_at = |y: f32| {
        surface.stroke_line(
            Point::new(l.pos_x, y),
            Point::new(l.pos_x + l.width, y),
            options.decoration_width,
            run.font.color,
        );
        drawn += 1;
    };
    if run.font.is_underline() {
        line_at(baseline + l.descent * 0.5);
    }
    if run.font.is_strikethrough() {
        line_at(baseline - l.ascent * 0.4);
    }
    drawn
}

fn prefix_width(chain: &DocumentChain, run: &TextRun, chars: usize) -> f32 {
    if chars == 0 {
        return 0.0;
    }
    let end = char_to_byte(&run.text, chars);
    chain.measurer().measure(&run.text[..end], &run.font).width
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        /// Canvas font shorthand.
        font: String,
        color: Rgba,
    },
    StrokeLine {
        from: Point,
        to: Point,
        width: f32,
        color: Rgba,
    },
}

/// A [`DrawSurface`] that records every call.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Texts of the recorded `FillText` calls, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for DisplayList {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontDescriptor) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font: font.css(),
            color: font.color,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            color,
        });
    }
}
