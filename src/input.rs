//! Normalized editor input.
//!
//! Hosts decode their native keyboard and pointer events into
//! [`EditorEvent`]s and feed them to
//! [`EditorController::handle_event`](crate::EditorController::handle_event).
//! Coordinates are in layout space (already translated by any scroll
//! offset).

/// Non-character keys the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl NamedKey {
    /// Check if this is a navigation key (arrows, home, end).
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::Left | Self::Right | Self::Up | Self::Down | Self::Home | Self::End
        )
    }
}

/// A point in layout coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An input event.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// A printable character (`'\n'` behaves like Enter).
    Char(char),
    /// A named key press.
    Key(NamedKey),
    /// Primary button pressed: places the caret and anchors a drag.
    PointerDown(Point),
    /// Pointer moved; extends the selection while a drag is active.
    PointerMove(Point),
    /// Primary button released; ends the drag.
    PointerUp(Point),
    /// Double click.
    SelectWord(Point),
    /// Triple click.
    SelectLine(Point),
    /// Text delivered by the host's own paste handling.
    Paste(String),
}

impl EditorEvent {
    /// Check if this is a pointer event.
    #[must_use]
    pub const fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::PointerDown(_)
                | Self::PointerMove(_)
                | Self::PointerUp(_)
                | Self::SelectWord(_)
                | Self::SelectLine(_)
        )
    }

    /// Get the point if this is a pointer event.
    #[must_use]
    pub const fn point(&self) -> Option<Point> {
        match self {
            Self::PointerDown(p)
            | Self::PointerMove(p)
            | Self::PointerUp(p)
            | Self::SelectWord(p)
            | Self::SelectLine(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<char> for EditorEvent {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<NamedKey> for EditorEvent {
    fn from(key: NamedKey) -> Self {
        Self::Key(key)
    }
}
