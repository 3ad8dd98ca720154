//! Property-based tests for the document chain and editor.
//!
//! Uses proptest to drive random edit sequences and verify that layout
//! invariants survive every operation, plain text round-trips, layout is
//! idempotent, and history restores what it recorded.

#![allow(clippy::float_cmp)] // Exact float comparison is intentional in tests

mod common;

use common::{chain_with, check_invariants, editor, line_texts};
use proptest::prelude::*;
use runchain::{DocumentItem, EditorController, EditorEvent, NamedKey, Point};

// ============================================================================
// Strategies
// ============================================================================

/// Plain text over a small alphabet with spaces, breaks and wide chars.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!['a', 'b', 'x', ' ', ' ', '\n', 'é', '中']),
        0..60,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn wrap_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![Just(f32::INFINITY), 4.0f32..200.0]
}

#[derive(Clone, Debug)]
enum Op {
    Type(char),
    Paste(String),
    Key(NamedKey),
    Click(f32, f32),
    Drag(f32, f32, f32, f32),
    Select(usize, usize),
    SelectWord(f32, f32),
    Bold,
    Superscript,
    FontSize(f32),
    Undo,
    Redo,
    Wrap(f32),
}

fn key_strategy() -> impl Strategy<Value = NamedKey> {
    prop::sample::select(vec![
        NamedKey::Backspace,
        NamedKey::Delete,
        NamedKey::Enter,
        NamedKey::Left,
        NamedKey::Right,
        NamedKey::Up,
        NamedKey::Down,
        NamedKey::Home,
        NamedKey::End,
    ])
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let coord = -20.0f32..400.0;
    prop_oneof![
        4 => prop::sample::select(vec!['a', 'b', ' ', '中']).prop_map(Op::Type),
        1 => text_strategy().prop_map(Op::Paste),
        4 => key_strategy().prop_map(Op::Key),
        1 => (coord.clone(), coord.clone()).prop_map(|(x, y)| Op::Click(x, y)),
        1 => (coord.clone(), coord.clone(), coord.clone(), coord.clone())
            .prop_map(|(a, b, c, d)| Op::Drag(a, b, c, d)),
        1 => (0usize..80, 0usize..80).prop_map(|(a, b)| Op::Select(a, b)),
        1 => (coord.clone(), coord).prop_map(|(x, y)| Op::SelectWord(x, y)),
        1 => Just(Op::Bold),
        1 => Just(Op::Superscript),
        1 => (8.0f32..40.0).prop_map(Op::FontSize),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
        1 => (16.0f32..300.0).prop_map(Op::Wrap),
    ]
}

fn apply(editor: &mut EditorController, op: &Op) {
    match op {
        Op::Type(c) => {
            editor.handle_event(EditorEvent::Char(*c));
        }
        Op::Paste(text) => {
            editor.handle_event(EditorEvent::Paste(text.clone()));
        }
        Op::Key(key) => {
            editor.handle_event(EditorEvent::Key(*key));
        }
        Op::Click(x, y) => {
            editor.click_at(*x, *y);
        }
        Op::Drag(x0, y0, x1, y1) => {
            editor.handle_event(EditorEvent::PointerDown(Point::new(*x0, *y0)));
            editor.handle_event(EditorEvent::PointerUp(Point::new(*x1, *y1)));
        }
        Op::Select(a, b) => editor.set_selection_range(*a, *b),
        Op::SelectWord(x, y) => editor.select_word_at(*x, *y),
        Op::Bold => editor.toggle_bold(),
        Op::Superscript => editor.toggle_superscript(),
        Op::FontSize(size) => editor.set_font_size(*size).unwrap(),
        Op::Undo => {
            editor.undo();
        }
        Op::Redo => {
            editor.redo();
        }
        Op::Wrap(width) => editor.set_wrap_width(*width).unwrap(),
    }
}

// ============================================================================
// Serialization
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Plain text survives set_text/text unchanged at any wrap width.
    #[test]
    fn set_text_round_trips(text in text_strategy(), wrap in wrap_strategy()) {
        let chain = chain_with(&text, wrap);
        prop_assert_eq!(chain.text(), text.clone());
        prop_assert_eq!(chain.len_chars(), text.chars().count());
        prop_assert_eq!(chain.cursor_position(), text.chars().count());
    }

    /// A freshly laid out chain satisfies every invariant.
    #[test]
    fn layout_invariants_hold(text in text_strategy(), wrap in wrap_strategy()) {
        let chain = chain_with(&text, wrap);
        if let Err(broken) = check_invariants(&chain) {
            prop_assert!(false, "{}", broken);
        }
    }

    /// Running the pipeline again changes nothing.
    #[test]
    fn relayout_is_idempotent(text in text_strategy(), wrap in wrap_strategy(), pos in 0usize..60) {
        let mut chain = chain_with(&text, wrap);
        chain.set_cursor_position(pos);
        let items = chain.items().to_vec();
        let layout = chain.layouts().to_vec();
        let lines = chain.lines().to_vec();
        chain.relayout();
        prop_assert_eq!(chain.items(), items.as_slice());
        prop_assert_eq!(chain.layouts(), layout.as_slice());
        prop_assert_eq!(chain.lines(), lines.as_slice());
    }

    /// Wrap points depend on the text alone, never on where the cursor is.
    #[test]
    fn wrap_ignores_cursor(text in text_strategy(), wrap in 4.0f32..200.0, pos in 0usize..60) {
        let mut chain = chain_with(&text, wrap);
        let lines = line_texts(&chain);
        chain.set_cursor_position(pos);
        prop_assert_eq!(line_texts(&chain), lines);
        prop_assert_eq!(chain.cursor_position(), pos.min(text.chars().count()));
    }

    /// Widening to an unbounded width removes every soft break.
    #[test]
    fn widening_unwraps(text in text_strategy(), wrap in 4.0f32..100.0) {
        let mut chain = chain_with(&text, wrap);
        chain.set_wrap_width(f32::INFINITY).unwrap();
        prop_assert!(!chain.items().iter().any(|item| matches!(item, DocumentItem::SoftBreak)));
        let hard_breaks = text.matches('\n').count();
        prop_assert_eq!(chain.lines().len(), hard_breaks + 1);
    }
}

// ============================================================================
// Selection
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Selecting (a, b) and (b, a) is the same selection.
    #[test]
    fn selection_is_symmetric(text in text_strategy(), a in 0usize..70, b in 0usize..70) {
        let mut chain = chain_with(&text, 80.0);
        chain.set_selection_range(a, b);
        let forward = (chain.selection(), chain.selected_text());
        chain.set_selection_range(b, a);
        prop_assert_eq!((chain.selection(), chain.selected_text()), forward);
    }

    /// The selected text is exactly the char range of the plain text.
    #[test]
    fn selected_text_matches_plain_text(text in text_strategy(), a in 0usize..70, b in 0usize..70) {
        let mut chain = chain_with(&text, 80.0);
        chain.set_selection_range(a, b);
        let len = text.chars().count();
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));
        let expected: String = text.chars().skip(start).take(end - start).collect();
        prop_assert_eq!(chain.selected_text(), expected);
    }

    /// Hit testing always resolves to a position inside the document.
    #[test]
    fn hit_test_stays_in_range(text in text_strategy(), x in -50.0f32..500.0, y in -50.0f32..500.0) {
        let chain = chain_with(&text, 80.0);
        let pos = chain.position_at_point(x, y);
        prop_assert!(pos <= chain.len_chars());
    }
}

// ============================================================================
// Editing
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No operation sequence breaks an invariant.
    #[test]
    fn invariants_survive_edits(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut editor = editor(120.0);
        for op in &ops {
            apply(&mut editor, op);
            if let Err(broken) = check_invariants(editor.chain()) {
                prop_assert!(false, "after {:?}: {}", op, broken);
            }
        }
    }

    /// Undoing N recorded edits returns to the start and redoing them
    /// returns to the end.
    #[test]
    fn undo_redo_round_trip(pieces in prop::collection::vec("[a-z ]{1,6}", 1..12)) {
        let mut editor = editor(80.0);
        for piece in &pieces {
            editor.insert_text(piece);
        }
        let full = editor.text();
        prop_assert_eq!(&full, &pieces.concat());

        for _ in 0..pieces.len() {
            prop_assert!(editor.undo());
        }
        prop_assert_eq!(editor.text(), "");
        prop_assert!(!editor.can_undo());

        for _ in 0..pieces.len() {
            prop_assert!(editor.redo());
        }
        prop_assert_eq!(editor.text(), full);
    }

    /// Backspace after typing a char restores the previous text.
    #[test]
    fn type_then_backspace_is_identity(text in text_strategy(), pos in 0usize..60, c in prop::sample::select(vec!['q', ' ', '中'])) {
        let mut chain = chain_with(&text, 80.0);
        chain.set_cursor_position(pos);
        let before = chain.text();
        chain.insert_char(c);
        chain.backspace();
        prop_assert_eq!(chain.text(), before);
    }
}
