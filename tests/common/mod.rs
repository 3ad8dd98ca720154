#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Each test binary uses a subset

use std::fmt::Write as _;

use runchain::{
    ChainOptions, DocumentChain, DocumentItem, EditorController, EditorOptions, MonospaceMeasurer,
};

/// Pixels per monospace cell used across integration tests.
pub const ADVANCE: f32 = 8.0;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    runchain::set_log_callback(|level, message| {
        tracing::debug!(?level, "{message}");
    });
}

pub fn chain_options(wrap_width: f32) -> ChainOptions {
    ChainOptions {
        wrap_width,
        ..ChainOptions::default()
    }
}

pub fn chain_with(text: &str, wrap_width: f32) -> DocumentChain {
    let mut chain =
        DocumentChain::new(MonospaceMeasurer::new(ADVANCE), chain_options(wrap_width)).unwrap();
    chain.set_text(text);
    chain
}

pub fn editor(wrap_width: f32) -> EditorController {
    let options = EditorOptions {
        chain: chain_options(wrap_width),
        ..EditorOptions::default()
    };
    EditorController::new(MonospaceMeasurer::new(ADVANCE), options).unwrap()
}

/// Every structural and geometric invariant a laid-out chain must hold.
/// Returns the first broken one.
pub fn check_invariants(chain: &DocumentChain) -> Result<(), String> {
    let items = chain.items();
    let cursors = items.iter().filter(|item| item.is_cursor()).count();
    if cursors != 1 {
        return Err(format!("{cursors} cursors\n{}", chain.dump()));
    }
    if chain.layouts().len() != items.len() {
        return Err("layout not parallel to items".to_string());
    }

    for (i, item) in items.iter().enumerate() {
        let Some(run) = item.as_run() else {
            continue;
        };
        if run.text.is_empty() {
            return Err(format!("empty run at {i}"));
        }
        let ws = run.text.chars().filter(|c| c.is_whitespace()).count();
        if ws != 0 && ws != run.text.chars().count() {
            return Err(format!("mixed whitespace run {:?}", run.text));
        }
        if let Some(DocumentItem::TextRun(next)) = items.get(i + 1) {
            if next.font == run.font && next.is_whitespace() == run.is_whitespace() {
                return Err(format!("unmerged runs {:?} {:?}", run.text, next.text));
            }
        }
        if run.text.contains('\n') {
            return Err(format!("run spans a break: {:?}", run.text));
        }
    }

    let wrap = chain.wrap_width();
    let mut top = 0.0;
    for (i, line) in chain.lines().iter().enumerate() {
        if line.top != top {
            return Err(format!("line {i} top {} expected {top}", line.top));
        }
        top = line.bottom();
        let runs: Vec<_> = items[line.start..line.end]
            .iter()
            .filter_map(DocumentItem::as_run)
            .collect();
        let single_glyph = runs.len() == 1 && runs[0].char_len() == 1;
        if line.width > wrap + 0.001 && !single_glyph {
            return Err(format!("line {i} width {} exceeds {wrap}", line.width));
        }
    }
    if chain.invariant_violations() != 0 {
        return Err(format!("{} repaired violations", chain.invariant_violations()));
    }
    Ok(())
}

/// Text of each visual line, cursor ignored.
pub fn line_texts(chain: &DocumentChain) -> Vec<String> {
    chain
        .lines()
        .iter()
        .map(|line| {
            chain.items()[line.start..line.end]
                .iter()
                .filter_map(DocumentItem::as_run)
                .map(|run| run.text.as_str())
                .collect()
        })
        .collect()
}

/// One line per item: display form and computed position.
pub fn layout_listing(chain: &DocumentChain) -> String {
    let mut out = String::new();
    for (i, (item, l)) in chain.items().iter().zip(chain.layouts()).enumerate() {
        let _ = writeln!(out, "[{i}] {item} @ ({}, {})", l.pos_x, l.pos_y);
    }
    out
}
