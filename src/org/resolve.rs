//! Token stream → final Org text.
//!
//! Single left-to-right pass over the render stream. Three pieces of state
//! are threaded through the fold: the current indentation depth, whether we
//! are inside a table row, and the list-nesting stack. Markers update the
//! state; literal fragments are expanded against it.

use memchr::memchr;

use crate::error::{Error, Result};

use super::render::{Marker, Token};

/// The kind of the innermost open list.
///
/// Deliberately a two-variant enum rather than an `Option<ordinal>`: an
/// ordered list whose counter happens to be zero is still ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    /// Ordered list carrying the next ordinal to emit.
    Ordered(u32),
    Unordered,
}

#[derive(Debug, Default)]
struct ResolveState {
    depth: usize,
    in_row: bool,
    lists: Vec<ListKind>,
}

/// Resolve a render stream into Org text.
///
/// Every valid stream is balanced: the pass must end at depth zero, outside
/// any row, with no open lists. Anything else indicates a handler-wiring
/// defect and is reported as [`Error::UnbalancedMarkers`], never ignored.
pub fn resolve(tokens: &[Token]) -> Result<String> {
    let mut state = ResolveState::default();
    let mut out = String::new();

    for token in tokens {
        match token {
            Token::Marker(marker) => apply_marker(*marker, &mut state, &mut out)?,
            Token::Text(text) => emit(text, &state, &mut out),
        }
    }

    if state.depth != 0 || state.in_row || !state.lists.is_empty() {
        return Err(Error::UnbalancedMarkers(format!(
            "stream ended at depth {} with {} open lists{}",
            state.depth,
            state.lists.len(),
            if state.in_row { ", inside a row" } else { "" }
        )));
    }

    Ok(out)
}

fn apply_marker(marker: Marker, state: &mut ResolveState, out: &mut String) -> Result<()> {
    match marker {
        Marker::Indent => state.depth += 1,
        Marker::Dedent => {
            state.depth = state
                .depth
                .checked_sub(1)
                .ok_or_else(|| Error::UnbalancedMarkers("dedent below depth zero".to_string()))?;
        }
        Marker::RowStart => state.in_row = true,
        Marker::RowEnd => state.in_row = false,
        Marker::BeginOrdered => state.lists.push(ListKind::Ordered(1)),
        Marker::BeginUnordered => state.lists.push(ListKind::Unordered),
        Marker::EndOrdered | Marker::EndUnordered => {
            state.lists.pop().ok_or_else(|| {
                Error::UnbalancedMarkers("list end without matching begin".to_string())
            })?;
        }
        Marker::ListItem => {
            // The bullet resolves before the item's own Indent marker, so
            // it sits at the enclosing depth while the item body indents
            // one level deeper.
            let bullet = match state.lists.last_mut() {
                Some(ListKind::Ordered(n)) => {
                    let bullet = format!("\n{n}. ");
                    *n += 1;
                    bullet
                }
                Some(ListKind::Unordered) => "\n- ".to_string(),
                None => {
                    return Err(Error::UnbalancedMarkers(
                        "list item outside any list".to_string(),
                    ));
                }
            };
            emit(&bullet, state, out);
        }
    }
    Ok(())
}

/// Emit one literal fragment under the current state.
///
/// Inside a row, newlines vanish (row contents are never expanded); outside,
/// each newline gains two spaces of indent per open level.
fn emit(text: &str, state: &ResolveState, out: &mut String) {
    if memchr(b'\n', text.as_bytes()).is_none() {
        out.push_str(text);
        return;
    }

    if state.in_row {
        out.extend(text.chars().filter(|&c| c != '\n'));
        return;
    }

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            for _ in 0..state.depth {
                out.push_str("  ");
            }
        }
        out.push_str(line);
    }
}
