//! Clause splitting for "is amended" blocks.
//!
//! A block is decomposed in three levels, each narrowing the target it
//! inherits from the level above:
//!
//! ```text
//! is amended--
//!     (1) in subsection (b)--            numbered clause, scopes to (b)
//!         (A) in paragraph (1), by ...   lettered item, scopes to (b)(1)
//!         (B) by adding at the end ...   lettered item, stays at (b)
//!     (2) by striking "x" and ...        numbered clause, inherits target
//! ```

use regex::Regex;

use super::patterns::{LETTERED_ITEM, NUMBERED_CLAUSE};

/// A span of clause text with its designator, e.g. `1` or `A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clause<'a> {
    pub designator: &'a str,
    /// Byte offset of the clause within the split text.
    pub start: usize,
    pub text: &'a str,
}

/// Split at indented `(1)`, `(2)`, ... markers.
pub(crate) fn split_numbered(text: &str) -> Vec<Clause<'_>> {
    split_at_markers(text, &NUMBERED_CLAUSE)
}

/// Split at indented `(A)`, `(B)`, ... markers.
pub(crate) fn split_lettered(text: &str) -> Vec<Clause<'_>> {
    split_at_markers(text, &LETTERED_ITEM)
}

fn split_at_markers<'a>(text: &'a str, marker: &Regex) -> Vec<Clause<'a>> {
    let markers: Vec<(usize, &'a str)> = marker
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let designator = caps.get(1)?;
            Some((whole.start(), designator.as_str()))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(idx, &(start, designator))| {
            let end = markers.get(idx + 1).map(|&(next, _)| next).unwrap_or(text.len());
            Clause {
                designator,
                start,
                text: text[start..end].trim(),
            }
        })
        .collect()
}

/// Walk backwards from an "is amended" anchor to the start of its preamble
/// paragraph: the nearest preceding line that opens with `(`, or the line
/// after a blank line, whichever comes first.
pub(crate) fn find_preamble_start(text: &str, anchor_start: usize) -> usize {
    let bytes = text.as_bytes();

    let mut pos = anchor_start.min(bytes.len());
    while pos > 0 && bytes[pos - 1] != b'\n' {
        pos -= 1;
    }

    // A marker on the anchor's own line already opens the paragraph
    if text[pos..anchor_start].trim_start().starts_with('(') {
        return pos;
    }

    while pos > 0 {
        let prev_end = pos - 1;
        let mut prev_start = prev_end;
        while prev_start > 0 && bytes[prev_start - 1] != b'\n' {
            prev_start -= 1;
        }

        let prev_line = text[prev_start..prev_end].trim();
        if prev_line.is_empty() {
            break;
        }
        pos = prev_start;
        if prev_line.starts_with('(') {
            break;
        }
    }

    pos
}
