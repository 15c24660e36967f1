//! `Received` trace header decomposition.
//!
//! The value is free text written by many different MTAs, loosely shaped as
//!
//! ```text
//! from <host> (<literal>) by <host> (<literal>) with <proto> id <id> via <relay>; <date>
//! ```
//!
//! Clauses are located by their keywords in a single forward scan. `by` and
//! `with` are required anchors: when one is missing the scan stops and the
//! clauses resolved so far are returned. `id` and `via` are optional.

use tracing::debug;

use crate::model::header::HeaderRecord;
use crate::model::received::ReceivedParts;
use crate::parser::date::parse_timestamp;

const FROM: &str = "from ";
const BY: &str = "by ";
const WITH: &str = "with ";
const ID: &str = "id ";
const VIA: &str = "via ";

/// Which anchors have been resolved so far. Offsets are the byte position
/// where the clause's data starts, just past its keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseScan {
    /// Looking for `by`. `from` is set when an explicit `from` clause exists.
    SeekBy { from: Option<usize>, search: usize },
    /// `by` resolved; looking for `with`.
    SeekWith { by: usize },
    /// `with` resolved; looking for the optional `id`.
    SeekId { with: usize },
    /// Looking for the optional `via`, which closes the clause `open`.
    SeekVia { open: OpenClause, start: usize },
    Done,
}

/// The clause that runs until `via` or the end of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenClause {
    With,
    Id,
}

/// Decompose a `Received` record.
///
/// Never fails. An empty value yields a result with every clause absent.
pub fn parse(record: &HeaderRecord) -> ReceivedParts<'_> {
    let mut parts = ReceivedParts::empty(record);
    let value = record.value.as_str();
    if value.is_empty() {
        return parts;
    }

    let text = match value.rfind(';') {
        Some(semi) => {
            parts.timestamp = Some(parse_timestamp(value[semi + 1..].trim()));
            &value[..semi]
        }
        None => value,
    };

    let mut state = match find_anchor(text, FROM, 0) {
        Some(pos) => ClauseScan::SeekBy {
            from: Some(pos + FROM.len()),
            search: pos + FROM.len(),
        },
        None => ClauseScan::SeekBy {
            from: None,
            search: 0,
        },
    };

    loop {
        state = match state {
            ClauseScan::SeekBy { from, search } => match find_anchor(text, BY, search) {
                Some(by) => {
                    if let Some(start) = from {
                        let (host, address) = split_host(span(text, start, clause_end(text, by)));
                        parts.from_host = Some(host);
                        parts.from_address = address;
                    }
                    ClauseScan::SeekWith { by: by + BY.len() }
                }
                None => {
                    debug!(index = record.index, "Received header has no 'by' clause");
                    ClauseScan::Done
                }
            },
            ClauseScan::SeekWith { by } => {
                let with = find_anchor(text, WITH, by);
                let end = with.map_or(text.len(), |pos| clause_end(text, pos));
                let (host, address) = split_host(span(text, by, end));
                parts.by_host = Some(host);
                parts.by_address = address;
                match with {
                    Some(pos) => ClauseScan::SeekId {
                        with: pos + WITH.len(),
                    },
                    None => {
                        debug!(index = record.index, "Received header has no 'with' clause");
                        ClauseScan::Done
                    }
                }
            }
            ClauseScan::SeekId { with } => match find_anchor(text, ID, with) {
                Some(id) => {
                    parts.with = Some(span(text, with, clause_end(text, id)).to_string());
                    ClauseScan::SeekVia {
                        open: OpenClause::Id,
                        start: id + ID.len(),
                    }
                }
                None => ClauseScan::SeekVia {
                    open: OpenClause::With,
                    start: with,
                },
            },
            ClauseScan::SeekVia { open, start } => {
                let via = find_anchor(text, VIA, start);
                let end = via.map_or(text.len(), |pos| clause_end(text, pos));
                let clause = Some(span(text, start, end).to_string());
                match open {
                    OpenClause::With => parts.with = clause,
                    OpenClause::Id => parts.id = clause,
                }
                if let Some(pos) = via {
                    parts.via = Some(text[pos + VIA.len()..].to_string());
                }
                ClauseScan::Done
            }
            ClauseScan::Done => return parts,
        };
    }
}

/// First occurrence of `keyword` at or after `from` that starts a word:
/// at the very start of `text` or right after whitespace.
fn find_anchor(text: &str, keyword: &str, from: usize) -> Option<usize> {
    let mut offset = from;
    while let Some(rel) = text.get(offset..)?.find(keyword) {
        let pos = offset + rel;
        let standalone = text[..pos]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        if standalone {
            return Some(pos);
        }
        // Keywords are ASCII, so one byte forward is still a char boundary.
        offset = pos + 1;
    }
    None
}

/// End of the clause preceding an anchor: the anchor minus the single
/// whitespace character that separates them.
fn clause_end(text: &str, anchor: usize) -> usize {
    text[..anchor]
        .chars()
        .next_back()
        .map_or(anchor, |c| anchor - c.len_utf8())
}

/// `text[start..end]`, or `""` when the clause is empty.
fn span(text: &str, start: usize, end: usize) -> &str {
    text.get(start..end.max(start)).unwrap_or("")
}

/// `"host (literal)"` → `("host", Some("literal"))`; `"host"` → `("host", None)`.
///
/// An unclosed `(` takes the literal up to the end of the clause, trailing
/// character included: `"host (1.2.3.4"` gives `Some("1.2.3.4")`, not a
/// literal shortened by one.
fn split_host(clause: &str) -> (String, Option<String>) {
    match clause.find('(') {
        Some(open) => {
            let inner = &clause[open + 1..];
            let literal = inner.find(')').map_or(inner, |close| &inner[..close]);
            (
                clause[..open].trim().to_string(),
                Some(literal.trim().to_string()),
            )
        }
        None => (clause.trim().to_string(), None),
    }
}
