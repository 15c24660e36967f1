//! Logical header records produced by the splitter.

use serde::Serialize;

/// One logical header field, after unfolding and encoded-word decoding.
///
/// Records are created once per logical line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRecord {
    /// Everything before the first colon of the decoded line.
    /// The whole line when no colon is present.
    pub name: String,

    /// Everything after the first colon, minus the single separator
    /// character assumed to follow it (normally the space of `": "`).
    pub value: String,

    /// Zero-based position in the header block (0, 1, 2, …).
    pub index: usize,
}

impl HeaderRecord {
    /// Whether this record's name matches `name`, ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this is a `Received` trace header.
    pub fn is_received(&self) -> bool {
        self.is_named("received")
    }
}

/// Iterate over the `Received` records of a block, in declaration order.
pub fn received_records(
    records: &[HeaderRecord],
) -> impl DoubleEndedIterator<Item = &HeaderRecord> {
    records.iter().filter(|r| r.is_received())
}
