//! Structured view of a `Received` trace header.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::header::HeaderRecord;

/// The trailing date of a `Received` header.
///
/// A date that was present but could not be parsed is kept as
/// [`Timestamp::Invalid`] with its original text, never replaced by a
/// default date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    Valid(DateTime<Utc>),
    Invalid(String),
}

impl Timestamp {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The parsed date, if it was valid.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid(dt) => Some(*dt),
            Self::Invalid(_) => None,
        }
    }
}

/// Decomposition of one `Received` record's value.
///
/// Every field is a projection of `source.value`. A clause whose keyword was
/// not found stays `None`; a clause that was found but empty is `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedParts<'a> {
    /// The record this was parsed from.
    pub source: &'a HeaderRecord,

    /// Host named in the `from` clause.
    pub from_host: Option<String>,

    /// Parenthesized literal of the `from` clause, usually an IP address.
    pub from_address: Option<String>,

    /// Host named in the `by` clause.
    pub by_host: Option<String>,

    /// Parenthesized literal of the `by` clause.
    pub by_address: Option<String>,

    /// Protocol or software (`with ESMTP`, `with LMTP`, …).
    pub with: Option<String>,

    /// Relay-local message identifier.
    pub id: Option<String>,

    /// Relay or transport.
    pub via: Option<String>,

    /// Date after the last `;`. `None` when the value has no `;`.
    pub timestamp: Option<Timestamp>,
}

impl<'a> ReceivedParts<'a> {
    /// A result carrying only the back-reference.
    pub fn empty(source: &'a HeaderRecord) -> Self {
        Self {
            source,
            from_host: None,
            from_address: None,
            by_host: None,
            by_address: None,
            with: None,
            id: None,
            via: None,
            timestamp: None,
        }
    }

    /// The timestamp, when present and valid.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(Timestamp::as_datetime)
    }
}
