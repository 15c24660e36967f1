//! Relay path reconstruction from the `Received` headers of one message.

use chrono::Duration;
use serde::Serialize;

use crate::model::header::{received_records, HeaderRecord};
use crate::model::received::ReceivedParts;
use crate::parser::received;

/// One relay hop, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop<'a> {
    /// 1-based position along the path; hop 1 is the earliest relay.
    pub number: usize,

    /// The parsed `Received` header.
    pub parts: ReceivedParts<'a>,

    /// Time since the previous hop. `None` for the first hop or when either
    /// timestamp is missing or invalid. Clock skew between relays can make
    /// it negative.
    #[serde(serialize_with = "serialize_delay")]
    pub delay: Option<Duration>,
}

/// Parse every `Received` record and order them oldest first.
///
/// Relays prepend their header, so declaration order is newest first.
pub fn trace_route(records: &[HeaderRecord]) -> Vec<Hop<'_>> {
    let mut hops: Vec<Hop<'_>> = Vec::new();

    for (i, record) in received_records(records).rev().enumerate() {
        let parts = received::parse(record);
        let delay = match (hops.last().and_then(|h| h.parts.datetime()), parts.datetime()) {
            (Some(prev), Some(this)) => Some(this - prev),
            _ => None,
        };
        hops.push(Hop {
            number: i + 1,
            parts,
            delay,
        });
    }

    hops
}

/// Time from the first to the last valid timestamp along the path.
pub fn total_delay(hops: &[Hop<'_>]) -> Option<Duration> {
    let first = hops.iter().find_map(|h| h.parts.datetime())?;
    let last = hops.iter().rev().find_map(|h| h.parts.datetime())?;
    Some(last - first)
}

fn serialize_delay<S: serde::Serializer>(
    delay: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match delay {
        Some(d) => serializer.serialize_some(&d.num_seconds()),
        None => serializer.serialize_none(),
    }
}
