//! Date parsing for the trailing `; date` of trace headers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::model::received::Timestamp;

/// Formats tried after RFC 2822 and RFC 3339, on the text with any leading
/// day-of-week removed.
const FORMATS: [&str; 8] = [
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S",
    "%b %d %H:%M:%S %Y",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Classify the date text of a `Received` header.
pub fn parse_timestamp(text: &str) -> Timestamp {
    match parse_date(text) {
        Some(dt) => Timestamp::Valid(dt),
        None => Timestamp::Invalid(text.to_string()),
    }
}

/// Parse a mail date in the shapes relays actually emit.
///
/// Handles RFC 2822 (with or without day-of-week, with a trailing
/// `(comment)`), RFC 3339, named US/European timezones, and whitespace left
/// behind by header folding.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let normalized = collapse_whitespace(date_str);
    if normalized.is_empty() {
        return None;
    }
    let cleaned = strip_trailing_comment(&normalized);

    for candidate in [normalized.as_str(), cleaned] {
        if let Ok(dt) = DateTime::parse_from_rfc2822(candidate) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(candidate) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let no_dow = strip_day_of_week(cleaned);
    let with_offset = replace_named_tz(no_dow);

    for candidate in [no_dow, with_offset.as_str()] {
        for fmt in &FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
                return Some(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    if let Some(dt) = mail_parser_date(cleaned) {
        return Some(dt);
    }

    warn!(date = date_str, "Could not parse Received date");
    None
}

/// Last resort: let `mail-parser` read it as a `Date:` header.
fn mail_parser_date(input: &str) -> Option<DateTime<Utc>> {
    use mail_parser::MessageParser;

    let fake_msg = format!("Date: {input}\n\n");
    let parsed = MessageParser::default().parse(fake_msg.as_bytes())?;
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Collapse runs of whitespace (including folded line breaks) to one space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"… +0000 (UTC)"` → `"… +0000"`.
fn strip_trailing_comment(s: &str) -> &str {
    if s.ends_with(')') {
        if let Some(open) = s.rfind('(') {
            return s[..open].trim_end();
        }
    }
    s
}

/// Strip a leading day-of-week prefix (`"Thu, "` or `"Thu "`).
fn strip_day_of_week(s: &str) -> &str {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    for day in DAYS {
        if let Some(rest) = s.strip_prefix(day) {
            let rest = rest.strip_prefix(',').unwrap_or(rest);
            if rest.starts_with(' ') {
                return rest.trim_start();
            }
        }
    }
    s
}

/// Replace a trailing timezone abbreviation with its numeric offset.
fn replace_named_tz(s: &str) -> String {
    const ZONES: [(&str, &str); 13] = [
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("CET", "+0100"),
        ("CEST", "+0200"),
        ("JST", "+0900"),
    ];
    for (name, offset) in ZONES {
        if let Some(head) = s.strip_suffix(name) {
            if head.ends_with(' ') {
                return format!("{head}{offset}");
            }
        }
    }
    s.to_string()
}
