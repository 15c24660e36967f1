//! Header block splitting: line unfolding and record assembly.

use tracing::trace;

use crate::model::header::HeaderRecord;
use crate::parser::encoded_word::decode_encoded_words;

/// Split a raw header block into logical [`HeaderRecord`]s.
///
/// Lines are separated by CRLF or LF. A line starting with whitespace is a
/// continuation and is appended verbatim to the current logical line; any
/// other line starts a new one. The first empty line ends the block.
///
/// Malformed lines never fail: a line without a colon becomes a record whose
/// `name` is the whole line and whose `value` is empty.
pub fn split(raw: &str) -> Vec<HeaderRecord> {
    let mut records = Vec::new();
    let mut current = String::new();

    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }

        if line.starts_with(char::is_whitespace) {
            current.push_str(line);
        } else {
            if !current.is_empty() {
                records.push(finalize(&current, records.len()));
            }
            current.clear();
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        records.push(finalize(&current, records.len()));
    }

    records
}

/// Decode one logical line and cut it into name and value.
fn finalize(line: &str, index: usize) -> HeaderRecord {
    let decoded = decode_encoded_words(line);

    let (name, value) = match decoded.find(':') {
        Some(colon) => {
            // Skip exactly one character after the colon, assumed to be the
            // space of ": ".
            let mut rest = decoded[colon + 1..].chars();
            rest.next();
            (decoded[..colon].to_string(), rest.as_str().to_string())
        }
        None => (decoded.clone(), String::new()),
    };

    trace!(index, name = %name, "Header record");
    HeaderRecord { name, value, index }
}
