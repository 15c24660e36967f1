//! Loading raw header blocks from `.eml` files, mbox excerpts or stdin.

use std::io::Read;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

use crate::error::{HeaderError, Result};

/// Read a message (or bare header block) and return its header block as text.
///
/// `-` reads from stdin.
pub fn read_header_block(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| HeaderError::io(path, e))?;
        buf
    } else {
        std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HeaderError::FileNotFound(path.to_path_buf())
            } else {
                HeaderError::io(path, e)
            }
        })?
    };

    let text = decode_block_bytes(&data);
    Ok(header_block(&text).to_string())
}

/// Turn raw message bytes into text.
///
/// A byte order mark (UTF-8 or UTF-16) selects the encoding outright.
/// Without one the block must be UTF-8; anything else is read as
/// Windows-1252, which maps every byte.
pub fn decode_block_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(e) => {
            debug!(
                valid_up_to = e.valid_up_to(),
                "Header block is not UTF-8, reading as Windows-1252"
            );
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// The header part of a message: everything before the first blank line.
///
/// A leading mbox `From ` separator line is skipped.
pub fn header_block(text: &str) -> &str {
    let text = skip_from_line(text);
    let lf = text.find("\n\n");
    let crlf = text.find("\r\n\r\n");
    match (lf, crlf) {
        (Some(a), Some(b)) => &text[..a.min(b)],
        (Some(a), None) => &text[..a],
        (None, Some(b)) => &text[..b],
        (None, None) => text,
    }
}

/// Skip the `From ` separator line at the start of mbox messages.
fn skip_from_line(text: &str) -> &str {
    if text.starts_with("From ") {
        if let Some(pos) = text.find('\n') {
            return &text[pos + 1..];
        }
    }
    text
}
