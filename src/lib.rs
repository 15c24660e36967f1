//! `headertrace` — split raw email header blocks, decode RFC 2047
//! encoded-words, and break `Received` headers down into relay hops.
//!
//! ```
//! use headertrace::parser::{parse_received, split};
//!
//! let records = split("Received: from a (1.2.3.4) by b with ESMTP id X\r\nSubject: hi\r\n\r\n");
//! let parts = parse_received(&records[0]);
//! assert_eq!(parts.from_address.as_deref(), Some("1.2.3.4"));
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod trace;
