//! Header parsing: block splitting, encoded-word decoding, `Received` decomposition.

pub mod date;
pub mod encoded_word;
pub mod input;
pub mod received;
pub mod split;

pub use received::parse as parse_received;
pub use split::split;
