//! Core data model types: header records and `Received` decompositions.

pub mod header;
pub mod received;
