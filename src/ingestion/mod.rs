//! Document ingestion: parsing uploaded files and splitting them into
//! embeddable chunks.

pub mod chunker;
pub mod parser;
