//! ifc-core — tape, CRC32 fingerprint and number-parsing primitives.
//!
//! This crate has no notion of STEP grammar: it is the chunked
//! append-only byte arena (`tape`), the type-fingerprint hash (`crc32`)
//! and the decimal-number scanner (`numeric`) that [`ifc-step`] builds a
//! STEP-file tokenizer and indexer on top of.
//!
//! [`ifc-step`]: https://docs.rs/ifc-step

#![deny(missing_docs)]

/// The chunked append-only byte arena and its typed push/read primitives.
pub mod tape;

/// CRC32 (polynomial `0xEDB88320`) used as the type fingerprint.
pub mod crc32;

/// Longest-prefix decimal number scanner.
pub mod numeric;

pub use crc32::crc32;
pub use tape::{Position, Tape, TapeError, DEFAULT_CHUNK_SIZE};
pub use numeric::parse_number;

/// Convenient re-exports for crates building on top of the tape.
pub mod prelude {
    pub use crate::{crc32, parse_number, Position, Tape, TapeError, DEFAULT_CHUNK_SIZE};
}
