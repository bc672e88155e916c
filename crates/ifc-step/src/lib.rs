//! ifc-step — two-pass STEP (ISO 10303-21) physical-file tokenizer and
//! indexer for IFC.
//!
//! Built on [`ifc_core`]'s tape, CRC32 fingerprint and number parser,
//! this crate adds STEP grammar: [`tokenizer`] turns a raw SPF byte
//! buffer into a token stream (pass 1), [`index`] walks that stream into
//! line records and two lookup tables (pass 2), and [`IfcStepFile`] is
//! the façade a caller actually holds — load once, then query by
//! express-id, by type fingerprint, or by tape position.
//!
//! ```
//! # use ifc_step::IfcStepFile;
//! let mut file = IfcStepFile::new();
//! file.load(b"#1=IFCPROJECT('x',$,'y');\n");
//!
//! assert_eq!(file.num_lines(), 1);
//! assert_eq!(file.line(0).express_id, 1);
//! assert_eq!(file.line(0).ifc_type, ifc_step::crc32(b"IFCPROJECT"));
//! ```

#![deny(missing_docs)]

mod index;
mod line;
mod loader;
mod refs;
mod token;
mod tokenizer;

/// Errors surfaced while querying a loaded file.
pub mod error;

pub use error::{LoadError, Result};
pub use line::LineRecord;
pub use loader::IfcStepFile;
pub use token::TokenKind;

/// CRC32 fingerprint of `data` — re-exported so callers can compute the
/// type-fingerprint keys for [`IfcStepFile::line_ids_with_type`] from the
/// IFC schema's declared type names (spec §6).
pub use ifc_core::crc32;
