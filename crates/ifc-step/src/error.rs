//! Error types returned by the query surface.

use ifc_core::TapeError;
use thiserror::Error;

/// Errors surfaced while loading or querying a STEP file.
///
/// The tokenizer itself never fails: per the spec's "malformed-but-tolerated"
/// class (§7), unknown bytes are skipped and truncated constructs simply
/// produce whatever tokens could be recognised. This enum exists for the
/// "programming error" class instead — out-of-range tape access — plus an
/// extension point for a future caller-facing validation pass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The tape rejected a seek or typed read (§7, "programming errors").
    #[error("tape access error: {0}")]
    Tape(#[from] TapeError),

    /// A typed accessor (`get_string_argument`, `get_double_argument`, …)
    /// was called at a cursor position holding a different token kind.
    #[error("expected a {expected} token, found a {found} token at tape offset {at}")]
    UnexpectedTokenKind {
        /// The accessor's expected kind, as a short label (`"STRING"`, …).
        expected: &'static str,
        /// The kind actually found, as the same short label.
        found: &'static str,
        /// Tape offset of the mismatched token's kind byte.
        at: ifc_core::Position,
    },
}

/// Result alias used throughout the query surface.
pub type Result<T> = core::result::Result<T, LoadError>;
