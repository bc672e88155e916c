//! STEP token kinds, as written to the tape's 1-byte discriminant.

/// The lexical categories the tokenizer recognises inside a STEP instance
/// line. The discriminant values are an implementation detail (stable
/// only within a single tape); nothing outside this crate should depend
/// on their numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenKind {
    /// A byte sequence that did not match any recognised token start.
    Unknown = 0,
    /// `'...'` — an identifier or quoted string; payload is `(start, end)`.
    String = 1,
    /// `.VALUE.` — payload is `(start, end)` of the interior.
    Enum = 2,
    /// A numeric literal; payload is one `f64`.
    Real = 3,
    /// `#N` — payload is one `u32` express-id.
    Ref = 4,
    /// `$` or `*` — no payload.
    Empty = 5,
    /// `(` — no payload.
    SetBegin = 6,
    /// `)` — no payload.
    SetEnd = 7,
    /// `;` — terminates a line; no payload.
    LineEnd = 8,
}

impl TokenKind {
    /// Reconstructs a [`TokenKind`] from its tape discriminant byte.
    ///
    /// # Panics
    /// Panics if `byte` is not one of the values this enum defines. A
    /// tape only ever contains discriminants this crate wrote, so this
    /// indicates tape corruption or a read at the wrong offset.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            0 => TokenKind::Unknown,
            1 => TokenKind::String,
            2 => TokenKind::Enum,
            3 => TokenKind::Real,
            4 => TokenKind::Ref,
            5 => TokenKind::Empty,
            6 => TokenKind::SetBegin,
            7 => TokenKind::SetEnd,
            8 => TokenKind::LineEnd,
            other => panic!("corrupt tape: unknown token discriminant {other}"),
        }
    }

    /// Short label used in [`crate::LoadError::UnexpectedTokenKind`] messages.
    pub(crate) fn label(self) -> &'static str {
        match self {
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::String => "STRING",
            TokenKind::Enum => "ENUM",
            TokenKind::Real => "REAL",
            TokenKind::Ref => "REF",
            TokenKind::Empty => "EMPTY",
            TokenKind::SetBegin => "SET_BEGIN",
            TokenKind::SetEnd => "SET_END",
            TokenKind::LineEnd => "LINE_END",
        }
    }
}
