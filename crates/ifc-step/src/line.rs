//! Line records: the per-instance-line summary the indexer produces.

use ifc_core::Position;

/// One STEP source line, as summarized by the indexer (pass 2).
///
/// Every `LINE_END` token on the tape produces exactly one `LineRecord`,
/// in source order — including header/non-instance lines, for which
/// `express_id` and `ifc_type` are both `0` (spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineRecord {
    /// The `#N` identifier of the entity this line defines, or `0` for a
    /// non-instance line.
    pub express_id: u32,
    /// CRC32 fingerprint of the entity's type name, or `0` for a
    /// non-instance line.
    pub ifc_type: u32,
    /// This line's ordinal position in the lines vector.
    pub line_index: u32,
    /// Absolute tape position of the line's first token.
    pub tape_offset: Position,
}
