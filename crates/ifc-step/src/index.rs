//! Pass 2: walks the tape built by the tokenizer and produces line
//! records plus the two lookup indexes (spec §4.E).

use std::collections::HashMap;

use ifc_core::Tape;

use crate::line::LineRecord;
use crate::token::TokenKind;

/// The indexes produced by pass 2: line records, express-id → line, and
/// type fingerprint → ordered list of lines.
#[derive(Debug, Clone, Default)]
pub struct Index {
    /// One record per `LINE_END` on the tape, in source order.
    pub(crate) lines: Vec<LineRecord>,
    /// Dense: `express_id_to_line[e]` is the line index for express-id
    /// `e`, or `0` (sentinel) if `e` was never assigned.
    pub(crate) express_id_to_line: Vec<u32>,
    /// Type fingerprint → ordered (source order) list of line indices.
    pub(crate) ifc_type_to_line_id: HashMap<u32, Vec<u32>>,
}

impl Index {
    /// Walks `tape` from offset 0 to its write cursor, building line
    /// records and both indexes. `source` is the raw SPF buffer the
    /// tape's STRING/ENUM offsets point into (needed to fingerprint the
    /// type name token).
    ///
    /// Rewinds and restores the tape's read cursor: callers see the tape
    /// positioned at 0 afterwards, matching the reference design's
    /// `Reverse()` call at the end of `LoadFile`.
    pub(crate) fn build(tape: &mut Tape, source: &[u8]) -> Self {
        tape.move_to(0).expect("tape read cursor starts within bounds");

        let mut lines = Vec::new();
        let mut express_id_to_line = Vec::new();
        let mut ifc_type_to_line_id: HashMap<u32, Vec<u32>> = HashMap::new();

        let mut max_express_id: u32 = 0;
        let mut current_express_id: u32 = 0;
        let mut current_ifc_type: u32 = 0;
        let mut current_tape_offset = tape.read_offset();

        while !tape.at_end() {
            let kind = TokenKind::from_u8(tape.read_u8().expect("tape has at least one more token"));
            match kind {
                TokenKind::LineEnd => {
                    let line_index = lines.len() as u32;
                    let record = LineRecord {
                        express_id: current_express_id,
                        ifc_type: current_ifc_type,
                        line_index,
                        tape_offset: current_tape_offset,
                    };
                    ifc_type_to_line_id.entry(record.ifc_type).or_default().push(line_index);
                    max_express_id = max_express_id.max(record.express_id);
                    lines.push(record);

                    current_express_id = 0;
                    current_ifc_type = 0;
                    current_tape_offset = tape.read_offset();
                }
                TokenKind::String | TokenKind::Enum => {
                    let start = tape.read_u32().expect("STRING/ENUM token carries a start offset");
                    let end = tape.read_u32().expect("STRING/ENUM token carries an end offset");
                    if current_ifc_type == 0 {
                        current_ifc_type = ifc_core::crc32(&source[start as usize..end as usize]);
                    }
                }
                TokenKind::Ref => {
                    let id = tape.read_u32().expect("REF token carries an express-id");
                    if current_express_id == 0 {
                        current_express_id = id;
                    }
                }
                TokenKind::Real => {
                    tape.read_f64().expect("REAL token carries a double");
                }
                TokenKind::Empty | TokenKind::SetBegin | TokenKind::SetEnd | TokenKind::Unknown => {}
            }
        }

        express_id_to_line.resize(max_express_id as usize + 1, 0);
        for line in &lines {
            express_id_to_line[line.express_id as usize] = line.line_index;
        }

        tape.move_to(0).expect("rewinding to 0 after a full forward walk always succeeds");

        Self { lines, express_id_to_line, ifc_type_to_line_id }
    }

    /// Count of line records.
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Line index for express-id `e`, or `0` (sentinel) if absent.
    ///
    /// Express-id `0` is reserved and never assigned by valid input, so
    /// `0` doubles as "not found" (spec §3, "Indexes").
    pub fn express_id_to_line_id(&self, express_id: u32) -> u32 {
        self.express_id_to_line.get(express_id as usize).copied().unwrap_or(0)
    }

    /// Ordered (source order) line indices for a type fingerprint.
    pub fn line_ids_with_type(&self, ifc_type: u32) -> &[u32] {
        self.ifc_type_to_line_id.get(&ifc_type).map_or(&[], Vec::as_slice)
    }

    /// Materializes the express-ids of every line of the given type.
    pub fn express_ids_with_type(&self, ifc_type: u32) -> Vec<u32> {
        self.line_ids_with_type(ifc_type).iter().map(|&line_id| self.lines[line_id as usize].express_id).collect()
    }

    /// The line record at `line_id`.
    pub fn line(&self, line_id: u32) -> &LineRecord {
        &self.lines[line_id as usize]
    }

    /// All line records, in source order.
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }
}
