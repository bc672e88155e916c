//! Reference-graph extraction (spec §10.F, supplementing the distilled
//! core with the original `GetRefs`/`GetAllRefs` behaviour).
//!
//! The original implementation walks this recursively; per the redesign
//! note in spec §9 ("Cycles in the entity graph"), both operations here
//! are iterative with an explicit visited-set, so a malformed file whose
//! references cycle cannot blow the stack.

use std::collections::{HashSet, VecDeque};

use ifc_core::Tape;

use crate::error::Result;
use crate::index::Index;
use crate::token::TokenKind;

/// Collects the outgoing `REF` tokens of a single line, in tape order,
/// excluding the line's own leading express-id.
///
/// `tape`'s read cursor must already sit at the start of the line (see
/// [`crate::IfcStepFile::move_to_line`]); this consumes tokens up to and
/// including the line's `LINE_END`.
pub(crate) fn refs_for_line(tape: &mut Tape) -> Result<Vec<u32>> {
    let mut refs = Vec::new();
    let mut first = true;
    loop {
        let kind = TokenKind::from_u8(tape.read_u8()?);
        match kind {
            TokenKind::LineEnd => return Ok(refs),
            TokenKind::String | TokenKind::Enum => {
                tape.read_u32()?;
                tape.read_u32()?;
            }
            TokenKind::Ref => {
                let id = tape.read_u32()?;
                if first {
                    first = false;
                } else {
                    refs.push(id);
                }
            }
            TokenKind::Real => {
                tape.read_f64()?;
            }
            TokenKind::Empty | TokenKind::SetBegin | TokenKind::SetEnd | TokenKind::Unknown => {}
        }
    }
}

/// Transitive closure of references reachable from `start`, via an
/// iterative worklist rather than recursion.
pub(crate) fn all_refs_from(tape: &mut Tape, index: &Index, start: u32) -> Result<HashSet<u32>> {
    let mut visited = HashSet::new();
    if index.num_lines() == 0 {
        return Ok(visited);
    }

    let mut worklist = VecDeque::new();
    worklist.push_back(start);

    while let Some(id) = worklist.pop_front() {
        let line_id = index.express_id_to_line_id(id);
        if line_id == 0 && index.line(0).express_id != id {
            // The sentinel "not found" lookup only names a real line
            // when `id` truly lives at line 0.
            continue;
        }
        tape.move_to(index.line(line_id).tape_offset)?;
        for r in refs_for_line(tape)? {
            if visited.insert(r) {
                worklist.push_back(r);
            }
        }
    }

    Ok(visited)
}
