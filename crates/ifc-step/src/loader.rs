//! [`IfcStepFile`]: the façade tying tokenizer, indexer and query surface
//! together behind the lifecycle described in spec §3.

use std::collections::HashSet;

use ifc_core::{Position, Tape};

use crate::error::{LoadError, Result};
use crate::index::Index;
use crate::line::LineRecord;
use crate::refs;
use crate::token::TokenKind;
use crate::tokenizer::tokenize;

/// A loaded STEP (ISO 10303-21) physical file: tokenized onto a tape and
/// indexed by express-id and by type fingerprint.
///
/// Borrows its source buffer for the whole of its lifetime — `'src` —
/// since `STRING`/`ENUM` tokens on the tape are just `(start, end)`
/// offsets into it (spec §3, "the raw source buffer must remain live for
/// the lifetime of the loader"). Constructed empty via [`Self::new`];
/// [`Self::load`] performs both passes and flips [`Self::is_open`].
///
/// The read cursor used by the `move_to_*`/`get_*_argument` family is
/// shared, mutable state on `self` (spec §5: "the reference design keeps
/// a single shared read cursor"); callers issuing queries from multiple
/// threads must serialize access or clone an already-loaded file's tape.
#[derive(Debug, Default)]
pub struct IfcStepFile<'src> {
    source: &'src [u8],
    tape: Tape,
    index: Index,
    open: bool,
}

impl<'src> IfcStepFile<'src> {
    /// Constructs an empty, unopened loader.
    pub fn new() -> Self {
        Self { source: &[], tape: Tape::new(), index: Index::default(), open: false }
    }

    /// Tokenizes and indexes `content` (pass 1 then pass 2). Idempotent
    /// only in the sense that calling it again on a fresh loader replaces
    /// prior state entirely — there is no incremental update path (spec
    /// §3, "Lifecycle").
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, content), fields(bytes = content.len()))
    )]
    pub fn load(&mut self, content: &'src [u8]) {
        self.source = content;
        self.tape = Tape::new();

        tokenize(content, &mut self.tape);
        #[cfg(feature = "tracing")]
        tracing::debug!(tape_bytes = self.tape.write_offset(), "pass 1: tokenized");

        self.index = Index::build(&mut self.tape, content);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            lines = self.index.num_lines(),
            max_express_id = self.index.express_id_to_line.len().saturating_sub(1),
            "pass 2: indexed"
        );

        self.open = true;
    }

    /// Whether [`Self::load`] has been called on this loader.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Count of line records (spec §4.F).
    pub fn num_lines(&self) -> usize {
        self.index.num_lines()
    }

    /// Ordered (source order) line indices for a type fingerprint.
    pub fn line_ids_with_type(&self, ifc_type: u32) -> &[u32] {
        self.index.line_ids_with_type(ifc_type)
    }

    /// Materializes the express-ids of every line of the given type.
    pub fn express_ids_with_type(&self, ifc_type: u32) -> Vec<u32> {
        self.index.express_ids_with_type(ifc_type)
    }

    /// Line index for express-id `e`, or `0` (sentinel) if absent —
    /// callers must check (spec §8, "Boundary behaviours").
    pub fn express_id_to_line_id(&self, express_id: u32) -> u32 {
        self.index.express_id_to_line_id(express_id)
    }

    /// The line record at `line_id`.
    pub fn line(&self, line_id: u32) -> &LineRecord {
        self.index.line(line_id)
    }

    /// All line records, in source order.
    pub fn lines(&self) -> &[LineRecord] {
        self.index.lines()
    }

    /// Seeks the read cursor to an absolute tape offset.
    pub fn move_to(&mut self, offset: Position) -> Result<()> {
        self.tape.move_to(offset)?;
        Ok(())
    }

    /// Seeks the read cursor to the start of `line_id`'s first token.
    pub fn move_to_line(&mut self, line_id: u32) -> Result<()> {
        self.move_to(self.line(line_id).tape_offset)
    }

    /// Seeks the read cursor to the start of argument `argument_index` of
    /// `line_id`: argument 0 is the first value inside the top-level
    /// `SET_BEGIN` (spec §4.F).
    ///
    /// `movedOver` starts at -3 to skip the express-id, the type name and
    /// the opening `SET_BEGIN`; while a nested set is open the counter
    /// freezes, so a list-valued argument counts as a single argument.
    pub fn move_to_argument(&mut self, line_id: u32, argument_index: i32) -> Result<()> {
        self.move_to_line(line_id)?;

        let mut moved_over: i32 = -3;
        let mut inside_set = false;
        loop {
            if moved_over == argument_index && !inside_set {
                return Ok(());
            }
            if !inside_set {
                moved_over += 1;
            }

            let kind = TokenKind::from_u8(self.tape.read_u8()?);
            match kind {
                TokenKind::SetBegin => inside_set = moved_over != 0,
                TokenKind::SetEnd => inside_set = false,
                TokenKind::String | TokenKind::Enum => {
                    self.tape.read_u32()?;
                    self.tape.read_u32()?;
                }
                TokenKind::Ref => {
                    self.tape.read_u32()?;
                }
                TokenKind::Real => {
                    self.tape.read_f64()?;
                }
                TokenKind::Empty | TokenKind::Unknown => {}
                TokenKind::LineEnd => {
                    debug_assert!(false, "argument {argument_index} not found before LINE_END");
                    return Ok(());
                }
            }
        }
    }

    fn expect_kind(&mut self, expected: TokenKind) -> Result<()> {
        let at = self.tape.read_offset();
        let found = TokenKind::from_u8(self.tape.read_u8()?);
        if found != expected {
            return Err(LoadError::UnexpectedTokenKind { expected: expected.label(), found: found.label(), at });
        }
        Ok(())
    }

    /// Reads a `STRING`/`ENUM`-shaped token at the cursor, returning the
    /// raw (undecoded) source slice it references.
    pub fn get_string_argument(&mut self) -> Result<&'src str> {
        let at = self.tape.read_offset();
        let kind = TokenKind::from_u8(self.tape.read_u8()?);
        if kind != TokenKind::String && kind != TokenKind::Enum {
            return Err(LoadError::UnexpectedTokenKind { expected: "STRING", found: kind.label(), at });
        }
        let start = self.tape.read_u32()? as usize;
        let end = self.tape.read_u32()? as usize;
        // The tokenizer only ever records offsets bounding byte ranges of
        // `self.source`; no decoding is attempted (spec's non-goals).
        Ok(std::str::from_utf8(&self.source[start..end]).unwrap_or_default())
    }

    /// Reads a `REAL` token at the cursor.
    pub fn get_double_argument(&mut self) -> Result<f64> {
        self.expect_kind(TokenKind::Real)?;
        Ok(self.tape.read_f64()?)
    }

    /// Reads a `REAL` token at an explicit tape offset, without disturbing
    /// a previously positioned cursor beyond this call.
    pub fn get_double_argument_at(&mut self, tape_offset: Position) -> Result<f64> {
        self.move_to(tape_offset)?;
        self.get_double_argument()
    }

    /// Reads a `REF` token at the cursor.
    pub fn get_ref_argument(&mut self) -> Result<u32> {
        self.expect_kind(TokenKind::Ref)?;
        Ok(self.tape.read_u32()?)
    }

    /// Reads a `REF` token at an explicit tape offset.
    pub fn get_ref_argument_at(&mut self, tape_offset: Position) -> Result<u32> {
        self.move_to(tape_offset)?;
        self.get_ref_argument()
    }

    /// Consumes a `SET_BEGIN` at the cursor and returns the tape offsets
    /// of each top-level element up to the matching `SET_END`. Nested
    /// sets are skipped as opaque single elements (their own offset is
    /// not recorded, only balanced over).
    pub fn get_set_argument(&mut self) -> Result<Vec<Position>> {
        self.expect_kind(TokenKind::SetBegin)?;

        let mut offsets = Vec::new();
        let mut depth = 1i32;
        loop {
            let offset = self.tape.read_offset();
            let kind = TokenKind::from_u8(self.tape.read_u8()?);
            match kind {
                TokenKind::SetBegin => depth += 1,
                TokenKind::SetEnd => depth -= 1,
                TokenKind::Real => {
                    self.tape.read_f64()?;
                    offsets.push(offset);
                }
                TokenKind::Ref => {
                    self.tape.read_u32()?;
                    offsets.push(offset);
                }
                TokenKind::String | TokenKind::Enum => {
                    self.tape.read_u32()?;
                    self.tape.read_u32()?;
                    offsets.push(offset);
                }
                TokenKind::Empty => offsets.push(offset),
                TokenKind::Unknown | TokenKind::LineEnd => {
                    debug_assert!(false, "unexpected {kind:?} inside a set argument");
                }
            }
            if depth == 0 {
                break;
            }
        }
        Ok(offsets)
    }

    /// Copies the tape bytes spanning express-id `e`'s line, from its
    /// first token up to (not including) the next line's first token.
    ///
    /// Per the redesign resolving the original's documented TODO (spec
    /// §9/§10.F): rather than assuming `e + 1` is itself a present
    /// express-id, this uses `e`'s line index and the next line record
    /// in *source order*, falling back to the tape's write cursor when
    /// `e`'s line is the last one.
    pub fn copy_tape_for_express_line(&self, express_id: u32, dest: &mut [u8]) -> Result<usize> {
        let line_id = self.index.express_id_to_line_id(express_id);
        let start = self.index.line(line_id).tape_offset;
        let end = self
            .index
            .lines()
            .get(line_id as usize + 1)
            .map_or_else(|| self.tape.write_offset(), |next| next.tape_offset);
        Ok(self.tape.copy(start, end, dest)?)
    }

    /// Outgoing `REF` tokens of `line_id`, excluding the line's own
    /// leading express-id (spec §10.F, "Reference graph extraction").
    pub fn refs_for_line(&mut self, line_id: u32) -> Result<Vec<u32>> {
        self.move_to_line(line_id)?;
        refs::refs_for_line(&mut self.tape)
    }

    /// Transitive closure of express-ids reachable from `start`, computed
    /// iteratively so a malformed cyclic file cannot exhaust the stack.
    pub fn all_refs_from(&mut self, start: u32) -> Result<HashSet<u32>> {
        refs::all_refs_from(&mut self.tape, &self.index, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_sets_the_open_flag() {
        let mut file = IfcStepFile::new();
        assert!(!file.is_open());
        file.load(b"#1=IFCPROJECT('x',$,'y');\n");
        assert!(file.is_open());
    }

    #[test]
    fn empty_input_opens_with_zero_lines() {
        let mut file = IfcStepFile::new();
        file.load(b"");
        assert!(file.is_open());
        assert_eq!(file.num_lines(), 0);
    }

    #[test]
    fn reads_arguments_of_a_simple_instance_line() {
        let mut file = IfcStepFile::new();
        file.load(b"#1=IFCPROJECT('x',$,'y');\n");

        file.move_to_argument(0, 0).unwrap();
        assert_eq!(file.get_string_argument().unwrap(), "x");

        file.move_to_argument(0, 2).unwrap();
        assert_eq!(file.get_string_argument().unwrap(), "y");
    }

    #[test]
    fn get_set_argument_returns_offsets_for_each_element() {
        let mut file = IfcStepFile::new();
        file.load(b"#2=IFCREAL((1.5,-2.0,3e2));\n");

        file.move_to_argument(0, 0).unwrap();
        let offsets = file.get_set_argument().unwrap();
        assert_eq!(offsets.len(), 3);

        let values: Vec<f64> = offsets.iter().map(|&o| file.get_double_argument_at(o).unwrap()).collect();
        assert_eq!(values, vec![1.5, -2.0, 300.0]);
    }

    #[test]
    fn a_nested_list_counts_as_one_top_level_argument() {
        let mut file = IfcStepFile::new();
        file.load(b"#1=IFCCOMPLEX((1,2),3);\n");

        // Argument 0 is the nested (1,2) list; argument 1 is the bare 3.
        file.move_to_argument(0, 1).unwrap();
        assert_eq!(file.get_double_argument().unwrap(), 3.0);
    }

    #[test]
    fn copy_tape_for_express_line_round_trips_through_the_tokenizer() {
        let src: &[u8] = b"#1=IFCWALL();\n#2=IFCSLAB();\n";
        let mut file = IfcStepFile::new();
        file.load(src);

        let line0_len = (file.line(1).tape_offset - file.line(0).tape_offset) as usize;
        let mut dest = vec![0u8; line0_len];
        let copied = file.copy_tape_for_express_line(1, &mut dest).unwrap();
        assert_eq!(copied, line0_len);

        let mut reference = Tape::new();
        tokenize(b"#1=IFCWALL();\n", &mut reference);
        let mut expected = vec![0u8; reference.write_offset() as usize];
        reference.copy(0, reference.write_offset(), &mut expected).unwrap();

        assert_eq!(dest, expected);
    }

    #[test]
    fn refs_for_line_excludes_the_lines_own_express_id() {
        let mut file = IfcStepFile::new();
        file.load(b"#1=IFCRELAGGREGATES(#2,#3);\n#2=IFCWALL();\n#3=IFCSLAB();\n");

        let refs = file.refs_for_line(0).unwrap();
        assert_eq!(refs, vec![2, 3]);
    }

    #[test]
    fn all_refs_from_follows_the_transitive_closure() {
        let mut file = IfcStepFile::new();
        file.load(b"#1=IFCRELAGGREGATES(#2);\n#2=IFCRELAGGREGATES(#3);\n#3=IFCWALL();\n");

        let reachable = file.all_refs_from(1).unwrap();
        assert_eq!(reachable, HashSet::from([2, 3]));
    }

    #[test]
    fn all_refs_from_tolerates_a_cycle() {
        let mut file = IfcStepFile::new();
        file.load(b"#1=IFCRELAGGREGATES(#2);\n#2=IFCRELAGGREGATES(#1);\n");

        let reachable = file.all_refs_from(1).unwrap();
        assert_eq!(reachable, HashSet::from([1, 2]));
    }
}
