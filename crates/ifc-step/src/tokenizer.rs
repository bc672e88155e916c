//! Pass 1: turns a raw SPF byte buffer into a token stream on the tape.

use ifc_core::{parse_number, Tape};

use crate::token::TokenKind;

/// Tokenizes the whole buffer, pushing one token stream per source line
/// onto `tape`. Every line — STEP instance line or not — ends with
/// exactly one [`TokenKind::LineEnd`].
pub(crate) fn tokenize(buf: &[u8], tape: &mut Tape) {
    let mut pos = 0usize;
    while tokenize_line(buf, &mut pos, tape) {}
}

/// Tokenizes a single `;`-terminated source line starting at `*pos`,
/// advancing `*pos` past the terminator. Returns `true` if there is more
/// input to tokenize, `false` at end of file.
///
/// `is_step_line` is decided once, from the line's first non-whitespace
/// byte, and never reassigned for the rest of the line (mirrors the
/// ground-truth tokenizer: `firstToken` only gates that one decision).
/// A non-STEP line (header section, blank line) still terminates at its
/// `;` — the `;` check runs unconditionally, ahead of the "skip this
/// line's content" branch — so headers don't swallow the rest of the
/// file.
///
/// A `LINE_END` is pushed when the line actually terminated at a `;`,
/// and also when EOF cuts off a line that had already seen real content
/// (spec §4.D, "EOF behavior": exhausted mid-line still emits a
/// `LINE_END`). A call that only ever sees trailing whitespace before
/// EOF — the newline after the file's last `;`, or a wholly empty
/// buffer — saw no content and gets no `LINE_END`.
fn tokenize_line(buf: &[u8], pos: &mut usize, tape: &mut Tape) -> bool {
    let len = buf.len();
    let mut first_token = true;
    let mut is_step_line = false;

    let (eof, terminated) = loop {
        if *pos >= len {
            break (true, false);
        }
        let c = buf[*pos];
        let is_whitespace = matches!(c, b' ' | b'\n' | b'\r' | b'\t');

        if first_token && !is_whitespace {
            is_step_line = c == b'#';
            first_token = false;
        }

        if is_whitespace {
            *pos += 1;
            continue;
        }

        if c == b';' {
            *pos += 1;
            break (false, true);
        }

        if !is_step_line {
            *pos += 1;
            continue;
        }

        match c {
            b'\'' => {
                // No escape decoding: a lone '\'' always terminates the
                // string, even preceded by a backslash (spec §4.D, §9).
                *pos += 1;
                let start = *pos as u32;
                while *pos < len && buf[*pos] != b'\'' {
                    *pos += 1;
                }
                let end = *pos as u32;
                tape.push_u8(TokenKind::String as u8);
                tape.push_u32(start);
                tape.push_u32(end);
            }
            b'#' => {
                *pos += 1;
                let express_id = read_uint(buf, pos);
                tape.push_u8(TokenKind::Ref as u8);
                tape.push_u32(express_id);
            }
            b'$' | b'*' => {
                tape.push_u8(TokenKind::Empty as u8);
            }
            b'(' => tape.push_u8(TokenKind::SetBegin as u8),
            b')' => tape.push_u8(TokenKind::SetEnd as u8),
            b'0'..=b'9' => {
                let negative = *pos > 0 && buf[*pos - 1] == b'-';
                let (mut value, consumed) = parse_number(&buf[*pos..]);
                if negative {
                    value = -value;
                }
                *pos += consumed.saturating_sub(1);
                tape.push_u8(TokenKind::Real as u8);
                tape.push_f64(value);
            }
            b'.' => {
                *pos += 1;
                let start = *pos as u32;
                while *pos < len && buf[*pos] != b'.' {
                    *pos += 1;
                }
                let end = *pos as u32;
                tape.push_u8(TokenKind::Enum as u8);
                tape.push_u32(start);
                tape.push_u32(end);
            }
            b'A'..=b'Z' => {
                let start = *pos as u32;
                while *pos < len && (buf[*pos].is_ascii_uppercase() || buf[*pos].is_ascii_digit()) {
                    *pos += 1;
                }
                let end = *pos as u32;
                tape.push_u8(TokenKind::String as u8);
                tape.push_u32(start);
                tape.push_u32(end);
                *pos -= 1;
            }
            _ => {
                // Unrecognised byte inside a STEP line: skipped silently
                // (spec §7, "malformed-but-tolerated").
            }
        }

        *pos += 1;
    };

    if terminated || !first_token {
        tape.push_u8(TokenKind::LineEnd as u8);
    }
    !eof
}

/// Reads a run of decimal digits as a `u32`, leaving `*pos` at the last
/// digit consumed (the caller's common `pos += 1` advances past it).
fn read_uint(buf: &[u8], pos: &mut usize) -> u32 {
    let mut value: u32 = 0;
    let start = *pos;
    while *pos < buf.len() && buf[*pos].is_ascii_digit() {
        value = value.wrapping_mul(10).wrapping_add(u32::from(buf[*pos] - b'0'));
        *pos += 1;
    }
    if *pos > start {
        *pos -= 1;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn token_kinds(buf: &[u8]) -> Vec<TokenKind> {
        let mut tape = Tape::new();
        tokenize(buf, &mut tape);
        tape.move_to(0).unwrap();
        let mut kinds = Vec::new();
        while !tape.at_end() {
            let kind = TokenKind::from_u8(tape.read_u8().unwrap());
            match kind {
                TokenKind::String | TokenKind::Enum => {
                    tape.read_u32().unwrap();
                    tape.read_u32().unwrap();
                }
                TokenKind::Ref => {
                    tape.read_u32().unwrap();
                }
                TokenKind::Real => {
                    tape.read_f64().unwrap();
                }
                _ => {}
            }
            kinds.push(kind);
        }
        kinds
    }

    #[test]
    fn canonical_instance_line_ordering() {
        let kinds = token_kinds(b"#1=IFCPROJECT('x',$,'y');\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ref,
                TokenKind::String,
                TokenKind::SetBegin,
                TokenKind::String,
                TokenKind::Empty,
                TokenKind::String,
                TokenKind::SetEnd,
                TokenKind::LineEnd,
            ]
        );
    }

    #[test]
    fn header_lines_still_emit_a_line_end() {
        let kinds = token_kinds(b"ISO-10303-21;\nHEADER;\n");
        assert_eq!(kinds, vec![TokenKind::LineEnd, TokenKind::LineEnd]);
    }

    #[test]
    fn negative_reals_are_a_single_token() {
        let mut tape = Tape::new();
        tokenize(b"#1=IFCLENGTHMEASURE(-12.5);\n", &mut tape);
        tape.move_to(0).unwrap();
        assert_eq!(TokenKind::from_u8(tape.read_u8().unwrap()), TokenKind::Ref);
        tape.read_u32().unwrap();
        assert_eq!(TokenKind::from_u8(tape.read_u8().unwrap()), TokenKind::String);
        tape.read_u32().unwrap();
        tape.read_u32().unwrap();
        assert_eq!(TokenKind::from_u8(tape.read_u8().unwrap()), TokenKind::SetBegin);
        assert_eq!(TokenKind::from_u8(tape.read_u8().unwrap()), TokenKind::Real);
        assert_eq!(tape.read_f64().unwrap(), -12.5);
    }

    #[test]
    fn backslash_quote_still_terminates_the_string() {
        let buf = b"#1=IFCTEXT('Type G5 - 800kg/m\\X2\\00B2\\X0\\');\n";
        let kinds = token_kinds(buf);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ref,
                TokenKind::String,
                TokenKind::SetBegin,
                TokenKind::String,
                TokenKind::SetEnd,
                TokenKind::LineEnd,
            ]
        );
    }

    #[test]
    fn nested_lists_balance_set_begin_and_set_end() {
        let kinds = token_kinds(b"#1=IFCCOMPLEX(((1,2),(3,4)));\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ref,
                TokenKind::String,
                TokenKind::SetBegin,
                TokenKind::SetBegin,
                TokenKind::SetBegin,
                TokenKind::Real,
                TokenKind::Real,
                TokenKind::SetEnd,
                TokenKind::SetBegin,
                TokenKind::Real,
                TokenKind::Real,
                TokenKind::SetEnd,
                TokenKind::SetEnd,
                TokenKind::SetEnd,
                TokenKind::LineEnd,
            ]
        );
    }
}
