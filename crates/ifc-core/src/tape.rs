//! Chunked append-only byte arena.
//!
//! A [`Tape`] is a list of fixed-size chunks. Writes only ever append at
//! the write cursor; reads are served from a separately seekable read
//! cursor. Once allocated, a chunk's backing buffer is never resized or
//! moved, so positions handed out by [`Tape::write_offset`] stay valid for
//! the tape's whole lifetime.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

/// 1 MiB — the reference chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Absolute byte offset into a [`Tape`]. Stable once written.
pub type Position = u32;

/// Contract violations: seeking or reading past the write cursor.
///
/// The original design surfaces these as assertions (§7 of the spec);
/// this crate returns them as a typed error instead so callers that do
/// want to recover (rather than abort) have the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TapeError {
    /// `move_to` was asked to seek past the current write cursor.
    SeekPastWriteCursor {
        /// The offset the caller asked to seek to.
        requested: Position,
        /// The tape's write cursor at the time of the call.
        write_cursor: Position,
    },
    /// A typed read ran past the write cursor.
    ReadPastWriteCursor {
        /// Read cursor position the read started from.
        at: Position,
        /// Number of bytes the read needed.
        needed: u32,
    },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapeError::SeekPastWriteCursor { requested, write_cursor } => write!(
                f,
                "seek to {requested} is past the write cursor at {write_cursor}"
            ),
            TapeError::ReadPastWriteCursor { at, needed } => {
                write!(f, "read of {needed} bytes at {at} runs past the write cursor")
            }
        }
    }
}

impl std::error::Error for TapeError {}

/// Chunked append-only byte arena with typed push/read primitives.
#[derive(Debug, Clone)]
pub struct Tape {
    chunk_size: usize,
    chunks: Vec<Vec<u8>>,
    write_pos: Position,
    read_pos: Position,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    /// Creates an empty tape using [`DEFAULT_CHUNK_SIZE`] chunks.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Creates an empty tape with an explicit chunk size.
    ///
    /// Exposed mainly so tests can exercise cross-chunk-boundary reads and
    /// writes without allocating megabytes of tape.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "tape chunk size must be non-zero");
        Self { chunk_size, chunks: Vec::new(), write_pos: 0, read_pos: 0 }
    }

    /// Current write cursor (one past the last written byte).
    pub fn write_offset(&self) -> Position {
        self.write_pos
    }

    /// Current read cursor.
    pub fn read_offset(&self) -> Position {
        self.read_pos
    }

    /// True once the read cursor has caught up with the write cursor.
    pub fn at_end(&self) -> bool {
        self.read_pos == self.write_pos
    }

    /// Moves the read cursor. Errors if `pos` is past the write cursor.
    pub fn move_to(&mut self, pos: Position) -> Result<(), TapeError> {
        if pos > self.write_pos {
            return Err(TapeError::SeekPastWriteCursor { requested: pos, write_cursor: self.write_pos });
        }
        self.read_pos = pos;
        Ok(())
    }

    /// Finalizes writing and rewinds the read cursor to the start.
    ///
    /// Mirrors the reference design's `Reverse()`: the tape is logically
    /// read-only from this point on, but nothing here actually prevents
    /// further pushes — callers that finished pass 1 simply stop pushing.
    pub fn reverse(&mut self) {
        self.read_pos = 0;
    }

    fn ensure_chunk(&mut self, idx: usize) {
        while self.chunks.len() <= idx {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
        }
    }

    /// Appends raw bytes, growing into new chunks as needed.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        let mut remaining = bytes;
        while !remaining.is_empty() {
            let chunk_idx = (self.write_pos as usize) / self.chunk_size;
            let offset_in_chunk = (self.write_pos as usize) % self.chunk_size;
            self.ensure_chunk(chunk_idx);
            let space = self.chunk_size - offset_in_chunk;
            let n = remaining.len().min(space);
            self.chunks[chunk_idx].extend_from_slice(&remaining[..n]);
            self.write_pos += n as u32;
            remaining = &remaining[n..];
        }
    }

    /// Appends a single byte (used for the 1-byte token-kind discriminant).
    pub fn push_u8(&mut self, value: u8) {
        self.push_bytes(&[value]);
    }

    /// Appends a little-endian `u32`.
    pub fn push_u32(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.push_bytes(&buf);
    }

    /// Appends a little-endian `f64`.
    pub fn push_f64(&mut self, value: f64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, value);
        self.push_bytes(&buf);
    }

    fn copy_out(&self, start: Position, dest: &mut [u8]) {
        let mut pos = start as usize;
        let mut written = 0usize;
        while written < dest.len() {
            let chunk_idx = pos / self.chunk_size;
            let offset = pos % self.chunk_size;
            let space = self.chunk_size - offset;
            let n = (dest.len() - written).min(space);
            dest[written..written + n].copy_from_slice(&self.chunks[chunk_idx][offset..offset + n]);
            pos += n;
            written += n;
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TapeError> {
        let needed = N as u32;
        if self.write_pos - self.read_pos < needed {
            return Err(TapeError::ReadPastWriteCursor { at: self.read_pos, needed });
        }
        let mut buf = [0u8; N];
        self.copy_out(self.read_pos, &mut buf);
        self.read_pos += needed;
        Ok(buf)
    }

    /// Reads one byte at the read cursor, advancing it.
    pub fn read_u8(&mut self) -> Result<u8, TapeError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a little-endian `u32` at the read cursor, advancing it.
    pub fn read_u32(&mut self) -> Result<u32, TapeError> {
        Ok(LittleEndian::read_u32(&self.read_array::<4>()?))
    }

    /// Reads a little-endian `f64` at the read cursor, advancing it.
    pub fn read_f64(&mut self) -> Result<f64, TapeError> {
        Ok(LittleEndian::read_f64(&self.read_array::<8>()?))
    }

    /// Copies `end - start` bytes out of the tape into `dest`.
    ///
    /// `dest` must be at least `end - start` bytes long. Returns the
    /// number of bytes copied.
    pub fn copy(&self, start: Position, end: Position, dest: &mut [u8]) -> Result<usize, TapeError> {
        if end > self.write_pos {
            return Err(TapeError::ReadPastWriteCursor { at: start, needed: end.saturating_sub(start) });
        }
        let len = end.saturating_sub(start) as usize;
        self.copy_out(start, &mut dest[..len]);
        Ok(len)
    }
}
