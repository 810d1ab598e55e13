//! Overlapping, boundary-aware text chunking.
//!
//! Sizes are in characters. Each cut prefers, in order: a paragraph break, a
//! line break, sentence punctuation followed by a space, any whitespace, and
//! only then a hard cut at the window edge. The next chunk starts `overlap`
//! characters before the previous cut.

use std::iter::FusedIterator;

use crate::config::chunking;

/// A slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position in the chunk sequence.
    pub index: usize,
    /// Character offset of the first character in the source.
    pub offset: usize,
    /// Chunk text.
    pub text: &'a str,
}

/// Rejected chunker settings.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("chunk overlap ({overlap}) must be smaller than a non-zero chunk size ({size})")]
pub struct InvalidChunking {
    pub size: usize,
    pub overlap: usize,
}

/// Chunk settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidChunking`] if `size` is zero or `overlap >= size`.
    pub const fn new(size: usize, overlap: usize) -> Result<Self, InvalidChunking> {
        if size == 0 || overlap >= size {
            return Err(InvalidChunking { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    /// Maximum characters per chunk.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Characters shared by adjacent chunks.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into chunks. The iterator can be cloned to restart it.
    #[must_use]
    pub const fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks { text, size: self.size, overlap: self.overlap, pos: 0, char_pos: 0, index: 0 }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self { size: chunking::CHUNK_SIZE, overlap: chunking::CHUNK_OVERLAP }
    }
}

/// Iterator over the chunks of one text.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    size: usize,
    overlap: usize,
    /// Byte offset of the next chunk.
    pos: usize,
    /// Character offset of the next chunk.
    char_pos: usize,
    index: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }

        let rest = &self.text[self.pos..];
        let chunk_offset = self.char_pos;
        let index = self.index;
        self.index += 1;

        let window_end = byte_at_char(rest, self.size);
        if window_end == rest.len() {
            self.pos = self.text.len();
            return Some(Chunk { index, offset: chunk_offset, text: rest });
        }

        // A cut at or before `overlap` characters would not move the next start forward.
        let min_cut = byte_at_char(rest, self.overlap + 1);
        let cut = find_cut(&rest[..window_end], min_cut).unwrap_or(window_end);

        let cut_chars = rest[..cut].chars().count();
        let advance = cut_chars - self.overlap;
        self.pos += byte_at_char(rest, advance);
        self.char_pos += advance;

        Some(Chunk { index, offset: chunk_offset, text: &rest[..cut] })
    }
}

impl FusedIterator for Chunks<'_> {}

/// Byte offset of the `n`th character, or the string length past the end.
fn byte_at_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// Latest natural boundary in `window` that ends at or after `min_cut`.
fn find_cut(window: &str, min_cut: usize) -> Option<usize> {
    let usable = |cut: usize| (cut >= min_cut).then_some(cut);

    if let Some(cut) = window.rfind("\n\n").and_then(|i| usable(i + 2)) {
        return Some(cut);
    }
    if let Some(cut) = window.rfind('\n').and_then(|i| usable(i + 1)) {
        return Some(cut);
    }

    let bytes = window.as_bytes();
    let sentence_end = (0..bytes.len().saturating_sub(1))
        .rev()
        .find(|&i| matches!(bytes[i], b'.' | b'!' | b'?') && bytes[i + 1] == b' ');
    if let Some(cut) = sentence_end.and_then(|i| usable(i + 2)) {
        return Some(cut);
    }

    window
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .and_then(|(i, c)| usable(i + c.len_utf8()))
}
