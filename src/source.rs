use alloc::string::String;

use crate::error::JlstError;

/// Read cursor over an in-memory input.
///
/// Handlers sequence header and body reads explicitly; each detection attempt
/// starts from [`Source::rewind`].
#[derive(Clone, Debug)]
pub struct Source<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Source<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Total input length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Up to `n` bytes starting at the cursor, without consuming them.
    pub fn peek_slice(&self, n: usize) -> &'a [u8] {
        let end = self.pos.saturating_add(n).min(self.data.len());
        &self.data[self.pos..end]
    }

    /// Consume up to `n` bytes; shorter at end of input.
    pub fn read(&mut self, n: usize) -> &'a [u8] {
        let out = self.peek_slice(n);
        self.pos += out.len();
        out
    }

    /// Consume exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], JlstError> {
        if self.remaining() < n {
            return Err(JlstError::UnexpectedEof);
        }
        Ok(self.read(n))
    }

    /// Consume one line, dropping the `\n` or `\r\n` terminator.
    ///
    /// Returns `UnexpectedEof` at end of input. The final line may be
    /// unterminated.
    pub fn read_line(&mut self) -> Result<String, JlstError> {
        let rest = &self.data[self.pos..];
        if rest.is_empty() {
            return Err(JlstError::UnexpectedEof);
        }
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(String::from_utf8_lossy(line).into_owned())
    }

    /// Everything from the cursor to the end of input.
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    /// The whole input, independent of the cursor.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }
}
