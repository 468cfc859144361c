//! Incremental line and block reader for WebVTT text.
//!
//! A WebVTT file is a series of blocks: runs of non-blank lines separated by
//! one or more blank lines. `BlockReader` accepts raw bytes in chunks of any
//! size and hands back complete blocks once a blank line (or `flush`) marks
//! their end. Feeding a document byte by byte or all at once yields the same
//! blocks.
//!
//! Lines may end in `\n`, `\r\n` or a lone `\r`. A `\r` that is the last
//! buffered byte is held until the following byte shows whether it starts a
//! `\r\n` pair. A UTF-8 byte order mark at the start of the stream is kept
//! in the first line's text.
use tracing::trace;

/// One blank-line-delimited group of non-blank lines.
pub type Block = Vec<String>;

/// Stateful reader that groups pushed bytes into blocks.
///
/// # Examples
/// ```
/// use vttstream::webvtt::block::BlockReader;
///
/// let mut reader = BlockReader::new();
/// reader.push_data(b"WEBVTT\n\n00:00.000 --> 00:01.000\nHel");
/// assert_eq!(reader.next_block(), Some(vec!["WEBVTT".to_string()]));
/// // The cue block is still open.
/// assert_eq!(reader.next_block(), None);
///
/// reader.push_data(b"lo\n");
/// reader.flush();
/// assert_eq!(
///     reader.next_block(),
///     Some(vec!["00:00.000 --> 00:01.000".to_string(), "Hello".to_string()])
/// );
/// assert_eq!(reader.next_block(), None);
/// ```
#[derive(Debug, Default)]
pub struct BlockReader {
    /// Bytes not yet split into lines.
    buffer: Vec<u8>,
    /// Lines of the block currently being assembled.
    pending: Block,
    /// Total byte length of `pending` lines.
    pending_bytes: usize,
    /// Set once the caller has signalled end of input.
    flushed: bool,
    /// Offset in `buffer` up to which no line terminator was found.
    scanned: usize,
}

impl BlockReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        trace!(len = data.len(), "push_data");
        self.buffer.extend_from_slice(data);
    }

    /// Marks the end of input.
    ///
    /// After this the remaining buffered lines form one final block even if
    /// no blank line follows them.
    pub fn flush(&mut self) {
        self.flushed = true;
    }

    /// Returns `true` once `flush` has been called.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Number of bytes held that have not been returned as part of a block.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len() + self.pending_bytes
    }

    /// Releases spare capacity of the internal buffers.
    pub fn optimize_memory(&mut self) {
        self.buffer.shrink_to_fit();
        self.pending.shrink_to_fit();
    }

    /// Returns the next complete block, or `None` if more data is needed
    /// (or, after `flush`, when the input is exhausted).
    pub fn next_block(&mut self) -> Option<Block> {
        let mut consumed = 0;
        let mut block = None;

        while let Some((line, next)) = self.split_line(consumed) {
            consumed = next;
            if line.is_empty() {
                if !self.pending.is_empty() {
                    block = Some(self.take_pending());
                    break;
                }
                continue;
            }
            self.pending_bytes += line.len();
            self.pending.push(line);
        }

        self.buffer.drain(..consumed);
        self.scanned = self.scanned.saturating_sub(consumed);

        if block.is_none() && self.flushed && !self.pending.is_empty() {
            block = Some(self.take_pending());
        }
        if let Some(ref b) = block {
            trace!(lines = b.len(), buffered = self.buffer.len(), "block ready");
        }
        block
    }

    fn take_pending(&mut self) -> Block {
        self.pending_bytes = 0;
        std::mem::take(&mut self.pending)
    }

    /// Splits one line off the buffer starting at `start`.
    ///
    /// Returns the decoded line (terminator stripped) and the offset just
    /// past its terminator, or `None` when no complete line is available.
    /// The terminator search resumes at `scanned` so an unterminated tail is
    /// only looked at once.
    fn split_line(&mut self, start: usize) -> Option<(String, usize)> {
        let len = self.buffer.len();
        if start >= len {
            return None;
        }

        let from = self.scanned.max(start);
        let found = self.buffer[from..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map(|i| from + i);

        let (end, next) = match found {
            Some(i) if self.buffer[i] == b'\n' => (i, i + 1),
            Some(i) => match self.buffer.get(i + 1) {
                Some(b'\n') => (i, i + 2),
                Some(_) => (i, i + 1),
                // A trailing CR may be the first half of a CRLF pair.
                None if self.flushed => (i, i + 1),
                None => {
                    self.scanned = i;
                    return None;
                }
            },
            None if self.flushed => (len, len),
            None => {
                self.scanned = len;
                return None;
            }
        };

        self.scanned = next;
        let line = String::from_utf8_lossy(&self.buffer[start..end]).into_owned();
        Some((line, next))
    }
}

impl Iterator for BlockReader {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block()
    }
}
