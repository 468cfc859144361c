//! WebVTT streaming utilities.
//!
//! This module implements a pull-based parser that consumes WebVTT bytes in
//! arbitrary chunks and yields the stream description and cues one at a
//! time.
//!
//! High-level responsibilities:
//! - grouping pushed bytes into blank-line-delimited blocks (`BlockReader`)
//! - validating the `WEBVTT` header block
//! - classifying every later block as comment, style, region or cue
//! - collecting STYLE/REGION text into the stream's codec config until the
//!   first cue is seen
//! - parsing cue timings, settings and payload
//!
//! Classification is heuristic and ordered; the first matching rule wins:
//! 1. `NOTE` blocks are comments and are dropped.
//! 2. `STYLE` blocks feed the codec config (dropped after the first cue).
//! 3. `REGION` blocks do the same.
//! 4. A block whose second line holds `-->` and whose first line does not is
//!    a cue with an identifier.
//! 5. A block whose first line holds `-->` is a cue without an identifier.
//! 6. Anything else is an error that ends the stream.
//!
//! See the `WebVttStream` type below for usage examples.
use std::collections::VecDeque;

use tracing::{debug, error, warn};

use crate::error::ParseError;
use crate::webvtt::block::{Block, BlockReader};
use crate::webvtt::sample::{Cue, StreamInfo};
use crate::webvtt::timestamp::parse_timestamp;

/// Header line every WebVTT file starts with.
pub const HEADER: &str = "WEBVTT";
/// Header line preceded by a byte order mark.
pub const HEADER_WITH_BOM: &str = "\u{FEFF}WEBVTT";
/// Separator between the start and end timestamps of a cue.
pub const TIMING_DELIMITER: &str = "-->";

const NOTE: &str = "NOTE";
const STYLE: &str = "STYLE";
const REGION: &str = "REGION";

/// Default maximum number of bytes buffered without a block boundary (32 MiB).
const DEFAULT_MAX_BUFFER_SIZE: usize = 32 * 1024 * 1024;

/// Result type for stream parsing operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamResult {
    /// The stream description; yielded once, just before the first cue.
    StreamInfo(StreamInfo),
    /// A cue with a positive duration.
    Sample(Cue),
    /// More data is needed to complete the current block.
    NeedsMoreData,
    /// Input was flushed and every block has been processed.
    EndOfStream,
}

/// Shape of a block, decided from its first lines only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Comment,
    Style,
    Region,
    CueWithId,
    Cue,
    Unknown,
}

/// Classifies a block by the precedence rules described in the module docs.
///
/// A cue-shaped block can still fail later if its timing line does not
/// parse.
///
/// # Examples
/// ```
/// use vttstream::webvtt::stream::{BlockKind, classify_block};
///
/// let note = vec!["NOTE a comment".to_string()];
/// assert_eq!(classify_block(&note), BlockKind::Comment);
///
/// let cue = vec!["intro".to_string(), "00:01.000 --> 00:02.000".to_string()];
/// assert_eq!(classify_block(&cue), BlockKind::CueWithId);
/// ```
pub fn classify_block(block: &[String]) -> BlockKind {
    let Some(first) = block.first() else {
        return BlockKind::Unknown;
    };

    if is_likely_note(first) {
        BlockKind::Comment
    } else if trim_trailing(first) == STYLE {
        BlockKind::Style
    } else if trim_trailing(first) == REGION {
        BlockKind::Region
    } else if block.len() >= 2
        && !first.contains(TIMING_DELIMITER)
        && block[1].contains(TIMING_DELIMITER)
    {
        BlockKind::CueWithId
    } else if first.contains(TIMING_DELIMITER) {
        BlockKind::Cue
    } else {
        BlockKind::Unknown
    }
}

/// ASCII whitespace as the WebVTT grammar sees it, vertical tab included.
const ASCII_WHITESPACE: [char; 6] = [' ', '\t', '\n', '\x0B', '\x0C', '\r'];

fn trim_trailing(line: &str) -> &str {
    line.trim_end_matches(ASCII_WHITESPACE)
}

fn is_likely_note(line: &str) -> bool {
    line == NOTE
        || line
            .strip_prefix(NOTE)
            .is_some_and(|rest| rest.starts_with([' ', '\t']))
}

/// Cue timing parsed from the first content line of a cue block.
struct CueTiming {
    start_time: u64,
    end_time: u64,
    settings: String,
}

/// Splits a timing line into start, end and settings.
///
/// Needs at least three whitespace-separated tokens with `-->` as the second
/// one and valid timestamps around it. Any further tokens are settings.
fn parse_cue_timing(line: &str) -> Option<CueTiming> {
    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    if tokens.len() < 3 || tokens[1] != TIMING_DELIMITER {
        return None;
    }
    Some(CueTiming {
        start_time: parse_timestamp(tokens[0])?,
        end_time: parse_timestamp(tokens[2])?,
        settings: tokens[3..].join(" "),
    })
}

/// Memory-efficient streaming WebVTT parser.
///
/// `WebVttStream` accepts raw bytes via `push_data` and yields
/// `StreamResult` values through its iterator interface. Blocks are parsed as
/// soon as a blank line closes them; call `flush` once the input has ended so
/// the last block is parsed too.
///
/// The iterator never ends on its own. It yields `NeedsMoreData` when the
/// buffered bytes do not hold a complete block, and `EndOfStream` after
/// `flush` once everything is consumed. After an error every call returns
/// `ParseError::Halted`.
///
/// ## Buffer limit
///
/// Bytes are held until a block is complete. To avoid unbounded memory
/// growth on input that never contains a blank line there is a configurable
/// limit on buffered bytes, 32 MiB by default. Change it with
/// `set_max_buffer_size`; exceeding it yields
/// `ParseError::BufferLimitExceeded`.
///
/// # Examples
///
/// ```
/// use vttstream::webvtt::WebVttStream;
/// use vttstream::webvtt::stream::StreamResult;
///
/// let mut parser = WebVttStream::new();
/// let chunks: [&[u8]; 3] = [b"WEBVTT\n\n00:00:01.0", b"00 --> 00:00:02.000\nHi", b"\n"];
///
/// let mut cues = Vec::new();
/// for chunk in chunks {
///     parser.push_data(chunk);
///     for result in &mut parser {
///         match result {
///             Ok(StreamResult::Sample(cue)) => cues.push(cue),
///             Ok(StreamResult::StreamInfo(_)) => {}
///             Ok(StreamResult::NeedsMoreData) => break,
///             Ok(StreamResult::EndOfStream) => break,
///             Err(e) => panic!("{e}"),
///         }
///     }
/// }
/// parser.flush();
/// for result in &mut parser {
///     match result {
///         Ok(StreamResult::Sample(cue)) => cues.push(cue),
///         Ok(StreamResult::EndOfStream) => break,
///         Ok(_) => {}
///         Err(e) => panic!("{e}"),
///     }
/// }
///
/// assert_eq!(cues.len(), 1);
/// assert_eq!(cues[0].payload, "Hi");
/// assert_eq!(cues[0].start_time, 1000);
/// ```
#[derive(Debug)]
pub struct WebVttStream {
    reader: BlockReader,
    /// Whether the header block has been validated.
    initialized: bool,
    /// Whether the stream description has been queued.
    stream_info_dispatched: bool,
    /// Whether any cue-shaped block has been parsed; freezes the config.
    saw_cue: bool,
    /// Accumulated STYLE and REGION blocks.
    style_region_config: String,
    /// Results produced by the last block and not yet returned.
    pending: VecDeque<StreamResult>,
    /// Cues dropped for having a non-positive duration.
    dropped_cues: usize,
    /// Set after the first error.
    halted: bool,
    /// Lines of the block the most recent sample was built from.
    last_cue_block: Block,
    max_buffer_size: usize,
}

impl WebVttStream {
    /// Creates a new parser expecting a `WEBVTT` header first.
    pub fn new() -> Self {
        Self {
            reader: BlockReader::new(),
            initialized: false,
            stream_info_dispatched: false,
            saw_cue: false,
            style_region_config: String::new(),
            pending: VecDeque::new(),
            dropped_cues: 0,
            halted: false,
            last_cue_block: Block::new(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    /// Adds new data to the internal buffer for parsing.
    pub fn push_data(&mut self, data: &[u8]) {
        self.reader.push_data(data);
    }

    /// Signals that no more data will arrive.
    ///
    /// Any buffered lines not followed by a blank line become the final
    /// block.
    pub fn flush(&mut self) {
        self.reader.flush();
    }

    /// Whether the header has been read.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a cue-shaped block has been parsed.
    pub fn saw_cue(&self) -> bool {
        self.saw_cue
    }

    /// Whether the stream description has been produced.
    pub fn stream_info_dispatched(&self) -> bool {
        self.stream_info_dispatched
    }

    /// STYLE/REGION text collected so far.
    pub fn style_region_config(&self) -> &str {
        &self.style_region_config
    }

    /// Number of cues dropped because their end time was not after their
    /// start time.
    pub fn dropped_cue_count(&self) -> usize {
        self.dropped_cues
    }

    /// Sets the maximum number of bytes buffered without a block boundary.
    ///
    /// When more bytes than this are waiting for a blank line, a
    /// `ParseError::BufferLimitExceeded` error will be returned.
    ///
    /// # Arguments
    ///
    /// * `max_size` - Maximum size in bytes (default is 32 MiB)
    pub fn set_max_buffer_size(&mut self, max_size: usize) {
        self.max_buffer_size = max_size;
    }

    /// Gets the maximum number of bytes buffered without a block boundary.
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Bytes buffered that have not been parsed into a block yet.
    pub fn buffer_size(&self) -> usize {
        self.reader.buffer_size()
    }

    /// Releases spare capacity held by internal buffers.
    pub fn optimize_memory(&mut self) {
        self.reader.optimize_memory();
        self.pending.shrink_to_fit();
    }

    /// Takes the lines of the block the last yielded sample came from.
    ///
    /// Each block yields at most one sample and is fully drained before the
    /// next block is read, so this always matches the latest `Sample`.
    pub(crate) fn take_last_cue_block(&mut self) -> Block {
        std::mem::take(&mut self.last_cue_block)
    }

    /// Attempts to produce the next result from buffered data.
    pub(crate) fn next_result(&mut self) -> Result<StreamResult, ParseError> {
        if self.halted {
            return Err(ParseError::Halted);
        }

        loop {
            if let Some(result) = self.pending.pop_front() {
                return Ok(result);
            }

            let Some(block) = self.reader.next_block() else {
                if self.reader.is_flushed() {
                    return Ok(StreamResult::EndOfStream);
                }
                let buffered = self.reader.buffer_size();
                if buffered > self.max_buffer_size {
                    return Err(self.fail(ParseError::BufferLimitExceeded {
                        limit: self.max_buffer_size,
                        buffered,
                    }));
                }
                return Ok(StreamResult::NeedsMoreData);
            };

            if let Err(e) = self.process_block(block) {
                return Err(self.fail(e));
            }
        }
    }

    fn fail(&mut self, e: ParseError) -> ParseError {
        error!("{}", e);
        self.halted = true;
        self.pending.clear();
        e
    }

    fn process_block(&mut self, block: Block) -> Result<(), ParseError> {
        if !self.initialized {
            return self.process_header(block);
        }

        let kind = classify_block(&block);
        debug!(?kind, lines = block.len(), "classified block");
        match kind {
            BlockKind::Comment => Ok(()),
            BlockKind::Style | BlockKind::Region => {
                self.update_config(kind, &block);
                Ok(())
            }
            BlockKind::CueWithId => self.process_cue(block, true),
            BlockKind::Cue => self.process_cue(block, false),
            BlockKind::Unknown => Err(ParseError::UnclassifiableBlock { block }),
        }
    }

    /// Validates the header block. A byte order mark may precede `WEBVTT`.
    fn process_header(&mut self, block: Block) -> Result<(), ParseError> {
        if block.len() != 1 {
            return Err(ParseError::InvalidHeader {
                reason: format!("block size should be 1 but was {}", block.len()),
                block,
            });
        }
        if block[0] != HEADER && block[0] != HEADER_WITH_BOM {
            return Err(ParseError::InvalidHeader {
                reason: format!("should be {} but was {}", HEADER, block[0]),
                block,
            });
        }
        debug!("read WEBVTT header");
        self.initialized = true;
        Ok(())
    }

    fn update_config(&mut self, kind: BlockKind, block: &[String]) {
        if self.saw_cue {
            warn!("found {:?} block after seeing cue; ignoring it", kind);
            return;
        }
        if !self.style_region_config.is_empty() {
            self.style_region_config.push_str("\n\n");
        }
        self.style_region_config.push_str(&block.join("\n"));
    }

    fn process_cue(&mut self, block: Block, has_id: bool) -> Result<(), ParseError> {
        let (id, content) = if has_id {
            (block[0].as_str(), &block[1..])
        } else {
            ("", &block[..])
        };

        let Some(timing) = parse_cue_timing(&content[0]) else {
            error!(
                "could not parse start time, -->, and end time from {}",
                content[0]
            );
            return Err(ParseError::UnclassifiableBlock { block });
        };

        if !self.stream_info_dispatched {
            self.dispatch_stream_info();
        }
        self.saw_cue = true;

        // Non-positive durations are skipped, not fatal.
        if timing.end_time <= timing.start_time {
            warn!(
                "WebVTT input is not compliant. Start time ({}) should be less than end \
                 time ({}). Skipping webvtt cue:\n{}",
                timing.start_time,
                timing.end_time,
                crate::error::format_block(content)
            );
            self.dropped_cues += 1;
            return Ok(());
        }

        let cue = Cue {
            id: id.to_string(),
            start_time: timing.start_time,
            end_time: timing.end_time,
            settings: timing.settings,
            payload: content[1..].join("\n"),
        };
        self.pending.push_back(StreamResult::Sample(cue));
        self.last_cue_block = block;
        Ok(())
    }

    fn dispatch_stream_info(&mut self) {
        debug!(
            config_len = self.style_region_config.len(),
            "dispatching stream info"
        );
        self.stream_info_dispatched = true;
        let info = StreamInfo::webvtt(&self.style_region_config);
        self.pending.push_back(StreamResult::StreamInfo(info));
    }
}

impl Default for WebVttStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator implementation for convenient result processing.
impl Iterator for WebVttStream {
    type Item = Result<StreamResult, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_result())
    }
}
