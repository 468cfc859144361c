//! Error type returned by the WebVTT reader and parsers.
use std::fmt::Write as _;

use thiserror::Error;

/// Errors produced while parsing a WebVTT stream.
///
/// All errors are permanent: once a parser has returned one it refuses
/// further input with `ParseError::Halted`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first block was not a single `WEBVTT` line.
    ///
    /// `reason` describes what was wrong and `block` holds the offending
    /// lines.
    #[error("failed to read WEBVTT header - {reason}\n{}", format_block(.block))]
    InvalidHeader { reason: String, block: Vec<String> },

    /// A block matched none of the comment, style, region or cue shapes, or
    /// looked like a cue but its timing line could not be parsed.
    #[error("failed to determine block classification:\n{}", format_block(.block))]
    UnclassifiableBlock { block: Vec<String> },

    /// The sample callback refused a cue.
    ///
    /// `block` holds the lines the cue was parsed from.
    #[error(
        "sample sink rejected cue {start_time}ms --> {end_time}ms:\n{}",
        format_block(.block)
    )]
    SampleRejected {
        start_time: u64,
        end_time: u64,
        block: Vec<String>,
    },

    /// More than `limit` bytes were buffered without a blank line to end the
    /// current block.
    #[error("buffered {buffered} bytes without a block boundary (limit {limit})")]
    BufferLimitExceeded { limit: usize, buffered: usize },

    /// A decryption key source was supplied; WebVTT input is never
    /// encrypted.
    #[error("encrypted WebVTT is not supported")]
    EncryptionNotSupported,

    /// The parser already failed and does not accept more input.
    #[error("parser halted after a previous error")]
    Halted,
}

impl ParseError {
    /// Returns the block attached to this error, if any.
    pub fn block(&self) -> Option<&[String]> {
        match self {
            ParseError::InvalidHeader { block, .. }
            | ParseError::UnclassifiableBlock { block }
            | ParseError::SampleRejected { block, .. } => Some(block),
            _ => None,
        }
    }
}

/// Render a block for diagnostics, one indented line per block line.
pub(crate) fn format_block(block: &[String]) -> String {
    let mut out = String::from(" --- BLOCK START ---\n");
    for line in block {
        let _ = writeln!(out, "    {}", line);
    }
    out.push_str(" --- BLOCK END ---");
    out
}
