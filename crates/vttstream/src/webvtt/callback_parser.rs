//! WebVTT parser with callback delivery.
//!
//! This module provides `WebVttParser`, a wrapper around `WebVttStream` for
//! pipelines that want results pushed to them. The caller registers two
//! callbacks when the parser is created:
//!
//! - the init callback receives the stream descriptions exactly once, just
//!   before the first cue is delivered;
//! - the sample callback receives every cue together with its stream index
//!   and returns whether it accepted the cue. A refused cue ends the parse.
//!
//! Both callbacks run synchronously inside `parse` and `flush`.
//!
//! # Examples
//!
//! ```
//! use std::cell::RefCell;
//! use vttstream::webvtt::WebVttParser;
//!
//! let streams = RefCell::new(Vec::new());
//! let cues = RefCell::new(Vec::new());
//!
//! let mut parser = WebVttParser::init(
//!     |info| streams.borrow_mut().extend(info),
//!     |_index, cue| {
//!         cues.borrow_mut().push(cue);
//!         true
//!     },
//!     None,
//! )
//! .expect("no key source given");
//!
//! parser.parse(b"WEBVTT\n\nintro\n00:01.000 --> 00:02.000\nHello\n").unwrap();
//! parser.flush().unwrap();
//! drop(parser);
//!
//! assert_eq!(streams.borrow().len(), 1);
//! assert_eq!(cues.borrow()[0].id, "intro");
//! ```
use tracing::error;

use crate::error::ParseError;
use crate::webvtt::sample::{Cue, STREAM_INDEX, StreamInfo};
use crate::webvtt::stream::{StreamResult, WebVttStream};

type InitCallback<'a> = Box<dyn FnMut(Vec<StreamInfo>) + 'a>;
type SampleCallback<'a> = Box<dyn FnMut(u32, Cue) -> bool + 'a>;

/// Provider of content decryption keys.
///
/// WebVTT text is never encrypted, so `WebVttParser::init` refuses any key
/// source it is given.
pub trait KeySource {
    /// Returns the key registered for `key_id`, if any.
    fn get_key(&self, key_id: &[u8]) -> Option<Vec<u8>>;
}

/// Push-style WebVTT parser.
///
/// Feed bytes with `parse` as they arrive and call `flush` at end of input.
/// Both return `Ok(())` while the stream is healthy; the first error is
/// returned once and every later call returns `ParseError::Halted`.
pub struct WebVttParser<'a> {
    stream: WebVttStream,
    on_init: InitCallback<'a>,
    on_sample: SampleCallback<'a>,
    halted: bool,
}

impl<'a> WebVttParser<'a> {
    /// Creates a parser delivering results to the given callbacks.
    ///
    /// Returns `ParseError::EncryptionNotSupported` if `key_source` is
    /// `Some`.
    pub fn init<I, S>(
        init_cb: I,
        sample_cb: S,
        key_source: Option<&dyn KeySource>,
    ) -> Result<Self, ParseError>
    where
        I: FnMut(Vec<StreamInfo>) + 'a,
        S: FnMut(u32, Cue) -> bool + 'a,
    {
        if key_source.is_some() {
            error!("encrypted WebVTT not supported");
            return Err(ParseError::EncryptionNotSupported);
        }
        Ok(Self {
            stream: WebVttStream::new(),
            on_init: Box::new(init_cb),
            on_sample: Box::new(sample_cb),
            halted: false,
        })
    }

    /// Pushes `data` and processes every block it completes.
    ///
    /// Not having a full block yet is not an error.
    pub fn parse(&mut self, data: &[u8]) -> Result<(), ParseError> {
        if self.halted {
            return Err(ParseError::Halted);
        }
        self.stream.push_data(data);
        self.drain()
    }

    /// Signals end of input and processes the final block.
    pub fn flush(&mut self) -> Result<(), ParseError> {
        if self.halted {
            return Err(ParseError::Halted);
        }
        self.stream.flush();
        self.drain()
    }

    /// The underlying stream, for inspecting parser state.
    pub fn stream(&self) -> &WebVttStream {
        &self.stream
    }

    /// Mutable access to the underlying stream, e.g. to change its buffer
    /// limit before feeding data.
    pub fn stream_mut(&mut self) -> &mut WebVttStream {
        &mut self.stream
    }

    fn drain(&mut self) -> Result<(), ParseError> {
        loop {
            let result = match self.stream.next_result() {
                Ok(result) => result,
                Err(e) => {
                    self.halted = true;
                    return Err(e);
                }
            };
            match result {
                StreamResult::StreamInfo(info) => (self.on_init)(vec![info]),
                StreamResult::Sample(cue) => {
                    let (start_time, end_time) = (cue.start_time, cue.end_time);
                    if !(self.on_sample)(STREAM_INDEX, cue) {
                        let e = ParseError::SampleRejected {
                            start_time,
                            end_time,
                            block: self.stream.take_last_cue_block(),
                        };
                        error!("{}", e);
                        self.halted = true;
                        return Err(e);
                    }
                }
                StreamResult::NeedsMoreData | StreamResult::EndOfStream => return Ok(()),
            }
        }
    }
}
