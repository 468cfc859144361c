#![doc = include_str!("../README.md")]
//! vttstream — streaming block reader and cue parser for WebVTT subtitles
//!
//! `vttstream` turns a WebVTT text track, delivered as arbitrarily chunked
//! bytes, into a single stream description (`StreamInfo`) and a sequence of
//! timed text samples (`Cue`).
//!
//! Key features:
//! - Chunk-boundary independence: feeding a document byte by byte or in one
//!   piece produces the same results.
//! - Header validation with optional UTF-8 byte order mark.
//! - Ordered block classification: `NOTE` comments, `STYLE`/`REGION`
//!   configuration, cues with and without identifiers.
//! - STYLE/REGION text seen before the first cue is passed through opaquely
//!   as the stream's codec config.
//! - Tolerant handling of cues with a non-positive duration (logged and
//!   dropped) and strict handling of unrecognisable blocks (parse fails).
//!
//! Examples
//!
//! Example: pull API
//!
//! ```rust
//! use vttstream::WebVttStream;
//! use vttstream::webvtt::stream::StreamResult;
//!
//! let mut parser = WebVttStream::new();
//! parser.push_data(b"WEBVTT\n\n00:01:00.000 --> 01:00:00.000 size:50%\nsubtitle\n");
//! parser.flush();
//!
//! let mut cues = Vec::new();
//! for result in &mut parser {
//!     match result {
//!         Ok(StreamResult::StreamInfo(info)) => assert_eq!(info.timescale, 1000),
//!         Ok(StreamResult::Sample(cue)) => cues.push(cue),
//!         Ok(StreamResult::NeedsMoreData) => break,
//!         Ok(StreamResult::EndOfStream) => break,
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//!
//! assert_eq!(cues.len(), 1);
//! assert_eq!(cues[0].start_time, 60_000);
//! assert_eq!(cues[0].end_time, 3_600_000);
//! assert_eq!(cues[0].settings, "size:50%");
//! assert_eq!(cues[0].payload, "subtitle");
//! ```
//!
//! Example: callback API
//!
//! ```rust
//! use vttstream::{Cue, WebVttParser};
//!
//! let mut cues: Vec<Cue> = Vec::new();
//! {
//!     let mut parser = WebVttParser::init(
//!         |_streams| {},
//!         |_index, cue| {
//!             cues.push(cue);
//!             true
//!         },
//!         None,
//!     )
//!     .expect("no key source given");
//!
//!     for chunk in b"WEBVTT\n\nid\n00:01.000 --> 00:02.000\nHello\n".chunks(3) {
//!         parser.parse(chunk).expect("valid input");
//!     }
//!     parser.flush().expect("valid input");
//! }
//!
//! assert_eq!(cues[0].id, "id");
//! assert_eq!(cues[0].payload, "Hello");
//! ```
mod error;
pub mod webvtt;

pub use error::ParseError;
pub use webvtt::{Codec, Cue, KeySource, StreamInfo, WebVttParser, WebVttStream};
