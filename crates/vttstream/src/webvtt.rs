//! WebVTT reading utilities used by this crate.
//!
//! This module exposes the block reader, the timestamp helpers, the emitted
//! sample types and the two parser front ends: the pull-based `WebVttStream`
//! and the callback-driven `WebVttParser`.
pub mod block;
pub mod callback_parser;
pub mod sample;
pub mod stream;
pub mod timestamp;

pub use callback_parser::{KeySource, WebVttParser};
pub use sample::{Codec, Cue, StreamInfo};
pub use stream::WebVttStream;
