//! Values emitted by the WebVTT parsers: the stream description and cues.

/// Track id reported for the single text stream.
pub const TRACK_ID: u32 = 0;
/// Index passed to the sample callback; a WebVTT file carries one stream.
pub const STREAM_INDEX: u32 = 0;
/// Cue times are expressed in milliseconds.
pub const TIMESCALE: u32 = 1000;
/// Codec string used by packagers for WebVTT in ISO-BMFF.
pub const WEBVTT_CODEC_STRING: &str = "wvtt";

/// Codec of an emitted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    WebVtt,
}

/// Description of the text stream, dispatched once before the first cue.
///
/// Duration is left at zero because the whole file would have to be read to
/// know it, and the language is filled in by a later demuxing stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub track_id: u32,
    pub timescale: u32,
    pub duration: u64,
    pub codec: Codec,
    pub codec_string: String,
    /// STYLE and REGION blocks seen before the first cue, separated by a
    /// blank line, in arrival order.
    pub codec_config: Vec<u8>,
    pub width: u16,
    pub height: u16,
    pub language: String,
    pub is_encrypted: bool,
}

impl StreamInfo {
    /// Builds the WebVTT stream description around a style/region config.
    pub fn webvtt(config: &str) -> Self {
        Self {
            track_id: TRACK_ID,
            timescale: TIMESCALE,
            duration: 0,
            codec: Codec::WebVtt,
            codec_string: WEBVTT_CODEC_STRING.to_string(),
            codec_config: config.as_bytes().to_vec(),
            width: 0,
            height: 0,
            language: String::new(),
            is_encrypted: false,
        }
    }

    /// The config blob as text (lossy if it is not valid UTF-8).
    pub fn codec_config_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.codec_config)
    }
}

/// One timed text entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cue {
    /// Cue identifier, empty when the block had none.
    pub id: String,
    /// Start time in milliseconds.
    pub start_time: u64,
    /// End time in milliseconds, always greater than `start_time`.
    pub end_time: u64,
    /// Cue settings tokens joined by single spaces.
    pub settings: String,
    /// Body lines joined by `\n`.
    pub payload: String,
}

impl Cue {
    /// Length of the cue in milliseconds, zero if `end_time` is not after
    /// `start_time`.
    pub fn duration(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }
}
