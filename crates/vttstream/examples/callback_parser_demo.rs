//! Example demonstrating WebVttParser usage
//!
//! This example feeds a small WebVTT document to `WebVttParser` in uneven
//! chunks and prints the stream description and cues as the callbacks
//! receive them.

use vttstream::WebVttParser;
use vttstream::webvtt::timestamp::format_timestamp;

const DOCUMENT: &str = "WEBVTT

STYLE
::cue { color: lime }

NOTE the next cue has an identifier

intro
00:00:01.000 --> 00:00:04.000 align:start
Hello, world.

00:00:04.000 --> 00:00:04.000
This cue has no duration and is skipped.

00:00:05.000 --> 00:00:08.500
Second line
with two rows
";

fn main() {
    println!("WebVttParser Demo\n");

    let mut parser = WebVttParser::init(
        |streams| {
            for info in streams {
                println!(
                    "stream: codec={} timescale={} config={:?}",
                    info.codec_string,
                    info.timescale,
                    info.codec_config_str()
                );
            }
        },
        |index, cue| {
            println!(
                "[{}] {} --> {} id={:?} settings={:?}",
                index,
                format_timestamp(cue.start_time),
                format_timestamp(cue.end_time),
                cue.id,
                cue.settings
            );
            for line in cue.payload.lines() {
                println!("    {}", line);
            }
            true
        },
        None,
    )
    .expect("no key source given");

    // Simulate network delivery in uneven chunks.
    for chunk in DOCUMENT.as_bytes().chunks(17) {
        if let Err(e) = parser.parse(chunk) {
            eprintln!("parse error: {}", e);
            return;
        }
    }
    if let Err(e) = parser.flush() {
        eprintln!("parse error: {}", e);
        return;
    }

    println!(
        "\ndone: {} cue(s) dropped",
        parser.stream().dropped_cue_count()
    );
}
