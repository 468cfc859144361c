use std::cell::RefCell;

use vttstream::webvtt::sample::{Codec, STREAM_INDEX, TIMESCALE};
use vttstream::{Cue, ParseError, StreamInfo, WebVttParser};

/// Everything the callbacks received during one parse.
#[derive(Debug, Default, PartialEq)]
struct Collected {
    streams: Vec<StreamInfo>,
    init_calls: usize,
    samples: Vec<Cue>,
}

/// Outcome of feeding a document and flushing.
#[derive(Debug, PartialEq)]
struct Run {
    parse: Result<(), ParseError>,
    flush: Option<Result<(), ParseError>>,
    collected: Collected,
}

/// Feed `text` in chunks of `chunk_size` bytes, then flush.
///
/// Feeding stops at the first error; `flush` is only called when every chunk
/// was accepted.
fn run_chunked(text: &[u8], chunk_size: usize) -> Run {
    let collected = RefCell::new(Collected::default());
    let (parse, flush) = {
        let mut parser = WebVttParser::init(
            |streams| {
                let mut c = collected.borrow_mut();
                c.init_calls += 1;
                c.streams.extend(streams);
            },
            |stream_index, cue| {
                assert_eq!(stream_index, STREAM_INDEX);
                collected.borrow_mut().samples.push(cue);
                true
            },
            None,
        )
        .expect("parser without key source");

        let mut parse = Ok(());
        for chunk in text.chunks(chunk_size.max(1)) {
            parse = parser.parse(chunk);
            if parse.is_err() {
                break;
            }
        }
        let flush = parse.is_ok().then(|| parser.flush());
        (parse, flush)
    };
    Run {
        parse,
        flush,
        collected: collected.into_inner(),
    }
}

fn run(text: &[u8]) -> Run {
    run_chunked(text, text.len())
}

fn run_ok(text: &[u8]) -> Collected {
    let run = run(text);
    assert_eq!(run.parse, Ok(()));
    assert_eq!(run.flush, Some(Ok(())));
    run.collected
}

#[test]
fn test_parse_empty_file() {
    let collected = run_ok(b"");
    assert!(collected.streams.is_empty());
    assert!(collected.samples.is_empty());
}

#[test]
fn test_parse_only_header() {
    let collected = run_ok(b"WEBVTT\n\n");
    assert!(collected.streams.is_empty());
    assert!(collected.samples.is_empty());
}

#[test]
fn test_parse_header_with_bom() {
    let collected = run_ok(b"\xEF\xBB\xBFWEBVTT\n\n");
    assert!(collected.streams.is_empty());
    assert!(collected.samples.is_empty());
}

#[test]
fn test_parse_header_without_trailing_newline() {
    let collected = run_ok(b"WEBVTT");
    assert!(collected.streams.is_empty());
}

#[test]
fn test_fail_header_wrong_word() {
    let run = run(b"NOT WEBVTT\n\n");
    assert!(matches!(run.parse, Err(ParseError::InvalidHeader { .. })));
    assert!(run.collected.streams.is_empty());
    assert!(run.collected.samples.is_empty());
}

#[test]
fn test_fail_header_not_one_line() {
    let run = run(b"WEBVTT\nWEBVTT\n\n");
    match run.parse {
        Err(ParseError::InvalidHeader { block, .. }) => assert_eq!(block.len(), 2),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(run.collected.streams.is_empty());
}

#[test]
fn test_header_error_waits_for_complete_block() {
    // Without a blank line the header block is not complete yet.
    let run = run(b"NOT WEBVTT\n");
    assert_eq!(run.parse, Ok(()));
    assert!(matches!(
        run.flush,
        Some(Err(ParseError::InvalidHeader { .. }))
    ));
}

#[test]
fn test_sends_stream_info() {
    let collected = run_ok(b"WEBVTT\n\n00:00:00.000 --> 00:01:00.000\nTesting\n");

    assert_eq!(collected.init_calls, 1);
    assert_eq!(collected.streams.len(), 1);
    let info = &collected.streams[0];
    assert_eq!(info.timescale, TIMESCALE);
    assert_eq!(info.codec, Codec::WebVtt);
    assert_eq!(info.codec_string, "wvtt");
    assert!(!info.is_encrypted);
    assert!(info.codec_config.is_empty());
    assert_eq!(info.language, "");
    assert_eq!((info.width, info.height), (0, 0));

    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].start_time, 0);
    assert_eq!(collected.samples[0].end_time, 60_000);
    assert_eq!(collected.samples[0].payload, "Testing");
}

#[test]
fn test_ignores_zero_duration_cues() {
    let collected =
        run_ok(b"WEBVTT\n\n00:01:00.000 --> 00:01:00.000\nThis subtitle would never show\n");
    assert_eq!(collected.streams.len(), 1);
    assert!(collected.samples.is_empty());
}

#[test]
fn test_negative_duration_cue_does_not_stop_later_cues() {
    let collected = run_ok(
        b"WEBVTT\n\n\
          00:00:05.000 --> 00:00:01.000\nbackwards\n\n\
          00:00:06.000 --> 00:00:07.000\nforwards\n",
    );
    assert_eq!(collected.init_calls, 1);
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].payload, "forwards");
}

#[test]
fn test_parse_one_cue() {
    let collected = run_ok(b"WEBVTT\n\n00:01:00.000 --> 01:00:00.000\nsubtitle\n");

    assert_eq!(collected.streams.len(), 1);
    assert_eq!(
        collected.samples,
        vec![Cue {
            id: String::new(),
            start_time: 60_000,
            end_time: 3_600_000,
            settings: String::new(),
            payload: "subtitle".to_string(),
        }]
    );
    assert_eq!(collected.samples[0].duration(), 3_540_000);
}

#[test]
fn test_parse_one_cue_with_style_and_region() {
    let collected = run_ok(
        b"WEBVTT\n\n\
          STYLE\n::cue { color:lime }\n\n\
          REGION\nid:scroll\nscrol:up\n\n\
          00:01:00.000 --> 01:00:00.000\nsubtitle\n",
    );

    assert_eq!(collected.streams.len(), 1);
    assert_eq!(
        collected.streams[0].codec_config_str(),
        "STYLE\n::cue { color:lime }\n\nREGION\nid:scroll\nscrol:up"
    );
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].payload, "subtitle");
}

#[test]
fn test_style_after_cue_is_ignored() {
    let collected = run_ok(
        b"WEBVTT\n\n\
          STYLE\n::cue { color:lime }\n\n\
          00:00:01.000 --> 00:00:02.000\na\n\n\
          STYLE\n::cue { color:red }\n\n\
          REGION\nid:late\n\n\
          00:00:03.000 --> 00:00:04.000\nb\n",
    );

    assert_eq!(collected.streams.len(), 1);
    assert_eq!(
        collected.streams[0].codec_config_str(),
        "STYLE\n::cue { color:lime }"
    );
    assert_eq!(collected.samples.len(), 2);
}

#[test]
fn test_style_header_with_trailing_vertical_tab() {
    let collected =
        run_ok(b"WEBVTT\n\nSTYLE\x0B\n::cue {}\n\n00:01.000 --> 00:02.000\nx\n\n");
    assert_eq!(collected.streams.len(), 1);
    assert_eq!(
        collected.streams[0].codec_config_str(),
        "STYLE\u{B}\n::cue {}"
    );
    assert_eq!(collected.samples.len(), 1);
}

#[test]
fn test_style_after_dropped_cue_is_ignored() {
    let collected = run_ok(
        b"WEBVTT\n\n\
          00:00:02.000 --> 00:00:02.000\nzero\n\n\
          STYLE\n::cue { color:red }\n\n\
          00:00:03.000 --> 00:00:04.000\nb\n",
    );
    assert_eq!(collected.streams.len(), 1);
    assert!(collected.streams[0].codec_config.is_empty());
    assert_eq!(collected.samples.len(), 1);
}

#[test]
fn test_parse_one_empty_cue() {
    let collected = run_ok(b"WEBVTT\n\n00:01:00.000 --> 01:00:00.000\n\n");
    assert_eq!(collected.streams.len(), 1);
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].payload, "");
}

#[test]
fn test_fail_cue_with_arrow_in_id() {
    let run = run(b"WEBVTT\n\n-->\n00:01:00.000 --> 01:00:00.000\nsubtitle\n");
    // The block is only complete once the input is flushed.
    assert_eq!(run.parse, Ok(()));
    match run.flush {
        Some(Err(ParseError::UnclassifiableBlock { block })) => {
            assert_eq!(block[0], "-->");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(run.collected.samples.is_empty());
}

#[test]
fn test_fail_single_line_block() {
    let run = run(b"WEBVTT\n\nnot a cue\n\n");
    assert!(matches!(
        run.parse,
        Err(ParseError::UnclassifiableBlock { .. })
    ));
}

#[test]
fn test_fail_cue_with_bad_timing() {
    let run = run(b"WEBVTT\n\nid\n00:01:00.000 --> 1:00:00\nsubtitle\n\n");
    assert!(matches!(
        run.parse,
        Err(ParseError::UnclassifiableBlock { .. })
    ));
    assert!(run.collected.streams.is_empty());
}

#[test]
fn test_parse_one_cue_with_id() {
    let collected = run_ok(b"WEBVTT\n\nid\n00:01:00.000 --> 01:00:00.000\nsubtitle\n");
    assert_eq!(collected.streams.len(), 1);
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].id, "id");
    assert_eq!(collected.samples[0].payload, "subtitle");
}

#[test]
fn test_parse_one_empty_cue_with_id() {
    let collected = run_ok(b"WEBVTT\n\nid\n00:01:00.000 --> 01:00:00.000\n\n");
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].id, "id");
    assert_eq!(collected.samples[0].payload, "");
}

#[test]
fn test_parse_one_cue_with_settings() {
    let collected = run_ok(b"WEBVTT\n\n00:01:00.000 --> 01:00:00.000 size:50%\nsubtitle\n");
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].settings, "size:50%");
}

#[test]
fn test_parse_multi_line_payload() {
    let collected =
        run_ok(b"WEBVTT\n\n00:01.000 --> 00:02.000 align:start line:0\nfirst\nsecond\n");
    assert_eq!(collected.samples[0].settings, "align:start line:0");
    assert_eq!(collected.samples[0].payload, "first\nsecond");
}

#[test]
fn test_parse_multiple_cues() {
    let collected = run_ok(
        b"WEBVTT\n\n\
          00:00:01.000 --> 00:00:05.200\nsubtitle A\n\n\
          00:00:02.321 --> 00:00:07.000\nsubtitle B\n\n\
          00:00:05.800 --> 00:00:08.000\nsubtitle C\n",
    );

    assert_eq!(collected.streams.len(), 1);
    let timings: Vec<(u64, u64, &str)> = collected
        .samples
        .iter()
        .map(|c| (c.start_time, c.duration(), c.payload.as_str()))
        .collect();
    assert_eq!(
        timings,
        vec![
            (1000, 4200, "subtitle A"),
            (2321, 4679, "subtitle B"),
            (5800, 2200, "subtitle C"),
        ]
    );
}

#[test]
fn test_parse_with_comments() {
    let collected = run_ok(
        b"WEBVTT\n\n\
          NOTE This is a one line comment\n\n\
          00:00:01.000 --> 00:00:05.200\nsubtitle A\n\n\
          NOTE\nThis is a multi-line comment\n\n\
          00:00:02.321 --> 00:00:07.000\nsubtitle B\n\n\
          NOTE This is a single line comment that\nspans two lines\n\n\
          NOTE\tThis is a comment that using a tab\n\n\
          00:00:05.800 --> 00:00:08.000\nsubtitle C\n",
    );

    assert_eq!(collected.streams.len(), 1);
    let payloads: Vec<&str> = collected.samples.iter().map(|c| c.payload.as_str()).collect();
    assert_eq!(payloads, vec!["subtitle A", "subtitle B", "subtitle C"]);
}

#[test]
fn test_crlf_line_endings() {
    let collected = run_ok(
        b"WEBVTT\r\n\r\nid\r\n00:00:01.000 --> 00:00:02.000\r\nline one\r\nline two\r\n\r\n",
    );
    assert_eq!(collected.samples.len(), 1);
    assert_eq!(collected.samples[0].id, "id");
    assert_eq!(collected.samples[0].payload, "line one\nline two");
}

#[test]
fn test_chunk_boundary_independence() {
    let text: &[u8] = b"\xEF\xBB\xBFWEBVTT\r\n\r\n\
          STYLE\r\n::cue { color:lime }\r\n\r\n\
          NOTE skipped\r\n\r\n\
          intro\r\n00:00:01.000 --> 00:00:05.200 size:50%\r\nsubtitle A\r\n\r\n\r\n\
          00:00:05.200 --> 00:00:05.200\r\nzero\r\n\r\n\
          00:02.321 --> 00:07.000\rsubtitle B\r\rREGION\rid:late\r\r\
          00:00:05.800 --> 00:00:08.000\nsubtitle C\nmore";

    let whole = run(text);
    assert_eq!(whole.parse, Ok(()));
    assert_eq!(whole.flush, Some(Ok(())));
    assert_eq!(whole.collected.init_calls, 1);
    assert_eq!(whole.collected.samples.len(), 3);
    assert_eq!(whole.collected.samples[0].id, "intro");
    assert_eq!(whole.collected.samples[1].payload, "subtitle B");
    assert_eq!(whole.collected.samples[2].payload, "subtitle C\nmore");
    assert_eq!(
        whole.collected.streams[0].codec_config_str(),
        "STYLE\n::cue { color:lime }"
    );

    for chunk_size in [1, 2, 3, 5, 7, 13, 64] {
        assert_eq!(
            run_chunked(text, chunk_size),
            whole,
            "chunk size {}",
            chunk_size
        );
    }
}

#[test]
fn test_failure_is_permanent() {
    let mut parser = WebVttParser::init(|_| {}, |_, _| true, None).unwrap();
    assert!(parser.parse(b"WEBVTT\n\nbogus\n\n").is_err());
    assert_eq!(parser.parse(b"00:01.000 --> 00:02.000\nx\n\n"), Err(ParseError::Halted));
    assert_eq!(parser.flush(), Err(ParseError::Halted));
}
