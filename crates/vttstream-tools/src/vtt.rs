use std::fs::File;
use std::io::{Read, stdin};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use flate2::read::GzDecoder;
use vttstream::webvtt::stream::{StreamResult, WebVttStream};
use vttstream::webvtt::timestamp::format_timestamp;
use vttstream::{Cue, ParseError, StreamInfo};

use comfy_table::{Cell, ContentArrangement, Table, presets::NOTHING};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest payload preview shown in the cue table, in terminal columns.
const PAYLOAD_PREVIEW_WIDTH: usize = 48;

/// Pad a &str to a target display width (columns) using unicode-width to
/// account for fullwidth characters. Pads with spaces on the right.
fn pad_to_width(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

/// Cut `s` to at most `width` display columns, marking the cut with `…`.
fn truncate_to_width(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1F && data[1] == 0x8B
}

/// Read WebVTT bytes from a path or stdin ('-') into a Vec<u8>.
///
/// Gzipped input (a `.gz` extension or the gzip magic bytes) is
/// decompressed.
pub fn read_vtt_as_vec(path: &PathBuf) -> anyhow::Result<Vec<u8>> {
    let mut inbuf = Vec::new();
    if path == Path::new("-") {
        stdin()
            .read_to_end(&mut inbuf)
            .context("failed to read from stdin")?;
    } else {
        let mut f = File::open(path)
            .with_context(|| format!("failed to open input file: {}", path.display()))?;
        f.read_to_end(&mut inbuf)
            .context("failed to read input file")?;
    }

    let has_gz_ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if has_gz_ext || is_gzip(&inbuf) {
        let mut decoder = GzDecoder::new(&inbuf[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .context("failed to decompress gzip input")?;
        Ok(out)
    } else {
        Ok(inbuf)
    }
}

/// Everything a full parse of one document produced.
#[derive(Debug, Default)]
pub(crate) struct ParsedVtt {
    pub stream_info: Option<StreamInfo>,
    pub cues: Vec<Cue>,
    pub dropped_cues: usize,
}

/// Run `data` through `WebVttStream`, `chunk_size` bytes at a time.
pub(crate) fn parse_document(data: &[u8], chunk_size: usize) -> Result<ParsedVtt, ParseError> {
    let mut parser = WebVttStream::new();
    let mut parsed = ParsedVtt::default();

    let mut drain = |parser: &mut WebVttStream| -> Result<(), ParseError> {
        for result in parser {
            match result? {
                StreamResult::StreamInfo(info) => parsed.stream_info = Some(info),
                StreamResult::Sample(cue) => parsed.cues.push(cue),
                StreamResult::NeedsMoreData | StreamResult::EndOfStream => break,
            }
        }
        Ok(())
    };

    for chunk in data.chunks(chunk_size.max(1)) {
        parser.push_data(chunk);
        drain(&mut parser)?;
    }
    parser.flush();
    drain(&mut parser)?;

    parsed.dropped_cues = parser.dropped_cue_count();
    Ok(parsed)
}

fn display_path(path: &Path) -> String {
    match path.canonicalize() {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Produce key/value summary fields for a parsed document.
fn summarize(parsed: &ParsedVtt, bytes: usize) -> Vec<(String, String)> {
    let mut rows = vec![
        ("header".to_string(), "WEBVTT".to_string()),
        ("input_bytes".to_string(), bytes.to_string()),
        ("cues".to_string(), parsed.cues.len().to_string()),
        ("dropped_cues".to_string(), parsed.dropped_cues.to_string()),
    ];

    match &parsed.stream_info {
        Some(info) => {
            rows.push(("codec".into(), info.codec_string.clone()));
            rows.push(("timescale".into(), info.timescale.to_string()));
            rows.push((
                "config_bytes".into(),
                info.codec_config.len().to_string(),
            ));
        }
        None => rows.push(("stream_info".into(), "(none)".into())),
    }

    let first = parsed.cues.iter().map(|c| c.start_time).min();
    let last = parsed.cues.iter().map(|c| c.end_time).max();
    if let (Some(first), Some(last)) = (first, last) {
        rows.push(("first_cue".into(), format_timestamp(first)));
        rows.push(("last_cue_end".into(), format_timestamp(last)));
        rows.push(("span".into(), format_timestamp(last - first)));
    }

    let with_id = parsed.cues.iter().filter(|c| !c.id.is_empty()).count();
    let with_settings = parsed.cues.iter().filter(|c| !c.settings.is_empty()).count();
    rows.push(("cues_with_id".into(), with_id.to_string()));
    rows.push(("cues_with_settings".into(), with_settings.to_string()));
    rows
}

/// Info command: parse the whole file and print a summary table.
///
/// On parse error this prints a one-line message with the path to stderr and
/// returns Ok(()).
pub fn info(path: &Path, data: Vec<u8>) -> anyhow::Result<()> {
    let file_str = display_path(path);
    let parsed = match parse_document(&data, data.len()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("\"{}\": parse error: {}", file_str, e);
            return Ok(());
        }
    };

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Field"), Cell::new("Value")]);
    for (k, v) in summarize(&parsed, data.len()) {
        table.add_row(vec![Cell::new(k), Cell::new(v)]);
    }
    println!("{}", file_str);
    println!("{}", table);

    if let Some(info) = &parsed.stream_info
        && !info.codec_config.is_empty()
    {
        println!("\nconfig:");
        for line in info.codec_config_str().lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

/// Cues command: list emitted cues in a table.
pub fn cues(path: &Path, data: Vec<u8>, chunk_size: usize) -> anyhow::Result<()> {
    let file_str = display_path(path);
    let parsed = match parse_document(&data, chunk_size) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("\"{}\": parse error: {}", file_str, e);
            return Ok(());
        }
    };

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Index"),
        Cell::new("Start"),
        Cell::new("End"),
        Cell::new("Id"),
        Cell::new("Settings"),
        Cell::new("Payload"),
    ]);
    for (index, cue) in parsed.cues.iter().enumerate() {
        let first_line = cue.payload.lines().next().unwrap_or("");
        let preview = if cue.payload.lines().count() > 1 {
            format!("{} (+{})", first_line, cue.payload.lines().count() - 1)
        } else {
            first_line.to_string()
        };
        table.add_row(vec![
            Cell::new(index),
            Cell::new(format_timestamp(cue.start_time)),
            Cell::new(format_timestamp(cue.end_time)),
            Cell::new(&cue.id),
            Cell::new(&cue.settings),
            Cell::new(pad_to_width(
                &truncate_to_width(&preview, PAYLOAD_PREVIEW_WIDTH),
                PAYLOAD_PREVIEW_WIDTH,
            )),
        ]);
    }
    println!("{}", table);
    Ok(())
}

/// Check command: fail with the parse error if the file is rejected.
pub fn check(path: &Path, data: Vec<u8>, chunk_size: usize) -> anyhow::Result<()> {
    let file_str = display_path(path);
    match parse_document(&data, chunk_size) {
        Ok(parsed) => {
            println!(
                "\"{}\": ok ({} cues, {} dropped)",
                file_str,
                parsed.cues.len(),
                parsed.dropped_cues
            );
            Ok(())
        }
        Err(e) => bail!("\"{}\": parse error: {}", file_str, e),
    }
}
