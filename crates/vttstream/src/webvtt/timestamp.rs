//! WebVTT cue timestamp conversion.
//!
//! Timestamps have the form `[HH:]MM:SS.mmm`. Hours take two or more digits
//! and are unbounded, minutes and seconds take exactly two digits in
//! `00..=59`, and the fraction takes exactly three digits. All values are
//! converted to milliseconds.

const MS_PER_SECOND: u64 = 1000;
const SECONDS_PER_MINUTE: u64 = 60;
const MINUTES_PER_HOUR: u64 = 60;

/// Parse a WebVTT timestamp into milliseconds.
///
/// Returns `None` for anything that does not match `[HH:]MM:SS.mmm`
/// exactly, and for hour values too large to represent in milliseconds.
///
/// # Examples
/// ```
/// use vttstream::webvtt::timestamp::parse_timestamp;
///
/// assert_eq!(parse_timestamp("00:01:00.000"), Some(60_000));
/// assert_eq!(parse_timestamp("01:02.003"), Some(62_003));
/// assert_eq!(parse_timestamp("1:02.003"), None);
/// ```
pub fn parse_timestamp(source: &str) -> Option<u64> {
    let (clock, millis) = source.split_once('.')?;
    let millis = parse_digits(millis, 3, 3)?;

    let fields: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [minutes, seconds] => (0, *minutes, *seconds),
        [hours, minutes, seconds] => (parse_digits(hours, 2, usize::MAX)?, *minutes, *seconds),
        _ => return None,
    };
    let minutes = parse_digits(minutes, 2, 2)?;
    let seconds = parse_digits(seconds, 2, 2)?;
    if minutes >= MINUTES_PER_HOUR || seconds >= SECONDS_PER_MINUTE {
        return None;
    }

    hours
        .checked_mul(MINUTES_PER_HOUR)?
        .checked_add(minutes)?
        .checked_mul(SECONDS_PER_MINUTE)?
        .checked_add(seconds)?
        .checked_mul(MS_PER_SECOND)?
        .checked_add(millis)
}

/// Render milliseconds in the canonical `HH:MM:SS.mmm` form.
///
/// Hours are zero-padded to two digits and grow as needed.
///
/// # Examples
/// ```
/// use vttstream::webvtt::timestamp::format_timestamp;
///
/// assert_eq!(format_timestamp(3_600_000), "01:00:00.000");
/// assert_eq!(format_timestamp(62_003), "00:01:02.003");
/// ```
pub fn format_timestamp(ms: u64) -> String {
    let millis = ms % MS_PER_SECOND;
    let total_seconds = ms / MS_PER_SECOND;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    let total_minutes = total_seconds / SECONDS_PER_MINUTE;
    let minutes = total_minutes % MINUTES_PER_HOUR;
    let hours = total_minutes / MINUTES_PER_HOUR;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Parse an all-ASCII-digit field whose length lies in `min..=max`.
fn parse_digits(field: &str, min: usize, max: usize) -> Option<u64> {
    if field.len() < min || field.len() > max || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
