use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the UNIX epoch, or 0 if the system clock is before it.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current UTC time as `YYYY-MM-DD HH:MM:SS`, the format stored in the
/// `last_seen` column.
pub fn utc_datetime_now() -> String {
    format_utc_datetime(now_secs())
}

/// Formats a UNIX timestamp (seconds) as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_utc_datetime(secs: u64) -> String {
    unix_to_utc(secs).map_or_else(
        |_| format!("unix_{secs}"),
        |tm| {
            format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                tm.year, tm.mon, tm.day, tm.hour, tm.min, tm.sec
            )
        },
    )
}

/// Generates a human-readable timestamp for filenames without external dependencies.
///
/// Output Format: `YYYYMMDD_HHMMSS` (e.g., `20251102_023045`)
pub fn timestamp_for_filename() -> String {
    let secs = now_secs();

    unix_to_utc(secs).map_or_else(
        |_| format!("unix_{secs}"), // graceful fallback, never panics
        |tm| {
            format!(
                "{:04}{:02}{:02}_{:02}{:02}{:02}",
                tm.year, tm.mon, tm.day, tm.hour, tm.min, tm.sec
            )
        },
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimpleUtc {
    pub year: i32,
    pub mon: u32,
    pub day: u32,
    pub hour: u32,
    pub min: u32,
    pub sec: u32,
}

#[derive(Debug)]
pub enum UtcConvError {
    Year,
    Month,
    Day,
}

/// Minimal UTC conversion (civil time) to avoid importing `chrono`.
///
/// # Errors
///
/// Returns a [`UtcConvError`] if a calculated component cannot be represented
/// in its target integer type.
#[allow(clippy::missing_const_for_fn, clippy::many_single_char_names)]
pub fn unix_to_utc(mut s: u64) -> Result<SimpleUtc, UtcConvError> {
    let sec = (s % 60) as u32;
    s /= 60;
    let min = (s % 60) as u32;
    s /= 60;
    let hour = (s % 24) as u32;
    s /= 24;

    // i128 keeps the intermediate era arithmetic from overflowing.
    let z: i128 = i128::from(s) + 719_468;

    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]

    let year_i = y + i128::from(m <= 2);

    let year = i32::try_from(year_i).map_err(|_| UtcConvError::Year)?;
    let mon = u32::try_from(m).map_err(|_| UtcConvError::Month)?;
    let day = u32::try_from(d).map_err(|_| UtcConvError::Day)?;

    Ok(SimpleUtc {
        year,
        mon,
        day,
        hour,
        min,
        sec,
    })
}
