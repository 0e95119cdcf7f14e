use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;
use tracing::trace;

use crate::page::Page;

pub const LOCALE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Parses the machine timestamp of a cell. Accepts RFC 3339, plain dates,
/// naive date-times (taken as UTC), the ISO 8601 basic forms and epoch seconds.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(ts, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Some(instant) = parse_basic(ts) {
        return Some(instant);
    }
    // Eight bare digits are a basic date, never epoch seconds
    if ts.len() == BASIC_DATE_LEN {
        return None;
    }
    ts.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

const BASIC_DATE_LEN: usize = 8;

// ISO 8601 basic format: 20240101, 20240101T000000, 20240101T000000Z, 20240101T010000+0100
fn parse_basic(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(ts, "%Y%m%dT%H%M%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = ts.strip_suffix(['Z', 'z']).unwrap_or(ts);
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y%m%dT%H%M%S") {
        return Some(dt.and_utc());
    }
    if ts.len() == BASIC_DATE_LEN && ts.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(ts, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());
    }
    None
}

pub fn localize(page: &mut Page) {
    localize_with(page, &Local);
}

/// Rewrites the display text of every timestamp cell in the given timezone.
pub fn localize_with<Tz>(page: &mut Page, tz: &Tz)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut converted = 0;
    for row in page.table.body.iter_mut() {
        for cell in row.cells.iter_mut() {
            if let Some(instant) = cell.timestamp.as_deref().and_then(parse_timestamp) {
                cell.text = instant
                    .with_timezone(tz)
                    .format(LOCALE_FORMAT)
                    .to_string();
                converted += 1;
            }
        }
    }
    trace!("Localized {converted} timestamps");
}
