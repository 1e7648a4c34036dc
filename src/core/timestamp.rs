//! Purpose: Decide which JSON strings are date-times and hold the typed result.
//! Exports: `DateFormat`, `Timestamp`.
//! Role: Eligibility predicate behind hydration; everything date-specific lives here.
//! Invariants: A string qualifies only if it parses AND contains a literal `T`.
//! Invariants: Parsed values keep sub-second precision and the original offset.
//! Notes: `Iso8601` uses the `time` crate's well-known ISO 8601 parser; no lenient fallbacks.

use std::fmt;
use std::fmt::Write as _;

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Which date-time grammar a string must satisfy to be hydrated.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DateFormat {
    /// ISO 8601 date-time, offset optional (offset-less values become [`Timestamp::Local`]).
    #[default]
    Iso8601,
    /// RFC 3339 profile: offset (`Z` or `±hh:mm`) is mandatory.
    Rfc3339,
}

/// A hydrated date-time leaf.
///
/// Equality follows the `time` crate: two `Offset` values are equal when they
/// denote the same instant, even if written with different offsets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Timestamp {
    /// Carried `Z` or a numeric offset.
    Offset(OffsetDateTime),
    /// Calendar date-time with no offset in the source string.
    Local(PrimitiveDateTime),
}

impl Timestamp {
    pub fn parse(raw: &str, format: DateFormat) -> Option<Self> {
        if !raw.contains('T') {
            return None;
        }
        match format {
            DateFormat::Iso8601 => OffsetDateTime::parse(raw, &Iso8601::DEFAULT)
                .map(Self::Offset)
                .or_else(|_| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).map(Self::Local))
                .ok(),
            DateFormat::Rfc3339 => OffsetDateTime::parse(raw, &Rfc3339).ok().map(Self::Offset),
        }
    }

    pub fn offset(&self) -> Option<UtcOffset> {
        match self {
            Self::Offset(value) => Some(value.offset()),
            Self::Local(_) => None,
        }
    }

    /// `Z`, `±hh:mm` (or `±hh:mm:ss`), or `None` for offset-less values.
    pub fn offset_label(&self) -> Option<String> {
        let offset = self.offset()?;
        let mut out = String::with_capacity(6);
        push_offset(offset, &mut out);
        Some(out)
    }

    pub fn date(&self) -> Date {
        match self {
            Self::Offset(value) => value.date(),
            Self::Local(value) => value.date(),
        }
    }

    pub fn time(&self) -> Time {
        match self {
            Self::Offset(value) => value.time(),
            Self::Local(value) => value.time(),
        }
    }

    /// Nanoseconds since the Unix epoch; `None` for offset-less values.
    pub fn unix_timestamp_nanos(&self) -> Option<i128> {
        match self {
            Self::Offset(value) => Some(value.unix_timestamp_nanos()),
            Self::Local(_) => None,
        }
    }

    /// Same instant expressed in UTC. Offset-less values are returned as-is.
    pub fn to_utc(self) -> Self {
        match self {
            Self::Offset(value) => {
                match OffsetDateTime::from_unix_timestamp_nanos(value.unix_timestamp_nanos()) {
                    Ok(utc) => Self::Offset(utc),
                    Err(_) => self,
                }
            }
            Self::Local(_) => self,
        }
    }

    pub fn to_rfc3339(&self) -> String {
        match self {
            Self::Offset(value) => value.format(&Rfc3339).unwrap_or_else(|_| {
                format_fallback(value.date(), value.time(), Some(value.offset()))
            }),
            Self::Local(value) => format_fallback(value.date(), value.time(), None),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

// Rfc3339 formatting refuses years outside 0..=9999 and offsets with seconds;
// this keeps rendering total for everything the ISO 8601 parser accepts.
fn format_fallback(date: Date, time: Time, offset: Option<UtcOffset>) -> String {
    let mut out = String::with_capacity(38);
    let year = date.year();
    if (0..=9999).contains(&year) {
        let _ = write!(out, "{year:04}");
    } else {
        // ISO 8601 expanded representation: sign plus six digits.
        let _ = write!(out, "{year:+07}");
    }
    let _ = write!(
        out,
        "-{:02}-{:02}T{:02}:{:02}:{:02}",
        u8::from(date.month()),
        date.day(),
        time.hour(),
        time.minute(),
        time.second()
    );
    let nanos = time.nanosecond();
    if nanos != 0 {
        let digits = format!("{nanos:09}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    if let Some(offset) = offset {
        push_offset(offset, &mut out);
    }
    out
}

fn push_offset(offset: UtcOffset, out: &mut String) {
    if offset.is_utc() {
        out.push('Z');
        return;
    }
    let (hours, minutes, seconds) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    let _ = write!(
        out,
        "{sign}{:02}:{:02}",
        hours.unsigned_abs(),
        minutes.unsigned_abs()
    );
    if seconds != 0 {
        let _ = write!(out, ":{:02}", seconds.unsigned_abs());
    }
}

#[cfg(test)]
mod tests {
    use super::{DateFormat, Timestamp};
    use time::macros::{datetime, offset};
    use time::{Date, Month};

    #[test]
    fn utc_timestamp_qualifies() {
        let ts = Timestamp::parse("2024-01-01T10:00:00Z", DateFormat::Iso8601).expect("timestamp");
        assert_eq!(ts, Timestamp::Offset(datetime!(2024-01-01 10:00:00 UTC)));
        assert_eq!(ts.offset(), Some(offset!(UTC)));
    }

    #[test]
    fn strings_without_t_never_qualify() {
        for raw in ["2024-01-01", "2024", "", "hello", "10:00:00Z"] {
            assert_eq!(Timestamp::parse(raw, DateFormat::Iso8601), None, "{raw:?}");
            assert_eq!(Timestamp::parse(raw, DateFormat::Rfc3339), None, "{raw:?}");
        }
    }

    #[test]
    fn strings_with_t_must_still_parse() {
        for raw in ["T", "Tuesday", "2024-13-01T00:00:00Z", "2024-01-01T25:00:00Z"] {
            assert_eq!(Timestamp::parse(raw, DateFormat::Iso8601), None, "{raw:?}");
        }
    }

    #[test]
    fn offsetless_value_is_local_under_iso8601_only() {
        let raw = "2024-01-01T10:00:00";
        assert_eq!(
            Timestamp::parse(raw, DateFormat::Iso8601),
            Some(Timestamp::Local(datetime!(2024-01-01 10:00:00)))
        );
        assert_eq!(Timestamp::parse(raw, DateFormat::Rfc3339), None);
    }

    #[test]
    fn precision_and_offset_are_retained() {
        let ts = Timestamp::parse("2024-06-30T23:59:59.123456789+05:30", DateFormat::Rfc3339)
            .expect("timestamp");
        assert_eq!(ts.offset(), Some(offset!(+05:30)));
        assert_eq!(ts.time().nanosecond(), 123_456_789);
        assert_eq!(ts.to_rfc3339(), "2024-06-30T23:59:59.123456789+05:30");
    }

    #[test]
    fn offset_labels_follow_rfc3339() {
        let label = |raw: &str| {
            Timestamp::parse(raw, DateFormat::Iso8601).and_then(|ts| ts.offset_label())
        };
        assert_eq!(label("2024-01-01T00:00:00Z").as_deref(), Some("Z"));
        assert_eq!(label("2024-01-01T00:00:00+05:30").as_deref(), Some("+05:30"));
        assert_eq!(label("2024-01-01T00:00:00-03:00").as_deref(), Some("-03:00"));
        assert_eq!(label("2024-01-01T00:00:00"), None);
    }

    #[test]
    fn to_utc_keeps_the_instant() {
        let ts = Timestamp::parse("2024-01-01T02:00:00+02:00", DateFormat::Iso8601)
            .expect("timestamp");
        let utc = ts.to_utc();
        assert_eq!(utc.offset(), Some(offset!(UTC)));
        assert_eq!(utc.unix_timestamp_nanos(), ts.unix_timestamp_nanos());
        assert_eq!(utc.to_rfc3339(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn negative_years_render_in_expanded_form_and_parse_back() {
        for raw in ["-000001-01-01T00:00:00Z", "-002024-06-30T12:00:00.5+01:00"] {
            let ts = Timestamp::parse(raw, DateFormat::Iso8601).expect("timestamp");
            let rendered = ts.to_rfc3339();
            assert_eq!(rendered, raw);
            assert_eq!(Timestamp::parse(&rendered, DateFormat::Iso8601), Some(ts));
        }

        let date = Date::from_calendar_date(-1, Month::January, 1).expect("date");
        let local = Timestamp::Local(date.midnight());
        assert_eq!(local.to_rfc3339(), "-000001-01-01T00:00:00");
        assert_eq!(Timestamp::parse(&local.to_rfc3339(), DateFormat::Iso8601), Some(local));
    }

    #[test]
    fn local_rendering_has_no_offset() {
        let ts = Timestamp::Local(datetime!(2024-03-05 07:08:09.25));
        assert_eq!(ts.to_rfc3339(), "2024-03-05T07:08:09.25");
        assert_eq!(ts.unix_timestamp_nanos(), None);
        assert_eq!(ts.to_utc(), ts);
    }
}
