//! Timestamp recoverer.
//!
//! Publish times show up in three unrelated encodings depending on the markup
//! revision a page was rendered with:
//!
//! | Source | Example | Rule |
//! |--------|---------|------|
//! | `datetime` attribute | `2025-07-29T09:47:28+07:00` | ISO-8601, offset optional |
//! | link digits | `/xa-hoi/bao-cao-20250729094728.htm` | 14 digits, suffix-adjacent run preferred |
//! | ad-hoc attribute | `data-track-content="...-20250729094728.htm"` | last `-` segment starts with 14 digits |
//!
//! Digit runs are read positionally as `YYYYMMDDHHMMSS`; extra trailing digits
//! (Tuổi Trẻ appends three) are ignored. Values without an offset are local
//! wall-clock time in the publisher offset and are localized, not converted.

use crate::models::{ArticleCandidate, TimestampSource};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Any run of at least 14 ASCII digits.
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{14,}").expect("static regex"));

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Why no publish time could be recovered for a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("no 14-digit timestamp found")]
    NoDigits,

    #[error("`{0}` is not a valid calendar date/time")]
    InvalidCalendar(String),

    #[error("unrecognized datetime value `{0}`")]
    Unrecognized(String),
}

/// Recovers publish instants for one publisher.
#[derive(Debug, Clone)]
pub struct TimestampRecoverer {
    offset: FixedOffset,
    /// 14 digits, optional extra digits, then the article suffix.
    suffix_run: Regex,
}

impl TimestampRecoverer {
    pub fn new(offset: FixedOffset, article_suffix: &str) -> Result<Self, regex::Error> {
        let suffix_run = Regex::new(&format!(r"([0-9]{{14}})[0-9]*{}", regex::escape(article_suffix)))?;
        Ok(Self { offset, suffix_run })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Recover the publish instant of `candidate` from the source the locator picked.
    pub fn recover(&self, candidate: &ArticleCandidate) -> Result<DateTime<FixedOffset>, TimestampError> {
        match &candidate.timestamp_source {
            TimestampSource::Structured(value) => parse_structured(value, self.offset),
            TimestampSource::UrlDigits => {
                let digits = self.digits_in_link(&candidate.raw_link)?;
                parse_compact(digits, self.offset)
            }
            TimestampSource::AttributeDigits(value) => {
                parse_compact(attribute_digits(value)?, self.offset)
            }
        }
    }

    /// The 14 timestamp digits embedded in `link`.
    ///
    /// A run directly followed by the article suffix wins over any earlier run.
    pub fn digits_in_link<'a>(&self, link: &'a str) -> Result<&'a str, TimestampError> {
        if let Some(run) = self.suffix_run.captures(link).and_then(|c| c.get(1)) {
            return Ok(run.as_str());
        }
        DIGIT_RUN
            .find(link)
            .and_then(|m| m.as_str().get(..14))
            .ok_or(TimestampError::NoDigits)
    }
}

/// The digits carried by an ad-hoc attribute value such as `article-20250729094728.htm`.
///
/// The last `-`-separated segment, cut at its first `.`, must start with 14 digits.
pub fn attribute_digits(value: &str) -> Result<&str, TimestampError> {
    let tail = value.rsplit('-').next().unwrap_or(value);
    let head = tail.split('.').next().unwrap_or(tail).trim();
    head.get(..14)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or(TimestampError::NoDigits)
}

/// Parse the first 14 digits of `digits` as `YYYYMMDDHHMMSS` in `offset`.
pub fn parse_compact(digits: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, TimestampError> {
    let digits = digits
        .get(..14)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or(TimestampError::NoDigits)?;

    let invalid = || TimestampError::InvalidCalendar(digits.to_string());
    let field = |from: usize, to: usize| digits[from..to].parse::<u32>().map_err(|_| invalid());

    let year = digits[..4].parse::<i32>().map_err(|_| invalid())?;
    let naive = NaiveDate::from_ymd_opt(year, field(4, 6)?, field(6, 8)?)
        .and_then(|date| date.and_hms_opt(field(8, 10).ok()?, field(10, 12).ok()?, field(12, 14).ok()?))
        .ok_or_else(invalid)?;
    localize(naive, offset).ok_or_else(invalid)
}

/// Parse a machine-readable `datetime` value, converting any explicit offset into `offset`.
pub fn parse_structured(value: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, TimestampError> {
    let value = value.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Ok(aware.with_timezone(&offset));
    }
    for format in OFFSET_FORMATS {
        if let Ok(aware) = DateTime::parse_from_str(value, format) {
            return Ok(aware.with_timezone(&offset));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return localize(naive, offset).ok_or_else(|| TimestampError::InvalidCalendar(value.to_string()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| localize(midnight, offset))
            .ok_or_else(|| TimestampError::InvalidCalendar(value.to_string()));
    }

    Err(TimestampError::Unrecognized(value.to_string()))
}

/// Attach `offset` to a wall-clock time without shifting it.
fn localize(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    naive.and_local_timezone(offset).single()
}
