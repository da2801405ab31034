//! Effective-date parsing for common congressional phrasings.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::recognizer::normalize_whitespace;

const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

static DATE_OF_ENACTMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:shall|will)\s+(?:take\s+effect|become\s+effective)\s+(?:on\s+)?(?:the\s+)?date\s+of\s+(?:the\s+)?enactment")
        .expect("Invalid date of enactment regex")
});

static DAYS_AFTER_ENACTMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:effective|take\s+effect)\s+(\d+)\s+days?\s+after\s+(?:the\s+)?date\s+of\s+(?:the\s+)?enactment")
        .expect("Invalid days after enactment regex")
});

static CALENDAR_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:shall|will)\s+(?:take\s+effect|become\s+effective)\s+(?:on\s+)?({MONTHS})\s+(\d{{1,2}}),?\s+(\d{{4}})"
    ))
    .expect("Invalid calendar date regex")
});

static FISCAL_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)shall\s+apply\s+to\s+fiscal\s+years?\s+beginning\s+after\s+({MONTHS})\s+(\d{{1,2}}),?\s+(\d{{4}})"
    ))
    .expect("Invalid fiscal year regex")
});

static NOT_UNTIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)shall\s+not\s+take\s+effect\s+until\s+({MONTHS})\s+(\d{{1,2}}),?\s+(\d{{4}})"
    ))
    .expect("Invalid not until regex")
});

/// When a bill takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EffectiveTiming {
    DateOfEnactment,
    DaysAfterEnactment(u32),
    CalendarDate(NaiveDate),
    FiscalYearsAfter(NaiveDate),
    NotUntil(NaiveDate),
}

/// Parsed effective-date clause with the text it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveDate {
    pub timing: EffectiveTiming,
    pub raw_text: String,
}

impl EffectiveDate {
    /// The calendar date, when the clause names one.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.timing {
            EffectiveTiming::CalendarDate(date)
            | EffectiveTiming::FiscalYearsAfter(date)
            | EffectiveTiming::NotUntil(date) => Some(date),
            EffectiveTiming::DateOfEnactment | EffectiveTiming::DaysAfterEnactment(_) => None,
        }
    }

    pub fn is_date_of_enactment(&self) -> bool {
        self.timing == EffectiveTiming::DateOfEnactment
    }

    /// Parse the first recognizable effective-date clause in `text`.
    ///
    /// Phrasings are tried in a fixed order and the first that yields a valid
    /// value wins. `None` means no clause was found.
    pub fn parse(text: &str) -> Option<Self> {
        let text = normalize_whitespace(text).to_lowercase();

        if let Some(m) = DATE_OF_ENACTMENT.find(&text) {
            return Some(Self::new(EffectiveTiming::DateOfEnactment, m.as_str()));
        }

        if let Some(caps) = DAYS_AFTER_ENACTMENT.captures(&text) {
            if let Ok(days) = caps[1].parse() {
                return Some(Self::new(EffectiveTiming::DaysAfterEnactment(days), &caps[0]));
            }
        }

        let dated: [(&Lazy<Regex>, fn(NaiveDate) -> EffectiveTiming); 3] = [
            (&CALENDAR_DATE, EffectiveTiming::CalendarDate),
            (&FISCAL_YEAR, EffectiveTiming::FiscalYearsAfter),
            (&NOT_UNTIL, EffectiveTiming::NotUntil),
        ];
        for (pattern, timing) in dated {
            let Some(caps) = pattern.captures(&text) else {
                continue;
            };
            if let Some(date) = date_from_captures(&caps) {
                return Some(Self::new(timing(date), &caps[0]));
            }
        }

        None
    }

    fn new(timing: EffectiveTiming, raw_text: &str) -> Self {
        Self {
            timing,
            raw_text: raw_text.to_string(),
        }
    }
}

/// Build a date from (month name, day, year) captures.
fn date_from_captures(caps: &Captures<'_>) -> Option<NaiveDate> {
    parse_date(&caps[1], &caps[2], &caps[3])
}

/// Month name, day and year to a date; out-of-range parts and impossible
/// dates such as February 30 are rejected.
pub fn parse_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month = month_number(month)?;
    let day: u32 = day.parse().ok().filter(|d| (1..=31).contains(d))?;
    let year: i32 = year.parse().ok().filter(|y| (1900..=2100).contains(y))?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    let index = MONTHS.split('|').position(|month| month.eq_ignore_ascii_case(name))?;
    u32::try_from(index + 1).ok()
}
