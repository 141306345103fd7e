//! Menu date detection and normalization.
//!
//! Both steps are "first match wins" over an ordered table, so each entry can
//! be exercised on its own.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::DateDisplay;
use crate::types::{DateSource, ExtractedDate, MenuDate};

// ── Date-shaped patterns ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePattern {
    /// `23/04/2025`, `4-23-25`
    Numeric,
    /// `(13-APR-2025)`; the last one on a line wins.
    Parenthesized,
    /// `21st January 2023`
    OrdinalDayMonthYear,
    /// `January 21, 2023`
    MonthDayYear,
    /// `January 2023`
    MonthYear,
}

const MONTH: &str = "(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|\
Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)";

impl DatePattern {
    /// Priority order, tried left to right on every line.
    pub const ALL: [DatePattern; 5] = [
        DatePattern::Numeric,
        DatePattern::Parenthesized,
        DatePattern::OrdinalDayMonthYear,
        DatePattern::MonthDayYear,
        DatePattern::MonthYear,
    ];

    fn source(self) -> String {
        match self {
            DatePattern::Numeric => r"([0-9]{1,2}[/-][0-9]{1,2}[/-][0-9]{2,4})".to_string(),
            DatePattern::Parenthesized => r".*\(([0-9]{1,2}-[a-z]{3}-[0-9]{2,4})\)".to_string(),
            DatePattern::OrdinalDayMonthYear => {
                format!(r"([0-9]{{1,2}}(?:st|nd|rd|th)?\s+{MONTH}\s+[0-9]{{2,4}})")
            }
            DatePattern::MonthDayYear => {
                format!(r"({MONTH}\s+[0-9]{{1,2}}(?:st|nd|rd|th)?,?\s+[0-9]{{2,4}})")
            }
            DatePattern::MonthYear => format!(r"({MONTH}\s+[0-9]{{4}})"),
        }
    }

    fn regex(self) -> &'static Regex {
        static TABLE: OnceLock<Vec<(DatePattern, Regex)>> = OnceLock::new();
        let table = TABLE.get_or_init(|| {
            DatePattern::ALL
                .iter()
                .map(|p| (*p, Regex::new(&format!("(?i){}", p.source())).expect("invalid regex")))
                .collect()
        });
        table
            .iter()
            .find(|(p, _)| *p == self)
            .map(|(_, re)| re)
            .expect("every pattern is compiled")
    }

    /// The captured date substring if this pattern occurs anywhere in `line`.
    pub fn find(self, line: &str) -> Option<&str> {
        self.regex().captures(line)?.get(1).map(|m| m.as_str())
    }
}

/// Scan trimmed, non-empty lines in order; stop at the first line where any
/// pattern matches. Falls back to `today` as `DD/MM/YYYY`.
pub fn extract_date_on(enhanced_text: &str, today: NaiveDate) -> ExtractedDate {
    let hit = enhanced_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find_map(|line| {
            DatePattern::ALL
                .iter()
                .find_map(|p| p.find(line).map(|text| (*p, text)))
        });

    match hit {
        Some((pattern, text)) => {
            tracing::debug!(?pattern, text, "menu date found");
            ExtractedDate::Matched { pattern, text: text.to_string() }
        }
        None => ExtractedDate::Fallback { text: today.format("%d/%m/%Y").to_string() },
    }
}

pub fn extract_date(enhanced_text: &str) -> ExtractedDate {
    extract_date_on(enhanced_text, today())
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ── Normalization ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    DayMonthYearSlash,
    MonthDayYearSlash,
    DayMonthYearDash,
    MonthDayYearDash,
    MonthNameDayYear,
    DayMonthNameYear,
    DayMonAbbrShortYearDash,
    DayMonAbbrYearDash,
    DayMonAbbrShortYearSlash,
    DayMonAbbrYearSlash,
}

impl DateFormat {
    pub const ALL: [DateFormat; 10] = [
        DateFormat::DayMonthYearSlash,
        DateFormat::MonthDayYearSlash,
        DateFormat::DayMonthYearDash,
        DateFormat::MonthDayYearDash,
        DateFormat::MonthNameDayYear,
        DateFormat::DayMonthNameYear,
        DateFormat::DayMonAbbrShortYearDash,
        DateFormat::DayMonAbbrYearDash,
        DateFormat::DayMonAbbrShortYearSlash,
        DateFormat::DayMonAbbrYearSlash,
    ];

    pub fn template(self) -> &'static str {
        match self {
            DateFormat::DayMonthYearSlash => "%d/%m/%Y",
            DateFormat::MonthDayYearSlash => "%m/%d/%Y",
            DateFormat::DayMonthYearDash => "%d-%m-%Y",
            DateFormat::MonthDayYearDash => "%m-%d-%Y",
            DateFormat::MonthNameDayYear => "%B %d, %Y",
            DateFormat::DayMonthNameYear => "%d %B %Y",
            DateFormat::DayMonAbbrShortYearDash => "%d-%b-%y",
            DateFormat::DayMonAbbrYearDash => "%d-%b-%Y",
            DateFormat::DayMonAbbrShortYearSlash => "%d/%b/%y",
            DateFormat::DayMonAbbrYearSlash => "%d/%b/%Y",
        }
    }

    pub fn parse(self, text: &str) -> Option<NaiveDate> {
        let date = NaiveDate::parse_from_str(text, self.template()).ok()?;
        // `%Y` is read as a four-digit year; chrono would otherwise accept `25` as year 25.
        if self.template().contains("%Y") && date.year() < 1000 {
            return None;
        }
        Some(date)
    }
}

fn re_ordinal() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)([0-9])(?:st|nd|rd|th)\b").expect("invalid regex"))
}

/// Try every format in order against the matched substring.
pub fn parse_date_text(text: &str) -> Option<(DateFormat, NaiveDate)> {
    let text = re_ordinal().replace_all(text.trim(), "$1");
    DateFormat::ALL
        .iter()
        .find_map(|f| f.parse(&text).map(|d| (*f, d)))
}

fn is_compact_numeric(text: &str) -> bool {
    text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit())
}

/// Turn an extracted date into the canonical menu date. An 8-digit numeric
/// string is taken as already normalized (`DDMMYYYY`). Today's date is the
/// fallback whenever parsing is inconclusive.
pub fn normalize_date(extracted: &ExtractedDate, today: NaiveDate, display: DateDisplay) -> MenuDate {
    let (date, source) = match extracted {
        ExtractedDate::Fallback { .. } => (today, DateSource::Fallback),
        ExtractedDate::Matched { pattern, text } => {
            let parsed = if is_compact_numeric(text) {
                NaiveDate::parse_from_str(text, "%d%m%Y").ok()
            } else {
                parse_date_text(text).map(|(_, d)| d)
            };
            match parsed {
                Some(d) => (d, DateSource::Extracted { pattern: *pattern, text: text.clone() }),
                None => {
                    tracing::warn!(text = text.as_str(), "menu date not understood; using today");
                    (today, DateSource::Unparsed { pattern: *pattern, text: text.clone() })
                }
            }
        }
    };
    MenuDate { date, display: display.format(date), source }
}
