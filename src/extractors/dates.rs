// src/extractors/dates.rs

// --- Imports ---
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

// --- Constants ---
/// Ranges of 50 years or more are treated as typos and ignored.
pub const MAX_RANGE_MONTHS: i64 = 600;

// --- Regex Patterns (Lazy Static) ---
// Both run over lowercased text. Month names may carry trailing letters ("sept", "september").
const MONTH_TOKEN: &str = r"(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*[\s,]+([0-9]{4})";

// "sep 2024 – present"
static OPEN_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{}\s*[-–—]\s*(present|current)", MONTH_TOKEN))
        .expect("Failed to compile OPEN_RANGE_RE")
});

// "jan 2020 - dec 2023"
static CLOSED_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{}\s*[-–—]\s*{}", MONTH_TOKEN, MONTH_TOKEN))
        .expect("Failed to compile CLOSED_RANGE_RE")
});

/// Resolves a month name or abbreviation by its first three letters.
pub fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.trim().to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

// --- Data Structures ---

/// A calendar month. `month` is always within 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Signed number of months from `self` to `later`.
    pub fn months_until(&self, later: YearMonth) -> i64 {
        (later.year as i64 - self.year as i64) * 12 + (later.month as i64 - self.month as i64)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts "YYYY-MM" or a full "YYYY-MM-DD" date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d"))
            .map_err(|e| format!("Invalid month '{}' (expected YYYY-MM): {}", s, e))?;
        Ok(Self { year: date.year(), month: date.month() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    Month(YearMonth),
    /// "Present" / "Current": resolved against the scan's `today`.
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: YearMonth,
    pub end: RangeEnd,
}

impl DateRange {
    /// Raw signed month count; negative for reversed ranges.
    pub fn months(&self, today: YearMonth) -> i64 {
        let end = match self.end {
            RangeEnd::Month(end) => end,
            RangeEnd::Present => today,
        };
        self.start.months_until(end)
    }

    /// Month count if it is plausible (`0 < months < MAX_RANGE_MONTHS`).
    pub fn accepted_months(&self, today: YearMonth) -> Option<u32> {
        let months = self.months(today);
        (months > 0 && months < MAX_RANGE_MONTHS).then_some(months as u32)
    }
}

// --- Clock ---

/// Source of "the current month" for open-ended ranges.
pub trait Clock: Send + Sync {
    fn today(&self) -> YearMonth;
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> YearMonth {
        let now = chrono::Local::now();
        YearMonth { year: now.year(), month: now.month() }
    }
}

/// Always returns the same month.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub YearMonth);

impl Clock for FixedClock {
    fn today(&self) -> YearMonth {
        self.0
    }
}

// --- Parsing ---

fn year_month(month_name: &str, year: &str) -> Option<YearMonth> {
    YearMonth::new(year.parse().ok()?, month_from_name(month_name)?)
}

/// "<month> <year> – present|current" ranges. Expects lowercased text.
pub fn parse_open_ranges(text: &str) -> Vec<DateRange> {
    OPEN_RANGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let start = year_month(&caps[1], &caps[2])?;
            Some(DateRange { start, end: RangeEnd::Present })
        })
        .collect()
}

/// "<month> <year> – <month> <year>" ranges. Expects lowercased text.
pub fn parse_closed_ranges(text: &str) -> Vec<DateRange> {
    CLOSED_RANGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let start = year_month(&caps[1], &caps[2])?;
            let end = year_month(&caps[3], &caps[4])?;
            Some(DateRange { start, end: RangeEnd::Month(end) })
        })
        .collect()
}

// --- Scanner ---

/// Sums the months covered by every date range found in a span of text.
///
/// Matches are not deduplicated: a range mentioned twice counts twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeScanner;

impl DateRangeScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, text: &str, today: YearMonth) -> u32 {
        let lowered = text.to_lowercase();

        parse_open_ranges(&lowered)
            .into_iter()
            .chain(parse_closed_ranges(&lowered))
            .map(|range| match range.accepted_months(today) {
                Some(months) => {
                    tracing::debug!("Counted {:?} = {} months", range, months);
                    months
                }
                None => {
                    tracing::debug!(
                        "Skipped implausible range {:?} ({} months)",
                        range,
                        range.months(today)
                    );
                    0
                }
            })
            .sum()
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_month_lookup_handles_variants() {
        assert_eq!(month_from_name("jan"), Some(1));
        assert_eq!(month_from_name("September"), Some(9));
        assert_eq!(month_from_name("sept"), Some(9));
        assert_eq!(month_from_name("may"), Some(5));
        assert_eq!(month_from_name("xyz"), None);
        assert_eq!(month_from_name("de"), None);
    }

    #[test]
    fn test_year_month_rejects_bad_month() {
        assert!(YearMonth::new(2020, 0).is_none());
        assert!(YearMonth::new(2020, 13).is_none());
        assert_eq!(ym(2020, 1).months_until(ym(2023, 12)), 47);
    }

    #[test]
    fn test_year_month_from_str() {
        assert_eq!("2025-06".parse::<YearMonth>().unwrap(), ym(2025, 6));
        assert_eq!("2025-06-17".parse::<YearMonth>().unwrap(), ym(2025, 6));
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("June 2025".parse::<YearMonth>().is_err());
        assert_eq!(ym(2025, 6).to_string(), "2025-06");
    }

    #[test]
    fn test_open_range_with_en_dash() {
        let ranges = parse_open_ranges("sep 2020 – present");
        assert_eq!(ranges, vec![DateRange { start: ym(2020, 9), end: RangeEnd::Present }]);
        assert_eq!(ranges[0].months(ym(2025, 6)), 57);
    }

    #[test]
    fn test_open_range_variants() {
        assert_eq!(parse_open_ranges("september, 2021 - current").len(), 1);
        assert_eq!(parse_open_ranges("sept 2021—present").len(), 1);
        assert_eq!(parse_open_ranges("jan 2021 to present").len(), 0);
        assert_eq!(parse_open_ranges("jan 21 - present").len(), 0);
    }

    #[test]
    fn test_closed_range_full_and_abbreviated_names() {
        let ranges = parse_closed_ranges("january 2020 - dec 2023");
        assert_eq!(
            ranges,
            vec![DateRange { start: ym(2020, 1), end: RangeEnd::Month(ym(2023, 12)) }]
        );
        assert_eq!(ranges[0].months(ym(1999, 1)), 47);
    }

    #[test]
    fn test_closed_range_with_em_dash_and_commas() {
        let ranges = parse_closed_ranges("mar, 2018—aug, 2019");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].months(ym(2025, 1)), 17);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let range = parse_closed_ranges("dec 2023 - jan 2020")[0];
        assert!(range.months(ym(2025, 1)) < 0);
        assert_eq!(range.accepted_months(ym(2025, 1)), None);
    }

    #[test]
    fn test_century_scale_range_is_rejected() {
        let range = parse_closed_ranges("jan 1920 - jan 2020")[0];
        assert_eq!(range.months(ym(2025, 1)), 1200);
        assert_eq!(range.accepted_months(ym(2025, 1)), None);
    }

    #[test]
    fn test_zero_length_range_is_rejected() {
        let range = parse_closed_ranges("may 2020 - may 2020")[0];
        assert_eq!(range.accepted_months(ym(2025, 1)), None);
    }

    #[test]
    fn test_open_range_in_future_is_rejected() {
        let scanner = DateRangeScanner::new();
        assert_eq!(scanner.scan("Jan 2030 - Present", ym(2025, 6)), 0);
    }

    #[test]
    fn test_scan_sums_both_passes() {
        let text = "Acme Corp\nSep 2020 – Present\nInitech\nJan 2018 - Jun 2020";
        let scanner = DateRangeScanner::new();
        assert_eq!(scanner.scan(text, ym(2025, 6)), 57 + 29);
    }

    #[test]
    fn test_scan_counts_repeated_ranges_twice() {
        let text = "Jan 2020 - Jan 2021\nJan 2020 - Jan 2021";
        assert_eq!(DateRangeScanner::new().scan(text, ym(2025, 6)), 24);
    }

    #[test]
    fn test_scan_is_case_insensitive() {
        let text = "MARCH 2025 - MAY 2025";
        assert_eq!(DateRangeScanner::new().scan(text, ym(2025, 6)), 2);
    }

    #[test]
    fn test_scan_without_dates_is_zero() {
        assert_eq!(DateRangeScanner::new().scan("No dates here", ym(2025, 6)), 0);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = FixedClock(ym(2025, 6));
        assert_eq!(clock.today(), clock.today());
        assert_eq!(clock.today(), ym(2025, 6));
    }
}
