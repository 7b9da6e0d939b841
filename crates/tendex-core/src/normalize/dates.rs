//! French date parsing. Canonical output form is DD/MM/YYYY.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMERIC_DATE: Regex =
        Regex::new(r"(?x) (\d{1,2}) \s* [/.\-] \s* (\d{1,2}) \s* [/.\-] \s* (\d{2,4})")
            .unwrap();
    static ref LONG_DATE: Regex = Regex::new(
        r"(?ix) (\d{1,2})(?:er)? \s+ ([^\W\d_]+)\.? \s+ (\d{4})"
    )
    .unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
}

/// Accepted year window. Anything outside is treated as noise.
const YEAR_MIN: i32 = 2000;
const YEAR_MAX: i32 = 2100;

fn month_from_french(name: &str) -> Option<u32> {
    let lowered = name.to_lowercase();
    // Prefix match covers abbreviations like "janv", "févr", "sept".
    let table: [(&str, u32); 14] = [
        ("janv", 1),
        ("fevr", 2),
        ("févr", 2),
        ("mars", 3),
        ("avr", 4),
        ("mai", 5),
        ("juin", 6),
        ("juil", 7),
        ("aout", 8),
        ("août", 8),
        ("sept", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ];
    if lowered.starts_with("déc") {
        return Some(12);
    }
    table
        .iter()
        .find(|(prefix, _)| lowered.starts_with(prefix))
        .map(|(_, m)| *m)
}

fn in_window(year: i32) -> bool {
    (YEAR_MIN..=YEAR_MAX).contains(&year)
}

/// Parse a date from noisy French text.
///
/// Accepted forms: numeric DD/MM/YYYY with `/`, `.` or `-` separators and
/// two- or four-digit years, long form "15 mars 2025" (with abbreviated month
/// names), and ISO "2025-03-15". Two-digit years map into 2000-2099. Dates
/// outside the 2000-2100 window are rejected.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if in_window(year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    if let Some(caps) = NUMERIC_DATE.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        if in_window(year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    if let Some(caps) = LONG_DATE.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(month) = month_from_french(&caps[2]) {
            if in_window(year) {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    return Some(date);
                }
            }
        }
    }

    None
}

/// Canonical DD/MM/YYYY rendering.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
