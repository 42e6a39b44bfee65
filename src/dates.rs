use crate::model::EventDate;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

const LOCAL_DATE_FORMATS: [&str; 4] = ["%d.%m.%Y", "%d.%m.%y", "%Y-%m-%d", "%d/%m/%Y"];

const LOCAL_DATETIME_FORMATS: [&str; 3] =
    ["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M", "%Y-%m-%d %H:%M:%S"];

const ENGLISH_DATE_FORMATS: [&str; 8] = [
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%A, %d %B %Y",
    "%A, %B %d, %Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%d-%B-%Y",
];

static DAY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*-\s*(\d+)\s*(\w+)\s*(\d+)").expect("day range regex must compile")
});

pub fn parse_local_date(raw: &str) -> Option<NaiveDate> {
    let value = raw
        .trim_matches(|c: char| c.is_whitespace() || c == '"')
        .trim_end_matches('.');
    if value.is_empty() {
        return None;
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format)
            && has_full_year(dt.date())
        {
            return Some(dt.date());
        }
    }

    LOCAL_DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .filter(|date| has_full_year(*date))
    })
}

// chrono's `%Y` also takes `26`, which must fall through to `%y`.
fn has_full_year(date: NaiveDate) -> bool {
    date.year() >= 1000
}

pub fn parse_english_date(raw: &str) -> Option<NaiveDate> {
    let value = collapse_whitespace(raw);
    if value.is_empty() {
        return None;
    }

    ENGLISH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&value, format).ok())
}

/// `d-d Month yyyy` ranges collapse to their first day.
pub fn parse_registry_date(raw: &str) -> EventDate {
    let value = collapse_whitespace(raw);
    if let Some(date) = parse_english_date(&value) {
        return EventDate::Parsed(date);
    }

    let Some(caps) = DAY_RANGE.captures(&value) else {
        return EventDate::Text(format!("??? {value}"));
    };

    let start = format!("{} {} {}", &caps[1], &caps[3], &caps[4]);
    match parse_english_date(&start) {
        Some(date) => EventDate::Parsed(date),
        None => EventDate::Text(format!("?????? {value} -> {start}")),
    }
}

pub fn parse_schedule_date(raw: Option<&str>) -> EventDate {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return EventDate::Text(String::new());
    };

    match parse_local_date(&format!("{value}:00")) {
        Some(date) => EventDate::Parsed(date),
        None => EventDate::Text(value.to_string()),
    }
}

pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_range_uses_first_day() {
        assert_eq!(
            parse_registry_date("15-17 August 2026"),
            EventDate::Parsed(ymd(2026, 8, 15))
        );
        assert_eq!(
            parse_registry_date("15-17 August 2026"),
            parse_registry_date("15 August 2026")
        );
        assert_eq!(
            parse_registry_date("3 - 4\n Oct 2026"),
            EventDate::Parsed(ymd(2026, 10, 3))
        );
    }

    #[test]
    fn unparseable_registry_date_keeps_original_text() {
        let date = parse_registry_date("TBD");
        assert_eq!(date, EventDate::Text("??? TBD".to_string()));
        assert!(date.to_string().contains("TBD"));
        assert_eq!(date.sort_date(), None);

        let date = parse_registry_date("15-17 Smarch 2026");
        assert!(date.to_string().starts_with("??????"));
        assert!(date.to_string().contains("15-17 Smarch 2026"));
    }

    #[test]
    fn local_dates_accept_trailing_dot_and_time() {
        assert_eq!(parse_local_date("05.10.2026."), Some(ymd(2026, 10, 5)));
        assert_eq!(parse_local_date("\"5.10.2026\""), Some(ymd(2026, 10, 5)));
        assert_eq!(parse_local_date("05.10.2026 09:30:00"), Some(ymd(2026, 10, 5)));
        assert_eq!(parse_local_date("sometime"), None);
        assert_eq!(parse_local_date("05.10.26."), Some(ymd(2026, 10, 5)));
        assert_eq!(parse_local_date("05.10.26"), Some(ymd(2026, 10, 5)));
        assert_eq!(parse_local_date(""), None);
    }

    #[test]
    fn schedule_dates_fall_back_to_raw_text() {
        assert_eq!(
            parse_schedule_date(Some("25.10.2026 10:00")),
            EventDate::Parsed(ymd(2026, 10, 25))
        );
        assert_eq!(
            parse_schedule_date(Some("Oktobar 2026")),
            EventDate::Text("Oktobar 2026".to_string())
        );
        assert_eq!(parse_schedule_date(None), EventDate::Text(String::new()));
    }
}
