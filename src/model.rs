use crate::dates::parse_local_date;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    Trail,
    Asphalt,
    #[serde(rename = "OCR")]
    Ocr,
    Other,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Trail => "Trail",
            EventType::Asphalt => "Asphalt",
            EventType::Ocr => "OCR",
            EventType::Other => "Other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Itra,
    Trka,
    RunTrace,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Itra, SourceKind::Trka, SourceKind::RunTrace];

    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::Itra => "itra",
            SourceKind::Trka => "trka",
            SourceKind::RunTrace => "runtrace",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let key = value.trim().to_ascii_lowercase();
        for kind in SourceKind::ALL {
            if kind.key() == key {
                return Ok(kind);
            }
        }
        bail!("unknown source {value}; expected one of itra, trka, runtrace")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDate {
    Parsed(NaiveDate),
    Text(String),
}

impl EventDate {
    pub fn sort_date(&self) -> Option<NaiveDate> {
        match self {
            EventDate::Parsed(date) => Some(*date),
            EventDate::Text(text) => parse_local_date(text),
        }
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventDate::Parsed(date) => write!(f, "{}", date.format("%d.%m.%Y")),
            EventDate::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub source: SourceKind,
    pub event_type: EventType,
    pub title: String,
    pub distance: Option<String>,
    pub elevation: Option<String>,
    pub date: EventDate,
    pub deadline: Option<String>,
    pub link: String,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub contact: Option<String>,
    pub country: String,
    pub location: Option<String>,
}

impl Event {
    pub fn new(
        source: SourceKind,
        event_type: EventType,
        title: impl Into<String>,
        date: EventDate,
        link: impl Into<String>,
    ) -> Self {
        Self {
            source,
            event_type,
            title: title.into(),
            distance: None,
            elevation: None,
            date,
            deadline: None,
            link: link.into(),
            facebook: None,
            instagram: None,
            contact: None,
            country: String::new(),
            location: None,
        }
    }

    pub fn sort_date(&self) -> Option<NaiveDate> {
        self.date.sort_date()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownRace {
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarMatch {
    pub event_title: String,
    pub event_date: String,
    pub known: Vec<KnownRace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRunReport {
    pub source: SourceKind,
    pub parsed: usize,
    pub retained: usize,
    pub failed: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub known_races: usize,
    pub sources: Vec<SourceRunReport>,
    pub events_written: usize,
    pub output_path: PathBuf,
    pub similar: Vec<SimilarMatch>,
}
