use crate::dates::parse_local_date;
use crate::fetch::get_text;
use crate::model::KnownRace;
use crate::names::NameRule;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct KnownRaces {
    races: Vec<KnownRace>,
}

impl KnownRaces {
    pub fn new(races: Vec<KnownRace>) -> Self {
        Self { races }
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownRace> {
        self.races.iter()
    }

    pub fn contains(&self, name: &str, rule: NameRule) -> bool {
        self.races.iter().any(|race| rule.matches(&race.name, name))
    }
}

pub fn parse_known_races(text: &str) -> KnownRaces {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut races = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!(row = index + 2, error = %err, "skipping malformed known race row");
                continue;
            }
        };

        let name = clean_cell(record.get(0).unwrap_or_default());
        if name.is_empty() {
            continue;
        }

        let Some(date) = record.get(1).and_then(parse_local_date) else {
            debug!(row = index + 2, name = %name, "skipping known race without a date");
            continue;
        };

        races.push(KnownRace { name, date });
    }

    KnownRaces::new(races)
}

pub fn load_known_races(client: &Client, location: &str) -> KnownRaces {
    info!(source = %location, "loading known races");

    match read_known_races(client, location) {
        Ok(text) => {
            let known = parse_known_races(&text);
            info!(
                known = known.len(),
                first = known.races.first().map(|r| r.name.as_str()).unwrap_or_default(),
                last = known.races.last().map(|r| r.name.as_str()).unwrap_or_default(),
                "known races loaded"
            );
            known
        }
        Err(err) => {
            let message = format!("{err:#}");
            warn!(
                source = %location,
                error = %message,
                "failed to load known races; nothing will be filtered"
            );
            KnownRaces::default()
        }
    }
}

fn read_known_races(client: &Client, location: &str) -> Result<String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return get_text(client, location);
    }

    std::fs::read_to_string(location)
        .with_context(|| format!("failed to read known races file {location}"))
}

fn clean_cell(raw: &str) -> String {
    raw.trim().to_string()
}
