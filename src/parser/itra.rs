use super::{SiteParser, absolutize_url, element_text, first_attr, first_text, selector};
use crate::config::{HttpConfig, ItraConfig};
use crate::dates::parse_registry_date;
use crate::fetch::{build_session_client, get_text, post_form_text};
use crate::known::KnownRaces;
use crate::model::{Event, EventType, SourceKind};
use crate::names::NameRule;
use crate::normalize::{country_from_location, join_distances, join_elevations, location_prefix};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

const CALENDAR_PATH: &str = "/Races/RaceCalendar";

// Quoted, backslash-escaped HTML strings inside a script array.
static FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(<div[\s\S]*?</div>)""#).expect("registry fragment regex must compile")
});

static VERIFICATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="__RequestVerificationToken"[^>]*?value="([^"]+)""#)
        .expect("verification token regex must compile")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    pub name: String,
    pub link: Option<String>,
    pub date: String,
    pub location: Option<String>,
    pub races: Vec<RaceBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceBox {
    pub distance: String,
    pub elevation: String,
    pub link: Option<String>,
}

pub struct ItraParser {
    config: ItraConfig,
    http: HttpConfig,
    filter_date_from: NaiveDate,
}

impl ItraParser {
    pub fn new(config: ItraConfig, http: HttpConfig, filter_date_from: NaiveDate) -> Self {
        Self {
            config,
            http,
            filter_date_from,
        }
    }

    fn calendar_url(&self) -> String {
        format!("{}{CALENDAR_PATH}", self.config.base_url.trim_end_matches('/'))
    }
}

impl SiteParser for ItraParser {
    fn source(&self) -> SourceKind {
        SourceKind::Itra
    }

    fn parse(&self, known: &KnownRaces) -> Result<Vec<Event>> {
        let url = self.calendar_url();
        info!(source = %self.source(), url = %url, "parsing race calendar");

        let client = build_session_client(&self.http)?;
        let page = get_text(&client, &url)?;
        let token = extract_verification_token(&page)
            .context("anti-forgery token not found on race calendar page")?;

        let start = self.filter_date_from.max(Local::now().date_naive());
        let form = search_form(&self.config.countries, start, &token);
        debug!(
            source = %self.source(),
            countries = ?self.config.countries,
            start = %start,
            "submitting race calendar search"
        );

        let body = post_form_text(&client, &url, &form)?;
        let records = extract_registry_records(&body)?;
        info!(source = %self.source(), found = records.len(), "race calendar events found");

        Ok(registry_events(records, known, &self.config))
    }
}

pub fn extract_verification_token(html: &str) -> Option<String> {
    VERIFICATION_TOKEN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Form body of the calendar search; `Input.Country` repeats once per code.
pub fn search_form(countries: &[String], start: NaiveDate, token: &str) -> Vec<(&'static str, String)> {
    let mut form = vec![("Input.SearchTerms", String::new())];
    form.extend(
        countries
            .iter()
            .map(|code| ("Input.Country", code.trim().to_string())),
    );
    form.push(("Input.DateStart", start.format("%d-%m-%Y").to_string()));
    form.push(("__RequestVerificationToken", token.to_string()));
    form
}

struct RegistrySelectors {
    name: Selector,
    link: Selector,
    date: Selector,
    location: Selector,
    races: Selector,
    race_distance: Selector,
    race_elevation: Selector,
    race_link: Selector,
}

impl RegistrySelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            name: selector(r#"div[class="event_name"] h4"#)?,
            link: selector(r#"div[class="event_name"] a"#)?,
            date: selector(r#"div[class="date"]"#)?,
            location: selector(r#"div[class="location"]"#)?,
            races: selector(r#"div[class="races-boxes"] > div[class="boxes"]"#)?,
            race_distance: selector(r#"div[class="count"]"#)?,
            race_elevation: selector(r#"div[class="distance"]"#)?,
            race_link: selector("a")?,
        })
    }
}

pub fn extract_registry_records(body: &str) -> Result<Vec<RegistryRecord>> {
    let selectors = RegistrySelectors::new()?;

    Ok(FRAGMENT
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("\\\"", "\""))
        .map(|html| parse_fragment(&html, &selectors))
        .collect())
}

fn parse_fragment(html: &str, selectors: &RegistrySelectors) -> RegistryRecord {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();

    let location = root.select(&selectors.location).next().and_then(|el| {
        el.children().find_map(|child| {
            child
                .value()
                .as_text()
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        })
    });

    let races = root
        .select(&selectors.races)
        .map(|race| RaceBox {
            distance: first_text(race, &selectors.race_distance).unwrap_or_default(),
            elevation: first_text(race, &selectors.race_elevation).unwrap_or_default(),
            link: first_attr(race, &selectors.race_link, "href"),
        })
        .collect();

    RegistryRecord {
        name: first_text(root, &selectors.name).unwrap_or_default(),
        link: first_attr(root, &selectors.link, "href"),
        date: root
            .select(&selectors.date)
            .next()
            .map(element_text)
            .unwrap_or_default(),
        location,
        races,
    }
}

pub fn registry_events(
    records: Vec<RegistryRecord>,
    known: &KnownRaces,
    config: &ItraConfig,
) -> Vec<Event> {
    records
        .into_iter()
        .filter(|record| !record.name.is_empty())
        .filter(|record| !known.contains(&record.name, NameRule::Exact))
        .map(|record| registry_event(record, config))
        .collect()
}

pub fn registry_event(record: RegistryRecord, config: &ItraConfig) -> Event {
    let link = record
        .link
        .as_deref()
        .map(|href| absolutize_url(Some(config.base_url.as_str()), href))
        .unwrap_or_default();
    let mut event = Event::new(
        SourceKind::Itra,
        EventType::Trail,
        record.name,
        parse_registry_date(&record.date),
        link,
    );

    let distances = record.races.iter().map(|r| r.distance.as_str()).collect::<Vec<_>>();
    let elevations = record.races.iter().map(|r| r.elevation.as_str()).collect::<Vec<_>>();
    event.distance = Some(join_distances(&distances)).filter(|v| !v.is_empty());
    event.elevation = Some(join_elevations(&elevations)).filter(|v| !v.is_empty());

    let location = record.location.as_deref().unwrap_or_default();
    event.country = country_from_location(location, &config.country_aliases);
    event.location = location_prefix(location);
    event
}
