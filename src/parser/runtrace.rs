use super::{SiteParser, absolutize_url, first_attr, first_text, selector};
use crate::config::{HttpConfig, RunTraceConfig};
use crate::dates::parse_schedule_date;
use crate::fetch::{build_client, get_text};
use crate::known::KnownRaces;
use crate::model::{Event, SourceKind};
use crate::names::NameRule;
use crate::normalize::classify_event_type;
use anyhow::Result;
use scraper::Html;
use tracing::{debug, info};

const EVENT_BLOCK: &str = "div.grid__item.js-event_info";
const EVENT_INFO: &str = "div.grid__race__info";
const TITLE: &str = "a.race-title";
const DATE: &str = "div.race-date";
const LOCATION: &str = "div.race-location > span";
const SIGN_UP: &str = r#"a[title="Sign up"]"#;
const PARTICIPANTS: &str = r#"a[title="Participants"]"#;
const SLUG_ATTR: &str = "data-slug_event";

pub struct RunTraceParser {
    config: RunTraceConfig,
    http: HttpConfig,
}

impl RunTraceParser {
    pub fn new(config: RunTraceConfig, http: HttpConfig) -> Self {
        Self { config, http }
    }
}

impl SiteParser for RunTraceParser {
    fn source(&self) -> SourceKind {
        SourceKind::RunTrace
    }

    fn parse(&self, known: &KnownRaces) -> Result<Vec<Event>> {
        info!(source = %self.source(), url = %self.config.base_url, "parsing race calendar");

        let client = build_client(&self.http)?;
        let html = get_text(&client, &self.config.base_url)?;
        extract_schedule_events(&html, &self.config.base_url, &self.config.country, known)
    }
}

pub fn extract_schedule_events(
    html: &str,
    base_url: &str,
    country: &str,
    known: &KnownRaces,
) -> Result<Vec<Event>> {
    let block_selector = selector(EVENT_BLOCK)?;
    let info_selector = selector(EVENT_INFO)?;
    let title_selector = selector(TITLE)?;
    let date_selector = selector(DATE)?;
    let location_selector = selector(LOCATION)?;
    let sign_up_selector = selector(SIGN_UP)?;
    let participants_selector = selector(PARTICIPANTS)?;

    let document = Html::parse_document(html);
    let blocks = document.select(&block_selector).collect::<Vec<_>>();
    info!(source = %SourceKind::RunTrace, found = blocks.len(), "event blocks found");

    let mut events = Vec::new();
    for block in blocks {
        let Some(info) = block.select(&info_selector).next() else {
            debug!(source = %SourceKind::RunTrace, "event block without race info; skipping");
            continue;
        };

        let Some(title) = first_text(info, &title_selector) else {
            continue;
        };
        if known.contains(&title, NameRule::Canonical) {
            continue;
        }

        let date = first_text(info, &date_selector);
        let location = first_text(info, &location_selector);

        let slug = block
            .value()
            .attr(SLUG_ATTR)
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let link = match slug {
            Some(slug) => absolutize_url(Some(base_url), &format!("?event={slug}")),
            None => first_attr(info, &sign_up_selector, "href")
                .or_else(|| first_attr(info, &participants_selector, "href"))
                .map(|href| absolutize_url(Some(base_url), &href))
                .unwrap_or_else(|| base_url.to_string()),
        };

        let mut event = Event::new(
            SourceKind::RunTrace,
            classify_event_type(&title),
            title,
            parse_schedule_date(date.as_deref()),
            link,
        );
        event.country = country.to_string();
        event.location = location;
        events.push(event);
    }

    Ok(events)
}
