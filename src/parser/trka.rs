use super::{SiteParser, absolutize_url, element_text, first_attr, first_text, selector};
use crate::config::{HttpConfig, TrkaConfig};
use crate::fetch::{build_client_with_cookies, get_text};
use crate::known::KnownRaces;
use crate::model::{Event, EventDate, SourceKind};
use crate::names::NameRule;
use crate::normalize::{classify_event_type, resolve_links};
use anyhow::{Context, Result};
use scraper::{ElementRef, Html};
use tracing::{info, warn};
use url::Url;

const CARD: &str = "div.card.event-tile";
const CARD_TITLE: &str = "h5.card-title";
const CARD_DATE: &str = "p.card-text > small.text-body-secondary";
const CARD_LINK: &str = "a[href]";

// Cyrillic when the language cookie sticks, English otherwise.
const DEADLINE_LABELS: [&str; 2] = ["Крајњи рок за пријаву:", "Registrations deadline:"];
const CONTACT_LABELS: [&str; 2] = ["Контакт:", "Contact:"];
const MORE_DETAILS_LABELS: [&str; 2] = ["Више детаља:", "More details:"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCard {
    pub title: String,
    pub date: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub deadline: Option<String>,
    pub contact: Option<String>,
    pub more_details: Option<String>,
}

pub struct TrkaParser {
    config: TrkaConfig,
    http: HttpConfig,
}

impl TrkaParser {
    pub fn new(config: TrkaConfig, http: HttpConfig) -> Self {
        Self { config, http }
    }
}

impl SiteParser for TrkaParser {
    fn source(&self) -> SourceKind {
        SourceKind::Trka
    }

    fn parse(&self, known: &KnownRaces) -> Result<Vec<Event>> {
        let base = Url::parse(&self.config.base_url)
            .with_context(|| format!("invalid base url {}", self.config.base_url))?;
        info!(source = %self.source(), url = %base, "parsing event listing");

        let language_cookie = format!("django_language={}", self.config.language);
        let client = build_client_with_cookies(&self.http, &base, &[language_cookie])?;

        let html = get_text(&client, base.as_str())?;
        let cards = extract_event_cards(&html)?;
        if cards.is_empty() {
            warn!(source = %self.source(), "no event cards found; the page layout may have changed");
            return Ok(Vec::new());
        }
        info!(source = %self.source(), found = cards.len(), "event cards found");

        let cards = unknown_cards(cards, known);
        Ok(listing_events(cards, &base, &self.config.country, |url| {
            get_text(&client, url)
        }))
    }
}

pub fn listing_events<F>(cards: Vec<EventCard>, base: &Url, country: &str, fetch_page: F) -> Vec<Event>
where
    F: Fn(&str) -> Result<String>,
{
    let mut events = Vec::new();
    for card in cards {
        let mut link = card.link.clone();
        let mut details = DetailFields::default();
        if !link.is_empty() && !link.starts_with("http") {
            link = absolutize_url(Some(base.as_str()), &link);
            details = match fetch_page(&link) {
                Ok(page) => extract_detail_fields(&page),
                Err(err) => {
                    let message = format!("{err:#}");
                    warn!(
                        source = %SourceKind::Trka,
                        url = %link,
                        error = %message,
                        "event details unavailable"
                    );
                    DetailFields::default()
                }
            };
        }

        events.push(listing_event(card, &link, details, country));
    }
    events
}

pub fn extract_event_cards(html: &str) -> Result<Vec<EventCard>> {
    let card_selector = selector(CARD)?;
    let title_selector = selector(CARD_TITLE)?;
    let date_selector = selector(CARD_DATE)?;
    let link_selector = selector(CARD_LINK)?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&card_selector)
        .map(|card| EventCard {
            title: first_text(card, &title_selector).unwrap_or_default(),
            date: first_text(card, &date_selector).unwrap_or_default(),
            link: first_attr(card, &link_selector, "href").unwrap_or_default(),
        })
        .collect())
}

pub fn unknown_cards(cards: Vec<EventCard>, known: &KnownRaces) -> Vec<EventCard> {
    cards
        .into_iter()
        .filter(|card| !card.title.is_empty())
        .filter(|card| !known.contains(&card.title, NameRule::CaseInsensitive))
        .collect()
}

pub fn extract_detail_fields(html: &str) -> DetailFields {
    let document = Html::parse_document(html);
    DetailFields {
        deadline: first_labelled_value(&document, &DEADLINE_LABELS),
        contact: first_labelled_value(&document, &CONTACT_LABELS),
        more_details: first_labelled_value(&document, &MORE_DETAILS_LABELS),
    }
}

fn first_labelled_value(document: &Html, labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| labelled_value(document, label))
}

fn labelled_value(document: &Html, label_text: &str) -> Option<String> {
    let label_selector = selector("label").ok()?;
    let link_selector = selector("a").ok()?;

    let label = document
        .select(&label_selector)
        .find(|label| element_text(*label) == label_text)?;
    let wrapper = label.parent().and_then(ElementRef::wrap)?;
    let row = wrapper.parent().and_then(ElementRef::wrap);

    let value = match row.and_then(|row| row.select(&link_selector).next()) {
        Some(link) => link.value().attr("href").unwrap_or_default().trim().to_string(),
        None => wrapper
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(element_text)
            .unwrap_or_default(),
    };

    Some(value).filter(|v| !v.trim().is_empty())
}

pub fn listing_event(card: EventCard, link: &str, details: DetailFields, country: &str) -> Event {
    let links = resolve_links(link, details.more_details.as_deref());

    let mut event = Event::new(
        SourceKind::Trka,
        classify_event_type(&card.title),
        card.title,
        EventDate::Text(card.date),
        links.link,
    );
    event.facebook = links.facebook;
    event.instagram = links.instagram;
    event.deadline = details.deadline;
    event.contact = details.contact;
    event.country = country.to_string();
    event
}
