pub mod itra;
pub mod runtrace;
pub mod trka;

use crate::config::AppConfig;
use crate::known::KnownRaces;
use crate::model::{Event, SourceKind};
use anyhow::{Result, anyhow};
use scraper::{ElementRef, Selector};
use url::Url;

pub use itra::ItraParser;
pub use runtrace::RunTraceParser;
pub use trka::TrkaParser;

pub trait SiteParser: Send + Sync {
    fn source(&self) -> SourceKind;
    fn parse(&self, known: &KnownRaces) -> Result<Vec<Event>>;
}

pub fn site_parsers(config: &AppConfig) -> Vec<Box<dyn SiteParser>> {
    let mut parsers: Vec<Box<dyn SiteParser>> = Vec::new();
    if config.itra.enabled {
        parsers.push(Box::new(ItraParser::new(
            config.itra.clone(),
            config.http.clone(),
            config.filter_date_from,
        )));
    }
    if config.trka.enabled {
        parsers.push(Box::new(TrkaParser::new(
            config.trka.clone(),
            config.http.clone(),
        )));
    }
    if config.runtrace.enabled {
        parsers.push(Box::new(RunTraceParser::new(
            config.runtrace.clone(),
            config.http.clone(),
        )));
    }
    parsers
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector {css}: {err:?}"))
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn first_text(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

pub(crate) fn first_attr(node: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    node.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

pub fn absolutize_url(base_url: Option<&str>, value: &str) -> String {
    if value.starts_with("http://") || value.starts_with("https://") {
        return value.to_string();
    }

    if let Some(base) = base_url
        && let Ok(base_url) = Url::parse(base)
        && let Ok(joined) = base_url.join(value)
    {
        return joined.to_string();
    }

    value.to_string()
}
