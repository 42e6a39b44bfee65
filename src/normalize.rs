use crate::model::EventType;
use std::collections::BTreeMap;
use url::Url;

const TRAIL_TOKENS: [&str; 4] = ["trail", "trejl", "planinarski", "ultra"];
const ASPHALT_TOKENS: [&str; 3] = ["marathon", "maraton", "desetka"];
const OCR_TOKENS: [&str; 1] = ["ocr"];

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if haystack.trim().is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn classify_event_type(title: &str) -> EventType {
    let has_any = |tokens: &[&str]| tokens.iter().any(|t| contains_ignore_case(title, t));

    if has_any(&TRAIL_TOKENS) {
        EventType::Trail
    } else if has_any(&ASPHALT_TOKENS) {
        EventType::Asphalt
    } else if has_any(&OCR_TOKENS) {
        EventType::Ocr
    } else {
        EventType::Other
    }
}

/// `["18 k", "42 k"]` becomes `"18, 42"`.
pub fn join_distances<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref().replace('k', "").trim().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `["+912 m", "+2100 m"]` becomes `"912, 2100"`.
pub fn join_elevations<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref().replace(['+', 'm'], "").trim().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn country_from_location(location: &str, aliases: &BTreeMap<String, String>) -> String {
    if location.trim().is_empty() {
        return String::new();
    }

    let code = location
        .rsplit(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase();

    aliases.get(&code).cloned().unwrap_or(code)
}

pub fn location_prefix(location: &str) -> Option<String> {
    location
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLinks {
    pub link: String,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

pub fn resolve_links(listing_link: &str, more_details: Option<&str>) -> ResolvedLinks {
    let more_details = more_details.map(str::trim).filter(|v| !v.is_empty());

    let facebook = more_details
        .filter(|link| contains_ignore_case(link, "facebook"))
        .map(ToString::to_string);
    let instagram = more_details
        .filter(|link| contains_ignore_case(link, "instagram"))
        .map(ToString::to_string);

    let link = match more_details {
        Some(link) if facebook.is_none() && instagram.is_none() => link.to_string(),
        _ => listing_link.to_string(),
    };

    ResolvedLinks {
        link,
        facebook,
        instagram,
    }
}

pub fn sanitize_link(link: &str) -> String {
    let link = link.trim();
    if link.is_empty() {
        return String::new();
    }

    if let Ok(url) = Url::parse(link) {
        return url.to_string();
    }

    let mut out = String::with_capacity(link.len());
    for c in link.chars() {
        if c.is_ascii_graphic() {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}
