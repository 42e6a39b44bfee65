use crate::model::Event;
use crate::normalize::sanitize_link;
use anyhow::{Context, Result};
use std::path::Path;

pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(Event::sort_date);
}

/// Tab-separated columns: type, title, distance, elevation, date, deadline,
/// link, facebook, instagram, contact, country, location.
pub fn report_line(event: &Event) -> String {
    let date = event.date.to_string();
    let columns = [
        event.event_type.label().to_string(),
        event.title.clone(),
        event.distance.clone().unwrap_or_default(),
        event.elevation.clone().unwrap_or_default(),
        date.trim_end_matches('.').to_string(),
        event.deadline.clone().unwrap_or_default(),
        sanitize_link(&event.link),
        event.facebook.clone().unwrap_or_default(),
        event.instagram.clone().unwrap_or_default(),
        event.contact.clone().unwrap_or_default(),
        event.country.clone(),
        event.location.clone().unwrap_or_default(),
    ];

    columns
        .iter()
        .map(|value| flatten_field(value))
        .collect::<Vec<_>>()
        .join("\t")
}

pub fn render_report(events: &[Event]) -> String {
    events
        .iter()
        .map(|event| report_line(event) + "\n")
        .collect()
}

pub fn write_report(path: &Path, events: &[Event]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory {}", parent.display()))?;
    }

    std::fs::write(path, render_report(events))
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(())
}

fn flatten_field(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c })
        .collect()
}
