use crate::config::AppConfig;
use crate::fetch::build_client;
use crate::known::{KnownRaces, load_known_races};
use crate::model::{Event, RunReport, SourceRunReport};
use crate::parser::{SiteParser, site_parsers};
use crate::report::{sort_events, write_report};
use crate::similar::detect_similar;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

pub fn run(config: &AppConfig) -> Result<RunReport> {
    info!(from = %config.filter_date_from.format("%d.%m.%Y"), "filtering races by start date");

    let client = build_client(&config.http)?;
    let known = load_known_races(&client, &config.known_races_url);
    let parsers = site_parsers(config);

    run_with_parsers(&parsers, &known, config.filter_date_from, &config.report_path())
}

pub fn run_with_parsers(
    parsers: &[Box<dyn SiteParser>],
    known: &KnownRaces,
    filter_date_from: NaiveDate,
    output_path: &Path,
) -> Result<RunReport> {
    let (mut events, sources) = collect_events(parsers, known, filter_date_from);
    sort_events(&mut events);

    write_report(output_path, &events)?;
    info!(
        events = events.len(),
        path = %output_path.display(),
        "report written"
    );

    let similar = detect_similar(&events, known);
    for event in &events {
        info!(date = %event.date, title = %event.title, source = %event.source, "new event");
    }
    for found in &similar {
        for race in &found.known {
            warn!(
                event = %found.event_title,
                known = %race.name,
                known_date = %race.date.format("%d.%m.%Y"),
                "similar race already listed; check before importing"
            );
        }
    }

    Ok(RunReport {
        known_races: known.len(),
        sources,
        events_written: events.len(),
        output_path: output_path.to_path_buf(),
        similar,
    })
}

pub fn collect_events(
    parsers: &[Box<dyn SiteParser>],
    known: &KnownRaces,
    filter_date_from: NaiveDate,
) -> (Vec<Event>, Vec<SourceRunReport>) {
    let mut events = Vec::new();
    let mut reports = Vec::new();

    for parser in parsers {
        let source = parser.source();
        match parser.parse(known) {
            Ok(parsed) => {
                let parsed_count = parsed.len();
                let retained = parsed
                    .into_iter()
                    .filter(|event| !event.title.trim().is_empty())
                    .filter(|event| !is_before(event, filter_date_from))
                    .collect::<Vec<_>>();

                info!(
                    source = %source,
                    parsed = parsed_count,
                    retained = retained.len(),
                    "source parsed"
                );
                reports.push(SourceRunReport {
                    source,
                    parsed: parsed_count,
                    retained: retained.len(),
                    failed: None,
                });
                events.extend(retained);
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(source = %source, error = %message, "failed to get events");
                reports.push(SourceRunReport {
                    source,
                    parsed: 0,
                    retained: 0,
                    failed: Some(message),
                });
            }
        }
    }

    (events, reports)
}

fn is_before(event: &Event, filter_date_from: NaiveDate) -> bool {
    event.sort_date().is_some_and(|date| date < filter_date_from)
}
