use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use trcara::config::ItraConfig;
use trcara::known::{KnownRaces, parse_known_races};
use trcara::model::{EventDate, EventType, KnownRace, SourceKind};
use trcara::parser::itra::{
    RegistryRecord, extract_registry_records, extract_verification_token, registry_event,
    registry_events, search_form,
};
use trcara::parser::runtrace::extract_schedule_events;
use trcara::parser::trka::{
    EventCard, extract_detail_fields, extract_event_cards, listing_event, listing_events,
    unknown_cards,
};
use url::Url;

fn fixture(name: &str) -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    Ok(fs::read_to_string(path)?)
}

fn known_fixture() -> Result<KnownRaces> {
    Ok(parse_known_races(&fixture("known_races.csv")?))
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn registry_token_is_read_from_calendar_page() -> Result<()> {
    let page = fixture("itra_calendar.html")?;
    assert_eq!(
        extract_verification_token(&page).as_deref(),
        Some("CfDJ8Nq-token_value42")
    );
    assert_eq!(extract_verification_token("<html></html>"), None);
    Ok(())
}

#[test]
fn registry_search_form_repeats_country_filter() {
    let countries = vec!["AL".to_string(), "TR".to_string()];
    let form = search_form(&countries, ymd(2026, 11, 3), "tok+en");

    assert_eq!(
        form,
        vec![
            ("Input.SearchTerms", String::new()),
            ("Input.Country", "AL".to_string()),
            ("Input.Country", "TR".to_string()),
            ("Input.DateStart", "03-11-2026".to_string()),
            ("__RequestVerificationToken", "tok+en".to_string()),
        ]
    );
}

#[test]
fn registry_fragments_are_parsed_from_script_payload() -> Result<()> {
    let records = extract_registry_records(&fixture("itra_search.txt")?)?;
    assert_eq!(records.len(), 5);

    let first = &records[0];
    assert_eq!(first.name, "Red Tower Trail");
    assert_eq!(
        first.link.as_deref(),
        Some("/Races/RaceDetails/Red.Tower.Trail/2026/101")
    );
    assert_eq!(first.date, "15-17 August 2026");
    assert_eq!(first.location.as_deref(), Some("RED TOWER, TUR"));
    assert_eq!(first.races.len(), 2);
    assert_eq!(first.races[0].distance, "18 k");
    assert_eq!(first.races[1].elevation, "+2100 m");

    assert!(records[4].name.is_empty());
    Ok(())
}

#[test]
fn registry_events_are_normalized_and_filtered() -> Result<()> {
    let records = extract_registry_records(&fixture("itra_search.txt")?)?;
    let known = known_fixture()?;
    let events = registry_events(records, &known, &ItraConfig::default());

    let titles = events.iter().map(|e| e.title.as_str()).collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec!["Red Tower Trail", "Ohrid Lake Trail", "Nowhere Mountain Run"]
    );

    let red = &events[0];
    assert_eq!(red.source, SourceKind::Itra);
    assert_eq!(red.event_type, EventType::Trail);
    assert_eq!(red.date, EventDate::Parsed(ymd(2026, 8, 15)));
    assert_eq!(red.distance.as_deref(), Some("18, 42"));
    assert_eq!(red.elevation.as_deref(), Some("912, 2100"));
    assert_eq!(red.country, "Turkey");
    assert_eq!(red.location.as_deref(), Some("RED TOWER"));
    assert_eq!(
        red.link,
        "https://itra.run/Races/RaceDetails/Red.Tower.Trail/2026/101"
    );

    let ohrid = &events[1];
    assert_eq!(ohrid.date.to_string(), "??? TBD");
    assert_eq!(ohrid.country, "NMK");

    let nowhere = &events[2];
    assert_eq!(nowhere.country, "XYZ");
    assert_eq!(nowhere.distance, None);
    assert_eq!(nowhere.date, EventDate::Parsed(ymd(2026, 10, 3)));
    Ok(())
}

#[test]
fn registry_known_names_compare_exactly() -> Result<()> {
    let records = extract_registry_records(&fixture("itra_search.txt")?)?;
    let known = KnownRaces::new(vec![KnownRace {
        name: "durmitor ultra".to_string(),
        date: ymd(2026, 7, 4),
    }]);

    let events = registry_events(records, &known, &ItraConfig::default());
    assert!(events.iter().any(|e| e.title == "Durmitor Ultra"));
    Ok(())
}

#[test]
fn registry_record_without_link_keeps_link_empty() {
    let record = RegistryRecord {
        name: "Prokletije Trail".to_string(),
        link: None,
        date: "12 September 2026".to_string(),
        location: Some("PLAV, MNE".to_string()),
        races: Vec::new(),
    };

    let event = registry_event(record, &ItraConfig::default());
    assert_eq!(event.link, "");
    assert_eq!(event.country, "Montenegro");
}

#[test]
fn listing_cards_are_selected_by_class() -> Result<()> {
    let cards = extract_event_cards(&fixture("trka_index.html")?)?;
    assert_eq!(cards.len(), 4);
    assert_eq!(
        cards[0],
        EventCard {
            title: "Fruška Gora Trail & Run".to_string(),
            date: "25.10.2026.".to_string(),
            link: "/events/1234/".to_string(),
        }
    );
    assert_eq!(cards[2].title, "Beogradski Maraton");
    assert_eq!(cards[2].link, "https://example.org/beograd-maraton");
    assert!(cards[3].title.is_empty());
    Ok(())
}

#[test]
fn listing_cards_skip_known_titles_ignoring_case_only() -> Result<()> {
    let cards = extract_event_cards(&fixture("trka_index.html")?)?;
    let known = known_fixture()?;

    let titles = unknown_cards(cards.clone(), &known)
        .into_iter()
        .map(|c| c.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Fruška Gora Trail & Run", "Beogradski Maraton"]);

    let partial = KnownRaces::new(vec![KnownRace {
        name: "City Trail".to_string(),
        date: ymd(2026, 11, 1),
    }]);
    let kept = unknown_cards(cards, &partial);
    assert!(kept.iter().any(|c| c.title == "City Trail 2026"));
    Ok(())
}

#[test]
fn detail_page_fields_follow_labels() -> Result<()> {
    let details = extract_detail_fields(&fixture("trka_event.html")?);
    assert_eq!(details.deadline.as_deref(), Some("20.10.2026."));
    assert_eq!(details.contact.as_deref(), Some("info@fruskagoratrail.rs"));
    assert_eq!(
        details.more_details.as_deref(),
        Some("https://fruskagoratrail.rs/prijave")
    );

    let empty = extract_detail_fields("<html><body><p>Nema podataka</p></body></html>");
    assert_eq!(empty.deadline, None);
    assert_eq!(empty.contact, None);
    assert_eq!(empty.more_details, None);
    Ok(())
}

#[test]
fn listing_events_survive_failed_detail_pages() -> Result<()> {
    let details_page = fixture("trka_event.html")?;
    let base = Url::parse("https://www.trka.rs")?;
    let mut cards = extract_event_cards(&fixture("trka_index.html")?)?;
    cards.retain(|card| !card.title.is_empty() && card.title != "City Trail 2026");
    cards.push(EventCard {
        title: "Kosmaj Trail".to_string(),
        date: "08.11.2026.".to_string(),
        link: "/events/1300/".to_string(),
    });

    let requested = RefCell::new(Vec::new());
    let events = listing_events(cards, &base, "Serbia", |url| {
        requested.borrow_mut().push(url.to_string());
        if url.ends_with("/events/1234/") {
            Ok(details_page.clone())
        } else {
            bail!("GET {url} failed with status 500 Internal Server Error")
        }
    });

    assert_eq!(
        requested.into_inner(),
        vec![
            "https://www.trka.rs/events/1234/",
            "https://www.trka.rs/events/1300/"
        ]
    );

    let titles = events.iter().map(|e| e.title.as_str()).collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec!["Fruška Gora Trail & Run", "Beogradski Maraton", "Kosmaj Trail"]
    );

    assert_eq!(events[0].link, "https://fruskagoratrail.rs/prijave");
    assert_eq!(events[0].deadline.as_deref(), Some("20.10.2026."));

    assert_eq!(events[1].link, "https://example.org/beograd-maraton");
    assert_eq!(events[1].event_type, EventType::Asphalt);

    let failed = &events[2];
    assert_eq!(failed.link, "https://www.trka.rs/events/1300/");
    assert_eq!(failed.deadline, None);
    assert_eq!(failed.contact, None);
    assert_eq!(failed.facebook, None);
    assert_eq!(failed.country, "Serbia");
    Ok(())
}

#[test]
fn listing_event_prefers_organiser_link() -> Result<()> {
    let card = EventCard {
        title: "Fruška Gora Trail & Run".to_string(),
        date: "25.10.2026.".to_string(),
        link: "/events/1234/".to_string(),
    };
    let details = extract_detail_fields(&fixture("trka_event.html")?);
    let event = listing_event(card, "https://www.trka.rs/events/1234/", details, "Serbia");

    assert_eq!(event.source, SourceKind::Trka);
    assert_eq!(event.event_type, EventType::Trail);
    assert_eq!(event.link, "https://fruskagoratrail.rs/prijave");
    assert_eq!(event.facebook, None);
    assert_eq!(event.deadline.as_deref(), Some("20.10.2026."));
    assert_eq!(event.country, "Serbia");
    assert_eq!(event.sort_date(), Some(ymd(2026, 10, 25)));
    Ok(())
}

#[test]
fn listing_event_moves_social_link_aside() -> Result<()> {
    let card = EventCard {
        title: "Fruška Gora Trail".to_string(),
        date: "25.10.2026.".to_string(),
        link: "/events/1234/".to_string(),
    };
    let details = extract_detail_fields(&fixture("trka_event_social.html")?);
    assert_eq!(details.contact, None);

    let event = listing_event(card, "https://www.trka.rs/events/1234/", details, "Serbia");
    assert_eq!(event.link, "https://www.trka.rs/events/1234/");
    assert_eq!(
        event.facebook.as_deref(),
        Some("https://www.Facebook.com/fruskagoratrail")
    );
    assert_eq!(event.instagram, None);
    Ok(())
}

#[test]
fn schedule_events_resolve_links_by_precedence() -> Result<()> {
    let html = fixture("runtrace_index.html")?;
    let events = extract_schedule_events(
        &html,
        "https://runtrace.net",
        "Serbia",
        &known_fixture()?,
    )?;

    let titles = events.iter().map(|e| e.title.as_str()).collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec![
            "Avala Night Run",
            "Zlatibor Trail",
            "Kosmaj OCR",
            "Ada Ciganlija Cross"
        ]
    );

    assert_eq!(
        events[0].link,
        "https://runtrace.net/?event=avala-night-run-2026"
    );
    assert_eq!(events[0].date, EventDate::Parsed(ymd(2026, 10, 25)));
    assert_eq!(events[0].location.as_deref(), Some("Beograd"));
    assert_eq!(events[0].country, "Serbia");

    assert_eq!(events[1].link, "https://runtrace.net/signup/zlatibor");
    assert_eq!(events[1].date, EventDate::Text("Oktobar 2026".to_string()));
    assert_eq!(events[1].event_type, EventType::Trail);

    assert_eq!(events[2].link, "https://runtrace.net/participants/kosmaj");
    assert_eq!(events[2].event_type, EventType::Ocr);
    assert_eq!(events[2].location, None);

    assert_eq!(events[3].link, "https://runtrace.net");
    assert_eq!(events[3].event_type, EventType::Other);
    Ok(())
}

#[test]
fn schedule_events_fold_sky_race_when_matching_known() -> Result<()> {
    let html = fixture("runtrace_index.html")?;

    let with_known = extract_schedule_events(&html, "https://runtrace.net", "Serbia", &known_fixture()?)?;
    assert!(!with_known.iter().any(|e| e.title == "Rtanj SkyRace"));

    let without_known =
        extract_schedule_events(&html, "https://runtrace.net", "Serbia", &KnownRaces::default())?;
    assert_eq!(without_known.len(), 5);
    Ok(())
}
