use crate::known::KnownRaces;
use crate::model::{Event, KnownRace, SimilarMatch};
use crate::names::extract_words;

pub fn find_similar_races<'a>(title: &str, known: &'a KnownRaces) -> Vec<&'a KnownRace> {
    let words = extract_words(title);
    if words.is_empty() {
        return Vec::new();
    }

    known
        .iter()
        .filter(|race| !extract_words(&race.name).is_disjoint(&words))
        .collect()
}

pub fn detect_similar(events: &[Event], known: &KnownRaces) -> Vec<SimilarMatch> {
    events
        .iter()
        .filter_map(|event| {
            let similar = find_similar_races(&event.title, known);
            if similar.is_empty() {
                return None;
            }
            Some(SimilarMatch {
                event_title: event.title.clone(),
                event_date: event.date.to_string(),
                known: similar.into_iter().cloned().collect(),
            })
        })
        .collect()
}
