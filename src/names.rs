use std::collections::BTreeSet;

pub const NOISE_WORDS: [&str; 19] = [
    "kolo",
    "vtl",
    "втл",
    "trail",
    "ttls",
    "ultra",
    "maraton",
    "polumaraton",
    "marathon",
    "halfmarathon",
    "half",
    "race",
    "run",
    "challenge",
    "ocr",
    "trka",
    "skyrace",
    "na",
    "ultramaraton",
];

const WORD_SEPARATORS: [char; 5] = [' ', ',', '.', '-', '&'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Ordinal, case-sensitive, untrimmed.
    Exact,
    /// Ordinal, ignoring case.
    CaseInsensitive,
    /// Case-insensitive after [`comparable_name`] folding.
    Canonical,
}

impl NameRule {
    pub fn matches(self, known: &str, candidate: &str) -> bool {
        match self {
            NameRule::Exact => known == candidate,
            NameRule::CaseInsensitive => known.to_lowercase() == candidate.to_lowercase(),
            NameRule::Canonical => comparable_name(known) == comparable_name(candidate),
        }
    }
}

pub fn comparable_name(name: &str) -> String {
    name.to_lowercase().replace("sky race", "skyrace")
}

pub fn extract_words(name: &str) -> BTreeSet<String> {
    name.split(WORD_SEPARATORS)
        .map(|word| {
            word.trim_matches(|c: char| c == ' ' || c == '"' || c == '\'')
                .to_lowercase()
        })
        .filter(|word| !word.trim().is_empty())
        .filter(|word| word.parse::<i64>().is_err())
        .filter(|word| !NOISE_WORDS.contains(&word.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparable_name_folds_sky_race() {
        assert_eq!(comparable_name("Sky Race"), comparable_name("SkyRace"));
        assert!(NameRule::Canonical.matches("Rtanj Sky Race", "RTANJ SKYRACE"));
    }

    #[test]
    fn comparable_name_is_idempotent() {
        for name in ["Sky Race Kopaonik", "Fruška Gora Trail", "sky  race", "ABC"] {
            let once = comparable_name(name);
            assert_eq!(comparable_name(&once), once);
        }
    }

    #[test]
    fn rules_differ_on_case() {
        assert!(NameRule::Exact.matches("City Trail 2026", "City Trail 2026"));
        assert!(!NameRule::Exact.matches("City Trail 2026", "city trail 2026"));
        assert!(NameRule::CaseInsensitive.matches("City Trail 2026", "CITY TRAIL 2026"));
        assert!(!NameRule::CaseInsensitive.matches("City Trail 2026", "City Trail"));
        assert!(!NameRule::CaseInsensitive.matches("Sky Race", "SkyRace"));
    }

    #[test]
    fn extract_words_drops_noise_and_numbers() {
        let words = extract_words("Vršac Ultra-Trail 2026 & \"Kolo\" Run, 42.");
        let expected: BTreeSet<String> = ["vršac"].into_iter().map(String::from).collect();
        assert_eq!(words, expected);

        let words = extract_words("Avala 'Night' Challenge");
        assert!(words.contains("avala"));
        assert!(words.contains("night"));
        assert!(!words.contains("challenge"));
    }
}
