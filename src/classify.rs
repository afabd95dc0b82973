//! Status classification: raw indicator text to a severity tier.

use serde::{Deserialize, Serialize};

/// Raw text recorded when no status text could be obtained.
pub const UNKNOWN_TEXT: &str = "Unknown";

/// Severity of a route's current status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Tier {
    Red,
    Amber,
    Green,
    Unknown,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Red => write!(f, "Red"),
            Tier::Amber => write!(f, "Amber"),
            Tier::Green => write!(f, "Green"),
            Tier::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One row of the vocabulary table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyEntry {
    /// Exact, case-sensitive indicator text.
    pub text: String,
    pub tier: Tier,
}

/// Ordered mapping from exact indicator text to tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    /// The table used by the public status pages.
    pub fn reference() -> Self {
        Self::from_entries([
            ("Cancelled", Tier::Red),
            ("One or more sailings are disrupted", Tier::Amber),
            ("Be aware / At risk", Tier::Amber),
            ("Normal service", Tier::Green),
        ])
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Tier)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(text, tier)| VocabularyEntry {
                    text: text.into(),
                    tier,
                })
                .collect(),
        }
    }

    /// Configured override, or the reference table when none is given.
    pub fn from_config(entries: &[VocabularyEntry]) -> Self {
        if entries.is_empty() {
            Self::reference()
        } else {
            Self {
                entries: entries.to_vec(),
            }
        }
    }

    /// First entry matching `text` exactly.
    pub fn lookup(&self, text: &str) -> Option<Tier> {
        self.entries
            .iter()
            .find(|e| e.text == text)
            .map(|e| e.tier)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::reference()
    }
}

/// Maps extracted text to a tier using an injected vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    vocabulary: Vocabulary,
}

impl Classifier {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Returns the tier and whether the text was recognized.
    /// Unrecognized text, including [`UNKNOWN_TEXT`], yields `Tier::Unknown`.
    pub fn classify(&self, text: &str) -> (Tier, bool) {
        match self.vocabulary.lookup(text) {
            Some(tier) => (tier, true),
            None => (Tier::Unknown, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table() {
        let c = Classifier::default();
        assert_eq!(c.classify("Cancelled"), (Tier::Red, true));
        assert_eq!(
            c.classify("One or more sailings are disrupted"),
            (Tier::Amber, true)
        );
        assert_eq!(c.classify("Be aware / At risk"), (Tier::Amber, true));
        assert_eq!(c.classify("Normal service"), (Tier::Green, true));
    }

    #[test]
    fn test_unrecognized_text_is_unknown() {
        let c = Classifier::default();
        assert_eq!(c.classify("Delayed due to weather"), (Tier::Unknown, false));
        assert_eq!(c.classify(UNKNOWN_TEXT), (Tier::Unknown, false));
        assert_eq!(c.classify(""), (Tier::Unknown, false));
    }

    #[test]
    fn test_match_is_exact_and_case_sensitive() {
        let c = Classifier::default();
        assert_eq!(c.classify("cancelled"), (Tier::Unknown, false));
        assert_eq!(c.classify("Normal service "), (Tier::Unknown, false));
        assert_eq!(c.classify("NORMAL SERVICE"), (Tier::Unknown, false));
    }

    #[test]
    fn test_injected_vocabulary_replaces_reference() {
        let c = Classifier::new(Vocabulary::from_entries([("Suspended", Tier::Red)]));
        assert_eq!(c.classify("Suspended"), (Tier::Red, true));
        assert_eq!(c.classify("Cancelled"), (Tier::Unknown, false));
    }

    #[test]
    fn test_first_entry_wins() {
        let v = Vocabulary::from_entries([("Check", Tier::Amber), ("Check", Tier::Red)]);
        assert_eq!(v.lookup("Check"), Some(Tier::Amber));
    }

    #[test]
    fn test_empty_config_falls_back_to_reference() {
        assert_eq!(Vocabulary::from_config(&[]), Vocabulary::reference());
    }

    #[test]
    fn test_tier_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Tier::Amber).unwrap(), "\"Amber\"");
        assert_eq!(Tier::Unknown.to_string(), "Unknown");
    }
}
