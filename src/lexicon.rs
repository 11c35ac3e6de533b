//! The category → phrase registry that drives detection.
//!
//! A [`Lexicon`] is built once at startup and shared read-only (usually behind an `Arc`) by
//! every pipeline run. Phrases are stored in their normalized form, so the detector compares
//! with plain string equality.

use std::collections::{BTreeSet, HashSet};
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;
use crate::settings::FilterSettings;
use crate::{Error, Result};

const PROFANITY_CURSE: &[&str] = &[
    "damn",
    "damnit",
    "damned",
    "hell",
    "crap",
    "shit",
    "shitty",
    "shitting",
    "fuck",
    "fucking",
    "fucked",
    "bitch",
    "bitching",
    "ass",
    "asses",
    "bastard",
    "bastards",
    "piss",
    "pissed",
    "asshole",
    "assholes",
    "dickhead",
    "dickheads",
    "motherfucker",
    "motherfuckers",
    "cocksucker",
    "cocksuckers",
    "bullshit",
];

const BLASPHEMY_RELIGIOUS: &[&str] = &[
    "goddamn",
    "god damn",
    "jesus",
    "christ",
    "jesus christ",
    "holy shit",
];

const MILD_LANGUAGE: &[&str] = &["darn", "dang", "crud", "frick", "shoot"];

const SLURS_HATE: &[&str] = &[];

/// One named group of trigger phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub phrases: Vec<String>,
}

/// Immutable registry of profanity categories.
///
/// Category order matters: [`Lexicon::category_of`] reports the first category containing a
/// word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    categories: Vec<Category>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    /// The built-in registry.
    pub fn builtin() -> Self {
        let builtin = [
            ("profanity_curse", PROFANITY_CURSE),
            ("blasphemy_religious", BLASPHEMY_RELIGIOUS),
            ("mild_language", MILD_LANGUAGE),
            ("slurs_hate", SLURS_HATE),
        ];

        let categories = builtin
            .iter()
            .map(|(id, phrases)| Category {
                id: (*id).to_owned(),
                phrases: phrases.iter().map(|p| (*p).to_owned()).collect(),
            })
            .collect();

        Self { categories }
    }

    /// Build a custom registry.
    ///
    /// Phrases are normalized and deduplicated within their category (first occurrence wins).
    /// Empty category ids, phrases that normalize to nothing, and repeated category ids are
    /// rejected.
    pub fn from_categories<I>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = Category>,
    {
        let mut seen_ids = HashSet::new();
        let mut out = Vec::new();

        for category in categories {
            let id = category.id.trim().to_owned();
            if id.is_empty() {
                return Err(Error::InvalidLexicon("category id must not be empty".into()));
            }
            if !seen_ids.insert(id.clone()) {
                return Err(Error::InvalidLexicon(format!(
                    "duplicate category id '{id}'"
                )));
            }

            let mut seen_phrases = HashSet::new();
            let mut phrases = Vec::with_capacity(category.phrases.len());
            for raw in &category.phrases {
                let phrase = normalize(raw);
                if phrase.is_empty() {
                    return Err(Error::InvalidLexicon(format!(
                        "category '{id}' has a phrase with no letters or digits: {raw:?}"
                    )));
                }
                if seen_phrases.insert(phrase.clone()) {
                    phrases.push(phrase);
                }
            }

            out.push(Category { id, phrases });
        }

        Ok(Self { categories: out })
    }

    /// Load a registry from a JSON array of `{"id": ..., "phrases": [...]}` objects.
    pub fn from_json_reader<R: Read>(r: R) -> Result<Self> {
        let categories: Vec<Category> = serde_json::from_reader(r)?;
        Self::from_categories(categories)
    }

    /// Category ids in registry order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.id.as_str())
    }

    /// Phrases of a single category, if it exists.
    pub fn phrases(&self, category_id: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.phrases.as_slice())
    }

    /// The deduplicated union of phrases for every enabled category.
    ///
    /// Unknown category ids are skipped.
    pub fn active_words(&self, settings: &FilterSettings) -> BTreeSet<String> {
        settings
            .enabled_categories
            .iter()
            .filter_map(|id| self.phrases(id))
            .flatten()
            .cloned()
            .collect()
    }

    /// The first category (in registry order) that contains `word`.
    pub fn category_of(&self, word: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.phrases.iter().any(|p| p == word))
            .map(|c| c.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(categories: &[&str]) -> FilterSettings {
        FilterSettings::default().with_categories(categories.iter().copied())
    }

    #[test]
    fn builtin_categories_are_in_registry_order() {
        let lexicon = Lexicon::builtin();
        let ids: Vec<&str> = lexicon.categories().collect();
        assert_eq!(
            ids,
            vec![
                "profanity_curse",
                "blasphemy_religious",
                "mild_language",
                "slurs_hate"
            ]
        );
    }

    #[test]
    fn builtin_phrases_are_already_normalized() {
        let lexicon = Lexicon::builtin();
        for id in lexicon.categories() {
            for phrase in lexicon.phrases(id).unwrap_or_default() {
                assert_eq!(&normalize(phrase), phrase);
            }
        }
    }

    #[test]
    fn active_words_unions_enabled_categories() {
        let lexicon = Lexicon::builtin();
        let words = lexicon.active_words(&settings(&["mild_language", "blasphemy_religious"]));

        assert!(words.contains("darn"));
        assert!(words.contains("holy shit"));
        assert!(!words.contains("fuck"));
        assert_eq!(words.len(), MILD_LANGUAGE.len() + BLASPHEMY_RELIGIOUS.len());
    }

    #[test]
    fn active_words_deduplicates_repeated_categories() {
        let lexicon = Lexicon::builtin();
        let once = lexicon.active_words(&settings(&["mild_language"]));
        let twice = lexicon.active_words(&settings(&["mild_language", "mild_language"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_categories_are_ignored() {
        let lexicon = Lexicon::builtin();
        let known = lexicon.active_words(&settings(&["profanity_curse"]));
        let with_unknown =
            lexicon.active_words(&settings(&["profanity_curse", "added_next_year"]));
        assert_eq!(known, with_unknown);
    }

    #[test]
    fn empty_category_contributes_nothing() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.active_words(&settings(&["slurs_hate"])).is_empty());
    }

    #[test]
    fn category_of_reports_first_match() -> anyhow::Result<()> {
        let lexicon = Lexicon::from_categories([
            Category {
                id: "first".into(),
                phrases: vec!["heck".into()],
            },
            Category {
                id: "second".into(),
                phrases: vec!["heck".into(), "darn".into()],
            },
        ])?;

        assert_eq!(lexicon.category_of("heck"), Some("first"));
        assert_eq!(lexicon.category_of("darn"), Some("second"));
        assert_eq!(lexicon.category_of("hello"), None);
        Ok(())
    }

    #[test]
    fn custom_phrases_are_normalized_and_deduplicated() -> anyhow::Result<()> {
        let lexicon = Lexicon::from_json_reader(
            r#"[{"id": "custom", "phrases": ["Heck!", "heck", " Gosh "]}]"#.as_bytes(),
        )?;
        assert_eq!(
            lexicon.phrases("custom"),
            Some(&["heck".to_owned(), "gosh".to_owned()][..])
        );
        Ok(())
    }

    #[test]
    fn duplicate_category_ids_are_rejected() {
        let err = Lexicon::from_json_reader(
            r#"[{"id": "a", "phrases": ["x"]}, {"id": "a", "phrases": ["y"]}]"#.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidLexicon(_)));
    }

    #[test]
    fn punctuation_only_phrases_are_rejected() {
        let json = r#"[{"id": "a", "phrases": ["?!"]}]"#;
        let err = Lexicon::from_json_reader(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no letters or digits"));
    }
}
