#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heuristic field extraction.
//!
//! Turns the assembled text of a resume, plus an NLP [`Analysis`] of it,
//! into a [`ParsedRecord`]. Every rule is independent and none of them
//! fail: a field with no match is left as the empty persistence sentinel.

pub mod config;

use std::sync::LazyLock;

use regex::Regex;
use resume_ledger_nlp::{Analysis, Analyzer, EntityLabel};
use resume_ledger_record_models::ParsedRecord;

pub use config::{ConfigError, ExtractionConfig};

/// Separator between values of a single-line field.
const LIST_SEPARATOR: &str = ", ";

/// Separator between values of a multi-line field.
const LINE_SEPARATOR: &str = "\n";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d{10,12}").expect("valid phone regex"));

/// Applies the extraction rules of an [`ExtractionConfig`].
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    config: ExtractionConfig,
    skills_lower: Vec<String>,
    profile_cues_lower: Vec<String>,
}

impl FieldExtractor {
    /// Creates an extractor for the given vocabulary.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        let skills_lower = config.skills.iter().map(|s| s.to_lowercase()).collect();
        let profile_cues_lower = config
            .profile_cues
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        Self {
            config,
            skills_lower,
            profile_cues_lower,
        }
    }

    /// The vocabulary this extractor was built from.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts every field from `text` and its analysis.
    ///
    /// `analysis` must have been produced from the same `text`.
    #[must_use]
    pub fn extract(&self, text: &str, analysis: Analysis<'_>) -> ParsedRecord {
        let name = analysis
            .first_entity(EntityLabel::Person)
            .map(|e| e.text.clone())
            .unwrap_or_default();
        let profile = self.profile(analysis.into_sentences());

        let record = ParsedRecord {
            name,
            emails: emails(text),
            phones: phones(text),
            skills: self.skills(text),
            education: matching_lines(text, &self.config.education_keywords),
            projects: matching_lines(text, &self.config.project_keywords),
            profile,
        };

        log::debug!(
            "Extracted fields: name={} emails={} phones={} skills={} education_lines={} project_lines={} profile_sentences={}",
            !record.name.is_empty(),
            count_items(&record.emails, LIST_SEPARATOR),
            count_items(&record.phones, LIST_SEPARATOR),
            count_items(&record.skills, LIST_SEPARATOR),
            count_items(&record.education, LINE_SEPARATOR),
            count_items(&record.projects, LINE_SEPARATOR),
            count_items(&record.profile, LINE_SEPARATOR),
        );

        record
    }

    /// Runs `analyzer` over `text` and extracts every field.
    #[must_use]
    pub fn extract_with<A: Analyzer + ?Sized>(&self, analyzer: &A, text: &str) -> ParsedRecord {
        self.extract(text, analyzer.analyze(text))
    }

    /// Vocabulary entries found anywhere in the text, ignoring case, in
    /// vocabulary order.
    fn skills(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let mut found: Vec<&str> = Vec::new();
        for (skill, skill_lower) in self.config.skills.iter().zip(&self.skills_lower) {
            if lower.contains(skill_lower.as_str()) && !found.contains(&skill.as_str()) {
                found.push(skill);
            }
        }
        found.join(LIST_SEPARATOR)
    }

    /// Sentences containing a profile cue word, ignoring case.
    fn profile<'a>(&self, sentences: impl Iterator<Item = &'a str>) -> String {
        sentences
            .filter(|sentence| {
                let lower = sentence.to_lowercase();
                self.profile_cues_lower
                    .iter()
                    .any(|cue| lower.contains(cue.as_str()))
            })
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }
}

/// Every email-like token, left to right, duplicates kept.
#[must_use]
pub fn emails(text: &str) -> String {
    join_matches(&EMAIL_RE, text)
}

/// Every phone-like digit run, left to right, duplicates kept.
#[must_use]
pub fn phones(text: &str) -> String {
    join_matches(&PHONE_RE, text)
}

fn join_matches(re: &Regex, text: &str) -> String {
    re.find_iter(text)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Lines containing any of `keywords` (case-sensitive), trimmed, in order.
#[must_use]
pub fn matching_lines(text: &str, keywords: &[String]) -> String {
    text.split('\n')
        .filter(|line| keywords.iter().any(|k| line.contains(k.as_str())))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

fn count_items(value: &str, separator: &str) -> usize {
    if value.is_empty() {
        0
    } else {
        value.split(separator).count()
    }
}

#[cfg(test)]
mod tests {
    use resume_ledger_nlp::{Entity, RuleBasedAnalyzer};
    use resume_ledger_record_models::{Field, NOT_AVAILABLE};

    use super::*;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(ExtractionConfig::builtin().unwrap())
    }

    fn person(text: &str, start: usize) -> Entity {
        Entity {
            text: text.to_owned(),
            label: EntityLabel::Person,
            start,
        }
    }

    #[test]
    fn emails_are_kept_in_order() {
        assert_eq!(
            emails("contact me at a.b@x.com or c@d"),
            "a.b@x.com, c@d"
        );
    }

    #[test]
    fn duplicate_emails_are_kept() {
        assert_eq!(emails("x@y.z and x@y.z"), "x@y.z, x@y.z");
    }

    #[test]
    fn phones_match_ten_to_twelve_digits() {
        assert_eq!(
            phones("call 9876543210 or +919876543210 ext 12"),
            "9876543210, +919876543210"
        );
    }

    #[test]
    fn nine_digit_runs_are_not_phones() {
        assert_eq!(phones("ref 987654321 only"), "");
    }

    #[test]
    fn skills_are_case_insensitive_and_unique() {
        let text = "python and PYTHON, also sql and machine learning";
        assert_eq!(extractor().skills(text), "Python, SQL, Machine Learning");
    }

    #[test]
    fn skills_follow_vocabulary_order() {
        let text = "Tableau dashboards built with Pandas";
        assert_eq!(extractor().skills(text), "Pandas, Tableau");
    }

    #[test]
    fn skills_match_as_substrings() {
        // "Java" is contained in "JavaScript".
        assert_eq!(extractor().skills("JavaScript"), "Java, JavaScript");
    }

    #[test]
    fn education_lines_are_case_sensitive() {
        let config = ExtractionConfig::builtin().unwrap();
        let text = "  Bachelors in Physics  \nuniversity dropout\nXYZ College, 2018\n+2 from ABC";
        assert_eq!(
            matching_lines(text, &config.education_keywords),
            "Bachelors in Physics\nXYZ College, 2018\n+2 from ABC"
        );
    }

    #[test]
    fn project_lines_keep_duplicates() {
        let config = ExtractionConfig::builtin().unwrap();
        let text = "ACADEMIC PROJECTS\nChatbot Project\nChatbot Project\nhobbies";
        assert_eq!(
            matching_lines(text, &config.project_keywords),
            "ACADEMIC PROJECTS\nChatbot Project\nChatbot Project"
        );
    }

    #[test]
    fn profile_keeps_cue_sentences() {
        let analysis = Analysis::new(
            Vec::new(),
            [
                "I am a Passionate engineer.",
                "I like cats.",
                "Highly SKILLED in SQL.",
            ]
            .into_iter(),
        );
        let record = extractor().extract("", analysis);
        assert_eq!(
            record.profile,
            "I am a Passionate engineer.\nHighly SKILLED in SQL."
        );
    }

    #[test]
    fn name_is_first_reported_person() {
        let analysis = Analysis::new(
            vec![
                Entity {
                    text: "Acme Labs".to_owned(),
                    label: EntityLabel::Organization,
                    start: 0,
                },
                person("Grace Hopper", 30),
                person("Alan Turing", 10),
            ],
            std::iter::empty(),
        );
        let record = extractor().extract("", analysis);
        assert_eq!(record.name, "Grace Hopper");
    }

    #[test]
    fn non_ascii_punctuation_after_initials_is_tolerated() {
        let text = "Conan O\u{2019}Neil\nSigned: Conan J\u{2019}. and Conan J\u{2026}.\nconan@example.com";
        let record = extractor().extract_with(&RuleBasedAnalyzer::new(), text);

        assert_eq!(record.name, "Conan O\u{2019}Neil");
        assert_eq!(record.emails, "conan@example.com");
    }

    #[test]
    fn empty_text_yields_all_sentinels() {
        let record = extractor().extract_with(&RuleBasedAnalyzer::new(), "");
        assert!(record.is_blank());
        for field in Field::ALL {
            assert_eq!(record.get(field), "");
            assert_eq!(record.display_value(field), NOT_AVAILABLE);
        }
    }

    #[test]
    fn extracts_full_resume() {
        let text = "Ada Lovelace\n\
                    ada@example.com | +441234567890\n\
                    \n\
                    I am passionate about numbers. I enjoy poetry.\n\
                    \n\
                    Masters in Mathematics, University of London\n\
                    Skills: Python, Statistics\n\
                    Mini Projects: Analytical Engine";
        let record = extractor().extract_with(&RuleBasedAnalyzer::new(), text);

        assert_eq!(record.name, "Ada Lovelace");
        assert_eq!(record.emails, "ada@example.com");
        assert_eq!(record.phones, "+441234567890");
        assert_eq!(record.skills, "Python, Statistics");
        assert_eq!(
            record.education,
            "Masters in Mathematics, University of London"
        );
        assert_eq!(record.projects, "Mini Projects: Analytical Engine");
        assert_eq!(record.profile, "I am passionate about numbers.");
    }

    #[test]
    fn custom_vocabulary_drives_rules() {
        let config = ExtractionConfig {
            skills: vec!["Rust".to_owned()],
            education_keywords: vec!["PhD".to_owned()],
            project_keywords: vec!["Side project".to_owned()],
            profile_cues: vec!["curious".to_owned()],
        };
        let text = "PhD, 2020\nSide project: a rust compiler\n\nA curious mind.";
        let record = FieldExtractor::new(config).extract_with(&RuleBasedAnalyzer::new(), text);

        assert_eq!(record.skills, "Rust");
        assert_eq!(record.education, "PhD, 2020");
        assert_eq!(record.projects, "Side project: a rust compiler");
        assert_eq!(record.profile, "A curious mind.");
    }
}
