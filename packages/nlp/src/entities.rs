//! Rule-based named-entity tagging.
//!
//! Resumes put names in a small number of shapes: a run of capitalized
//! words on one line ("Ada Lovelace", "Grace B. Hopper"), occasionally in
//! all capitals on a line of its own ("ALAN TURING"). Institutions look
//! the same but contain an organization word ("University of London",
//! "Acme Labs"). The tagger scans each line for such runs, drops runs made
//! of common words or resume headings, and labels the rest.

use std::collections::BTreeSet;

use crate::{Analysis, Analyzer, Entity, EntityLabel, SentenceSpans};

/// Capitalized words that never form part of a person's name.
///
/// Covers function words, resume section headings, and technical terms
/// that are routinely written in title case.
const STOP_WORDS: &[&str] = &[
    // Function words
    "A", "An", "The", "This", "That", "These", "Those", "I", "My", "Me", "We", "Our", "He",
    "She", "His", "Her", "It", "Its", "In", "On", "At", "By", "To", "From", "With", "For",
    "Of", "And", "Or", "But", "As", "Is", "Am", "Are", "Was", "Were", "Be", "Have", "Has",
    "Had", "Will", "Can", "Also", "All", "Any", "Some", "Each", "Other", "New", "Dear", "Sir",
    "Madam", "Mr", "Mrs", "Ms", "Dr", "Prof",
    // Resume headings and labels
    "Curriculum", "Vitae", "Resume", "Profile", "Summary", "Objective", "Career", "Contact",
    "Email", "Phone", "Mobile", "Address", "Skills", "Skill", "Technical", "Soft",
    "Education", "Educational", "Qualification", "Qualifications", "Experience", "Work",
    "Professional", "Employment", "History", "Projects", "Project", "Academic", "Mini",
    "Certifications", "Certification", "Certificate", "Achievements", "Awards", "Activities",
    "Hobbies", "Interests", "Languages", "Language", "Personal", "Details", "Information",
    "Declaration", "References", "Strengths", "Tools", "Frameworks", "Libraries", "Databases",
    "Internship", "Internships", "Intern", "Responsibilities", "Role", "Duration", "Date",
    "Birth", "Nationality", "Gender", "Status", "Linkedin", "Github", "Portfolio",
    // Degrees and study terms
    "Bachelor", "Bachelors", "Master", "Masters", "Degree", "Diploma", "Secondary", "Higher",
    "Senior", "Junior", "Grade", "Science", "Sciences", "Engineering", "Technology",
    "Arts", "Commerce", "Computer", "Computing",
    // Technical terms often written in title case
    "Machine", "Learning", "Deep", "Data", "Analysis", "Analytics", "Visualization",
    "Statistics", "Logistic", "Regression", "Random", "Forest", "Neural", "Networks",
    "Network", "Natural", "Processing", "Artificial", "Intelligence", "Web", "Development",
    "Developer", "Engineer", "Software", "Management", "System", "Systems", "Cloud",
    "Python", "Java", "Pandas", "Matplotlib", "Seaborn", "Tableau", "Excel", "Power",
    "Microsoft", "Office", "Google",
    // Calendar words
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug",
    "Sep", "Sept", "Oct", "Nov", "Dec", "Monday", "Tuesday", "Wednesday", "Thursday",
    "Friday", "Saturday", "Sunday", "Present", "Current",
];

/// Words that mark a run as an organization rather than a person.
const ORGANIZATION_WORDS: &[&str] = &[
    "University", "College", "School", "Institute", "Academy", "Polytechnic", "Inc",
    "Ltd", "Llc", "Corp", "Corporation", "Company", "Co", "Group", "Labs", "Lab",
    "Solutions", "Technologies", "Systems", "Services", "Foundation", "Bank", "Hospital",
    "Department", "Ministry", "Council", "Society", "Association", "Agency",
];

/// Lowercase words allowed inside an organization name.
const CONNECTORS: &[&str] = &["of", "and", "&", "the", "for", "de"];

/// Longest run accepted as a person's name.
const MAX_PERSON_WORDS: usize = 4;

/// Built-in [`Analyzer`] based on capitalization patterns and word lists.
#[derive(Debug, Clone)]
pub struct RuleBasedAnalyzer {
    stop_words: BTreeSet<String>,
    organization_words: BTreeSet<String>,
}

impl Default for RuleBasedAnalyzer {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|w| w.to_lowercase()).collect(),
            organization_words: ORGANIZATION_WORDS.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

impl RuleBasedAnalyzer {
    /// Creates an analyzer with the built-in word lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds words that must never be tagged as part of a person's name.
    #[must_use]
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Tags entities in `text`, in document order.
    #[must_use]
    pub fn entities(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();
        let mut offset = 0;

        for line in text.split('\n') {
            if let Some(entity) = self.all_caps_line(line, offset) {
                entities.push(entity);
            } else {
                self.scan_line(line, offset, &mut entities);
            }
            offset += line.len() + 1;
        }

        log::debug!("Tagged {} entities", entities.len());
        entities
    }

    fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    fn is_organization_word(&self, word: &str) -> bool {
        self.organization_words.contains(&word.to_lowercase())
    }

    /// A line consisting only of 2-4 all-caps words ("ALAN TURING") is
    /// taken as a name heading.
    fn all_caps_line(&self, line: &str, offset: usize) -> Option<Entity> {
        let tokens = tokenize(line);
        if !(2..=MAX_PERSON_WORDS).contains(&tokens.len()) {
            return None;
        }
        let all_caps_words = tokens.iter().all(|t| {
            t.core.chars().count() >= 2
                && t.core.chars().all(|c| c.is_alphabetic() && c.is_uppercase())
                && t.core.len() == t.raw.len()
        });
        if !all_caps_words || tokens.iter().any(|t| self.is_stop_word(t.core)) {
            return None;
        }

        let label = if tokens.iter().any(|t| self.is_organization_word(t.core)) {
            EntityLabel::Organization
        } else {
            EntityLabel::Person
        };
        let start = tokens[0].core_start;
        let end = tokens[tokens.len() - 1].core_end();
        Some(Entity {
            text: line[start..end].to_owned(),
            label,
            start: offset + start,
        })
    }

    /// Finds runs of capitalized words on one line.
    fn scan_line(&self, line: &str, offset: usize, entities: &mut Vec<Entity>) {
        let tokens = tokenize(line);
        let mut i = 0;

        while i < tokens.len() {
            if !self.is_run_word(&tokens[i]) {
                i += 1;
                continue;
            }

            let run_start = i;
            let mut run_end = i;
            let mut has_connector = false;
            let mut j = i;

            loop {
                if tokens[j].breaks_after() {
                    break;
                }
                let Some(next) = tokens.get(j + 1) else {
                    break;
                };
                if next.has_leading_punctuation() {
                    break;
                }
                if self.is_run_word(next) {
                    j += 1;
                    run_end = j;
                } else if CONNECTORS.contains(&next.core)
                    && next.core.len() == next.raw.len()
                    && tokens.get(j + 2).is_some_and(|t| self.is_run_word(t))
                {
                    has_connector = true;
                    j += 2;
                    run_end = j;
                } else {
                    break;
                }
            }

            let run = &tokens[run_start..=run_end];
            if let Some(entity) = self.label_run(line, offset, run, has_connector) {
                entities.push(entity);
            }
            i = run_end + 1;
        }
    }

    fn label_run(
        &self,
        line: &str,
        offset: usize,
        run: &[Token<'_>],
        has_connector: bool,
    ) -> Option<Entity> {
        let words: Vec<&Token<'_>> = run
            .iter()
            .filter(|t| !CONNECTORS.contains(&t.core))
            .collect();
        if words.len() < 2 {
            return None;
        }

        let label = if words.iter().any(|t| self.is_organization_word(t.core)) {
            EntityLabel::Organization
        } else if has_connector
            || words.len() > MAX_PERSON_WORDS
            || words.iter().any(|t| self.is_stop_word(t.core))
        {
            return None;
        } else {
            EntityLabel::Person
        };

        let start = run[0].core_start;
        let end = run[run.len() - 1].core_end();
        Some(Entity {
            text: line[start..end].to_owned(),
            label,
            start: offset + start,
        })
    }

    /// A word that can belong to a name or institution run.
    fn is_run_word(&self, token: &Token<'_>) -> bool {
        if token.is_initial() {
            return true;
        }
        let core = token.core;
        let Some(first) = core.chars().next() else {
            return false;
        };
        if !first.is_uppercase() {
            return false;
        }
        if !core
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '\'' | '\u{2019}' | '-'))
        {
            return false;
        }
        if !core.chars().any(char::is_lowercase) {
            return false;
        }
        self.is_organization_word(core) || !self.is_stop_word(core)
    }
}

impl Analyzer for RuleBasedAnalyzer {
    fn analyze<'a>(&self, text: &'a str) -> Analysis<'a> {
        Analysis::new(self.entities(text), SentenceSpans::new(text))
    }
}

/// A whitespace-delimited token with its punctuation-stripped core.
#[derive(Debug)]
struct Token<'a> {
    raw: &'a str,
    core: &'a str,
    /// Byte offset of `raw` within the line.
    raw_start: usize,
    /// Byte offset of `core` within the line.
    core_start: usize,
}

impl Token<'_> {
    /// Punctuation that follows `core` within `raw`.
    fn trailing(&self) -> &str {
        &self.raw[self.core_start - self.raw_start + self.core.len()..]
    }

    /// A single capital letter followed by exactly one period ("J.").
    fn is_initial(&self) -> bool {
        let mut chars = self.core.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
            && self.trailing() == "."
    }

    /// End offset of the token as it belongs to an entity; an initial
    /// keeps its period.
    fn core_end(&self) -> usize {
        let end = self.core_start + self.core.len();
        if self.is_initial() { end + 1 } else { end }
    }

    fn has_leading_punctuation(&self) -> bool {
        self.core_start > self.raw_start
    }

    /// Whether punctuation after this token ends the current run.
    fn breaks_after(&self) -> bool {
        !self.is_initial() && !self.trailing().is_empty()
    }
}

/// Splits a line into tokens, recording byte offsets.
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(make_token(line, s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(make_token(line, s, line.len()));
    }

    tokens
}

fn make_token(line: &str, start: usize, end: usize) -> Token<'_> {
    let raw = &line[start..end];
    let trimmed_front = raw.trim_start_matches(|c: char| !c.is_alphanumeric() && c != '&');
    let core = trimmed_front.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '&');
    Token {
        raw,
        core,
        raw_start: start,
        core_start: start + (raw.len() - trimmed_front.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(text: &str) -> Vec<(String, EntityLabel)> {
        RuleBasedAnalyzer::new()
            .entities(text)
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    #[test]
    fn finds_name_on_first_line() {
        assert_eq!(
            tagged("Ada Lovelace\nada@example.com"),
            vec![("Ada Lovelace".to_owned(), EntityLabel::Person)]
        );
    }

    #[test]
    fn keeps_middle_initial() {
        assert_eq!(
            tagged("Grace B. Hopper, Arlington"),
            vec![("Grace B. Hopper".to_owned(), EntityLabel::Person)]
        );
    }

    #[test]
    fn all_caps_name_line_is_a_person() {
        assert_eq!(
            tagged("ALAN TURING\nLondon"),
            vec![("ALAN TURING".to_owned(), EntityLabel::Person)]
        );
    }

    #[test]
    fn all_caps_headings_are_not_people() {
        assert!(tagged("ACADEMIC PROJECTS\nTECHNICAL SKILLS").is_empty());
    }

    #[test]
    fn institutions_are_organizations() {
        assert_eq!(
            tagged("Masters from University of London in 2019"),
            vec![("University of London".to_owned(), EntityLabel::Organization)]
        );
    }

    #[test]
    fn technical_terms_are_not_people() {
        assert!(tagged("Skilled in Machine Learning and Deep Learning").is_empty());
    }

    #[test]
    fn single_capitalized_words_are_ignored() {
        assert!(tagged("Worked at Globex on payments").is_empty());
    }

    #[test]
    fn punctuation_breaks_runs() {
        assert_eq!(
            tagged("Referees: Alan Turing, Grace Hopper"),
            vec![
                ("Alan Turing".to_owned(), EntityLabel::Person),
                ("Grace Hopper".to_owned(), EntityLabel::Person),
            ]
        );
    }

    #[test]
    fn entities_report_byte_offsets() {
        let text = "Resume\nAda Lovelace";
        let entities = RuleBasedAnalyzer::new().entities(text);
        assert_eq!(entities.len(), 1);
        let e = &entities[0];
        assert_eq!(&text[e.start..e.start + e.text.len()], "Ada Lovelace");
    }

    #[test]
    fn extra_stop_words_suppress_names() {
        let analyzer = RuleBasedAnalyzer::new().with_stop_words(["Lovelace"]);
        assert!(analyzer.entities("Ada Lovelace").is_empty());
    }

    #[test]
    fn analyze_bundles_sentences() {
        let analysis = RuleBasedAnalyzer::new().analyze("Ada Lovelace\n\nI am passionate. Done.");
        assert_eq!(analysis.entities().len(), 1);
        let sentences: Vec<&str> = analysis.into_sentences().collect();
        assert_eq!(sentences, vec!["Ada Lovelace", "I am passionate.", "Done."]);
    }

    #[test]
    fn empty_text_has_no_entities() {
        assert!(tagged("").is_empty());
    }

    #[test]
    fn initials_with_other_punctuation_do_not_extend_runs() {
        assert!(tagged("Signed: Ada J\u{2019}. and Ada J\u{2026}. again").is_empty());
        assert!(tagged("Ada J..").is_empty());
    }

    #[test]
    fn curly_apostrophe_stays_inside_a_name() {
        assert_eq!(
            tagged("Conan O\u{2019}Neil\nconan@example.com"),
            vec![("Conan O\u{2019}Neil".to_owned(), EntityLabel::Person)]
        );
    }

    #[test]
    fn ellipsis_ends_a_run() {
        assert_eq!(
            tagged("Ada Lovelace\u{2026} wrote notes"),
            vec![("Ada Lovelace".to_owned(), EntityLabel::Person)]
        );
    }

    #[test]
    fn multibyte_brackets_are_stripped() {
        let text = "\u{300c}Ada Lovelace\u{300d}";
        let entities = RuleBasedAnalyzer::new().entities(text);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Ada Lovelace");
        assert_eq!(entities[0].start, "\u{300c}".len());
    }
}
