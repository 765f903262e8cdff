#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sentence segmentation and named-entity tagging for resume text.
//!
//! Field extraction only needs two things from an NLP engine: the named
//! entities in the text (with a category label) and the sentence spans.
//! The [`Analyzer`] trait captures exactly that contract so that any
//! engine can be plugged in; [`RuleBasedAnalyzer`] is the built-in,
//! dependency-free implementation.

pub mod entities;
pub mod sentences;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use entities::RuleBasedAnalyzer;
pub use sentences::SentenceSpans;

/// Semantic category assigned to an entity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    /// A person's name.
    #[strum(serialize = "PERSON")]
    Person,
    /// A company, school, or other institution.
    #[strum(serialize = "ORG")]
    Organization,
}

/// A span of the analyzed text tagged with a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity's text, exactly as it appears in the document.
    pub text: String,
    /// Category of the entity.
    pub label: EntityLabel,
    /// Byte offset of the entity in the analyzed text.
    pub start: usize,
}

/// Result of analyzing a text: entities in reported order plus a lazy
/// sequence of sentence spans.
///
/// Sentences are borrowed from the analyzed text and produced on demand;
/// the sequence can be consumed once.
pub struct Analysis<'a> {
    entities: Vec<Entity>,
    sentences: Box<dyn Iterator<Item = &'a str> + 'a>,
}

impl<'a> Analysis<'a> {
    /// Bundles entities with a sentence iterator.
    #[must_use]
    pub fn new(entities: Vec<Entity>, sentences: impl Iterator<Item = &'a str> + 'a) -> Self {
        Self {
            entities,
            sentences: Box::new(sentences),
        }
    }

    /// Entities in the order the engine reported them.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns the first entity with the given label.
    #[must_use]
    pub fn first_entity(&self, label: EntityLabel) -> Option<&Entity> {
        self.entities.iter().find(|e| e.label == label)
    }

    /// Consumes the analysis, yielding its sentence spans.
    pub fn into_sentences(self) -> impl Iterator<Item = &'a str> + 'a {
        self.sentences
    }
}

impl std::fmt::Debug for Analysis<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analysis")
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}

/// An NLP engine that can tag entities and segment sentences.
pub trait Analyzer {
    /// Analyzes `text`.
    fn analyze<'a>(&self, text: &'a str) -> Analysis<'a>;
}
