//! Parley Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the Parley
//! NLU pipeline:
//! - Understanding results (intents + entities)
//! - Entity and classification models
//! - Common error types
//! - Trait seams for extractors, classification backends, and filters
//! - Configuration management

pub mod config;

pub use config::{ClassifierCredentials, ConfigError, NluConfig, QnaMode};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Entity dimension used for wrapped QnA matches.
pub const QNAS_DIM: &str = "qnas";

/// Intent label synthesized when a QnA match answers the sentence.
pub const QNA_INTENT_LABEL: &str = "qnas_dialog";

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for NLU operations
#[derive(Error, Debug)]
pub enum NluError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Extractor '{name}' failed: {message}")]
    Extractor { name: String, message: String },

    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    #[error("Classification filter failed: {0}")]
    Filter(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NluError {
    /// Build a transport error for a named remote service
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Build an extractor error for a named extractor
    pub fn extractor(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extractor {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NluError>;

// ============================================================================
// Entities and Intents
// ============================================================================

/// A structured piece of information extracted from a sentence
///
/// `dim` is a stable discriminator used by consumers to locate a specific
/// entity kind (e.g. `"boolean"`, `"location"`, `"qnas"`). The payload is
/// extractor-specific and carried as open JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Dimension discriminator
    pub dim: String,

    /// Extractor-specific payload
    pub value: serde_json::Value,

    /// The matched surface text, when the extractor tracks it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Byte offset of the match start in the sentence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,

    /// Byte offset of the match end in the sentence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Entity {
    /// Create a new entity with a dimension and payload
    pub fn new(dim: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            dim: dim.into(),
            value: value.into(),
            body: None,
            start: None,
            end: None,
        }
    }

    /// Attach the matched surface text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach the match span (byte offsets)
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// A labeled, confidence-scored guess at the user's intention
///
/// Confidence is in `[0, 1]`. Backends return these ranked descending;
/// the pipeline preserves that order and never re-sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Intent label
    pub label: String,

    /// Confidence score
    pub value: f32,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, value: f32) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A candidate answer retrieved from the QnA knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QnaMatch {
    /// Question variants this match covers
    pub questions: Vec<String>,

    /// The stored answer
    pub answer: String,

    /// Match score from the QnA service
    pub score: f32,
}

/// The result of one NLU computation: ranked intents plus extracted entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Understanding {
    /// Ranked intent classifications
    pub intents: Vec<ClassificationResult>,

    /// Extracted entities
    pub entities: Vec<Entity>,
}

impl Understanding {
    /// Create an understanding from intents and entities
    pub fn new(intents: Vec<ClassificationResult>, entities: Vec<Entity>) -> Self {
        Self { intents, entities }
    }
}

// ============================================================================
// Dialog Context
// ============================================================================

/// Conversational context handed to the classification filter
///
/// Read-only during a `compute` call; the pipeline never writes to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogContext {
    values: HashMap<String, serde_json::Value>,
}

impl DialogContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a context value by key
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a context value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of context entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A pluggable unit that scans a sentence for one category of entity
///
/// Extractors are instantiated once at construction and reused across
/// calls; `compute` must not mutate shared state.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Extract entities from the sentence
    async fn compute(&self, sentence: &str) -> Result<Vec<Entity>>;

    /// Extractor name for logging and error reporting
    fn name(&self) -> &str;
}

/// A statistical intent classification backend
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify the sentence into ranked intents, given already-extracted
    /// entities as context. The returned order is the backend's ranking.
    async fn classify(
        &self,
        sentence: &str,
        entities: &[Entity],
    ) -> Result<Vec<ClassificationResult>>;
}

/// A QnA matching backend
#[async_trait]
pub trait QnaMatcher: Send + Sync {
    /// Retrieve candidate question-answer matches for the sentence
    async fn matches(&self, sentence: &str) -> Result<Vec<QnaMatch>>;
}

/// A spellchecking backend
#[async_trait]
pub trait Spellchecker: Send + Sync {
    /// Return the corrected sentence
    async fn correct(&self, sentence: &str, key: &str) -> Result<String>;
}

/// An optional reranking/truncation hook applied after local classification
#[async_trait]
pub trait ClassificationFilter: Send + Sync {
    /// Rerank or drop classification results given conversational context
    async fn filter(
        &self,
        results: Vec<ClassificationResult>,
        context: &DialogContext,
    ) -> Result<Vec<ClassificationResult>>;
}

// ============================================================================
// Tests
// ============================================================================
