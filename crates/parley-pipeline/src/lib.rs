//! Parley Pipeline - NLU Orchestrator
//!
//! Sequences spellchecking, entity extraction, statistical intent
//! classification, and QnA matching into one deterministic
//! `compute(sentence, context)` call.
//!
//! The precedence between local classification and QnA matching is an
//! explicit three-state machine ([`QnaMode`]): QnA-before with local
//! fallback, local-first with QnA fallback, or local only. Emptiness is
//! the sole fallback trigger — a transport failure is never treated as an
//! empty result, and no confidence threshold is applied at this layer.

use std::sync::Arc;

use parley_core::{
    ClassificationFilter, ClassificationResult, ClassifierCredentials, DialogContext, Entity,
    EntityExtractor, IntentClassifier, NluConfig, NluError, QnaMatch, QnaMatcher, QnaMode,
    Result, Spellchecker, Understanding, QNAS_DIM, QNA_INTENT_LABEL,
};
use parley_extract::{BooleanExtractor, ExtractorRegistry, LocationExtractor};

pub mod classify;
pub mod qna;
pub mod spellcheck;

pub use classify::HttpClassifier;
pub use qna::HttpQna;
pub use spellcheck::HttpSpellchecker;

// ============================================================================
// Orchestrator
// ============================================================================

/// The NLU orchestrator
///
/// Built once per bot; all held state is read-only after construction, so
/// concurrent `compute` calls are independent.
pub struct Nlu {
    registry: ExtractorRegistry,
    classifier: Arc<dyn IntentClassifier>,
    qna: Arc<dyn QnaMatcher>,
    spellchecker: Arc<dyn Spellchecker>,
    filter: Option<Arc<dyn ClassificationFilter>>,
    config: NluConfig,
}

impl Nlu {
    /// Create an orchestrator backed by the remote HTTP services
    ///
    /// Registers the built-in extractors (boolean, then location) for the
    /// configured locale. Fails fast on missing credentials, before any
    /// network call can be attempted.
    pub fn new(credentials: &ClassifierCredentials, config: NluConfig) -> Result<Self> {
        credentials.validate()?;

        let registry = ExtractorRegistry::new()
            .with_extractor(Arc::new(BooleanExtractor::new(&config.locale)?))
            .with_extractor(Arc::new(LocationExtractor::new()?));

        Ok(Self {
            registry,
            classifier: Arc::new(HttpClassifier::from_credentials(credentials)?),
            qna: Arc::new(HttpQna::from_credentials(credentials)?),
            spellchecker: Arc::new(HttpSpellchecker::from_credentials(credentials)?),
            filter: None,
            config,
        })
    }

    /// Create an orchestrator from explicit parts
    ///
    /// Used by tests and by callers that bring their own backends. The
    /// registry starts as given; no built-in extractors are added.
    pub fn from_parts(
        registry: ExtractorRegistry,
        classifier: Arc<dyn IntentClassifier>,
        qna: Arc<dyn QnaMatcher>,
        spellchecker: Arc<dyn Spellchecker>,
        config: NluConfig,
    ) -> Self {
        Self {
            registry,
            classifier,
            qna,
            spellchecker,
            filter: None,
            config,
        }
    }

    /// Append a user-supplied extractor after the ones already registered
    pub fn with_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.registry.register(extractor);
        self
    }

    /// Install the optional classification filter hook
    ///
    /// When a filter is present, the filtered list is truncated to one
    /// intent (two with `multi_intent`). Without a filter, the
    /// classifier's full ranked list is returned untouched.
    pub fn with_filter(mut self, filter: Arc<dyn ClassificationFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &NluConfig {
        &self.config
    }

    /// Compute intents and entities for one utterance
    pub async fn compute(
        &self,
        sentence: &str,
        context: &DialogContext,
    ) -> Result<Understanding> {
        tracing::info!(qna = %self.config.qna, "nlu compute started");

        // Spellcheck failures are fatal here: correcting on a best-effort
        // basis would make downstream results depend on a hidden error.
        let sentence = match &self.config.spellchecking {
            Some(key) => {
                let corrected = self.spellchecker.correct(sentence, key).await?;
                tracing::debug!(%corrected, "sentence spellchecked");
                corrected
            }
            None => sentence.to_string(),
        };

        match self.config.qna {
            QnaMode::Before => {
                let matches = self.qna.matches(&sentence).await?;
                if !matches.is_empty() {
                    return Ok(wrap_qna_matches(matches));
                }
                tracing::debug!("no qna match, falling back to local classification");
                self.compute_local(&sentence, context).await
            }
            QnaMode::After => {
                let local = self.compute_local(&sentence, context).await?;
                if !local.intents.is_empty() {
                    return Ok(local);
                }
                tracing::debug!("no local intent, falling back to qna");
                let matches = self.qna.matches(&sentence).await?;
                Ok(wrap_qna_matches(matches))
            }
            QnaMode::Off => self.compute_local(&sentence, context).await,
        }
    }

    /// Extractor fan-out, remote classification, then the filter hook
    async fn compute_local(
        &self,
        sentence: &str,
        context: &DialogContext,
    ) -> Result<Understanding> {
        let entities = self.registry.compute(sentence).await?;
        tracing::debug!(count = entities.len(), "entities extracted");

        let intents = self.classifier.classify(sentence, &entities).await?;
        tracing::debug!(count = intents.len(), "intents classified");

        let intents = self.apply_filter(intents, context).await?;

        Ok(Understanding::new(intents, entities))
    }

    /// Run the filter hook if configured, then truncate
    ///
    /// Truncation is gated on filter presence, not on `multi_intent`
    /// alone: with no filter installed the raw ranked list passes through
    /// whole. This asymmetry is a binding contract.
    async fn apply_filter(
        &self,
        intents: Vec<ClassificationResult>,
        context: &DialogContext,
    ) -> Result<Vec<ClassificationResult>> {
        let Some(filter) = &self.filter else {
            return Ok(intents);
        };

        let mut filtered = filter.filter(intents, context).await.map_err(|err| {
            match err {
                already @ NluError::Filter(_) => already,
                other => NluError::Filter(other.to_string()),
            }
        })?;

        let limit = if self.config.multi_intent { 2 } else { 1 };
        filtered.truncate(limit);
        Ok(filtered)
    }
}

/// Wrap QnA matches as the fixed `qnas_dialog` understanding
///
/// One synthetic intent at confidence 1.0 plus a single entity of dim
/// `"qnas"` carrying the raw match list.
fn wrap_qna_matches(matches: Vec<QnaMatch>) -> Understanding {
    let payload = serde_json::to_value(&matches).unwrap_or_default();
    Understanding::new(
        vec![ClassificationResult::new(QNA_INTENT_LABEL, 1.0)],
        vec![Entity::new(QNAS_DIM, payload)],
    )
}
