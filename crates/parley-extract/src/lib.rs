//! Parley Extract - Entity extraction fan-out
//!
//! Holds an ordered list of polymorphic extractors and exposes a single
//! fan-out/merge operation. Extractors run concurrently, but their results
//! are always concatenated in registration order: completion order never
//! affects merge order, and registration order is part of the observable
//! contract (later extractors may override earlier entities downstream).

use std::sync::Arc;

use futures::future;
use parley_core::{Entity, EntityExtractor, NluError, Result};

pub mod builtin;

pub use builtin::{BooleanExtractor, LocationExtractor};

/// Ordered registry of entity extractors
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn EntityExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extractor; registration order is invocation order
    pub fn register(&mut self, extractor: Arc<dyn EntityExtractor>) {
        self.extractors.push(extractor);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.register(extractor);
        self
    }

    /// Number of registered extractors
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run every extractor against the sentence and merge the results
    ///
    /// Invocations run concurrently; results are concatenated strictly in
    /// registration order once all have completed. Any extractor failure
    /// aborts the whole computation and propagates (a failing extractor
    /// indicates a misconfigured plugin, not an empty match).
    pub async fn compute(&self, sentence: &str) -> Result<Vec<Entity>> {
        let pending: Vec<_> = self
            .extractors
            .iter()
            .map(|extractor| extractor.compute(sentence))
            .collect();

        let outcomes = future::join_all(pending).await;

        let mut entities = Vec::new();
        for (extractor, outcome) in self.extractors.iter().zip(outcomes) {
            let batch = outcome.map_err(|err| match err {
                already @ NluError::Extractor { .. } => already,
                other => NluError::extractor(extractor.name(), other.to_string()),
            })?;
            tracing::debug!(
                extractor = extractor.name(),
                count = batch.len(),
                "extractor completed"
            );
            entities.extend(batch);
        }

        Ok(entities)
    }
}
