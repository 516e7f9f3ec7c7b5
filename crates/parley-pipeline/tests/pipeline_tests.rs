//! Orchestrator behavior tests against mock backends
//!
//! Covers the fallback state machine (qna before/after/off), the
//! filter/truncation contract, and error propagation, with call-count
//! assertions proving which backends were consulted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_core::{
    ClassificationFilter, ClassificationResult, DialogContext, Entity, EntityExtractor,
    IntentClassifier, NluConfig, NluError, QnaMatch, QnaMatcher, QnaMode, Result, Spellchecker,
    Understanding, QNAS_DIM, QNA_INTENT_LABEL,
};
use parley_extract::ExtractorRegistry;
use parley_pipeline::Nlu;

// ============================================================================
// Mocks
// ============================================================================

struct MockClassifier {
    intents: Vec<ClassificationResult>,
    calls: AtomicUsize,
    last_sentence: Mutex<String>,
}

impl MockClassifier {
    fn returning(intents: Vec<ClassificationResult>) -> Arc<Self> {
        Arc::new(Self {
            intents,
            calls: AtomicUsize::new(0),
            last_sentence: Mutex::new(String::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(
        &self,
        sentence: &str,
        _entities: &[Entity],
    ) -> Result<Vec<ClassificationResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sentence.lock().unwrap() = sentence.to_string();
        Ok(self.intents.clone())
    }
}

struct MockQna {
    matches: Vec<QnaMatch>,
    calls: AtomicUsize,
}

impl MockQna {
    fn returning(matches: Vec<QnaMatch>) -> Arc<Self> {
        Arc::new(Self {
            matches,
            calls: AtomicUsize::new(0),
        })
    }

    fn empty() -> Arc<Self> {
        Self::returning(Vec::new())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QnaMatcher for MockQna {
    async fn matches(&self, _sentence: &str) -> Result<Vec<QnaMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.clone())
    }
}

/// Spellchecker that must never be called
struct UnusedSpellchecker;

#[async_trait]
impl Spellchecker for UnusedSpellchecker {
    async fn correct(&self, _sentence: &str, _key: &str) -> Result<String> {
        panic!("spellchecker invoked without spellchecking configured");
    }
}

struct FixedSpellchecker {
    corrected: String,
}

#[async_trait]
impl Spellchecker for FixedSpellchecker {
    async fn correct(&self, _sentence: &str, _key: &str) -> Result<String> {
        Ok(self.corrected.clone())
    }
}

struct FailingSpellchecker;

#[async_trait]
impl Spellchecker for FailingSpellchecker {
    async fn correct(&self, _sentence: &str, _key: &str) -> Result<String> {
        Err(NluError::transport("spellcheck", "service unavailable"))
    }
}

struct StubExtractor;

#[async_trait]
impl EntityExtractor for StubExtractor {
    async fn compute(&self, _sentence: &str) -> Result<Vec<Entity>> {
        Ok(vec![Entity::new("color", "red")])
    }

    fn name(&self) -> &str {
        "color"
    }
}

/// Filter that passes results through unchanged
struct IdentityFilter;

#[async_trait]
impl ClassificationFilter for IdentityFilter {
    async fn filter(
        &self,
        results: Vec<ClassificationResult>,
        _context: &DialogContext,
    ) -> Result<Vec<ClassificationResult>> {
        Ok(results)
    }
}

struct FailingFilter;

#[async_trait]
impl ClassificationFilter for FailingFilter {
    async fn filter(
        &self,
        _results: Vec<ClassificationResult>,
        _context: &DialogContext,
    ) -> Result<Vec<ClassificationResult>> {
        Err(anyhow::anyhow!("context store offline").into())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn sample_match() -> QnaMatch {
    QnaMatch {
        questions: vec!["what are your opening hours?".to_string()],
        answer: "9 to 5, weekdays".to_string(),
        score: 0.91,
    }
}

fn light_intents() -> Vec<ClassificationResult> {
    vec![
        ClassificationResult::new("lights_off", 0.92),
        ClassificationResult::new("lights_on", 0.05),
    ]
}

fn nlu(
    classifier: Arc<MockClassifier>,
    qna: Arc<MockQna>,
    config: NluConfig,
) -> Nlu {
    Nlu::from_parts(
        ExtractorRegistry::new().with_extractor(Arc::new(StubExtractor)),
        classifier,
        qna,
        Arc::new(UnusedSpellchecker),
        config,
    )
}

// ============================================================================
// Fallback state machine
// ============================================================================

#[tokio::test]
async fn qna_before_with_match_never_invokes_local() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::returning(vec![sample_match()]);
    let config = NluConfig {
        qna: QnaMode::Before,
        ..Default::default()
    };
    let nlu = nlu(classifier.clone(), qna.clone(), config);

    let result = nlu
        .compute("what are your opening hours", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(qna.calls(), 1);
    assert_eq!(classifier.calls(), 0);
    assert_eq!(result.intents[0].label, QNA_INTENT_LABEL);
    assert_eq!(result.entities[0].dim, QNAS_DIM);
}

#[tokio::test]
async fn qna_before_with_empty_match_equals_local_result() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::empty();
    let config = NluConfig {
        qna: QnaMode::Before,
        ..Default::default()
    };
    let nlu = nlu(classifier.clone(), qna.clone(), config);

    let result = nlu
        .compute("turn off the light", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(qna.calls(), 1);
    assert_eq!(classifier.calls(), 1);

    let expected = Understanding::new(light_intents(), vec![Entity::new("color", "red")]);
    assert_eq!(result, expected);
}

#[tokio::test]
async fn qna_after_with_local_intents_never_invokes_qna() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::returning(vec![sample_match()]);
    let config = NluConfig {
        qna: QnaMode::After,
        ..Default::default()
    };
    let nlu = nlu(classifier.clone(), qna.clone(), config);

    let result = nlu
        .compute("turn off the light", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(classifier.calls(), 1);
    assert_eq!(qna.calls(), 0);
    assert_eq!(result.intents.len(), 2);
}

#[tokio::test]
async fn qna_after_with_empty_local_falls_back_to_qna() {
    let classifier = MockClassifier::returning(Vec::new());
    let qna = MockQna::returning(vec![sample_match()]);
    let config = NluConfig {
        qna: QnaMode::After,
        ..Default::default()
    };
    let nlu = nlu(classifier.clone(), qna.clone(), config);

    let result = nlu
        .compute("what are your opening hours", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(classifier.calls(), 1);
    assert_eq!(qna.calls(), 1);
    assert_eq!(result.intents[0].label, QNA_INTENT_LABEL);
    assert!((result.intents[0].value - 1.0).abs() < f32::EPSILON);
    assert_eq!(result.entities.len(), 1);
    assert_eq!(result.entities[0].dim, QNAS_DIM);
}

#[tokio::test]
async fn qna_off_never_invokes_qna() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::returning(vec![sample_match()]);
    let nlu = nlu(classifier.clone(), qna.clone(), NluConfig::default());

    nlu.compute("turn off the light", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(classifier.calls(), 1);
    assert_eq!(qna.calls(), 0);
}

// ============================================================================
// Filter / truncation contract
// ============================================================================

#[tokio::test]
async fn no_filter_returns_full_ranked_list_untruncated() {
    // Two classifier entries, no filter, multi_intent = false:
    // both entries come back untouched.
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::empty();
    let nlu = nlu(classifier, qna, NluConfig::default());

    let result = nlu
        .compute("turn off the light", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(result.intents, light_intents());
}

#[tokio::test]
async fn filter_present_truncates_to_one_intent() {
    let three = vec![
        ClassificationResult::new("a", 0.5),
        ClassificationResult::new("b", 0.3),
        ClassificationResult::new("c", 0.2),
    ];
    let classifier = MockClassifier::returning(three);
    let qna = MockQna::empty();
    let nlu = nlu(classifier, qna, NluConfig::default()).with_filter(Arc::new(IdentityFilter));

    let result = nlu.compute("anything", &DialogContext::new()).await.unwrap();

    assert_eq!(result.intents.len(), 1);
    assert_eq!(result.intents[0].label, "a");
}

#[tokio::test]
async fn filter_present_with_multi_intent_truncates_to_two() {
    let three = vec![
        ClassificationResult::new("a", 0.5),
        ClassificationResult::new("b", 0.3),
        ClassificationResult::new("c", 0.2),
    ];
    let classifier = MockClassifier::returning(three);
    let qna = MockQna::empty();
    let config = NluConfig {
        multi_intent: true,
        ..Default::default()
    };
    let nlu = nlu(classifier, qna, config).with_filter(Arc::new(IdentityFilter));

    let result = nlu.compute("anything", &DialogContext::new()).await.unwrap();

    let labels: Vec<_> = result.intents.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b"]);
}

#[tokio::test]
async fn filter_error_propagates_and_aborts() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::empty();
    let nlu = nlu(classifier, qna, NluConfig::default()).with_filter(Arc::new(FailingFilter));

    let err = nlu
        .compute("anything", &DialogContext::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NluError::Filter(_)));
}

// ============================================================================
// Spellchecking
// ============================================================================

#[tokio::test]
async fn spellcheck_replaces_sentence_before_classification() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::empty();
    let config = NluConfig {
        spellchecking: Some("en_US".to_string()),
        ..Default::default()
    };
    let nlu = Nlu::from_parts(
        ExtractorRegistry::new(),
        classifier.clone(),
        qna,
        Arc::new(FixedSpellchecker {
            corrected: "turn off the light".to_string(),
        }),
        config,
    );

    nlu.compute("turn of the lihgt", &DialogContext::new())
        .await
        .unwrap();

    assert_eq!(
        *classifier.last_sentence.lock().unwrap(),
        "turn off the light"
    );
}

#[tokio::test]
async fn spellcheck_failure_is_fatal_not_an_empty_result() {
    let classifier = MockClassifier::returning(light_intents());
    let qna = MockQna::returning(vec![sample_match()]);
    let config = NluConfig {
        qna: QnaMode::Before,
        spellchecking: Some("en_US".to_string()),
        ..Default::default()
    };
    let nlu = Nlu::from_parts(
        ExtractorRegistry::new(),
        classifier.clone(),
        qna.clone(),
        Arc::new(FailingSpellchecker),
        config,
    );

    let err = nlu
        .compute("anything", &DialogContext::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NluError::Transport { .. }));
    assert_eq!(classifier.calls(), 0);
    assert_eq!(qna.calls(), 0);
}
