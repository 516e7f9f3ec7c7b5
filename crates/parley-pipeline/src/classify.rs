//! Remote statistical classifier adapter
//!
//! Wraps a single call to the classification service: the sentence (plus
//! the dims of already-extracted entities) goes out with three credential
//! headers; a ranked list of `{label, value}` pairs comes back. The
//! adapter never retries, never sorts, and never filters — truncation is
//! the orchestrator's responsibility.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use parley_core::{
    ClassificationResult, ClassifierCredentials, Entity, IntentClassifier, NluError, Result,
};

const SERVICE: &str = "classification";

/// Credential header carrying the bot/application token
pub const HEADER_APP_TOKEN: &str = "App-Token";
/// Credential header carrying the application id
pub const HEADER_APP_ID: &str = "App-Id";
/// Credential header carrying the application key
pub const HEADER_APP_KEY: &str = "App-Key";

/// HTTP client for the remote classification service
pub struct HttpClassifier {
    client: Client,
    base_url: String,
    app_token: String,
    app_id: String,
    app_key: String,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    sentence: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entity_dims: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct IntentPayload {
    label: String,
    value: f32,
}

impl HttpClassifier {
    /// Build a classifier adapter from validated credentials
    pub fn from_credentials(credentials: &ClassifierCredentials) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            client: Client::new(),
            base_url: credentials.endpoint_base(),
            app_token: credentials.app_token.clone(),
            app_id: credentials.app_id.clone(),
            app_key: credentials.app_key.clone(),
        })
    }

    /// Use a pre-built reqwest client (timeouts are the caller's concern)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}classify", self.base_url)
    }
}

#[async_trait]
impl IntentClassifier for HttpClassifier {
    async fn classify(
        &self,
        sentence: &str,
        entities: &[Entity],
    ) -> Result<Vec<ClassificationResult>> {
        let request = ClassifyRequest {
            sentence,
            entity_dims: entities.iter().map(|e| e.dim.as_str()).collect(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(HEADER_APP_TOKEN, &self.app_token)
            .header(HEADER_APP_ID, &self.app_id)
            .header(HEADER_APP_KEY, &self.app_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NluError::transport(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NluError::transport(
                SERVICE,
                format!("status {status}: {error_text}"),
            ));
        }

        let payload: Vec<IntentPayload> = response
            .json()
            .await
            .map_err(|e| NluError::transport(SERVICE, format!("invalid response: {e}")))?;

        tracing::debug!(count = payload.len(), "classification response received");

        Ok(payload
            .into_iter()
            .map(|p| ClassificationResult::new(p.label, p.value))
            .collect())
    }
}
