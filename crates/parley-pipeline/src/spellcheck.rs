//! Spellchecking service adapter
//!
//! Stateless request/response wrapper: `{ sentence, key }` out, a
//! corrected sentence back. The `key` selects the spellchecking model
//! and comes from `NluConfig::spellchecking`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use parley_core::{ClassifierCredentials, NluError, Result, Spellchecker};

use crate::classify::{HEADER_APP_ID, HEADER_APP_KEY, HEADER_APP_TOKEN};

const SERVICE: &str = "spellcheck";

/// HTTP client for the spellchecking service
pub struct HttpSpellchecker {
    client: Client,
    base_url: String,
    app_token: String,
    app_id: String,
    app_key: String,
}

#[derive(Debug, Serialize)]
struct SpellcheckRequest<'a> {
    sentence: &'a str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpellcheckResponse {
    #[serde(rename = "correctSentence")]
    correct_sentence: String,
}

impl HttpSpellchecker {
    /// Build a spellcheck adapter from validated credentials
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

    /// Use a pre-built reqwest client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}spellcheck", self.base_url)
    }
}

#[async_trait]
impl Spellchecker for HttpSpellchecker {
    async fn correct(&self, sentence: &str, key: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header(HEADER_APP_TOKEN, &self.app_token)
            .header(HEADER_APP_ID, &self.app_id)
            .header(HEADER_APP_KEY, &self.app_key)
            .json(&SpellcheckRequest { sentence, key })
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

        let payload: SpellcheckResponse = response
            .json()
            .await
            .map_err(|e| NluError::transport(SERVICE, format!("invalid response: {e}")))?;

        Ok(payload.correct_sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spellcheck_endpoint() {
        let credentials =
            ClassifierCredentials::new("t", "i", "k").with_base_url("https://nlp.example.com/v1");
        let spellchecker = HttpSpellchecker::from_credentials(&credentials).unwrap();
        assert_eq!(
            spellchecker.endpoint(),
            "https://nlp.example.com/v1/spellcheck"
        );
    }

    #[test]
    fn test_spellcheck_response_uses_wire_field_name() {
        let json = r#"{"correctSentence":"turn off the light"}"#;
        let payload: SpellcheckResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.correct_sentence, "turn off the light");
    }
}
