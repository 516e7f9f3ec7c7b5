//! QnA matching service adapter
//!
//! Stateless request/response wrapper: `{ sentence }` out, a list of
//! question-answer matches back. Match scoring is entirely the service's
//! concern; the orchestrator only ever inspects emptiness.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use parley_core::{ClassifierCredentials, NluError, QnaMatch, QnaMatcher, Result};

use crate::classify::{HEADER_APP_ID, HEADER_APP_KEY, HEADER_APP_TOKEN};

const SERVICE: &str = "qna";

/// HTTP client for the QnA matching service
pub struct HttpQna {
    client: Client,
    base_url: String,
    app_token: String,
    app_id: String,
    app_key: String,
}

#[derive(Debug, Serialize)]
struct QnaRequest<'a> {
    sentence: &'a str,
}

impl HttpQna {
    /// Build a QnA adapter from validated credentials
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
        format!("{}qnas", self.base_url)
    }
}

#[async_trait]
impl QnaMatcher for HttpQna {
    async fn matches(&self, sentence: &str) -> Result<Vec<QnaMatch>> {
        let response = self
            .client
            .post(self.endpoint())
            .header(HEADER_APP_TOKEN, &self.app_token)
            .header(HEADER_APP_ID, &self.app_id)
            .header(HEADER_APP_KEY, &self.app_key)
            .json(&QnaRequest { sentence })
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

        let matches: Vec<QnaMatch> = response
            .json()
            .await
            .map_err(|e| NluError::transport(SERVICE, format!("invalid response: {e}")))?;

        tracing::debug!(count = matches.len(), "qna response received");
        Ok(matches)
    }
}
