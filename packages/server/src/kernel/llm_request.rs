// Ranking completions over the OpenAI chat API
//
// The credential is supplied per run, so a client is assembled per call
// around a shared reqwest connection pool.

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::domains::ranking::RankingError;
use crate::kernel::BaseRankingService;

pub struct OpenAIRankingService {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAIRankingService {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl BaseRankingService for OpenAIRankingService {
    async fn complete(
        &self,
        credential: &SecretString,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, RankingError> {
        let client = OpenAIClient::new(credential.expose_secret())
            .with_http_client(self.http.clone())
            .with_base_url(self.base_url.as_str())
            .with_timeout(self.timeout);

        let request = ChatRequest::new(self.model.as_str())
            .message(Message::system(system_prompt))
            .message(Message::user(user_prompt))
            .temperature(0.2)
            .json_object();

        debug!(model = %self.model, prompt_chars = user_prompt.len(), "Requesting ranking");
        let response = client.chat_completion(request).await?;
        Ok(response.content)
    }
}
