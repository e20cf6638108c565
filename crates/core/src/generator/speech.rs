//! Speech back-end speaking to an HTTP text-to-speech service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::cancel::CancelToken;

use super::config::SpeechConfig;
use super::error::GenerationError;
use super::traits::UnitGenerator;
use super::types::{GenerationRequest, GeneratorRole};

/// Generates narration by issuing one GET per unit.
///
/// The service receives `text`, `speaker`, `style` and `ssml=false` as query
/// parameters and answers with the encoded audio as body.
pub struct HttpSpeechGenerator {
    client: Client,
    config: SpeechConfig,
}

impl HttpSpeechGenerator {
    pub fn new(config: SpeechConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    fn query<'a>(&'a self, text: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("text", text),
            ("speaker", self.config.speaker.as_str()),
            ("style", self.config.style.as_str()),
            ("ssml", "false"),
        ]
    }

    async fn fetch(&self, text: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&self.query(text))
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let bytes = response.bytes().await.map_err(map_request_error)?;
        if bytes.is_empty() {
            return Err(GenerationError::rendering_failed(
                "speech service returned an empty body",
            ));
        }
        Ok(bytes.to_vec())
    }
}

/// Maps a non-success HTTP status to an error kind.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let message = format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    );
    if status == StatusCode::TOO_MANY_REQUESTS {
        GenerationError::quota(message)
    } else if status.is_server_error() {
        GenerationError::transient(message)
    } else {
        GenerationError::rendering_failed(message)
    }
}

fn map_request_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() || e.is_connect() {
        GenerationError::transient(e.to_string())
    } else if e.is_decode() || e.is_body() {
        GenerationError::rendering_failed(e.to_string())
    } else {
        GenerationError::transient(e.to_string())
    }
}

#[async_trait]
impl UnitGenerator for HttpSpeechGenerator {
    fn name(&self) -> &str {
        "http-speech"
    }

    fn role(&self) -> GeneratorRole {
        GeneratorRole::Audio
    }

    async fn generate(
        &self,
        cancel: &CancelToken,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::cancelled());
        }
        debug!(
            node = %request.node_key,
            unit = request.unit_index,
            chars = request.text.len(),
            "Requesting speech"
        );

        tokio::select! {
            _ = cancel.cancelled() => Err(GenerationError::cancelled()),
            result = self.fetch(&request.text) => result,
        }
    }
}
