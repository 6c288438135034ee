//! OpenAI-compatible `/audio/speech` backend.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::config::OpenAiConfig;
use super::error::SynthesisError;
use super::traits::SpeechSynthesizer;
use super::types::{AudioFormat, SynthesisResult};

/// Longest error body kept from a failed API call.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

pub struct OpenAiSynthesizer {
    config: OpenAiConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiSynthesizer {
    pub fn new(config: OpenAiConfig) -> Result<Self, SynthesisError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SynthesisError::config("openai backend requires api_key"))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    fn name(&self) -> &str {
        "openai"
    }

    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        output_path: &Path,
    ) -> Result<SynthesisResult, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let body = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice: voice.unwrap_or(&self.config.voice),
            response_format: "mp3",
        };

        debug!(endpoint = %self.endpoint(), model = %self.config.model, "Requesting speech");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(SynthesisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let mut file = tokio::fs::File::create(output_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        SynthesisResult::from_output(output_path, AudioFormat::Mp3).await
    }

    async fn validate(&self) -> Result<(), SynthesisError> {
        // Only the key is checked; a test request would cost money.
        Ok(())
    }
}
