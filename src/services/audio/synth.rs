use futures::future::BoxFuture;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Serialize;

use super::{AudioClip, AudioError, SpeechSynthesizer, VoiceProfile};

#[derive(Debug, Serialize)]
struct SpeechRequest {
    text: String,
    voice_id: String,
    engine: String,
    language_code: String,
    output_format: String,
}

/// Speech synthesizer posting JSON to an HTTP text-to-speech gateway.
#[derive(Clone)]
pub struct HttpSpeechSynthesizer {
    client: Client,
    endpoint: Option<String>,
}

impl HttpSpeechSynthesizer {
    /// Without an endpoint every synthesis fails with [`AudioError::NotConfigured`].
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.filter(|url| !url.trim().is_empty()),
        }
    }
}

impl SpeechSynthesizer for HttpSpeechSynthesizer {
    fn synthesize(
        &self,
        text: String,
        voice: VoiceProfile,
    ) -> BoxFuture<'static, Result<AudioClip, AudioError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        Box::pin(async move {
            let endpoint = endpoint.ok_or(AudioError::NotConfigured)?;
            let fallback_type = format!("audio/{}", voice.output_format);
            let body = SpeechRequest {
                text,
                voice_id: voice.voice_id,
                engine: voice.engine,
                language_code: voice.language_code,
                output_format: voice.output_format,
            };

            let response = client
                .post(&endpoint)
                .json(&body)
                .send()
                .await
                .map_err(AudioError::Request)?;
            if !response.status().is_success() {
                return Err(AudioError::Status(response.status()));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .unwrap_or(fallback_type);
            let bytes = response.bytes().await.map_err(AudioError::Request)?;

            Ok(AudioClip {
                bytes: bytes.to_vec(),
                content_type,
            })
        })
    }
}
