//! Speech synthesis for cue announcements, cached on disk by content.

/// Filesystem cache in front of the synthesizer.
pub mod cache;
/// HTTP speech synthesizer.
pub mod synth;

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use cache::CachingCueResolver;
pub use synth::HttpSpeechSynthesizer;

/// Voice settings sent to the speech service; part of every cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceProfile {
    /// Voice name understood by the speech service.
    pub voice_id: String,
    /// Synthesis engine, e.g. `neural`.
    pub engine: String,
    /// BCP 47 language, e.g. `en-US`.
    pub language_code: String,
    /// Audio encoding requested, e.g. `mp3`.
    pub output_format: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: "Stephen".into(),
            engine: "neural".into(),
            language_code: "en-US".into(),
            output_format: "mp3".into(),
        }
    }
}

impl fmt::Display for VoiceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.voice_id, self.engine, self.language_code, self.output_format
        )
    }
}

/// Synthesized audio and its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio.
    pub bytes: Vec<u8>,
    /// MIME type sent with the clip.
    pub content_type: String,
}

/// Failures raised while producing cue audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No speech endpoint is configured.
    #[error("no speech endpoint configured")]
    NotConfigured,
    /// The speech request could not be sent or read.
    #[error("speech request failed")]
    Request(#[source] reqwest::Error),
    /// The speech service rejected the request.
    #[error("speech service answered with status {0}")]
    Status(reqwest::StatusCode),
    /// Reading or writing the cache directory failed.
    #[error("audio cache I/O failed for `{key}`")]
    Cache {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Cache key of a cue: SHA-256 over the voice settings and the spoken text.
///
/// Editing a level changes its text and therefore its key, so stale audio is never served.
pub fn cache_key(voice: &VoiceProfile, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice.to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Turns cue text into audio, generating it on first access.
pub trait CueResolver: Send + Sync {
    /// Voice used for every clip this resolver produces.
    fn voice(&self) -> &VoiceProfile;
    /// Audio for `text`, spoken with [`CueResolver::voice`].
    fn resolve(&self, text: String) -> BoxFuture<'static, Result<AudioClip, AudioError>>;
}

/// Text-to-speech backend.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` with `voice`. Every call hits the backend.
    fn synthesize(
        &self,
        text: String,
        voice: VoiceProfile,
    ) -> BoxFuture<'static, Result<AudioClip, AudioError>>;
}
