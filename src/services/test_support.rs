//! Fixtures shared by unit tests and the HTTP tests under `tests/`.
//!
//! Compiled for `cfg(test)` and with the `test-support` feature.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    config::AppConfig,
    dao::timer_store::memory::MemoryTimerStore,
    render::Renderer,
    services::audio::{AudioClip, AudioError, CueResolver, VoiceProfile},
    state::{AppState, SharedState},
};

/// Cue resolver echoing the cue text back as the clip body, so tests can
/// read announcements from audio responses.
#[derive(Default)]
pub struct EchoCues {
    voice: VoiceProfile,
}

impl CueResolver for EchoCues {
    fn voice(&self) -> &VoiceProfile {
        &self.voice
    }

    fn resolve(&self, text: String) -> BoxFuture<'static, Result<AudioClip, AudioError>> {
        Box::pin(async move {
            Ok(AudioClip {
                bytes: text.into_bytes(),
                content_type: "audio/mpeg".into(),
            })
        })
    }
}

/// Application state backed by a fresh in-memory store.
pub async fn memory_state() -> SharedState {
    let state = AppState::new(
        AppConfig::default(),
        Renderer::embedded().expect("embedded templates"),
        Arc::new(EchoCues::default()),
    );
    state
        .install_timer_store(Arc::new(MemoryTimerStore::new()))
        .await;
    state
}
