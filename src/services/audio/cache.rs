use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AudioClip, AudioError, CueResolver, SpeechSynthesizer, VoiceProfile, cache_key};

const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

/// Filesystem cache in front of a [`SpeechSynthesizer`].
///
/// Each clip is stored as `<key>.audio` with its MIME type in `<key>.content-type`.
#[derive(Clone)]
pub struct CachingCueResolver {
    dir: Arc<Path>,
    voice: VoiceProfile,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl CachingCueResolver {
    /// Cache clips under `dir`, synthesizing misses with `synthesizer`.
    pub fn new(
        dir: impl Into<PathBuf>,
        voice: VoiceProfile,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let dir: PathBuf = dir.into();
        Self {
            dir: Arc::from(dir),
            voice,
            synthesizer,
        }
    }

    fn paths(&self, key: &str) -> (PathBuf, PathBuf) {
        (
            self.dir.join(format!("{key}.audio")),
            self.dir.join(format!("{key}.content-type")),
        )
    }

    async fn read_cached(&self, key: &str) -> Result<Option<AudioClip>, AudioError> {
        let (audio_path, type_path) = self.paths(key);
        let bytes = match tokio::fs::read(&audio_path).await {
            Ok(bytes) if bytes.is_empty() => {
                warn!(key, "cached clip is empty; synthesizing again");
                return Ok(None);
            }
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AudioError::Cache {
                    key: key.to_string(),
                    source,
                });
            }
        };
        let content_type = match tokio::fs::read_to_string(&type_path).await {
            Ok(content_type) if !content_type.trim().is_empty() => content_type.trim().to_string(),
            Ok(_) => DEFAULT_CONTENT_TYPE.to_string(),
            Err(err) => {
                warn!(key, error = %err, "cached clip has no content type; assuming mp3");
                DEFAULT_CONTENT_TYPE.to_string()
            }
        };
        Ok(Some(AudioClip {
            bytes,
            content_type,
        }))
    }

    async fn write_cached(&self, key: &str, clip: &AudioClip) -> Result<(), AudioError> {
        let cache_err = |source| AudioError::Cache {
            key: key.to_string(),
            source,
        };
        let (audio_path, type_path) = self.paths(key);
        tokio::fs::create_dir_all(&self.dir).await.map_err(cache_err)?;
        // Content type first, so a readable clip always has its MIME type next to it.
        self.replace(&type_path, clip.content_type.as_bytes())
            .await
            .map_err(cache_err)?;
        self.replace(&audio_path, &clip.bytes)
            .await
            .map_err(cache_err)
    }

    /// Write `contents` to a private file in the cache directory and rename it
    /// over `target`, so readers see either nothing or the whole file.
    async fn replace(&self, target: &Path, contents: &[u8]) -> std::io::Result<()> {
        let staging = self.dir.join(format!(".{}.partial", Uuid::new_v4()));
        if let Err(err) = tokio::fs::write(&staging, contents).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err);
        }
        if let Err(err) = tokio::fs::rename(&staging, target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err);
        }
        Ok(())
    }
}

impl CueResolver for CachingCueResolver {
    fn voice(&self) -> &VoiceProfile {
        &self.voice
    }

    fn resolve(&self, text: String) -> BoxFuture<'static, Result<AudioClip, AudioError>> {
        let resolver = self.clone();
        Box::pin(async move {
            let key = cache_key(&resolver.voice, &text);
            if let Some(clip) = resolver.read_cached(&key).await? {
                debug!(%key, "serving cached cue audio");
                return Ok(clip);
            }

            info!(%key, %text, "generating cue audio");
            let clip = resolver
                .synthesizer
                .synthesize(text, resolver.voice.clone())
                .await?;
            resolver.write_cached(&key, &clip).await?;
            Ok(clip)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct CountingSynthesizer {
        calls: AtomicUsize,
    }

    impl SpeechSynthesizer for CountingSynthesizer {
        fn synthesize(
            &self,
            text: String,
            voice: VoiceProfile,
        ) -> BoxFuture<'static, Result<AudioClip, AudioError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(AudioClip {
                    bytes: format!("{}:{text}", voice.voice_id).into_bytes(),
                    content_type: "audio/mpeg".into(),
                })
            })
        }
    }

    struct FailingSynthesizer;

    impl SpeechSynthesizer for FailingSynthesizer {
        fn synthesize(
            &self,
            _text: String,
            _voice: VoiceProfile,
        ) -> BoxFuture<'static, Result<AudioClip, AudioError>> {
            Box::pin(async { Err(AudioError::NotConfigured) })
        }
    }

    #[tokio::test]
    async fn second_request_is_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(CountingSynthesizer::default());
        let resolver = CachingCueResolver::new(
            dir.path().join("cues"),
            VoiceProfile::default(),
            synth.clone(),
        );

        let first = resolver.resolve("Blinds Up.".into()).await.unwrap();
        let second = resolver.resolve("Blinds Up.".into()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.bytes, b"Stephen:Blinds Up.".to_vec());
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);

        let key = cache_key(resolver.voice(), "Blinds Up.");
        assert!(dir.path().join("cues").join(format!("{key}.audio")).exists());
    }

    #[tokio::test]
    async fn different_text_is_synthesized_separately() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(CountingSynthesizer::default());
        let resolver = CachingCueResolver::new(dir.path(), VoiceProfile::default(), synth.clone());

        resolver.resolve("The blinds are now 5/10.".into()).await.unwrap();
        resolver.resolve("The blinds are now 10/20.".into()).await.unwrap();
        assert_eq!(synth.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn synthesis_failures_leave_no_cache_entry() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CachingCueResolver::new(
            dir.path(),
            VoiceProfile::default(),
            Arc::new(FailingSynthesizer),
        );

        let err = resolver.resolve("It's break time.".into()).await.unwrap_err();
        assert!(matches!(err, AudioError::NotConfigured));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_content_type_falls_back_to_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CachingCueResolver::new(
            dir.path(),
            VoiceProfile::default(),
            Arc::new(FailingSynthesizer),
        );
        let key = cache_key(resolver.voice(), "Let's Play Poker.");
        std::fs::write(dir.path().join(format!("{key}.audio")), b"mp3").unwrap();

        let clip = resolver.resolve("Let's Play Poker.".into()).await.unwrap();
        assert_eq!(clip.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(clip.bytes, b"mp3".to_vec());
    }

    #[tokio::test]
    async fn empty_clip_on_disk_is_synthesized_again() {
        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(CountingSynthesizer::default());
        let resolver = CachingCueResolver::new(dir.path(), VoiceProfile::default(), synth.clone());
        let key = cache_key(resolver.voice(), "Blinds Up.");
        std::fs::write(dir.path().join(format!("{key}.content-type")), "audio/mpeg").unwrap();
        std::fs::write(dir.path().join(format!("{key}.audio")), b"").unwrap();

        let first = resolver.resolve("Blinds Up.".into()).await.unwrap();
        let second = resolver.resolve("Blinds Up.".into()).await.unwrap();

        assert_eq!(first.bytes, b"Stephen:Blinds Up.".to_vec());
        assert_eq!(second, first);
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn writes_leave_only_complete_entries_behind() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CachingCueResolver::new(
            dir.path(),
            VoiceProfile::default(),
            Arc::new(CountingSynthesizer::default()),
        );

        resolver.resolve("It's break time.".into()).await.unwrap();

        let mut names = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        let key = cache_key(resolver.voice(), "It's break time.");
        assert_eq!(
            names,
            vec![format!("{key}.audio"), format!("{key}.content-type")]
        );
    }
}
