use tracing::{debug, info, warn};

use crate::clip::SavedClip;
use crate::error::ClipError;
use crate::event::InboundEvent;
use crate::state::BotState;

/// What happened to a media-carrying event
#[derive(Debug)]
pub enum MediaRoute {
    /// No audio, or nothing pending: hand the event to text handling
    PassThrough,
    /// The event consumed the pending upload for `name`
    Consumed {
        /// Clip name the upload was armed for
        name: String,
        /// Save result (the pending entry is gone either way)
        outcome: Result<SavedClip, ClipError>,
    },
}

/// Match an owner's audio arrival against the outstanding upload.
///
/// The pending entry is ended before the save is awaited, so it is consumed
/// exactly once whether the save succeeds or fails.
pub async fn route_media(state: &mut BotState, event: &InboundEvent) -> MediaRoute {
    let Some(media) = event.audio() else {
        return MediaRoute::PassThrough;
    };

    let Some(name) = state.pending.any_pending().map(str::to_owned) else {
        debug!(kind = ?media.kind, "audio arrived with nothing pending");
        return MediaRoute::PassThrough;
    };
    state.pending.end(&name);

    let outcome = state
        .registry
        .save(&name, &media.data, media.mime.as_deref())
        .await;

    match &outcome {
        Ok(saved) => info!(
            clip = %name,
            bytes = saved.clip.size,
            format = %saved.clip.format,
            "pending upload fulfilled"
        ),
        Err(e) => warn!(clip = %name, error = %e, "pending upload failed"),
    }

    MediaRoute::Consumed { name, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipRegistry;
    use crate::config::Config;
    use crate::event::{ChatId, MediaAttachment, MediaKind};
    use crate::state::BotSettings;
    use tokio::time::Instant;

    async fn state() -> (tempfile::TempDir, BotState) {
        let dir = tempfile::tempdir().unwrap();
        let registry = ClipRegistry::open(dir.path(), 1024).await;
        let state = BotState::new(registry, BotSettings::from_config(&Config::default()));
        (dir, state)
    }

    fn audio(kind: MediaKind, mime: &str, data: &[u8]) -> InboundEvent {
        InboundEvent::media(
            ChatId("self".to_owned()),
            true,
            MediaAttachment {
                kind,
                mime: Some(mime.to_owned()),
                data: data.to_vec(),
            },
        )
    }

    #[tokio::test]
    async fn test_nothing_pending_passes_through() {
        let (_dir, mut state) = state().await;
        let event = audio(MediaKind::Voice, "audio/ogg", b"abc");

        assert!(matches!(
            route_media(&mut state, &event).await,
            MediaRoute::PassThrough
        ));
        assert!(state.registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_audio_passes_through() {
        let (_dir, mut state) = state().await;
        state.pending.begin("pic", Instant::now()).unwrap();
        let event = audio(MediaKind::Other, "image/png", b"png");

        assert!(matches!(
            route_media(&mut state, &event).await,
            MediaRoute::PassThrough
        ));
        assert!(state.pending.is_pending("pic"));
    }

    #[tokio::test]
    async fn test_text_event_passes_through() {
        let (_dir, mut state) = state().await;
        state.pending.begin("x", Instant::now()).unwrap();
        let event = InboundEvent::text(ChatId("self".to_owned()), true, "hello");

        assert!(matches!(
            route_media(&mut state, &event).await,
            MediaRoute::PassThrough
        ));
        assert!(state.pending.is_pending("x"));
    }

    #[tokio::test]
    async fn test_pending_upload_is_saved_and_ended() {
        let (dir, mut state) = state().await;
        state.pending.begin("hello", Instant::now()).unwrap();
        let event = audio(MediaKind::Voice, "audio/ogg; codecs=opus", &[1; 10]);

        let route = route_media(&mut state, &event).await;
        let MediaRoute::Consumed { name, outcome } = route else {
            panic!("expected the upload to be consumed");
        };
        assert_eq!(name, "hello");
        assert_eq!(outcome.unwrap().clip.size, 10);
        assert!(dir.path().join("hello.ogg").exists());
        assert!(state.pending.is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_still_ends_pending() {
        let (_dir, mut state) = state().await;
        state.pending.begin("hello", Instant::now()).unwrap();
        let event = audio(MediaKind::Audio, "audio/flac", b"fLaC");

        let route = route_media(&mut state, &event).await;
        assert!(matches!(
            route,
            MediaRoute::Consumed {
                outcome: Err(ClipError::UnsupportedFormat { .. }),
                ..
            }
        ));
        assert!(state.pending.is_empty());

        // Never retried: the next arrival finds nothing pending
        let retry = audio(MediaKind::Audio, "audio/ogg", b"ogg");
        assert!(matches!(
            route_media(&mut state, &retry).await,
            MediaRoute::PassThrough
        ));
    }
}
