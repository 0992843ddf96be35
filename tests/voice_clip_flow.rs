//! End-to-end scenarios through the public API
//!
//! A recording messenger stands in for the chat transport, so every reply
//! the dispatcher produces can be asserted on.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use voice_clip_bot::clip::{ClipMedia, ClipRegistry};
use voice_clip_bot::config::Config;
use voice_clip_bot::state::BotSettings;
use voice_clip_bot::{
    BotState, ChatId, ClipError, Dispatcher, InboundEvent, MediaAttachment, MediaKind, Messenger,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Text(String),
    Audio { name: String, bytes: usize },
    Bulk { text: String, count: u32 },
}

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn reply_text(&self, _chat: &ChatId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Text(text.to_owned()));
        Ok(())
    }

    async fn reply_audio(&self, _chat: &ChatId, media: &ClipMedia) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Audio {
            name: media.name.clone(),
            bytes: media.data.len(),
        });
        Ok(())
    }

    async fn send_bulk(
        &self,
        _chat: &ChatId,
        text: &str,
        count: u32,
        _spacing: Duration,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Bulk {
            text: text.to_owned(),
            count,
        });
        Ok(())
    }
}

fn chat() -> ChatId {
    ChatId("owner".to_owned())
}

fn owner(text: &str) -> InboundEvent {
    InboundEvent::text(chat(), true, text)
}

fn voice(mime: &str, data: Vec<u8>) -> InboundEvent {
    InboundEvent::media(
        chat(),
        true,
        MediaAttachment {
            kind: MediaKind::Voice,
            mime: Some(mime.to_owned()),
            data,
        },
    )
}

async fn setup() -> (tempfile::TempDir, Dispatcher<RecordingMessenger>) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let registry = ClipRegistry::open(dir.path().join("voices"), config.storage.max_file_size).await;
    let state = BotState::new(registry, BotSettings::from_config(&config));
    (dir, Dispatcher::new(state, RecordingMessenger::default()))
}

fn single_text(sent: &[Sent]) -> &str {
    match sent {
        [Sent::Text(text)] => text,
        other => panic!("expected one text reply, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_lifecycle() {
    let (dir, mut bot) = setup().await;
    let voices = dir.path().join("voices");

    bot.handle(&owner("!save voice hello")).await;
    assert!(single_text(&bot.messenger().take()).contains("Ready to save voice as \"hello\""));

    bot.handle(&voice("audio/ogg", vec![42; 1000])).await;
    assert!(single_text(&bot.messenger().take()).contains("Voice saved as \"hello\""));
    assert_eq!(std::fs::metadata(voices.join("hello.ogg")).unwrap().len(), 1000);

    let clip = bot.state().registry.get("hello").await.unwrap();
    assert_eq!(clip.path, voices.join("hello.ogg"));
    assert_eq!(clip.size, 1000);

    // Bare trigger plays the same clip
    bot.handle(&owner("hello")).await;
    assert_eq!(
        bot.messenger().take(),
        vec![Sent::Audio {
            name: "hello".to_owned(),
            bytes: 1000
        }]
    );

    bot.handle(&owner("!delete voice hello")).await;
    assert!(single_text(&bot.messenger().take()).contains("deleted successfully"));
    assert!(!voices.join("hello.ogg").exists());

    bot.handle(&owner("!hello")).await;
    assert!(single_text(&bot.messenger().take()).contains("Voice \"hello\" not found"));
}

#[tokio::test]
async fn test_conflicting_save_leaves_pending_untouched() {
    let (_dir, mut bot) = setup().await;

    bot.handle(&owner("!save voice bye")).await;
    bot.messenger().take();

    bot.handle(&owner("!save voice greet")).await;
    let reply = bot.messenger().take();
    assert!(single_text(&reply).contains("\"bye\""));
    assert!(bot.state().pending.is_pending("bye"));
    assert!(!bot.state().pending.is_pending("greet"));

    // The next voice note still lands under the original name
    bot.handle(&voice("audio/mp3", vec![1; 10])).await;
    assert!(bot.state().registry.get("bye").await.is_ok());
    assert!(matches!(
        bot.state().registry.get("greet").await,
        Err(ClipError::NotFound { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_upload_window_expires() {
    let (_dir, mut bot) = setup().await;

    bot.handle(&owner("!save voice slow")).await;
    bot.messenger().take();

    tokio::time::advance(Duration::from_secs(121)).await;
    assert_eq!(bot.sweep_expired(), vec!["slow".to_owned()]);

    // Nothing pending, so the audio is not stored and nothing is said
    bot.handle(&voice("audio/ogg", vec![1; 10])).await;
    assert!(bot.messenger().take().is_empty());
    assert!(bot.state().registry.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_save_clears_pending() {
    let (_dir, mut bot) = setup().await;

    bot.handle(&owner("!save voice big")).await;
    bot.messenger().take();

    bot.handle(&voice("video/mp4", vec![1; 10])).await;
    assert!(single_text(&bot.messenger().take()).contains("Failed to save voice \"big\""));
    assert!(bot.state().pending.is_empty());
}

#[tokio::test]
async fn test_non_owner_cannot_drive_the_bot() {
    let (_dir, mut bot) = setup().await;

    bot.handle(&InboundEvent::text(chat(), false, "!save voice intruder"))
        .await;
    bot.handle(&InboundEvent::text(chat(), false, "!list")).await;

    assert!(bot.messenger().take().is_empty());
    assert!(bot.state().pending.is_empty());
}

#[tokio::test]
async fn test_list_after_saves() {
    let (_dir, mut bot) = setup().await;

    for (name, mime) in [("zebra", "audio/wav"), ("apple", "audio/x-m4a")] {
        bot.handle(&owner(&format!("!save voice {name}"))).await;
        bot.handle(&voice(mime, vec![0; 512])).await;
    }
    bot.messenger().take();

    bot.handle(&owner("!list voices")).await;
    let reply = bot.messenger().take();
    let text = single_text(&reply);
    let apple = text.find("• apple").unwrap();
    let zebra = text.find("• zebra").unwrap();
    assert!(apple < zebra);
    assert!(text.contains("2 clips, 1 KB total"));
}

#[tokio::test]
async fn test_spam_is_delegated() {
    let (_dir, mut bot) = setup().await;

    bot.handle(&owner("!spam hey there 4")).await;
    let sent = bot.messenger().take();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[1],
        Sent::Bulk {
            text: "hey there".to_owned(),
            count: 4
        }
    );
}
