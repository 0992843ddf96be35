use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::clip::ClipMedia;
use crate::event::ChatId;

/// Outbound side of the chat transport.
///
/// The dispatcher only talks to the network through this trait, which makes
/// it mockable in tests (`MockMessenger` via `mockall`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Reply with a text message
    async fn reply_text(&self, chat: &ChatId, text: &str) -> Result<()>;

    /// Reply with an audio clip
    async fn reply_audio(&self, chat: &ChatId, media: &ClipMedia) -> Result<()>;

    /// Send `text` `count` times, waiting `spacing` between sends
    async fn send_bulk(&self, chat: &ChatId, text: &str, count: u32, spacing: Duration)
        -> Result<()>;
}
