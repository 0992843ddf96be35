//! Local stdin/stdout transport.
//!
//! Every line typed is an owner message in a single chat. A few prefixes
//! simulate what a real messaging client would deliver:
//!
//! - `:voice <path> [mime]` sends the file as a voice note
//! - `:audio <path> [mime]` sends the file as an audio attachment
//! - `:guest <text>` sends text from someone other than the owner

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::clip::{ClipFormat, ClipMedia};
use crate::event::{ChatId, InboundEvent, MediaAttachment, MediaKind};
use crate::messenger::Messenger;

/// Writes replies as lines to any async writer (stdout in the binary)
pub struct ConsoleMessenger<W> {
    out: Mutex<W>,
}

impl<W> ConsoleMessenger<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Unwrap the writer (tests inspect what was written)
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleMessenger<W> {
    async fn write_line(&self, chat: &ChatId, line: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(format!("[{chat}] {line}\n").as_bytes())
            .await
            .context("failed to write reply")?;
        out.flush().await.context("failed to flush reply")?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Messenger for ConsoleMessenger<W> {
    async fn reply_text(&self, chat: &ChatId, text: &str) -> Result<()> {
        self.write_line(chat, text).await
    }

    async fn reply_audio(&self, chat: &ChatId, media: &ClipMedia) -> Result<()> {
        let line = format!(
            "▶ {} ({}, {} bytes)",
            media.name,
            media.mime,
            media.data.len()
        );
        self.write_line(chat, &line).await
    }

    async fn send_bulk(
        &self,
        chat: &ChatId,
        text: &str,
        count: u32,
        spacing: Duration,
    ) -> Result<()> {
        for i in 1..=count {
            self.write_line(chat, text).await?;

            if i % 10 == 0 || i == count {
                tracing::debug!("bulk progress: {}/{} messages sent", i, count);
            }
            if i < count {
                tokio::time::sleep(spacing).await;
            }
        }
        Ok(())
    }
}

/// Turn one console line into an inbound event
///
/// # Errors
/// Returns error if a `:voice`/`:audio` line names a file that can't be read
pub async fn parse_line(line: &str, chat: &ChatId) -> Result<InboundEvent> {
    if let Some(text) = line.strip_prefix(":guest ") {
        return Ok(InboundEvent::text(chat.clone(), false, text));
    }

    let media = if let Some(rest) = line.strip_prefix(":voice ") {
        Some((MediaKind::Voice, rest))
    } else {
        line.strip_prefix(":audio ").map(|rest| (MediaKind::Audio, rest))
    };

    let Some((kind, rest)) = media else {
        return Ok(InboundEvent::text(chat.clone(), true, line));
    };

    let rest = rest.trim();
    let (path, mime) = match rest.split_once(' ') {
        Some((path, mime)) => (path, Some(mime.trim().to_owned())),
        None => (rest, None),
    };
    let path = Path::new(path);
    let mime = mime.or_else(|| ClipFormat::from_path(path).map(|f| f.mime_type().to_owned()));

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read media file {}", path.display()))?;

    Ok(InboundEvent::media(
        chat.clone(),
        true,
        MediaAttachment { kind, mime, data },
    ))
}
