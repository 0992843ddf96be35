use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::clip::{format_size, ClipName};
use crate::command::{BulkRequest, Command};
use crate::error::ClipError;
use crate::event::{ChatId, InboundEvent};
use crate::messenger::Messenger;
use crate::pending::Armed;
use crate::router::{route_media, MediaRoute};
use crate::state::BotState;
use crate::suggest::closest_clip;

/// Delay between bulk sends
pub const BULK_SPACING: Duration = Duration::from_millis(50);

const USAGE: &str = "Available commands:\n\
- !save voice [name]\n\
- ![name] or just [name]\n\
- !list voices\n\
- !delete voice [name]\n\
- !spam [message] [amount]\n\
- !help";

/// Routes inbound events to the media router or the text commands and
/// sends every acknowledgement through the [`Messenger`].
///
/// Events must be handed in one at a time; the dispatcher owns all bot
/// state so no locking is needed.
pub struct Dispatcher<M> {
    state: BotState,
    messenger: M,
}

impl<M: Messenger> Dispatcher<M> {
    /// Wrap state and an outbound transport
    pub const fn new(state: BotState, messenger: M) -> Self {
        Self { state, messenger }
    }

    /// Shared state (read-only)
    pub const fn state(&self) -> &BotState {
        &self.state
    }

    /// Outbound transport
    pub const fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Expire stale pending uploads; called periodically by the event loop
    pub fn sweep_expired(&mut self) -> Vec<String> {
        self.state.sweep(Instant::now())
    }

    /// Handle one inbound event
    pub async fn handle(&mut self, event: &InboundEvent) {
        self.state.sweep(Instant::now());

        if !event.from_owner {
            debug!(chat = %event.chat, "ignoring message (not from owner)");
            return;
        }

        if let MediaRoute::Consumed { name, outcome } = route_media(&mut self.state, event).await
        {
            let reply = match outcome {
                Ok(saved) => format!(
                    "✅ Voice saved as \"{name}\" ({}). Use !{name} to play it.",
                    format_size(saved.clip.size)
                ),
                Err(e) if e.is_validation() => {
                    format!("❌ Failed to save voice \"{name}\". {}", e.user_message())
                }
                Err(e) => {
                    error!(clip = %name, error = %e, "failed to save clip");
                    format!("❌ Failed to save voice \"{name}\".")
                }
            };
            self.reply(&event.chat, &reply).await;
            return;
        }

        let command = Command::parse(&event.body);
        debug!(?command, "processing command");

        match command {
            Command::SaveVoice(name) => self.arm_upload(&event.chat, name).await,
            Command::Bulk(args) => self.bulk(&event.chat, args).await,
            Command::Play(name) => self.play(&event.chat, name).await,
            Command::List => self.list(&event.chat).await,
            Command::Help => self.reply(&event.chat, USAGE).await,
            Command::Delete(name) => self.delete(&event.chat, name).await,
            Command::Unknown(content) => {
                debug!(content, "unknown command");
                let reply = format!("❌ Unknown command: {content}\n\n{USAGE}");
                self.reply(&event.chat, &reply).await;
            }
            Command::Trigger(word) => self.trigger(&event.chat, word).await,
            Command::Ignore => {}
        }
    }

    async fn arm_upload(&mut self, chat: &ChatId, name: &str) {
        if name.is_empty() {
            self.reply(
                chat,
                "❌ Please provide a name for the voice. Example: !save voice hello",
            )
            .await;
            return;
        }
        if name.contains(['/', '\\']) {
            self.reply(chat, "❌ Voice name cannot contain path separators.")
                .await;
            return;
        }
        if let Err(e) = ClipName::parse(name) {
            self.reply(chat, &ClipError::from(e).user_message()).await;
            return;
        }

        let reply = match self.state.pending.begin(name, Instant::now()) {
            Ok(Armed::New) => {
                info!(clip = name, "waiting for voice upload");
                format!("🎤 Ready to save voice as \"{name}\". Please send the voice message now.")
            }
            Ok(Armed::Restarted) => {
                info!(clip = name, "voice upload timer restarted");
                format!(
                    "⚠️ Already waiting for voice upload for \"{name}\". Please send the voice message now."
                )
            }
            Err(e) => {
                warn!(clip = name, error = %e, "rejected second pending upload");
                e.user_message()
            }
        };
        self.reply(chat, &reply).await;
    }

    async fn play(&self, chat: &ChatId, name: &str) {
        match self.state.registry.get(name).await {
            Ok(clip) => match self.state.registry.load(&clip).await {
                Ok(media) => {
                    if let Err(e) = self.messenger.reply_audio(chat, &media).await {
                        warn!(clip = name, error = %e, "failed to send clip");
                    } else {
                        info!(clip = name, "played clip");
                    }
                }
                Err(e) => {
                    error!(clip = name, error = %e, "failed to read clip");
                    self.reply(chat, &format!("❌ Error playing voice \"{name}\"."))
                        .await;
                }
            },
            Err(e @ ClipError::NotFound { .. }) => {
                let mut reply = e.user_message();
                if let Some(suggestion) = self.suggestion_for(name).await {
                    reply.push_str(&format!("\n💡 Did you mean !{suggestion}?"));
                }
                self.reply(chat, &reply).await;
            }
            Err(e) => {
                if !e.is_validation() {
                    error!(clip = name, error = %e, "failed to look up clip");
                }
                self.reply(chat, &e.user_message()).await;
            }
        }
    }

    async fn suggestion_for(&self, name: &str) -> Option<String> {
        let names = self.state.registry.list().await.ok()?;
        closest_clip(name, &names, &self.state.settings.suggestions).map(str::to_owned)
    }

    async fn list(&self, chat: &ChatId) {
        let names = match self.state.registry.list().await {
            Ok(names) => names,
            Err(e) => {
                error!(error = %e, "failed to list clips");
                self.reply(chat, "❌ Error retrieving voice list.").await;
                return;
            }
        };

        if names.is_empty() {
            self.reply(
                chat,
                "📝 No voices saved yet. Use !save voice [name] to save a voice.",
            )
            .await;
            return;
        }

        let lines: Vec<String> = names
            .iter()
            .map(|name| format!("• {name} → !{name} or just \"{name}\""))
            .collect();
        let mut reply = format!("🎵 Saved voices:\n{}", lines.join("\n"));

        match self.state.registry.storage_info().await {
            Ok(info) => reply.push_str(&format!(
                "\n\n📦 {} clips, {} total",
                info.clip_count,
                format_size(info.total_bytes)
            )),
            Err(e) => warn!(error = %e, "failed to compute storage info"),
        }
        reply.push_str("\n\n💡 Smart play: Type ![name] or just the name directly!");

        self.reply(chat, &reply).await;
    }

    async fn delete(&self, chat: &ChatId, name: &str) {
        if name.is_empty() {
            self.reply(
                chat,
                "❌ Please provide the name of the voice to delete. Example: !delete voice hello",
            )
            .await;
            return;
        }

        let reply = match self.state.registry.delete(name).await {
            Ok(true) => {
                info!(clip = name, "deleted clip");
                format!("✅ Voice \"{name}\" deleted successfully.")
            }
            Ok(false) => format!("❌ Voice \"{name}\" not found."),
            Err(e) if e.is_validation() => e.user_message(),
            Err(e) => {
                error!(clip = name, error = %e, "failed to delete clip");
                format!("❌ Error deleting voice \"{name}\".")
            }
        };
        self.reply(chat, &reply).await;
    }

    /// Bare-word lookup: plays on an exact match, stays silent otherwise
    async fn trigger(&self, chat: &ChatId, word: &str) {
        let names = match self.state.registry.list().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "trigger lookup failed");
                return;
            }
        };
        if !names.iter().any(|name| name == word) {
            return;
        }

        debug!(clip = word, "trigger matched clip");
        let media = match self.state.registry.get(word).await {
            Ok(clip) => self.state.registry.load(&clip).await,
            Err(e) => Err(e),
        };
        match media {
            Ok(media) => match self.messenger.reply_audio(chat, &media).await {
                Ok(()) => info!(clip = word, "auto-played clip"),
                Err(e) => warn!(clip = word, error = %e, "failed to send clip"),
            },
            Err(e) => warn!(clip = word, error = %e, "clip vanished before playback"),
        }
    }

    async fn bulk(&self, chat: &ChatId, args: &str) {
        let request = match BulkRequest::parse(args) {
            Ok(request) => request,
            Err(usage) => {
                self.reply(chat, usage).await;
                return;
            }
        };

        self.reply(
            chat,
            &format!(
                "🚀 Starting spam: \"{}\" x {} times",
                request.text, request.count
            ),
        )
        .await;
        info!(count = request.count, "starting bulk send");

        if let Err(e) = self
            .messenger
            .send_bulk(chat, request.text, request.count, BULK_SPACING)
            .await
        {
            error!(error = %e, "bulk send failed");
            self.reply(chat, &format!("❌ Error during spam: {e}")).await;
        }
    }

    async fn reply(&self, chat: &ChatId, text: &str) {
        if let Err(e) = self.messenger.reply_text(chat, text).await {
            warn!(chat = %chat, error = %e, "failed to send reply");
        }
    }
}
