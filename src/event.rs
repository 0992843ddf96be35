//! Inbound chat events as delivered by a transport.

use std::fmt;

/// Opaque conversation identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatId(pub String);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of media an event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Push-to-talk voice note
    Voice,
    /// Forwarded or attached audio file
    Audio,
    /// Images, video, documents
    Other,
}

impl MediaKind {
    /// Whether this media can satisfy a pending upload
    #[must_use]
    pub const fn is_audio(self) -> bool {
        matches!(self, Self::Voice | Self::Audio)
    }
}

/// Downloaded media attached to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    /// Media category
    pub kind: MediaKind,
    /// MIME type declared by the sender
    pub mime: Option<String>,
    /// Payload bytes
    pub data: Vec<u8>,
}

/// One inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Conversation the message belongs to (replies go here)
    pub chat: ChatId,
    /// Sent by the bot owner's own account
    pub from_owner: bool,
    /// Text body (caption for media)
    pub body: String,
    /// Attached media, if any
    pub media: Option<MediaAttachment>,
}

impl InboundEvent {
    /// Plain text message
    #[must_use]
    pub fn text(chat: ChatId, from_owner: bool, body: impl Into<String>) -> Self {
        Self {
            chat,
            from_owner,
            body: body.into(),
            media: None,
        }
    }

    /// Media message without a caption
    #[must_use]
    pub fn media(chat: ChatId, from_owner: bool, media: MediaAttachment) -> Self {
        Self {
            chat,
            from_owner,
            body: String::new(),
            media: Some(media),
        }
    }

    /// Attached media if it is a voice note or audio file
    #[must_use]
    pub fn audio(&self) -> Option<&MediaAttachment> {
        self.media.as_ref().filter(|media| media.kind.is_audio())
    }
}
