//! Text command parsing.
//!
//! Precedence is fixed and first match wins, mirroring how owners type
//! commands: `!save voice`, `!spam`, the reserved `!list`/`!help`,
//! `!<clip>`, `!list voices`, `!delete voice`, any other `!…`, and finally
//! a bare single word as a trigger.

const SAVE_COMMAND: &str = "!save voice";
const SAVE_PREFIX: &str = "!save voice ";
const SPAM_PREFIX: &str = "!spam ";
const DELETE_COMMAND: &str = "!delete voice";
const DELETE_PREFIX: &str = "!delete voice ";

/// Largest accepted `!spam` count
pub const MAX_BULK_COUNT: u32 = 100;

/// Intent behind one inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `!save voice NAME` (NAME trimmed, empty when omitted)
    SaveVoice(&'a str),
    /// `!spam TEXT COUNT` with its unparsed arguments
    Bulk(&'a str),
    /// `!NAME`
    Play(&'a str),
    /// `!list voices` or `!list`
    List,
    /// `!help`
    Help,
    /// `!delete voice NAME` (NAME trimmed, empty when omitted)
    Delete(&'a str),
    /// Any other `!` command
    Unknown(&'a str),
    /// A bare single word that may name a clip
    Trigger(&'a str),
    /// Nothing to do (empty text, lone `!`, multi-word chatter)
    Ignore,
}

impl<'a> Command<'a> {
    /// Classify a message body
    #[must_use]
    pub fn parse(body: &'a str) -> Self {
        let content = body.trim();

        if content == SAVE_COMMAND {
            return Self::SaveVoice("");
        }
        if let Some(name) = content.strip_prefix(SAVE_PREFIX) {
            return Self::SaveVoice(name.trim());
        }
        if let Some(args) = content.strip_prefix(SPAM_PREFIX) {
            return Self::Bulk(args.trim());
        }

        match content {
            "!list" => return Self::List,
            "!help" => return Self::Help,
            _ => {}
        }

        if let Some(token) = content.strip_prefix('!') {
            if !token.contains(' ') {
                return if token.is_empty() {
                    Self::Ignore
                } else {
                    Self::Play(token)
                };
            }
        }

        if content == "!list voices" {
            return Self::List;
        }
        if content == DELETE_COMMAND {
            return Self::Delete("");
        }
        if let Some(name) = content.strip_prefix(DELETE_PREFIX) {
            return Self::Delete(name.trim());
        }
        if content.starts_with('!') {
            return Self::Unknown(content);
        }

        if content.is_empty() || content.contains(' ') {
            Self::Ignore
        } else {
            Self::Trigger(content)
        }
    }
}

/// A validated `!spam` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest<'a> {
    /// Text to repeat
    pub text: &'a str,
    /// How many times
    pub count: u32,
}

impl<'a> BulkRequest<'a> {
    /// Split `TEXT COUNT`: the last space-separated token is the count.
    ///
    /// # Errors
    /// Returns the reply text explaining what is wrong
    pub fn parse(args: &'a str) -> Result<Self, &'static str> {
        let Some((text, count)) = args.rsplit_once(' ') else {
            return Err("❌ Usage: !spam [message] [amount]\nExample: !spam hello 10");
        };

        let count: u32 = match count.parse::<i64>() {
            Ok(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => return Err("❌ Amount must be a positive number"),
        };
        if count > MAX_BULK_COUNT {
            return Err("❌ Maximum 100 messages allowed");
        }

        let text = text.trim();
        if text.is_empty() {
            return Err("❌ Please provide a message to spam");
        }

        Ok(Self { text, count })
    }
}
