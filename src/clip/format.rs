use std::fmt;
use std::path::Path;

/// MIME types accepted for inbound clips (substring match, case-sensitive)
pub const SUPPORTED_MIME_TYPES: [&str; 7] = [
    "audio/ogg",
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/m4a",
    "audio/x-m4a",
    "audio/ogg; codecs=opus",
];

/// Audio container a clip is stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipFormat {
    /// Ogg (WhatsApp voice notes are Ogg/Opus)
    Ogg,
    /// MPEG layer 3
    Mp3,
    /// RIFF WAVE
    Wav,
    /// MPEG-4 audio
    M4a,
}

impl ClipFormat {
    /// Probe order used by every lookup. First hit wins.
    pub const ALL: [Self; 4] = [Self::Ogg, Self::Mp3, Self::Wav, Self::M4a];

    /// File extension including the leading dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Ogg => ".ogg",
            Self::Mp3 => ".mp3",
            Self::Wav => ".wav",
            Self::M4a => ".m4a",
        }
    }

    /// MIME type used when sending the clip back out
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::M4a => "audio/x-m4a",
        }
    }

    const fn mime_key(self) -> &'static str {
        match self {
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::M4a => "m4a",
        }
    }

    /// Pick the storage format for a declared MIME type.
    ///
    /// Keys are matched as substrings in probe order; anything else
    /// (including `audio/mpeg` and a missing type) is stored as Ogg.
    #[must_use]
    pub fn from_mime(mime: Option<&str>) -> Self {
        mime.and_then(|mime| {
            Self::ALL
                .into_iter()
                .find(|format| mime.contains(format.mime_key()))
        })
        .unwrap_or(Self::Ogg)
    }

    /// Format of a stored file, judged by its extension (case-insensitive)
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| format.extension()[1..].eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for ClipFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_key())
    }
}

/// Whether a declared MIME type is one we accept
#[must_use]
pub fn is_supported_mime(mime: &str) -> bool {
    SUPPORTED_MIME_TYPES
        .iter()
        .any(|supported| mime.contains(supported))
}
