use std::fmt;
use thiserror::Error;

/// Longest clip name accepted, in characters
pub const MAX_NAME_LEN: usize = 50;

const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: [&str; 22] = [
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Why a clip name was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Nothing left after trimming
    #[error("clip name is empty")]
    Empty,
    /// More than [`MAX_NAME_LEN`] characters
    #[error("clip name is {len} characters long (max {max})", max = MAX_NAME_LEN)]
    TooLong {
        /// Character count of the trimmed name
        len: usize,
    },
    /// Contains a path separator, a wildcard or another reserved character
    #[error("clip name contains forbidden character {0:?}")]
    ForbiddenChar(char),
    /// Collides with a reserved device name
    #[error("clip name {0:?} is a reserved device name")]
    Reserved(String),
}

/// A validated clip name, safe to use as a file stem.
///
/// The only way to address the registry, so save, get and delete all
/// reject exactly the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipName(String);

impl ClipName {
    /// Validate and trim a raw name
    ///
    /// # Errors
    /// Returns [`NameError`] describing the first rule the name breaks
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong { len });
        }

        if let Some(c) = name
            .chars()
            .find(|c| FORBIDDEN_CHARS.contains(c) || ('\u{0}'..='\u{1f}').contains(c))
        {
            return Err(NameError::ForbiddenChar(c));
        }

        let lowered = name.to_lowercase();
        if RESERVED_NAMES.contains(&lowered.as_str()) {
            return Err(NameError::Reserved(name.to_owned()));
        }

        Ok(Self(name.to_owned()))
    }

    /// The name as stored on disk
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClipName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(ClipName::parse("hello").unwrap().as_str(), "hello");
        assert_eq!(ClipName::parse("  padded  ").unwrap().as_str(), "padded");
        assert_eq!(ClipName::parse("two words").unwrap().as_str(), "two words");
        assert_eq!(ClipName::parse("ñandú").unwrap().as_str(), "ñandú");
        assert!(ClipName::parse("console").is_ok());
        assert!(ClipName::parse("com10").is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(ClipName::parse(""), Err(NameError::Empty));
        assert_eq!(ClipName::parse("   \t "), Err(NameError::Empty));
    }

    #[test]
    fn test_length_limit() {
        let max = "a".repeat(MAX_NAME_LEN);
        assert!(ClipName::parse(&max).is_ok());

        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            ClipName::parse(&long),
            Err(NameError::TooLong {
                len: MAX_NAME_LEN + 1
            })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let name = "é".repeat(MAX_NAME_LEN);
        assert!(name.len() > MAX_NAME_LEN);
        assert!(ClipName::parse(&name).is_ok());
    }

    #[test]
    fn test_forbidden_characters() {
        for c in FORBIDDEN_CHARS {
            let raw = format!("bad{c}name");
            assert_eq!(ClipName::parse(&raw), Err(NameError::ForbiddenChar(c)));
        }
        assert_eq!(
            ClipName::parse("bell\u{7}"),
            Err(NameError::ForbiddenChar('\u{7}'))
        );
        assert_eq!(
            ClipName::parse("a\nb"),
            Err(NameError::ForbiddenChar('\n'))
        );
    }

    #[test]
    fn test_reserved_names_case_insensitive() {
        assert_eq!(
            ClipName::parse("con"),
            Err(NameError::Reserved("con".to_owned()))
        );
        assert_eq!(
            ClipName::parse("LPT9"),
            Err(NameError::Reserved("LPT9".to_owned()))
        );
        assert!(matches!(ClipName::parse(" Nul "), Err(NameError::Reserved(_))));
    }
}
