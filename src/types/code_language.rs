//! Language identifier of a fenced code block.

use crate::error::BuildError;

/// The language a fenced code block declares in its info string, e.g.
/// `rust` in ```` ```rust,ignore ````.
///
/// Stored lowercase. Safe to use in a `class` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeLanguage(String);

impl CodeLanguage {
    pub const MAX_LENGTH: usize = 32;

    /// Parse the language from a full fence info string.
    ///
    /// The language is the first word; rustdoc-style attributes after a comma
    /// (`rust,no_run`) and anything after whitespace are dropped. Returns
    /// `Ok(None)` for an empty info string.
    pub fn from_info(info: &str) -> Result<Option<Self>, BuildError> {
        let word = info
            .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
            .next()
            .unwrap_or("");
        if word.is_empty() {
            return Ok(None);
        }
        Self::new(word).map(Some)
    }

    pub fn new(raw: &str) -> Result<Self, BuildError> {
        let lang = raw.trim();
        let reject = |reason| BuildError::InvalidLanguage {
            lang: raw.to_string(),
            reason,
        };

        if lang.is_empty() {
            return Err(reject("language is empty"));
        }
        if lang.len() > Self::MAX_LENGTH {
            return Err(reject("language exceeds 32 characters"));
        }
        if !lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        {
            return Err(reject("language contains unsupported characters"));
        }

        Ok(Self(lang.to_ascii_lowercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
