//! Validated post tag.
//!
//! A `Tag` can only be constructed via `Tag::new()`, which validates:
//! - Non-empty after trimming
//! - No HTML special characters
//! - Reasonable length
//! - A non-empty file-name slug

use crate::error::BuildError;

/// A tag from a post's front matter, safe to embed in HTML unescaped.
///
/// Invariants (enforced at construction):
/// - Non-empty
/// - No characters: `<`, `>`, `&`, `"`, `'`, `/`
/// - At most [`Tag::MAX_LENGTH`] characters
/// - [`Tag::slug`] is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub const MAX_LENGTH: usize = 50;

    const FORBIDDEN_CHARS: [char; 6] = ['<', '>', '&', '"', '\'', '/'];

    pub fn new(raw: &str) -> Result<Self, BuildError> {
        let trimmed = raw.trim();

        let reason = if trimmed.is_empty() {
            Some("tag is empty")
        } else if trimmed.chars().count() > Self::MAX_LENGTH {
            Some("tag exceeds 50 characters")
        } else if trimmed.chars().any(|c| Self::FORBIDDEN_CHARS.contains(&c)) {
            Some("tag contains HTML special characters")
        } else if file_slug(trimmed).is_empty() {
            Some("tag has no letters or digits")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(BuildError::InvalidTag {
                tag: raw.to_string(),
                reason,
            }),
            None => Ok(Self(trimmed.to_string())),
        }
    }

    /// Validate a list of raw tags, dropping (and returning) the invalid ones.
    pub fn parse_all<I, S>(raw: I) -> (Vec<Tag>, Vec<BuildError>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<Tag> = Vec::new();
        let mut rejected = Vec::new();
        for item in raw {
            match Tag::new(item.as_ref()) {
                Ok(tag) if !tags.contains(&tag) => tags.push(tag),
                Ok(_) => {}
                Err(e) => rejected.push(e),
            }
        }
        (tags, rejected)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name form used for `tags/<slug>.html`.
    ///
    /// Lowercase; `+` and `#` are spelled out (`C++` is `c-plus-plus`, `C#`
    /// is `c-sharp`), other runs of non-alphanumerics collapse to `-`.
    pub fn slug(&self) -> String {
        file_slug(&self.0)
    }
}

fn file_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        let word = match ch {
            '+' => "plus",
            '#' => "sharp",
            c if c.is_alphanumeric() => {
                slug.push(c);
                continue;
            }
            _ => {
                if !slug.is_empty() && !slug.ends_with('-') {
                    slug.push('-');
                }
                continue;
            }
        };
        if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
        slug.push_str(word);
        slug.push('-');
    }
    slug.trim_end_matches('-').to_string()
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        let tag = Tag::new("  macros  ").unwrap();
        assert_eq!(tag.as_str(), "macros");
    }

    #[test]
    fn rejects_empty() {
        assert!(Tag::new("").is_err());
        assert!(Tag::new("   ").is_err());
    }

    #[test]
    fn rejects_html_chars() {
        assert!(Tag::new("<script>").is_err());
        assert!(Tag::new("proc&macro").is_err());
        assert!(Tag::new("a/b").is_err());
    }

    #[test]
    fn rejects_too_long() {
        assert!(Tag::new(&"a".repeat(51)).is_err());
        assert!(Tag::new(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn slug_for_file_names() {
        assert_eq!(Tag::new("Proc Macros").unwrap().slug(), "proc-macros");
        assert_eq!(Tag::new("macro_rules!").unwrap().slug(), "macro-rules");
        assert_eq!(Tag::new("Rust").unwrap().slug(), "rust");
    }

    #[test]
    fn symbol_tags_get_distinct_slugs() {
        let cpp = Tag::new("C++").unwrap().slug();
        let csharp = Tag::new("C#").unwrap().slug();
        assert_eq!(cpp, "c-plus-plus");
        assert_eq!(csharp, "c-sharp");
        assert_ne!(cpp, Tag::new("C").unwrap().slug());
        assert_eq!(Tag::new("F# 8").unwrap().slug(), "f-sharp-8");
    }

    #[test]
    fn rejects_tags_without_a_slug() {
        match Tag::new("...") {
            Err(BuildError::InvalidTag { reason, .. }) => assert_eq!(reason, "tag has no letters or digits"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Tag::new("!?").is_err());
        assert!(Tag::new("++").is_ok());
    }

    #[test]
    fn parse_all_dedupes_and_collects_rejects() {
        let (tags, rejected) = Tag::parse_all(["rust", "", "rust", "syn"]);
        assert_eq!(tags.iter().map(Tag::as_str).collect::<Vec<_>>(), ["rust", "syn"]);
        assert_eq!(rejected.len(), 1);
    }
}
