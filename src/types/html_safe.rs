//! Escaped-string wrapper for everything interpolated into pages.
//!
//! Post titles, descriptions and dates come from front matter written by
//! hand, so they only reach a template as `HtmlSafe`.

/// A string that has been escaped and is safe to embed in HTML text or
/// double-quoted attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlSafe(String);

impl HtmlSafe {
    /// Escapes: `&` `<` `>` `"` `'`
    pub fn escape(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(ch),
            }
        }
        Self(out)
    }

    /// Wrap markup produced by this crate (rendered Markdown, template
    /// fragments). The caller guarantees any user text inside was escaped.
    pub fn from_trusted(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append already-safe markup.
    pub fn push_safe(&mut self, safe: &HtmlSafe) {
        self.0.push_str(&safe.0);
    }
}

impl std::fmt::Display for HtmlSafe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<HtmlSafe> for String {
    fn from(safe: HtmlSafe) -> String {
        safe.0
    }
}

/// Extension trait for convenient escaping.
pub trait EscapeHtml {
    fn escape_html(&self) -> HtmlSafe;
}

impl EscapeHtml for str {
    fn escape_html(&self) -> HtmlSafe {
        HtmlSafe::escape(self)
    }
}

impl EscapeHtml for String {
    fn escape_html(&self) -> HtmlSafe {
        HtmlSafe::escape(self)
    }
}
