//! Type-safe wrappers for validated content.

mod code_language;
mod html_safe;
mod tag;

pub use code_language::CodeLanguage;
pub use html_safe::{EscapeHtml, HtmlSafe};
pub use tag::Tag;
