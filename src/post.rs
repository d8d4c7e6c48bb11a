//! The `Post` entity: validated front matter plus a Markdown body.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;

use crate::error::BuildError;
use crate::frontmatter::{self, FrontMatter};
use crate::markdown::{self, CodeBlock};

/// One blog post. Immutable once parsed.
#[derive(Debug)]
pub struct Post {
    /// File stem; the post is published as `posts/<slug>.html`.
    pub slug: String,
    pub source_path: Option<PathBuf>,
    pub front_matter: FrontMatter,
    pub body: String,
    /// Tags dropped during validation; reported by `check`.
    pub rejected_tags: Vec<BuildError>,
}

impl Post {
    pub fn parse(source: &str, slug: impl Into<String>, default_offset: FixedOffset) -> Result<Self, BuildError> {
        let doc = frontmatter::parse(source, default_offset)?;
        Ok(Self {
            slug: slug.into(),
            source_path: None,
            front_matter: doc.front_matter,
            body: doc.body.to_string(),
            rejected_tags: doc.rejected_tags,
        })
    }

    /// Read and parse a post file. Errors name the file.
    pub fn load(path: &Path, default_offset: FixedOffset) -> Result<Self, BuildError> {
        let slug = slug_for(path)?;
        let source = fs::read_to_string(path).map_err(|e| BuildError::ParseFailed {
            path: path.to_path_buf(),
            message: format!("Failed to read file: {e}"),
        })?;

        let mut post = Self::parse(&source, slug, default_offset).map_err(|e| e.in_file(path))?;
        post.source_path = Some(path.to_path_buf());
        Ok(post)
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.front_matter.title
    }

    /// Not a draft.
    #[inline]
    pub fn is_published(&self) -> bool {
        !self.front_matter.draft
    }

    pub fn code_blocks(&self) -> Vec<CodeBlock> {
        markdown::code_blocks(&self.body)
    }

    /// Lines preceding the body in `source`. Add to a body line number to get
    /// the line in the file.
    pub fn body_line_offset(&self, source: &str) -> usize {
        let front = source.len().saturating_sub(self.body.len());
        source[..front].matches('\n').count()
    }
}

/// File stem of a post path, which must be valid UTF-8.
pub fn slug_for(path: &Path) -> Result<String, BuildError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BuildError::ParseFailed {
            path: path.to_path_buf(),
            message: "Invalid filename".to_string(),
        })
}
