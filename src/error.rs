//! Error types with semantic recovery strategies.

use std::io;
use std::path::PathBuf;

use tracing::{info, warn};

/// All possible errors while reading and publishing posts.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    // ══════════════════════════════════════════════════════════════════════
    // RECOVERABLE: Skip this post and continue with others
    // ══════════════════════════════════════════════════════════════════════

    /// A single post could not be read or split.
    #[error("Parse failed for {path:?}: {message}")]
    ParseFailed {
        path: PathBuf,
        message: String,
    },

    /// The document does not start with a `---` or `+++` line.
    #[error("Missing front matter: document must start with '---' or '+++'")]
    MissingFrontMatter,

    /// The opening delimiter was never closed.
    #[error("Unterminated front matter: no closing '{delimiter}' line")]
    UnterminatedFrontMatter {
        delimiter: &'static str,
    },

    /// The front-matter block is not valid YAML/TOML for the post schema.
    #[error("Invalid front matter: {message}")]
    InvalidFrontMatter {
        message: String,
    },

    /// A required front-matter field is absent or empty.
    #[error("Missing required front-matter field '{0}'")]
    MissingField(&'static str),

    /// The `date` field is not an ISO-8601-like timestamp.
    #[error("Invalid date '{value}': expected e.g. 2023-05-01T09:30:00+09:00")]
    InvalidDate {
        value: String,
    },

    /// Tag validation failed. Skip the tag.
    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag {
        tag: String,
        reason: &'static str,
    },

    /// Code fence language validation failed. Render the block untagged.
    #[error("Invalid code language '{lang}': {reason}")]
    InvalidLanguage {
        lang: String,
        reason: &'static str,
    },

    // ══════════════════════════════════════════════════════════════════════
    // NON-RECOVERABLE: Must abort entire build
    // ══════════════════════════════════════════════════════════════════════

    /// Cannot read content directory.
    #[error("Content directory not readable: {path:?}")]
    ContentNotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cannot write to output directory.
    #[error("Output directory not writable: {path:?}")]
    OutputNotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file missing or unreadable.
    #[error("Config file not readable: {path:?}")]
    ConfigNotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for the config schema.
    #[error("Invalid config {path:?}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `timezone_offset_hours` outside -23..=23.
    #[error("Invalid timezone offset: {hours} hours")]
    InvalidTimezoneOffset {
        hours: i32,
    },

    /// Output directories that get wiped on every build would contain the sources.
    #[error("Output {output:?} overlaps content directory {content:?}; refusing to clear it")]
    OutputOverlapsContent {
        content: PathBuf,
        output: PathBuf,
    },

    /// No valid posts found to build.
    #[error("No valid posts found in {path:?}")]
    NoValidPosts {
        path: PathBuf,
    },
}

impl BuildError {
    /// Returns true if we can skip this item and continue building.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed { .. }
            | Self::MissingFrontMatter
            | Self::UnterminatedFrontMatter { .. }
            | Self::InvalidFrontMatter { .. }
            | Self::MissingField(_)
            | Self::InvalidDate { .. }
            | Self::InvalidTag { .. }
            | Self::InvalidLanguage { .. }
        )
    }

    /// Attach the offending file to a per-post error.
    ///
    /// Errors that already carry a path, and fatal errors, are returned as-is.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::MissingFrontMatter
            | Self::UnterminatedFrontMatter { .. }
            | Self::InvalidFrontMatter { .. }
            | Self::MissingField(_)
            | Self::InvalidDate { .. } => Self::ParseFailed {
                path: path.into(),
                message: self.to_string(),
            },
            other => other,
        }
    }
}

/// Result of a build that may have partial failures.
#[derive(Debug)]
pub struct BuildResult {
    pub content_dir: PathBuf,
    pub successes: usize,
    pub drafts_skipped: usize,
    pub failures: Vec<BuildError>,
}

impl BuildResult {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            successes: 0,
            drafts_skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    pub fn record_draft(&mut self) {
        self.drafts_skipped += 1;
    }

    pub fn record_failure(&mut self, error: BuildError) {
        self.failures.push(error);
    }

    /// Returns Err if no posts succeeded or if any non-recoverable error occurred.
    pub fn finalize(mut self) -> Result<BuildSummary, BuildError> {
        if let Some(pos) = self.failures.iter().position(|e| !e.is_recoverable()) {
            return Err(self.failures.swap_remove(pos));
        }

        if self.successes == 0 && !self.failures.is_empty() {
            return Err(BuildError::NoValidPosts {
                path: self.content_dir,
            });
        }

        Ok(BuildSummary {
            posts_built: self.successes,
            posts_skipped: self.failures.len(),
            drafts_skipped: self.drafts_skipped,
            warnings: self.failures,
        })
    }
}

/// Summary of a successful (possibly partial) build.
#[derive(Debug)]
pub struct BuildSummary {
    pub posts_built: usize,
    pub posts_skipped: usize,
    pub drafts_skipped: usize,
    pub warnings: Vec<BuildError>,
}

impl BuildSummary {
    pub fn log_report(&self) {
        info!(
            built = self.posts_built,
            drafts = self.drafts_skipped,
            "✓ Built {} posts",
            self.posts_built
        );
        if self.posts_skipped > 0 {
            warn!("⚠ Skipped {} posts:", self.posts_skipped);
            for w in &self.warnings {
                warn!("  - {}", w);
            }
        }
    }
}
