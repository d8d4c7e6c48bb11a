//! Build configuration with typed defaults.
//!
//! Values come from, in increasing priority: the defaults below, an optional
//! `postpress.toml`, and command-line flags (applied with the builder methods).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;

use crate::error::BuildError;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "postpress.toml";

/// Configuration for the publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory containing markdown source files.
    pub content_dir: PathBuf,

    /// Directory for generated output.
    pub public_dir: PathBuf,

    /// Offset in hours applied to front-matter dates written without one.
    pub timezone_offset_hours: i32,

    /// Site brand name shown in header.
    pub brand_name: String,

    /// Whether to inline CSS into HTML (eliminates render-blocking).
    pub inline_css: bool,

    /// Publish posts marked `draft: true` too. Off for production builds.
    pub include_drafts: bool,

    /// Escape raw HTML found in post bodies instead of passing it through.
    pub escape_raw_html: bool,
}

impl Config {
    /// Create config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, falling back to defaults for absent keys.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| BuildError::ConfigNotReadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&text).map_err(|e| BuildError::InvalidConfig {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Like [`Config::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Builder: set content directory.
    pub fn content_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.content_dir = path.as_ref().to_path_buf();
        self
    }

    /// Builder: set public (output) directory.
    pub fn public_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.public_dir = path.as_ref().to_path_buf();
        self
    }

    /// Builder: set timezone offset.
    pub fn timezone_offset(mut self, hours: i32) -> Self {
        self.timezone_offset_hours = hours;
        self
    }

    /// Builder: set brand name.
    pub fn brand_name(mut self, name: impl Into<String>) -> Self {
        self.brand_name = name.into();
        self
    }

    /// Builder: inline CSS or link `style.css`.
    pub fn inline_css(mut self, inline: bool) -> Self {
        self.inline_css = inline;
        self
    }

    /// Builder: publish drafts.
    pub fn include_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    /// Builder: escape raw HTML in post bodies.
    pub fn escape_raw_html(mut self, escape: bool) -> Self {
        self.escape_raw_html = escape;
        self
    }

    /// Offset for dates that carry none.
    pub fn default_offset(&self) -> Result<FixedOffset, BuildError> {
        self.timezone_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(BuildError::InvalidTimezoneOffset {
                hours: self.timezone_offset_hours,
            })
    }

    /// Get the posts output directory.
    pub fn posts_dir(&self) -> PathBuf {
        self.public_dir.join("posts")
    }

    /// Get the tags output directory.
    pub fn tags_dir(&self) -> PathBuf {
        self.public_dir.join("tags")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            public_dir: PathBuf::from("public"),
            timezone_offset_hours: 0,
            brand_name: String::from("POSTPRESS"),
            inline_css: true,
            include_drafts: false,
            escape_raw_html: false,
        }
    }
}
