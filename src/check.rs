//! Content checks: front matter well-formed, code fences tagged.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::BuildError;
use crate::post::{self, Post};
use crate::site::discover_posts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A finding about one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    /// 1-based line in the file, when the finding has one.
    pub line: Option<usize>,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}: {}", self.path.display(), line, self.severity, self.message),
            None => write!(f, "{}: {}: {}", self.path.display(), self.severity, self.message),
        }
    }
}

/// Check an already-parsed post. `source` is the full file text, used to map
/// body lines back to file lines.
pub fn check_post(post: &Post, source: Option<&str>) -> Vec<Diagnostic> {
    let path = post
        .source_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.md", post.slug)));
    let line_offset = source.map_or(0, |s| post.body_line_offset(s));

    let mut found = Vec::new();
    let mut report = |line: Option<usize>, severity, message: String| {
        found.push(Diagnostic {
            path: path.clone(),
            line,
            severity,
            message,
        });
    };

    for e in &post.rejected_tags {
        report(None, Severity::Warning, e.to_string());
    }

    for block in post.code_blocks() {
        let line = Some(block.line + line_offset);
        if !block.fenced {
            report(
                line,
                Severity::Warning,
                "indented code block cannot declare a language; use a fenced block".to_string(),
            );
        } else if block.language.is_none() {
            let message = if block.info.trim().is_empty() {
                "fenced code block has no language".to_string()
            } else {
                format!("fenced code block has an invalid language '{}'", block.info.trim())
            };
            report(line, Severity::Warning, message);
        }
    }

    found
}

/// Parse and check one document's text.
pub fn check_source(path: &Path, source: &str, default_offset: FixedOffset) -> Vec<Diagnostic> {
    let slug = match post::slug_for(path) {
        Ok(slug) => slug,
        Err(e) => return vec![error_at(path, &e)],
    };

    match Post::parse(source, slug, default_offset) {
        Ok(mut post) => {
            post.source_path = Some(path.to_path_buf());
            check_post(&post, Some(source))
        }
        Err(e) => vec![error_at(path, &e)],
    }
}

fn error_at(path: &Path, e: &BuildError) -> Diagnostic {
    Diagnostic {
        path: path.to_path_buf(),
        line: None,
        severity: Severity::Error,
        message: e.to_string(),
    }
}

/// Outcome of checking a content directory.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    /// No errors; under `strict`, no warnings either.
    pub fn passed(&self, strict: bool) -> bool {
        self.errors() == 0 && (!strict || self.warnings() == 0)
    }

    pub fn log_report(&self) {
        for d in &self.diagnostics {
            match d.severity {
                Severity::Error => tracing::error!("{}", d),
                Severity::Warning => warn!("{}", d),
            }
        }
        info!(
            files = self.files_checked,
            errors = self.errors(),
            warnings = self.warnings(),
            "Checked {} files",
            self.files_checked
        );
    }
}

/// Check every post in the content directory, drafts included.
pub fn check_site(config: &Config) -> Result<CheckReport, BuildError> {
    let offset = config.default_offset()?;
    let paths = discover_posts(&config.content_dir)?;

    let mut diagnostics: Vec<Diagnostic> = paths
        .par_iter()
        .flat_map_iter(|path| match fs::read_to_string(path) {
            Ok(source) => check_source(path, &source, offset),
            Err(e) => vec![Diagnostic {
                path: path.clone(),
                line: None,
                severity: Severity::Error,
                message: format!("Failed to read file: {e}"),
            }],
        })
        .collect();
    diagnostics.sort_by(|a, b| (&a.path, a.line).cmp(&(&b.path, b.line)));

    Ok(CheckReport {
        files_checked: paths.len(),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn clean_post_has_no_findings() {
        let src = "---\ntitle: Clean\ndate: 2021-01-01\n---\n```rust\nfn f() {}\n```\n";
        assert!(check_source(Path::new("clean.md"), src, utc()).is_empty());
    }

    #[test]
    fn untagged_fence_is_warning_with_file_line() {
        let src = "---\ntitle: T\ndate: 2021-01-01\n---\ntext\n\n```\nplain\n```\n";
        let found = check_source(Path::new("t.md"), src, utc());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Warning);
        assert_eq!(found[0].line, Some(7));
        assert_eq!(found[0].to_string(), "t.md:7: warning: fenced code block has no language");
    }

    #[test]
    fn invalid_language_and_indented_blocks_flagged() {
        let src = "---\ntitle: T\ndate: 2021-01-01\n---\n```a<b\nx\n```\n\n    indented\n";
        let found = check_source(Path::new("t.md"), src, utc());
        assert_eq!(found.len(), 2);
        assert!(found[0].message.contains("invalid language 'a<b'"));
        assert!(found[1].message.contains("indented"));
    }

    #[test]
    fn bad_front_matter_is_error() {
        let found = check_source(Path::new("x.md"), "---\ntitle: \"\"\ndate: 2021-01-01\n---\n", utc());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert!(found[0].message.contains("'title'"));

        let found = check_source(Path::new("y.md"), "---\ntitle: T\ndate: soon\n---\n", utc());
        assert!(found[0].message.contains("Invalid date"));
    }

    #[test]
    fn rejected_tags_are_warnings() {
        let src = "---\ntitle: T\ndate: 2021-01-01\ntags: [\"\"]\n---\n";
        let found = check_source(Path::new("t.md"), src, utc());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Warning);
    }

    #[test]
    fn strict_mode_fails_on_warnings() {
        let report = CheckReport {
            files_checked: 1,
            diagnostics: vec![Diagnostic {
                path: PathBuf::from("a.md"),
                line: Some(3),
                severity: Severity::Warning,
                message: "fenced code block has no language".into(),
            }],
        };
        assert!(report.passed(false));
        assert!(!report.passed(true));
    }

    #[test]
    fn check_site_walks_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.md"), "---\ntitle: Good\ndate: 2021-01-01\n---\n").unwrap();
        fs::write(dir.path().join("bad.md"), "# no front matter\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = check_site(&Config::new().content_dir(dir.path())).unwrap();
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.errors(), 1);
        assert!(report.diagnostics[0].path.ends_with("bad.md"));
    }
}
