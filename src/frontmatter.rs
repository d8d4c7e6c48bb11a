//! Front-matter extraction and validation.
//!
//! A post starts with a metadata block fenced by `---` (YAML) or `+++`
//! (TOML):
//!
//! ```text
//! ---
//! title: "Declarative macros, part 2"
//! date: 2023-05-01T09:30:00+09:00
//! draft: false
//! ---
//! Body in Markdown...
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::error::BuildError;
use crate::types::Tag;

/// Serialization of the metadata block, selected by its delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    Yaml,
    Toml,
}

impl FrontMatterFormat {
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    fn from_delimiter(line: &str) -> Option<Self> {
        match line {
            "---" => Some(Self::Yaml),
            "+++" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Validated post metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub draft: bool,
    pub tags: Vec<Tag>,
    pub description: Option<String>,
}

/// Result of [`parse`]: metadata, the Markdown body, and any tags that were
/// dropped because they failed validation.
#[derive(Debug)]
pub struct ParsedDocument<'a> {
    pub front_matter: FrontMatter,
    pub body: &'a str,
    pub rejected_tags: Vec<BuildError>,
}

/// Schema as written by authors, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawFrontMatter {
    title: Option<String>,
    date: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default, deserialize_with = "tag_list")]
    tags: Vec<String>,
    description: Option<String>,
}

/// `tags` may be a list or a single comma-separated string (`tags: rust, macros`).
fn tag_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Line(String),
    }

    Ok(match Option::<Tags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Tags::List(tags)) => tags,
        Some(Tags::Line(line)) => line
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Split a document into its front-matter block and body.
pub fn split(source: &str) -> Result<(FrontMatterFormat, &str, &str), BuildError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let mut lines = source.split_inclusive('\n');
    let first = lines.next().ok_or(BuildError::MissingFrontMatter)?;
    let format = FrontMatterFormat::from_delimiter(first.trim_end())
        .ok_or(BuildError::MissingFrontMatter)?;

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == format.delimiter() {
            let block = &source[block_start..offset];
            let body = &source[offset + line.len()..];
            return Ok((format, block, body));
        }
        offset += line.len();
    }

    Err(BuildError::UnterminatedFrontMatter {
        delimiter: format.delimiter(),
    })
}

/// Split and validate the front matter of `source`.
///
/// `default_offset` applies to dates written without a UTC offset.
pub fn parse(source: &str, default_offset: FixedOffset) -> Result<ParsedDocument<'_>, BuildError> {
    let (format, block, body) = split(source)?;

    let raw = if block.trim().is_empty() {
        RawFrontMatter::default()
    } else {
        match format {
            FrontMatterFormat::Yaml => parse_yaml(block)?,
            FrontMatterFormat::Toml => parse_toml(block)?,
        }
    };

    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(BuildError::MissingField("title"))?;

    let date_text = raw.date.ok_or(BuildError::MissingField("date"))?;
    let date = parse_date(&date_text, default_offset)?;

    let (tags, rejected_tags) = Tag::parse_all(&raw.tags);
    for e in &rejected_tags {
        warn!(title = %title, "⚠ Skipping invalid tag: {}", e);
    }

    let description = raw
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(ParsedDocument {
        front_matter: FrontMatter {
            title,
            date,
            draft: raw.draft,
            tags,
            description,
        },
        body,
        rejected_tags,
    })
}

fn parse_yaml(block: &str) -> Result<RawFrontMatter, BuildError> {
    serde_yaml::from_str(block).map_err(|e| BuildError::InvalidFrontMatter {
        message: e.to_string(),
    })
}

fn parse_toml(block: &str) -> Result<RawFrontMatter, BuildError> {
    let invalid = |message: String| BuildError::InvalidFrontMatter { message };

    let mut table: toml::Table = toml::from_str(block).map_err(|e| invalid(e.to_string()))?;

    // Native TOML datetimes go through the same text grammar as YAML dates.
    let native_date = match table.get("date") {
        Some(toml::Value::Datetime(dt)) => Some(dt.to_string()),
        _ => None,
    };
    if let Some(text) = native_date {
        table.insert("date".to_string(), toml::Value::String(text));
    }

    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| invalid(e.to_string()))
}

/// Parse an ISO-8601-like timestamp.
///
/// Accepted, in order:
/// - RFC 3339 (`2023-05-01T09:30:00+09:00`, `...Z`, fractional seconds)
/// - `2023-05-01 09:30:00 +0900` and `2023-05-01T09:30:00+0900`
/// - the same without an offset, or `2023-05-01` alone, read in `default_offset`
pub fn parse_date(value: &str, default_offset: FixedOffset) -> Result<DateTime<FixedOffset>, BuildError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }

    const WITH_OFFSET: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    for fmt in WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }

    const NAIVE: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    let naive = NAIVE
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    naive
        .and_then(|ndt| default_offset.from_local_datetime(&ndt).single())
        .ok_or_else(|| BuildError::InvalidDate {
            value: value.to_string(),
        })
}
