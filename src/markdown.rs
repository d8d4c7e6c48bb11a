//! Markdown to HTML conversion and code-block inventory.

use std::collections::HashSet;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use tracing::warn;

use crate::config::Config;
use crate::types::{CodeLanguage, HtmlSafe};

/// Rendering switches.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Render raw HTML in the body as text instead of passing it through.
    pub escape_raw_html: bool,
    /// Give every heading an `id` for anchor links.
    pub heading_ids: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_raw_html: false,
            heading_ids: true,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            escape_raw_html: config.escape_raw_html,
            ..Self::default()
        }
    }
}

/// A code block found in a post body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Declared language, if the info string holds a valid one.
    pub language: Option<CodeLanguage>,
    /// Raw fence info string (empty for indented blocks).
    pub info: String,
    /// False for indented blocks, which cannot declare a language.
    pub fenced: bool,
    /// 1-based line of the opening fence within the body.
    pub line: usize,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert a post body to HTML.
///
/// Fenced blocks become `<pre><code class="language-x" data-lang="x">` so a
/// highlighter can pick them up. Headings get unique ids; an explicit
/// `{#id}` attribute is kept and reserved before later headings claim it.
pub fn render_markdown(markdown: &str, opts: &RenderOptions) -> HtmlSafe {
    let parser = Parser::new_ext(markdown, parser_options());

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut code: Option<(Option<CodeLanguage>, String)> = None;
    let mut heading: Option<PendingHeading<'_>> = None;
    let mut slugs = SlugSet::default();

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => fence_language(info),
                    CodeBlockKind::Indented => None,
                };
                code = Some((language, String::new()));
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, buf)) = code.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, buf)) = code.take() {
                    events.push(Event::Html(code_block_html(language.as_ref(), &buf).into()));
                }
            }

            Event::Start(Tag::Heading {
                level, id, classes, ..
            }) if opts.heading_ids => {
                heading = Some(PendingHeading {
                    level,
                    id,
                    classes,
                    inner: Vec::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                if let Some(h) = heading.take() {
                    let id = match h.id {
                        Some(explicit) => slugs.reserve(explicit.to_string()),
                        None => slugs.claim(&plain_text(&h.inner)),
                    };
                    let level = h.level;
                    let mut open = format!("<{level} id=\"{}\"", HtmlSafe::escape(&id));
                    if !h.classes.is_empty() {
                        let classes: Vec<&str> = h.classes.iter().map(|c| &**c).collect();
                        open.push_str(&format!(" class=\"{}\"", HtmlSafe::escape(&classes.join(" "))));
                    }
                    open.push('>');
                    events.push(Event::Html(open.into()));
                    events.extend(h.inner);
                    events.push(Event::Html(format!("</{level}>\n").into()));
                }
            }

            Event::Html(raw) | Event::InlineHtml(raw) if opts.escape_raw_html => {
                push(&mut events, &mut heading, Event::Text(raw));
            }
            other => push(&mut events, &mut heading, other),
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    HtmlSafe::from_trusted(html_output)
}

/// A heading whose inner events are held back until its id is known.
struct PendingHeading<'a> {
    level: HeadingLevel,
    id: Option<CowStr<'a>>,
    classes: Vec<CowStr<'a>>,
    inner: Vec<Event<'a>>,
}

fn push<'a>(events: &mut Vec<Event<'a>>, heading: &mut Option<PendingHeading<'a>>, event: Event<'a>) {
    match heading {
        Some(h) => h.inner.push(event),
        None => events.push(event),
    }
}

fn fence_language(info: &str) -> Option<CodeLanguage> {
    match CodeLanguage::from_info(info) {
        Ok(lang) => lang,
        Err(e) => {
            warn!("⚠ Rendering code block untagged: {}", e);
            None
        }
    }
}

fn code_block_html(language: Option<&CodeLanguage>, code: &str) -> String {
    let body = HtmlSafe::escape(code);
    match language {
        Some(lang) => format!(
            "<pre><code class=\"language-{lang}\" data-lang=\"{lang}\">{body}</code></pre>\n"
        ),
        None => format!("<pre><code>{body}</code></pre>\n"),
    }
}

fn plain_text(events: &[Event<'_>]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect()
}

/// Heading anchors, unique within one document.
#[derive(Default)]
struct SlugSet {
    used: HashSet<String>,
}

impl SlugSet {
    fn claim(&mut self, text: &str) -> String {
        self.reserve(slugify(text))
    }

    /// `base`, or `base-N` with the smallest N no earlier heading holds.
    fn reserve(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

/// Anchor form of a heading: lowercase alphanumerics joined by `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() || ch == '_' {
            slug.push(ch);
        } else if (ch.is_whitespace() || ch == '-') && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}

/// List every code block in `markdown`, in document order.
pub fn code_blocks(markdown: &str) -> Vec<CodeBlock> {
    Parser::new_ext(markdown, parser_options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let line = markdown[..range.start].matches('\n').count() + 1;
                let (info, fenced) = match kind {
                    CodeBlockKind::Fenced(info) => (info.to_string(), true),
                    CodeBlockKind::Indented => (String::new(), false),
                };
                Some(CodeBlock {
                    language: CodeLanguage::from_info(&info).ok().flatten(),
                    info,
                    fenced,
                    line,
                })
            }
            _ => None,
        })
        .collect()
}
