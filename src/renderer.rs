//! HTML page template and post listings.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};

use crate::config::Config;
use crate::types::{EscapeHtml, HtmlSafe, Tag};

/// Display format for post dates, in the post's own offset.
pub const DATE_FORMAT: &str = "%Y.%m.%d %H:%M";

pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Per-page rendering inputs beyond title and body.
pub struct RenderContext<'a> {
    pub config: &'a Config,
    pub inline_css: Option<&'a str>,
    pub description: Option<HtmlSafe>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            inline_css: None,
            description: None,
        }
    }

    pub fn with_css(mut self, css: Option<&'a str>) -> Self {
        self.inline_css = css;
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(|d| d.escape_html());
        self
    }
}

/// Render a full HTML page.
pub fn template(
    title: &HtmlSafe,
    content: &HtmlSafe,
    all_tags: &BTreeSet<Tag>,
    relative_root: &str,
    ctx: &RenderContext<'_>,
) -> String {
    let brand = ctx.config.brand_name.escape_html();

    let mut nav_html = format!(
        r#"<div class="nav-section"><a href="{relative_root}index.html" class="nav-link main-link">Index</a></div>"#
    );

    if !all_tags.is_empty() {
        nav_html.push_str(r#"<div class="nav-section"><span class="nav-header">Tags</span>"#);
        for tag in all_tags {
            let _ = write!(
                nav_html,
                r#"<a href="{relative_root}tags/{}.html" class="nav-link tag-link">{tag}</a>"#,
                tag.slug().escape_html()
            );
        }
        nav_html.push_str("</div>");
    }

    let css_block = match ctx.inline_css {
        Some(css) => format!("<style>{css}</style>"),
        None => format!(r#"<link rel="stylesheet" href="{relative_root}style.css">"#),
    };

    let description_block = match &ctx.description {
        Some(d) => format!(r#"<meta name="description" content="{d}">"#),
        None => String::new(),
    };

    format!(
r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{brand} | {title}</title>
    {description_block}
    <link rel="icon" href="{relative_root}favicon.ico" type="image/x-icon">
    {css_block}
</head>
<body>
    <header>
        <span class="brand">[ {brand} ]</span>
        <nav>
            {nav_html}
        </nav>
    </header>
    <article>
        {content}
    </article>
</body>
</html>"##
    )
}

fn tag_links(tags: &[Tag], relative_root: &str) -> String {
    tags.iter()
        .map(|t| {
            format!(
                r#"<a class="tag" href="{relative_root}tags/{}.html">#{t}</a>"#,
                t.slug().escape_html()
            )
        })
        .collect()
}

/// Header shown above a post body: title, date, tags.
pub fn render_post_meta(
    title: &HtmlSafe,
    date: &DateTime<FixedOffset>,
    draft: bool,
    tags: &[Tag],
    relative_root: &str,
) -> HtmlSafe {
    let draft_badge = if draft { r#" <span class="draft">DRAFT</span>"# } else { "" };
    HtmlSafe::from_trusted(format!(
        r#"<h1 class="post-title">{title}{draft_badge}</h1><div class="meta"><time class="meta-item" datetime="{}">{}</time> <span class="meta-item">{}</span></div>"#,
        date.to_rfc3339(),
        format_date(date),
        tag_links(tags, relative_root),
    ))
}

/// Item in the post list (for index/tag pages).
#[derive(Debug, Clone)]
pub struct PostListItem {
    pub title: HtmlSafe,
    pub slug: String,
    pub date: DateTime<FixedOffset>,
    pub draft: bool,
    pub tags: Vec<Tag>,
}

impl PostListItem {
    /// Path of the post page relative to the site root, escaped for an attribute.
    pub fn href(&self) -> HtmlSafe {
        format!("posts/{}.html", self.slug).escape_html()
    }
}

/// Newest first; slug breaks ties so output is stable.
pub fn sort_newest_first(items: &mut [PostListItem]) {
    items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}

/// Generate the post list HTML for index/tag pages.
pub fn render_post_list(posts: &[PostListItem], relative_root: &str) -> HtmlSafe {
    let mut html = String::from(r#"<div class="post-list">"#);

    for post in posts {
        let draft_badge = if post.draft { r#"<span class="draft">DRAFT</span> "# } else { "" };
        let _ = write!(
            html,
            r#"<div class="post-entry"><a href="{relative_root}{href}"><span class="entry-title">{draft_badge}{title}</span><time class="entry-date" datetime="{iso}">{date}</time></a>{tags}</div>"#,
            href = post.href(),
            title = post.title,
            iso = post.date.to_rfc3339(),
            date = format_date(&post.date),
            tags = tag_links(&post.tags, relative_root),
        );
    }

    html.push_str("</div>");
    HtmlSafe::from_trusted(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn item(slug: &str, when: &str) -> PostListItem {
        PostListItem {
            title: slug.escape_html(),
            slug: slug.to_string(),
            date: date(when),
            draft: false,
            tags: vec![Tag::new("Proc Macros").unwrap()],
        }
    }

    #[test]
    fn date_shown_in_post_offset() {
        assert_eq!(format_date(&date("2021-08-14T23:30:00+09:00")), "2021.08.14 23:30");
    }

    #[test]
    fn sorts_by_date_then_slug() {
        let mut items = vec![
            item("b", "2021-01-01T00:00:00Z"),
            item("old", "2020-01-01T00:00:00Z"),
            item("a", "2021-01-01T00:00:00Z"),
            // Later instant despite the earlier wall clock.
            item("east", "2021-01-01T08:00:00-05:00"),
        ];
        sort_newest_first(&mut items);
        let order: Vec<_> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(order, ["east", "a", "b", "old"]);
    }

    #[test]
    fn list_links_posts_and_tags() {
        let html = render_post_list(&[item("hygiene", "2022-06-01T08:00:00+02:00")], "../");
        let html = html.as_str();
        assert!(html.contains(r#"href="../posts/hygiene.html""#));
        assert!(html.contains(r#"href="../tags/proc-macros.html""#));
        assert!(html.contains("2022.06.01 08:00"));
    }

    #[test]
    fn file_stem_is_escaped_in_links() {
        let mut entry = item("q&a", "2022-06-01T08:00:00Z");
        entry.slug = r#"q&a "live""#.to_string();
        let html = render_post_list(&[entry], "");
        let html = html.as_str();
        assert!(html.contains(r#"href="posts/q&amp;a &quot;live&quot;.html""#));
        assert!(!html.contains(r#""live""#));
    }

    #[test]
    fn meta_marks_drafts() {
        let title = "Vec<T>".escape_html();
        let html = render_post_meta(&title, &date("2022-06-01T08:00:00Z"), true, &[], "../");
        assert!(html.as_str().contains("Vec&lt;T&gt; <span class=\"draft\">DRAFT</span>"));
    }

    #[test]
    fn template_inlines_css_and_description() {
        let config = Config::new().brand_name("R&D");
        let tags: BTreeSet<Tag> = [Tag::new("rust").unwrap()].into_iter().collect();
        let ctx = RenderContext::new(&config)
            .with_css(Some("body{}"))
            .with_description(Some("About \"macros\""));
        let page = template(
            &"Home".escape_html(),
            &HtmlSafe::from_trusted("<p>x</p>"),
            &tags,
            "",
            &ctx,
        );
        assert!(page.contains("<title>R&amp;D | Home</title>"));
        assert!(page.contains("<style>body{}</style>"));
        assert!(page.contains(r#"content="About &quot;macros&quot;""#));
        assert!(page.contains(r#"href="tags/rust.html""#));
    }

    #[test]
    fn template_links_stylesheet_without_inline_css() {
        let config = Config::new();
        let ctx = RenderContext::new(&config);
        let page = template(&"x".escape_html(), &HtmlSafe::default(), &BTreeSet::new(), "../", &ctx);
        assert!(page.contains(r#"<link rel="stylesheet" href="../style.css">"#));
        assert!(!page.contains("nav-header"));
    }
}
