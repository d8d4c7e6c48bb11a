//! Site build: discover posts, drop drafts, render pages, write output.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::iter::Either;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BuildError, BuildResult, BuildSummary};
use crate::markdown::{RenderOptions, render_markdown};
use crate::post::Post;
use crate::renderer::{
    PostListItem, RenderContext, format_date, render_post_list, render_post_meta, sort_newest_first,
    template,
};
use crate::types::{EscapeHtml, HtmlSafe, Tag};

/// Static files copied verbatim from the content directory when present.
const STATIC_ASSETS: [&str; 2] = ["favicon.ico", "style.css"];

/// All `*.md` files directly inside `content_dir`, sorted by path.
pub fn discover_posts(content_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let entries = fs::read_dir(content_dir).map_err(|e| BuildError::ContentNotReadable {
        path: content_dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("md"))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every post, newest first. Drafts are kept only if the config says so.
///
/// Per-post failures are returned alongside instead of aborting.
pub fn load_posts(config: &Config) -> Result<(Vec<Post>, Vec<BuildError>), BuildError> {
    let offset = config.default_offset()?;
    let paths = discover_posts(&config.content_dir)?;

    let (mut posts, failures): (Vec<_>, Vec<_>) = paths
        .par_iter()
        .map(|path| Post::load(path, offset))
        .partition_map(|res| match res {
            Ok(post) => Either::Left(post),
            Err(e) => Either::Right(e),
        });

    posts.retain(|p| config.include_drafts || p.is_published());
    posts.sort_by(|a, b| {
        b.front_matter
            .date
            .cmp(&a.front_matter.date)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    Ok((posts, failures))
}

/// Build the whole site into `config.public_dir`.
pub fn build_site(config: &Config) -> Result<BuildSummary, BuildError> {
    let offset = config.default_offset()?;

    create_dir(&config.public_dir)?;
    ensure_output_separate(config)?;
    // Posts that became drafts or were removed must not linger from a previous build.
    reset_dir(&config.posts_dir())?;
    reset_dir(&config.tags_dir())?;

    let css = load_inline_css(config);
    copy_static_assets(config, css.is_some());

    // Phase 1: discover markdown files (IO-bound, sequential)
    let paths = discover_posts(&config.content_dir)?;
    info!("Found {} markdown files.", paths.len());

    // Phase 2: parse front matter (parallel)
    let parsed: Vec<_> = paths.par_iter().map(|path| Post::load(path, offset)).collect();

    let mut build_result = BuildResult::new(&config.content_dir);
    let mut posts: Vec<Post> = Vec::new();
    for res in parsed {
        match res {
            Ok(post) if !post.is_published() && !config.include_drafts => {
                debug!(slug = %post.slug, "Skipping draft");
                build_result.record_draft();
            }
            Ok(post) => {
                debug!(
                    slug = %post.slug,
                    date = %format_date(&post.front_matter.date),
                    draft = post.front_matter.draft,
                    "  ✓ {}",
                    post.title()
                );
                posts.push(post);
            }
            Err(e) => {
                warn!("⚠ {}", e);
                build_result.record_failure(e);
            }
        }
    }

    // Tags that share a file name share a page; the first spelling wins.
    let mut tag_pages: BTreeMap<String, Tag> = BTreeMap::new();
    for tag in posts.iter().flat_map(|p| &p.front_matter.tags) {
        tag_pages.entry(tag.slug()).or_insert_with(|| tag.clone());
    }
    let all_tags: BTreeSet<Tag> = tag_pages.values().cloned().collect();

    info!(
        "Parsed {} posts ({} drafts excluded). Generating HTML...",
        posts.len(),
        build_result.drafts_skipped
    );

    // Phase 3: render posts (parallel)
    let render_results: Vec<_> = posts
        .par_iter()
        .map(|post| render_post(post, &all_tags, config, css.as_deref()))
        .collect();

    for res in render_results {
        match res {
            Ok(()) => build_result.record_success(),
            Err(e) => build_result.record_failure(e),
        }
    }

    // Phase 4: index pages (sequential)
    let mut items: Vec<PostListItem> = posts
        .iter()
        .map(|p| PostListItem {
            title: p.title().escape_html(),
            slug: p.slug.clone(),
            date: p.front_matter.date,
            draft: p.front_matter.draft,
            tags: p.front_matter.tags.clone(),
        })
        .collect();
    sort_newest_first(&mut items);

    write_list_page(
        &items,
        &all_tags,
        "Index",
        config.public_dir.join("index.html"),
        "",
        config,
        css.as_deref(),
    )?;

    for (slug, tag) in &tag_pages {
        let tagged: Vec<PostListItem> = items
            .iter()
            .filter(|item| item.tags.iter().any(|t| &t.slug() == slug))
            .cloned()
            .collect();
        write_list_page(
            &tagged,
            &all_tags,
            &format!("Tag: {tag}"),
            config.tags_dir().join(format!("{slug}.html")),
            "../",
            config,
            css.as_deref(),
        )?;
    }

    build_result.finalize()
}

fn render_post(
    post: &Post,
    all_tags: &BTreeSet<Tag>,
    config: &Config,
    css: Option<&str>,
) -> Result<(), BuildError> {
    let fm = &post.front_matter;
    let title = fm.title.escape_html();

    let mut content = render_post_meta(&title, &fm.date, fm.draft, &fm.tags, "../");
    content.push_safe(&render_markdown(&post.body, &RenderOptions::from_config(config)));

    let ctx = RenderContext::new(config)
        .with_css(css)
        .with_description(fm.description.as_deref());
    let page = template(&title, &content, all_tags, "../", &ctx);

    write_page(config.posts_dir().join(format!("{}.html", post.slug)), page)
}

fn write_list_page(
    posts: &[PostListItem],
    all_tags: &BTreeSet<Tag>,
    title: &str,
    path: PathBuf,
    relative_root: &str,
    config: &Config,
    css: Option<&str>,
) -> Result<(), BuildError> {
    let safe_title = title.escape_html();
    let content = HtmlSafe::from_trusted(format!(
        "<h1>{}</h1>{}",
        safe_title,
        render_post_list(posts, relative_root)
    ));

    let ctx = RenderContext::new(config).with_css(css);
    write_page(path, template(&safe_title, &content, all_tags, relative_root, &ctx))
}

fn write_page(path: PathBuf, html: String) -> Result<(), BuildError> {
    fs::write(&path, html).map_err(|e| BuildError::OutputNotWritable { path, source: e })
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|e| BuildError::OutputNotWritable {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Refuse to build when clearing `posts/` or `tags/` would delete the sources.
fn ensure_output_separate(config: &Config) -> Result<(), BuildError> {
    let content = config
        .content_dir
        .canonicalize()
        .map_err(|e| BuildError::ContentNotReadable {
            path: config.content_dir.clone(),
            source: e,
        })?;
    let public = config
        .public_dir
        .canonicalize()
        .map_err(|e| BuildError::OutputNotWritable {
            path: config.public_dir.clone(),
            source: e,
        })?;

    let cleared = ["posts", "tags"].map(|name| {
        let dir = public.join(name);
        dir.canonicalize().unwrap_or(dir)
    });
    if content == public || cleared.iter().any(|dir| content.starts_with(dir)) {
        return Err(BuildError::OutputOverlapsContent {
            content: config.content_dir.clone(),
            output: config.public_dir.clone(),
        });
    }
    Ok(())
}

fn reset_dir(path: &Path) -> Result<(), BuildError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(BuildError::OutputNotWritable {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }
    create_dir(path)
}

/// `style.css` contents, when CSS should be inlined and the file exists.
fn load_inline_css(config: &Config) -> Option<String> {
    if !config.inline_css {
        return None;
    }
    let css_path = config.content_dir.join("style.css");
    match fs::read_to_string(&css_path) {
        Ok(css) => {
            info!("  → CSS will be inlined ({} bytes)", css.len());
            Some(css)
        }
        Err(_) => {
            warn!("  ⚠ CSS file not found for inlining, using external link");
            None
        }
    }
}

fn copy_static_assets(config: &Config, css_inlined: bool) {
    for file in STATIC_ASSETS {
        if css_inlined && file == "style.css" {
            continue;
        }
        let src = config.content_dir.join(file);
        if src.exists() {
            if let Err(e) = fs::copy(&src, config.public_dir.join(file)) {
                warn!("  ⚠ Failed to copy {}: {}", file, e);
            }
        }
    }
}
