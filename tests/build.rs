//! End-to-end builds from a content directory to a public directory.

use std::fs;
use std::path::Path;

use postpress::{BuildError, Config, site};

const PUBLISHED: &str = r#"---
title: "Writing a derive macro"
date: 2023-03-10T09:00:00+09:00
draft: false
tags: [rust, proc-macro]
description: "syn, quote & friends"
---
Derive macros take a `TokenStream`.

```rust
#[proc_macro_derive(Hello)]
pub fn hello(input: TokenStream) -> TokenStream { input }
```
"#;

const OLDER: &str = r#"---
title: "macro_rules! basics"
date: 2022-11-02T18:30:00Z
tags: [rust]
---
## Repetition

```rust
macro_rules! count { () => { 0 }; }
```
"#;

const DRAFT: &str = r#"---
title: "Secret draft on const generics"
date: 2024-01-01T00:00:00Z
draft: true
tags: [unreleased]
---
Not ready.
"#;

fn write_content(dir: &Path) {
    fs::write(dir.join("2023-derive.md"), PUBLISHED).unwrap();
    fs::write(dir.join("2022-macro-rules.md"), OLDER).unwrap();
    fs::write(dir.join("2024-draft.md"), DRAFT).unwrap();
    fs::write(dir.join("style.css"), "body { color: black; }").unwrap();
}

fn config(content: &Path, public: &Path) -> Config {
    Config::new().content_dir(content).public_dir(public)
}

#[test]
fn drafts_are_excluded_from_production_build() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());

    let summary = site::build_site(&config(content.path(), public.path())).unwrap();
    assert_eq!(summary.posts_built, 2);
    assert_eq!(summary.drafts_skipped, 1);
    assert_eq!(summary.posts_skipped, 0);

    let out = public.path();
    assert!(out.join("posts/2023-derive.html").exists());
    assert!(out.join("posts/2022-macro-rules.html").exists());
    assert!(!out.join("posts/2024-draft.html").exists());
    assert!(!out.join("tags/unreleased.html").exists());

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(!index.contains("Secret draft"));
    assert!(!index.contains("unreleased"));

    // Newest first.
    let derive = index.find("Writing a derive macro").unwrap();
    let basics = index.find("macro_rules! basics").unwrap();
    assert!(derive < basics);
}

#[test]
fn post_page_renders_front_matter_and_highlighting_classes() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());

    site::build_site(&config(content.path(), public.path())).unwrap();

    let page = fs::read_to_string(public.path().join("posts/2023-derive.html")).unwrap();
    assert!(page.contains("<title>POSTPRESS | Writing a derive macro</title>"));
    assert!(page.contains(r#"<meta name="description" content="syn, quote &amp; friends">"#));
    assert!(page.contains("2023.03.10 09:00"));
    assert!(page.contains(r#"<code class="language-rust" data-lang="rust">"#));
    assert!(page.contains("<style>body { color: black; }</style>"));
    assert!(page.contains(r#"href="../tags/proc-macro.html""#));

    let older = fs::read_to_string(public.path().join("posts/2022-macro-rules.html")).unwrap();
    assert!(older.contains(r#"<h2 id="repetition">Repetition</h2>"#));
}

#[test]
fn tag_pages_list_only_tagged_posts() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());

    site::build_site(&config(content.path(), public.path())).unwrap();

    let rust = fs::read_to_string(public.path().join("tags/rust.html")).unwrap();
    assert!(rust.contains("<h1>Tag: rust</h1>"));
    assert!(rust.contains("Writing a derive macro"));
    assert!(rust.contains("macro_rules! basics"));

    let proc_macro = fs::read_to_string(public.path().join("tags/proc-macro.html")).unwrap();
    assert!(!proc_macro.contains("macro_rules! basics"));
}

#[test]
fn preview_build_includes_drafts() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());

    let cfg = config(content.path(), public.path()).include_drafts(true);
    let summary = site::build_site(&cfg).unwrap();
    assert_eq!(summary.posts_built, 3);
    assert_eq!(summary.drafts_skipped, 0);

    let page = fs::read_to_string(public.path().join("posts/2024-draft.html")).unwrap();
    assert!(page.contains(r#"<span class="draft">DRAFT</span>"#));
}

#[test]
fn post_turned_draft_is_removed_on_rebuild() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());
    let cfg = config(content.path(), public.path());

    site::build_site(&cfg).unwrap();
    assert!(public.path().join("posts/2022-macro-rules.html").exists());

    let now_draft = OLDER.replacen("tags: [rust]", "tags: [rust]\ndraft: true", 1);
    fs::write(content.path().join("2022-macro-rules.md"), now_draft).unwrap();

    site::build_site(&cfg).unwrap();
    assert!(!public.path().join("posts/2022-macro-rules.html").exists());
}

#[test]
fn malformed_posts_are_skipped() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());
    fs::write(content.path().join("no-date.md"), "---\ntitle: Undated\n---\nbody").unwrap();
    fs::write(content.path().join("plain.md"), "# No front matter").unwrap();

    let summary = site::build_site(&config(content.path(), public.path())).unwrap();
    assert_eq!(summary.posts_built, 2);
    assert_eq!(summary.posts_skipped, 2);
    assert!(summary.warnings.iter().all(BuildError::is_recoverable));
    assert!(!public.path().join("posts/no-date.html").exists());
}

#[test]
fn all_posts_malformed_fails_build() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    fs::write(content.path().join("plain.md"), "# No front matter").unwrap();

    let err = site::build_site(&config(content.path(), public.path())).unwrap_err();
    assert!(matches!(err, BuildError::NoValidPosts { .. }));
}

#[test]
fn stylesheet_copied_when_not_inlined() {
    let content = tempfile::tempdir().unwrap();
    let public = tempfile::tempdir().unwrap();
    write_content(content.path());

    let cfg = config(content.path(), public.path()).inline_css(false);
    site::build_site(&cfg).unwrap();

    assert!(public.path().join("style.css").exists());
    let index = fs::read_to_string(public.path().join("index.html")).unwrap();
    assert!(index.contains(r#"<link rel="stylesheet" href="style.css">"#));
}

#[test]
fn build_never_clears_its_own_sources() {
    let root = tempfile::tempdir().unwrap();
    let content = root.path().join("posts");
    fs::create_dir(&content).unwrap();
    write_content(&content);

    let err = site::build_site(&config(&content, root.path())).unwrap_err();
    assert!(matches!(err, BuildError::OutputOverlapsContent { .. }));
    assert!(content.join("2023-derive.md").exists());
    assert!(content.join("2024-draft.md").exists());
}
