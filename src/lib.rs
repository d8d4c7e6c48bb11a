//! Static publisher for Markdown blog posts.
//!
//! Reads posts with a front-matter header (`title`, `date`, `draft`), renders
//! their Markdown bodies to HTML and writes a small static site. Drafts are
//! left out of production builds.

pub mod check;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod markdown;
pub mod post;
pub mod renderer;
pub mod site;
pub mod types;

pub use config::Config;
pub use error::{BuildError, BuildSummary};
pub use post::Post;
