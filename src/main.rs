//! `postpress` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use postpress::config::{CONFIG_FILE_NAME, Config};
use postpress::error::BuildError;
use postpress::renderer::format_date;
use postpress::{check, site};

/// Publish Markdown blog posts as a static site.
#[derive(Parser)]
#[command(name = "postpress", version, long_about = None)]
struct Cli {
    /// Config file (defaults to ./postpress.toml when present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the Markdown posts.
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Render all published posts into the output directory.
    Build {
        /// Output directory.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Publish drafts too (preview builds).
        #[arg(long)]
        drafts: bool,
    },

    /// Validate front matter and code fences without writing anything.
    Check {
        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },

    /// List posts, newest first.
    List {
        /// Include drafts.
        #[arg(long)]
        drafts: bool,
    },
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "postpress=info",
        1 => "postpress=debug",
        _ => "postpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `list` output on stdout stays pipeable.
    match cli.log_format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn load_config(cli: &Cli) -> Result<Config, BuildError> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_file_or_default(CONFIG_FILE_NAME)?,
    };
    Ok(match &cli.content {
        Some(dir) => config.content_dir(dir),
        None => config,
    })
}

fn run(cli: &Cli) -> Result<bool, BuildError> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Build { out, drafts } => {
            let mut config = config;
            if let Some(out) = out {
                config = config.public_dir(out);
            }
            if *drafts {
                config = config.include_drafts(true);
            }

            let start = Instant::now();
            info!(
                content = %config.content_dir.display(),
                out = %config.public_dir.display(),
                drafts = config.include_drafts,
                "Building site..."
            );
            let summary = site::build_site(&config)?;
            summary.log_report();
            info!("Done! Built in {:.2?}", start.elapsed());
            Ok(true)
        }
        Command::Check { strict } => {
            let report = check::check_site(&config)?;
            report.log_report();
            Ok(report.passed(*strict))
        }
        Command::List { drafts } => {
            let config = config.include_drafts(*drafts);
            let (posts, failures) = site::load_posts(&config)?;
            for post in &posts {
                let fm = &post.front_matter;
                println!(
                    "{}  {}  {}  {}",
                    format_date(&fm.date),
                    if fm.draft { "draft" } else { "     " },
                    post.slug,
                    fm.title
                );
            }
            for e in &failures {
                error!("{}", e);
            }
            Ok(failures.is_empty())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Build failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
