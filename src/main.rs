//! CLI entry point for postpress

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "postpress")]
#[command(author = "Yukang Chen")]
#[command(version = "0.1.0")]
#[command(about = "Publish Markdown posts as static HTML pages", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Category of the new post (repeatable)
        #[arg(short = 'C', long = "category")]
        categories: Vec<String>,
    },

    /// Publish every post
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Publish a single post by id
    Render {
        /// Post id: its path under source/_posts without the extension
        id: String,
    },

    /// Clean the public folder and publish manifest
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, category, tag, media)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postpress=debug,info"
    } else {
        "postpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            postpress::commands::init::init_site(&target_dir)?;
            println!("Initialized empty site in {:?}", target_dir);
        }

        Commands::New { title, categories } => {
            let site = postpress::Site::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            let path = site.new_post(&title, &categories)?;
            println!("Created: {:?}", path);
        }

        Commands::Generate { watch } => {
            let site = postpress::Site::new(&base_dir)?;
            tracing::info!("Publishing posts...");

            let summary = site.generate()?;
            if summary.is_success() {
                println!("Generated successfully!");
            } else {
                println!("Generated with {} failure(s)", summary.failures.len());
            }

            if watch {
                postpress::commands::generate::watch(&site)?;
            } else if !summary.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Render { id } => {
            let site = postpress::Site::new(&base_dir)?;
            let report = site.render_one(&id)?;
            println!("{} -> {}", report.id, report.key);
            if report.unresolved > 0 {
                println!(
                    "{} of {} media references unresolved",
                    report.unresolved, report.media
                );
            }
        }

        Commands::Clean => {
            let site = postpress::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = postpress::Site::new(&base_dir)?;
            postpress::commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("postpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(ExitCode::SUCCESS)
}
