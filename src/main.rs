//! CLI entry point for folio-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_rs::content::ContentKind;
use folio_rs::{commands, Site};

#[derive(Parser)]
#[command(name = "folio-rs")]
#[command(version)]
#[command(about = "Content pipeline for posts, guides, news and apps", long_about = None)]
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

    /// Create a new content item
    New {
        /// Content type (posts, guides, news, apps)
        kind: ContentKind,

        /// Title of the new item
        title: String,

        /// Slug for the file name (derived from the title otherwise)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Generate the sitemap and data files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List published content (posts, guides, news, apps, tags)
    List {
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Show the related items picked for an item
    Related {
        /// Content type of the item
        kind: ContentKind,

        /// Slug of the item
        slug: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
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
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { kind, title, slug } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", kind, title);
            commands::new::run(&site, kind, &title, slug.as_deref())?;
        }

        Commands::Generate { watch } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Generating data files...");

            site.generate().await?;
            println!("Generated successfully!");

            if watch {
                commands::generate::watch(&site, None).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = Site::new(&base_dir)?;

            // Generate first
            tracing::info!("Generating data files...");
            site.generate().await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio_rs::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            commands::list::run(&site, &r#type).await?;
        }

        Commands::Related { kind, slug } => {
            let site = Site::new(&base_dir)?;
            commands::related::run(&site, kind, &slug).await?;
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
