//! CLI entry point for blogfront

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogfront::commands::list::ListOptions;
use blogfront::commands::theme::ThemeAction;
use blogfront::theme::Theme;
use blogfront::Blog;

#[derive(Parser)]
#[command(name = "blogfront")]
#[command(version)]
#[command(about = "A markdown blog front end with tag filtering, live search and a synced light/dark theme", long_about = None)]
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
    /// Initialize a new blog site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// File name under the pages directory (defaults to the slugified title)
        #[arg(short, long)]
        path: Option<String>,

        /// Tags for the new post
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Rebuild the post index from the pages directory
    #[command(alias = "i")]
    Index,

    /// List posts from the post index
    List {
        /// Only posts with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only posts matching this search text
        #[arg(short, long)]
        query: Option<String>,

        /// List tags instead of posts
        #[arg(long)]
        tags: bool,
    },

    /// Render a single post page
    Show {
        /// Post file, relative to the pages directory
        file: String,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
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

    /// Show or change the theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// Print the active theme
    Get,
    /// Switch between light and dark
    Toggle,
    /// Save a theme preference
    Set {
        /// light or dark
        theme: Theme,
    },
    /// Forget the saved preference and follow the system
    Reset,
}

impl From<ThemeCommand> for ThemeAction {
    fn from(command: ThemeCommand) -> Self {
        match command {
            ThemeCommand::Get => ThemeAction::Get,
            ThemeCommand::Toggle => ThemeAction::Toggle,
            ThemeCommand::Set { theme } => ThemeAction::Set(theme),
            ThemeCommand::Reset => ThemeAction::Reset,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogfront=debug,info"
    } else {
        "blogfront=info"
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
            tracing::info!("Initializing blog in {:?}", target_dir);
            blogfront::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New { title, path, tag } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            blogfront::commands::new::create_post(&blog, &title, path.as_deref(), &tag)?;
        }

        Commands::Index => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Indexing {:?}", blog.pages_dir);
            blogfront::commands::index::run(&blog)?;
        }

        Commands::List { tag, query, tags } => {
            let blog = Blog::new(&base_dir)?;
            let options = ListOptions { tag, query, tags };
            blogfront::commands::list::run(&blog, &options).await?;
        }

        Commands::Show { file, output } => {
            let blog = Blog::new(&base_dir)?;
            blogfront::commands::show::run(&blog, &file, output.as_deref()).await?;
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogfront::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Theme { action } => {
            let blog = Blog::new(&base_dir)?;
            let action = action.map(ThemeAction::from).unwrap_or(ThemeAction::Get);
            blogfront::commands::theme::run(&blog, action)?;
        }

        Commands::Version => {
            println!("blogfront version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
