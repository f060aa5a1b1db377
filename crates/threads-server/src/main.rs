//! Threads Server - REST API and management commands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use threads_core::config::{AppConfig, PaginationConfig, PathsConfig, TokenConfig};
use threads_core::fixtures::FixtureOutcome;
use threads_core::{Argon2Hasher, Settings};
use threads_server::commands;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "threads-server")]
#[command(about = "REST API for private two-party message threads")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "DATABASE_PATH", default_value = PathsConfig::DEFAULT_DATABASE_FILE)]
    database: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations and serve the API
    Runserver {
        /// Host to bind to
        #[arg(long, env = "BIND_HOST", default_value = AppConfig::DEFAULT_BIND_HOST)]
        host: String,

        /// Port to listen on (0 = auto-assign)
        #[arg(short, long, env = "BIND_PORT", default_value_t = AppConfig::DEFAULT_BIND_PORT)]
        port: u16,

        /// Key used to sign tokens
        #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
        secret_key: String,

        #[arg(long, env = "ACCESS_TOKEN_EXPIRES_MINUTES", default_value_t = TokenConfig::ACCESS_TOKEN_EXPIRES_MINUTES)]
        access_token_minutes: u64,

        #[arg(long, env = "REFRESH_TOKEN_EXPIRES_MINUTES", default_value_t = TokenConfig::REFRESH_TOKEN_EXPIRES_MINUTES)]
        refresh_token_minutes: u64,

        /// Default number of records per page
        #[arg(long, env = "PAGE_SIZE", default_value_t = PaginationConfig::DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Apply pending schema migrations
    Migrate,
    /// Create a staff superuser
    Createsuperuser {
        #[arg(long)]
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, env = "SUPERUSER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change the password of an existing user
    Changepassword {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },
    /// Create demo users, a thread and messages
    SetupTestData,
    /// Write all tables to a JSON file under dumps/
    DumpDb {
        /// File name (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Command::Runserver {
            host,
            port,
            secret_key,
            access_token_minutes,
            refresh_token_minutes,
            page_size,
        } => {
            info!("Starting {} server", AppConfig::APP_NAME);
            let settings = Settings {
                database_path: cli.database,
                secret_key,
                access_token_lifetime: Duration::from_secs(access_token_minutes * 60),
                refresh_token_lifetime: Duration::from_secs(refresh_token_minutes * 60),
                page_size,
            };
            commands::runserver(settings, &host, port).await?;
        }
        Command::Migrate => {
            let store = commands::open_store(&cli.database)?;
            let applied = commands::migrate(&store)?;
            println!("Applied {} migration(s)", applied.len());
        }
        Command::Createsuperuser {
            username,
            email,
            password,
        } => {
            let store = commands::open_store(&cli.database)?;
            commands::migrate(&store)?;
            let hasher = Argon2Hasher::new();
            commands::create_superuser(&store, &hasher, &username, &email, &password)?;
            println!("Superuser created successfully.");
        }
        Command::Changepassword { username, password } => {
            let store = commands::open_store(&cli.database)?;
            commands::migrate(&store)?;
            commands::change_password(&store, &Argon2Hasher::new(), &username, &password)?;
            println!("Password changed successfully for user '{}'", username);
        }
        Command::SetupTestData => {
            let store = commands::open_store(&cli.database)?;
            commands::migrate(&store)?;
            match commands::setup_test_data(&store, &Argon2Hasher::new())? {
                FixtureOutcome::Created {
                    users,
                    threads,
                    messages,
                } => println!(
                    "Created {} users, {} threads, {} messages",
                    users, threads, messages
                ),
                FixtureOutcome::AlreadyPresent => println!("Test data already present"),
            }
        }
        Command::DumpDb { output } => {
            let store = commands::open_store(&cli.database)?;
            commands::migrate(&store)?;
            let path = commands::dump_db(
                &store,
                &PathBuf::from(PathsConfig::DUMPS_DIR_NAME),
                output.as_deref(),
            )?;
            println!("Database dumped to {}", path.display());
        }
    }

    Ok(())
}
