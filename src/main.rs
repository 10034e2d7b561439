mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod ports;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    database::Database,
    http_server::app::HttpServerConfig,
    logging::{SERVICE_NAME, init_tracing},
    services::seed::{SeedService, faker::FakerDataSource},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PODCAST_API_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `podcast_api=debug,sea_orm=warn`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP collector to export traces to
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Connection URL; overrides the database settings of the config file
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the GraphQL API
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "3000", env = "PODCAST_API_PORT")]
        port: u16,
    },
    /// Fill the database with fake data
    #[command(subcommand)]
    Seed(SeedCommands),
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum SeedCommands {
    /// Create users with random roles
    Users {
        #[arg(long, default_value = "20")]
        count: u32,
    },
    /// Create podcasts with episodes, listeners and seen users
    Podcasts {
        #[arg(long, default_value = "10")]
        count: u32,
        #[arg(long, default_value = "1")]
        min_episodes: u32,
        #[arg(long, default_value = "5")]
        max_episodes: u32,
    },
    /// Give every podcast reviews from random listeners
    Reviews,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

async fn open_database(config: &Config, database_url: Option<String>) -> Result<Database> {
    match database_url.or_else(|| config.database_url.clone()) {
        Some(url) => {
            log::debug!("Connecting to database from URL");
            Database::connect(&url, config.search_dialect).await
        }
        None => {
            let path = config.database_path();
            log::debug!("Opening database at: {}", path.display());
            Database::open(&path, config.search_dialect).await
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load podcast-api config")?;

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                log::info!("Default config available at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Seed(seed_commands) => {
            let database = Arc::new(open_database(&config, args.database_url).await?);
            let seeder = SeedService::new(database, FakerDataSource);
            match seed_commands {
                SeedCommands::Users { count } => {
                    let created = seeder.seed_users(count).await?;
                    println!("Created {} users", created);
                }
                SeedCommands::Podcasts {
                    count,
                    min_episodes,
                    max_episodes,
                } => {
                    let summary = seeder
                        .seed_podcasts_and_episodes(count, min_episodes, max_episodes)
                        .await?;
                    println!(
                        "Created {} podcasts with {} episodes",
                        summary.podcasts, summary.episodes
                    );
                }
                SeedCommands::Reviews => {
                    let created = seeder.seed_reviews().await?;
                    println!("Created {} reviews", created);
                }
            }
        }
        Commands::Serve { port } => {
            let database = open_database(&config, args.database_url).await?;
            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(HttpServerConfig {
                port,
                database,
                identity_header: config.identity_header,
            })
            .await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        SERVICE_NAME,
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    log::debug!("podcast-api starting");
    let result = run(args).await;

    if let Some(provider) = tracer_provider
        && let Err(e) = provider.shutdown()
    {
        log::warn!("Failed to flush traces: {}", e);
    }

    result
}
