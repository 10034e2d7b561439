use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

use crate::http_server::graphql::query_builder::SearchDialect;

pub struct Database {
    pub conn: DatabaseConnection,
    /// How title searches are matched. Resolved once when the connection is opened.
    pub search_dialect: SearchDialect,
}

impl Database {
    /// Open or create a SQLite database at the given path
    pub async fn open(path: &Path, search_dialect: Option<SearchDialect>) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect(&url, search_dialect).await
    }

    /// Connect to any supported database URL and run pending migrations
    pub async fn connect(url: &str, search_dialect: Option<SearchDialect>) -> Result<Self> {
        let mut opt = ConnectOptions::new(url.to_owned());
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context("Failed to open database")?;

        Self::from_connection(conn, search_dialect).await
    }

    pub async fn from_connection(
        conn: DatabaseConnection,
        search_dialect: Option<SearchDialect>,
    ) -> Result<Self> {
        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        let search_dialect = search_dialect
            .unwrap_or_else(|| SearchDialect::for_backend(conn.get_database_backend()));
        log::info!(
            "Database ready ({:?} backend, {:?} title search)",
            conn.get_database_backend(),
            search_dialect
        );

        Ok(Database {
            conn,
            search_dialect,
        })
    }
}
