//! Database migration command.
//!
//! # Environment Variables
//!
//! - `MINIMART_DATABASE_URL` - `SQLite` connection string
//!   (default: sqlite://minimart.db)

use tracing::info;

use minimart_server::config::ServerConfig;
use minimart_server::db;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database cannot
/// be reached, or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
