mod import;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::import::ImportCommands;

#[derive(Debug, Parser)]
#[command(name = "reviewdb-cli")]
#[command(about = "reviewdb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Import reviews from CSV exports
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => run_db(command).await,
        Some(Commands::Import { command }) => import::run(command).await,
        None => {
            println!("reviewdb-cli: no command given (try --help)");
            Ok(())
        }
    }
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = reviewdb_core::load_app_config()?;
    let pool = connect(&config).await?;

    match command {
        DbCommands::Ping => {
            reviewdb_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = reviewdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    pool.close().await;
    Ok(())
}

pub(crate) async fn connect(config: &reviewdb_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = reviewdb_db::PoolConfig::from_app_config(config);
    let pool = reviewdb_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests;
