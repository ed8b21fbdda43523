use aerodesk_core::migrations::Migrator;
use aerodesk_core::routes::AUTH_ROUTES;
use aerodesk_core::{AerodeskError, App, Config, logging};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;

#[derive(Parser)]
#[command(name = "aerodesk")]
#[command(about = "Serve, migrate and seed the AeroDesk flight-booking back office")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending migrations, then start the HTTP server
    Serve,
    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },
    /// Print the auth route table
    Routes,
}

#[derive(Subcommand)]
enum DbCommands {
    /// Run pending migrations
    Migrate,
    /// Roll back applied migrations
    Rollback {
        /// Number of migrations to roll back
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Seed roles and permissions
    Seed,
    /// Drop every table, re-run all migrations
    Fresh {
        /// Seed roles and permissions afterwards
        #[arg(long)]
        seed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), AerodeskError> {
    let cli = Cli::parse();
    logging::init_logging();

    match cli.command {
        Commands::Serve => App::new().await?.run().await,
        Commands::Db { action } => run_db(action).await,
        Commands::Routes => {
            let config = Config::from_env()?;
            print_routes(&config.api_prefix);
            Ok(())
        }
    }
}

async fn run_db(action: DbCommands) -> Result<(), AerodeskError> {
    let config = Config::from_env()?;

    match action {
        DbCommands::Migrate => {
            App::with_config(config).await?;
        }
        DbCommands::Rollback { steps } => {
            let app = App::connect(config).await?;
            tracing::info!("Rolling back {} migration(s)...", steps);
            Migrator::down(&app.db, Some(steps)).await?;
            tracing::info!("Rollback complete.");
        }
        DbCommands::Seed => {
            let app = App::with_config(config).await?;
            app.seed().await?;
        }
        DbCommands::Fresh { seed } => {
            let app = App::connect(config).await?;
            tracing::info!("Dropping all tables and re-running migrations...");
            Migrator::fresh(&app.db).await?;
            tracing::info!("Database rebuilt.");
            if seed {
                app.seed().await?;
            }
        }
    }
    Ok(())
}

fn print_routes(prefix: &str) {
    println!("Auth routes (prefix: {})", if prefix.is_empty() { "/" } else { prefix });
    for endpoint in AUTH_ROUTES.iter() {
        println!("  {endpoint}");
    }
}
