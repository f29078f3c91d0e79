mod query;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "campsync-cli")]
#[command(about = "Campaign video sync and moderation command line interface")]
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
    /// Sync campaign videos from Shortimize
    Sync {
        /// Restrict the sync to one brand
        #[arg(long)]
        brand: Option<Uuid>,
        /// Restrict the sync to one campaign
        #[arg(long)]
        campaign: Option<Uuid>,
        /// Ignore the minimum interval between campaign syncs
        #[arg(long)]
        force: bool,
        /// List the campaigns that would be synced without fetching or writing
        #[arg(long)]
        dry_run: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync run history
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
    /// Payout items awaiting a moderation decision
    Flagged {
        #[command(subcommand)]
        command: FlaggedCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Subcommand)]
enum RunsCommands {
    /// Show the most recent sync runs
    List {
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

#[derive(Debug, Subcommand)]
enum FlaggedCommands {
    /// Show flagged payout items pending review
    List {
        #[arg(long, default_value = "50")]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("campsync-cli: run with --help to list commands");
        return Ok(());
    };

    let config = campsync_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = campsync_db::connect_pool_from_config(&config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                campsync_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = campsync_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Sync {
            brand,
            campaign,
            force,
            dry_run,
            json,
        } => {
            let request = campsync_sync::SyncRequest {
                brand_id: brand,
                campaign_id: campaign,
                force_refresh: force,
            };
            sync::run_sync(pool, &config, &request, dry_run, json).await?;
        }
        Commands::Runs {
            command: RunsCommands::List { limit },
        } => query::run_runs_list(&pool, i64::from(limit)).await?,
        Commands::Flagged {
            command: FlaggedCommands::List { limit },
        } => query::run_flagged_list(&pool, i64::from(limit)).await?,
    }

    Ok(())
}
