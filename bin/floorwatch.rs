use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use floorwatch::{
    aggregation::{heikin_ashi, Metric, Series, TimeInterval},
    cron::jobs::update_price_data,
    CollectionService, CronScheduler, Database, PriceFeeds, SeriesRequest, Settings,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the snapshot scheduler until Ctrl+C / SIGTERM
    Run,

    /// Take one snapshot of every configured collection (or just one)
    Update {
        /// Collection address; all configured collections when omitted
        #[arg(long)]
        collection: Option<String>,
    },

    /// Print a bucketed metric series as JSON
    Series {
        /// Collection address; the first configured collection when omitted
        #[arg(long)]
        collection: Option<String>,

        /// priceNative, priceUsd, listingQty, holders, volumeNativeToken or volumeUsd
        #[arg(long, default_value = "priceNative")]
        metric: Metric,

        /// Bucket width: 1w, 1d, 4h, 15m or 5m
        #[arg(long, default_value = "15m")]
        interval: TimeInterval,

        /// Inclusive start, unix seconds (defaults to the indexing start)
        #[arg(long)]
        start: Option<i64>,

        /// Inclusive end, unix seconds (defaults to the last interval boundary)
        #[arg(long)]
        end: Option<i64>,

        /// Smooth price candles into Heikin-Ashi candles
        #[arg(long)]
        heikin_ashi: bool,
    },

    /// Print the 24h collection overview as JSON
    Overview {
        /// Collection address; the first configured collection when omitted
        #[arg(long)]
        collection: Option<String>,
    },
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .context("Failed to initialize logger")?;

    let cli = Cli::parse();

    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let db = Database::new(settings.clone())
        .await
        .context("Failed to initialize database connection")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_scheduler(settings, db).await,
        Commands::Update { collection } => run_update(&settings, &db, collection.as_deref()).await,
        Commands::Series {
            collection,
            metric,
            interval,
            start,
            end,
            heikin_ashi: smooth,
        } => {
            let collection = settings.collection(collection.as_deref())?;
            let service = CollectionService::new(db.store(), &settings.cache);
            let request = SeriesRequest {
                start_time: start,
                end_time: end,
                metric,
                interval,
            };

            let series = service.get_latest(collection, &request).await?;
            let series = match (series.as_ref(), smooth) {
                (Series::Ohlc(points), true) => Series::Ohlc(heikin_ashi(points)),
                (Series::Value(_), true) => bail!("Heikin-Ashi needs a price metric, got {}", metric),
                (series, false) => series.clone(),
            };

            println!("{}", serde_json::to_string_pretty(&series)?);
            Ok(())
        },
        Commands::Overview { collection } => {
            let collection = settings.collection(collection.as_deref())?;
            let service = CollectionService::new(db.store(), &settings.cache);

            let overview = service.get_collection_data(collection).await?;

            println!("{}", serde_json::to_string_pretty(overview.as_ref())?);
            Ok(())
        },
    }
}

async fn run_update(settings: &Settings, db: &Database, collection: Option<&str>) -> anyhow::Result<()> {
    let feeds = PriceFeeds::from_settings(&settings.providers)?;
    let store = db.store();

    match collection {
        Some(address) => {
            let collection = settings.collection(Some(address))?;
            update_price_data::run(store.as_ref(), &feeds, collection).await
        },
        None => {
            let updated =
                update_price_data::run_all(store.as_ref(), &feeds, &settings.collections).await;
            info!(
                "Updated {}/{} collections",
                updated,
                settings.collections.len()
            );
            if updated < settings.collections.len() {
                bail!("Some collections failed to update");
            }
            Ok(())
        },
    }
}

async fn run_scheduler(settings: Arc<Settings>, db: Database) -> anyhow::Result<()> {
    if settings.collections.is_empty() {
        bail!("No collections configured");
    }

    let cancellation_token = CancellationToken::new();

    let feeds = PriceFeeds::from_settings(&settings.providers)?;
    let cron_scheduler = CronScheduler::new(
        db.store(),
        feeds,
        settings.collections.clone(),
        settings.cron.clone(),
    );

    let cron_token = cancellation_token.child_token();
    let cron_handle = tokio::spawn(async move {
        if let Err(e) = cron_scheduler.run(cron_token).await {
            error!("Cron scheduler failed: {:#}", e);
        }
    });

    info!("Cron scheduler started - snapshots will be taken periodically");

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("floorwatch running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    cancellation_token.cancel();

    // Wait for cron scheduler to stop
    info!("Waiting for cron scheduler to stop...");
    let _ = cron_handle.await;

    info!("Shutdown complete");
    Ok(())
}
