mod commands;
mod view;

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vitalis_core::{
    config::{self, Config},
    reminder::{Filter, Repeat},
    shellexpand,
};
use vitalis_notify::Delivery;
use vitalis_reminders::{EngineSettings, ReminderEngine};

#[derive(Parser)]
#[command(
    name = "vitalis",
    version,
    about = "Vitalis: health reminders that track pending, completed and missed doses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a reminder.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Due time, HH:MM.
        #[arg(long)]
        time: String,
        /// once, every-hour, every-two-hours or every-day.
        #[arg(long, default_value = "once")]
        repeat: Repeat,
        /// Do not schedule a notification.
        #[arg(long)]
        no_notify: bool,
    },
    /// List reminders: all, today, missed or completed.
    List {
        #[arg(default_value = "all")]
        filter: Filter,
    },
    /// Show the filter counters.
    Counts,
    /// Mark a pending or missed reminder as completed.
    Complete { id: String },
    /// Permanently delete a reminder.
    Delete { id: String },
    /// Move overdue pending reminders to missed.
    Reconcile,
    /// Keep the reminders view open: reconcile periodically and deliver
    /// notifications until Ctrl-C.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    let watching = matches!(cli.command, Commands::Watch);
    let _log_guard = init_tracing(&cfg, watching)?;

    let zone = cfg.calendar.zone()?;
    let store = vitalis_store::open(&cfg.storage).await?;
    let (scheduler, deliveries) = vitalis_notify::build(&cfg.notifications, zone)?;
    let engine = Arc::new(ReminderEngine::new(
        store,
        scheduler,
        EngineSettings::from_config(&cfg)?,
    ));
    engine.load().await?;

    let now = Utc::now();
    let output = match cli.command {
        Commands::Add {
            title,
            description,
            date,
            time,
            repeat,
            no_notify,
        } => {
            let args = commands::AddArgs {
                title,
                description,
                date,
                time,
                repeat,
                notify: !no_notify,
            };
            commands::handle_add(&engine, args, now).await?
        }
        Commands::List { filter } => commands::handle_list(&engine, filter, now).await?,
        Commands::Counts => commands::handle_counts(&engine, now).await?,
        Commands::Complete { id } => commands::handle_complete(&engine, &id, now).await?,
        Commands::Delete { id } => commands::handle_delete(&engine, &id, now).await?,
        Commands::Reconcile => commands::handle_reconcile(&engine, now).await?,
        Commands::Watch => {
            watch(&cfg, engine, deliveries).await?;
            return Ok(());
        }
    };
    println!("{output}");
    Ok(())
}

/// Console logging filtered by `RUST_LOG` or the configured level; in watch
/// mode also a daily log file under `<data_dir>/logs`.
fn init_tracing(
    cfg: &Config,
    to_file: bool,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.vitalis.log_level))
    };
    let console = fmt::layer().with_writer(std::io::stderr).with_filter(filter());

    if !to_file {
        tracing_subscriber::registry().with(console).init();
        return Ok(None);
    }

    let log_dir = format!("{}/logs", shellexpand(&cfg.vitalis.data_dir));
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::daily(&log_dir, "vitalis.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter());

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(Some(guard))
}

async fn watch(
    cfg: &Config,
    engine: Arc<ReminderEngine>,
    mut deliveries: Option<broadcast::Receiver<Delivery>>,
) -> anyhow::Result<()> {
    let every = Duration::from_secs(cfg.reconcile.interval_secs);
    let (mut view, first) = view::RemindersView::open(engine.clone(), every).await?;
    engine.rearm().await;

    let zone = &engine.settings().zone;
    let now = Utc::now();
    println!("{}: watching reminders (Ctrl-C to stop)\n", cfg.vitalis.name);
    println!("{}", commands::format_counts(&engine.counts(now).await));
    println!(
        "{}",
        commands::format_list(&engine.list(Filter::All, now).await, Filter::All, zone)
    );
    for id in &first.newly_missed {
        if let Some(r) = first.buckets.missed.iter().find(|r| &r.id == id) {
            println!("missed: {}", commands::format_reminder(r, zone));
        }
    }

    loop {
        tokio::select! {
            delivery = next_delivery(&mut deliveries) => {
                println!("\n{}", commands::format_delivery(&delivery));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    view.close();
    println!("Reminders view closed.");
    Ok(())
}

/// Wait for the next delivery. Without a delivering scheduler this never
/// resolves.
async fn next_delivery(deliveries: &mut Option<broadcast::Receiver<Delivery>>) -> Delivery {
    if let Some(rx) = deliveries {
        loop {
            match rx.recv().await {
                Ok(delivery) => return delivery,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("missed {skipped} notification banner(s)");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
    std::future::pending().await
}
