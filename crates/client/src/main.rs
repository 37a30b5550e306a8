//! `aurum`: headless Aurum signal client
//!
//! Connects to the configured Supabase project (or an in-memory demo feed),
//! prints the filtered signal list every time it changes, and exits on
//! Ctrl-C or after `--duration` seconds.

use anyhow::{Context, Result};
use aurum_client::config::{load_config, load_default_config};
use aurum_client::{DeskOptions, SignalDesk, demo_signals};
use aurum_core::StatusFilter;
use aurum_feed::ChannelFeed;
use chrono::Utc;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "aurum", about = "Headless Aurum signal client", version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, env = "AURUM_CONFIG")]
    config: Option<PathBuf>,

    /// Use the bundled demo signals instead of a backend
    #[arg(long)]
    demo: bool,

    /// Status filter: all, pending, active or closed
    #[arg(short, long)]
    filter: Option<StatusFilter>,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => load_default_config()?,
    };
    config.apply_env();
    if let Some(filter) = args.filter {
        config.initial_filter = filter;
    }

    let desk = if args.demo {
        info!("Running against the in-memory demo feed");
        let feed = Arc::new(ChannelFeed::seeded(demo_signals(Utc::now())));
        SignalDesk::new(feed.clone(), feed, DeskOptions::from(&config))
    } else {
        SignalDesk::connect_supabase(&config)?
    };

    let source = desk.start().await?;
    info!("Showing {:?} data", source);
    render(&desk);

    let mut updates = desk.updates();
    let mut session = desk.watch_session();
    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&desk);
            }
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *session.borrow_and_update();
                info!("Feed session is now {:?}", state);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = &mut deadline => {
                info!("Run duration elapsed");
                break;
            }
        }
    }

    desk.stop();
    Ok(())
}

fn render(desk: &SignalDesk) {
    let counts = desk.status_counts();
    println!();
    if let Some(label) = desk.connectivity_label() {
        println!("[{}]", label);
    }
    println!(
        "Signals ({:?}): {} shown | pending {} | active {} | closed {}",
        desk.filter(),
        counts.for_filter(desk.filter()),
        counts.pending,
        counts.active,
        counts.closed
    );

    for d in desk.displays() {
        let current = d
            .formatted_current
            .as_deref()
            .map(|price| format!(" now {}", price))
            .unwrap_or_default();
        let pnl = d
            .formatted_pnl
            .as_deref()
            .map(|pnl| format!(" {}", pnl))
            .unwrap_or_default();
        let risk_reward = d
            .risk_reward_label
            .as_deref()
            .map(|rr| format!(" {}", rr))
            .unwrap_or_default();

        println!(
            "{:<8} {:<4} {:<7} entry {}{} TP {} SL {}{}{} | {} | {}",
            d.pair,
            d.side_label,
            d.status_label,
            d.formatted_entry,
            current,
            d.take_profit_line,
            d.formatted_stop_loss,
            pnl,
            risk_reward,
            d.accuracy_label,
            d.age_label
        );
    }
}
