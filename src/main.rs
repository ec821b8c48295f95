//! Fanward entry point: CLI dispatch, role loops, signal handling.

mod app;
mod bmc;
mod config;
mod control;
mod node;
mod sensor;
mod supervisor;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use app::cli::{Args, Command};
use app::logging::init_tracing;
use bmc::{FanActuator, IpmitoolChannel};
use config::{load_config, save_config, Config};
use node::LocalController;
use sensor::HttpSensorGateway;
use supervisor::{HttpNodeQuery, Supervisor};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match args.command {
        Command::InitConfig => {
            save_config(&Config::default(), args.config.as_deref()).await
        }
        Command::Node => {
            let config = load_config(args.config.as_deref()).await?;
            run_node(config, args.dry_run).await
        }
        Command::Supervisor => {
            let config = load_config(args.config.as_deref()).await?;
            run_supervisor(config, args.dry_run).await
        }
    }
}

fn tick_interval(secs: f64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(secs));
    // A tick that fires mid-cycle is dropped, never queued.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_node(config: Config, dry_run: bool) -> Result<()> {
    let channel = Arc::new(IpmitoolChannel::new(config.bmc.clone(), dry_run));
    let sensor = Arc::new(HttpSensorGateway::new(&config.sensor)?);
    let controller = Arc::new(LocalController::new(
        sensor,
        FanActuator::new(channel),
        config.control.fan_speed_offset,
    ));

    let listener = tokio::net::TcpListener::bind(&config.node.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.node.listen_addr))?;
    info!("Node query interface listening on {}", config.node.listen_addr);

    let router = node::router(controller.clone());
    let server = tokio::spawn(async move { axum::serve(listener, router).await });

    info!(
        "Node control loop started (interval {}s, offset {})",
        config.node.poll_interval_secs, config.control.fan_speed_offset
    );
    let mut interval = tick_interval(config.node.poll_interval_secs);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !controller.gate().is_active() {
                    debug!("Polling suspended, skipping tick");
                    continue;
                }
                if !controller.gate().try_acquire() {
                    debug!("Previous cycle still in flight, skipping tick");
                    continue;
                }
                let outcome = controller.run_cycle().await;
                controller.gate().release();
                if outcome.succeeded {
                    info!("{}", outcome.message);
                } else {
                    warn!("{}", outcome.message);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down, returning fans to BMC auto-control");
                let outcome = controller.restore_default().await;
                if !outcome.succeeded {
                    warn!("{}", outcome.message);
                }
                break;
            }
        }
    }

    server.abort();
    Ok(())
}

async fn run_supervisor(config: Config, dry_run: bool) -> Result<()> {
    let channel = Arc::new(IpmitoolChannel::new(config.bmc.clone(), dry_run));
    let node_query = Arc::new(HttpNodeQuery::new(&config.supervisor)?);
    let supervisor = Supervisor::new(
        node_query,
        FanActuator::new(channel),
        config.control.fan_speed_offset,
    );

    info!(
        "Supervising {} (interval {}s, query timeout {}s)",
        config.supervisor.node_url,
        config.supervisor.poll_interval_secs,
        config.supervisor.query_timeout_secs
    );
    let mut interval = tick_interval(config.supervisor.poll_interval_secs);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !supervisor.gate().is_active() {
                    debug!("Supervision suspended, skipping tick");
                    continue;
                }
                if !supervisor.gate().try_acquire() {
                    debug!("Previous cycle still in flight, skipping tick");
                    continue;
                }
                let outcome = supervisor.run_cycle().await;
                supervisor.gate().release();
                if outcome.succeeded {
                    info!("{}", outcome.message);
                } else {
                    warn!("{}", outcome.message);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Supervisor shutting down");
                break;
            }
        }
    }

    Ok(())
}
