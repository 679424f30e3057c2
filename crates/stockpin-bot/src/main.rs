use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stockpin_channel::TelegramChannel;
use stockpin_dispense::Dispenser;
use stockpin_ledger::ChannelLedger;
use stockpin_server::HealthServer;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod dispatch;
mod poller;

use config::BotConfig;
use dispatch::Handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BotConfig::try_from(cli::Cli::parse()).context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let channel = Arc::new(TelegramChannel::with_base_url(
        config.token.clone(),
        config.api_base_url.clone(),
    ));
    let me = channel
        .get_me()
        .await
        .context("could not reach the Bot API with the configured token")?;
    tracing::info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        admin = %config.admin,
        ledger = %config.ledger.channel,
        "bot started"
    );

    let ledger = ChannelLedger::new(Arc::clone(&channel), config.ledger.clone());
    let handler = Handler::new(Arc::clone(&channel), Dispenser::new(ledger, config.admin));

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let health = HealthServer::new(config.health.clone());
    let health_task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = stop_rx.changed().await;
        };
        // The bot keeps working without its keep-alive endpoint.
        if let Err(e) = health.serve(shutdown).await {
            tracing::error!(error = %e, "health endpoint stopped");
        }
    });

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
    };
    poller::run(channel.as_ref(), &handler, &config.poll, ctrl_c).await;

    let _ = stop_tx.send(true);
    if let Err(e) = health_task.await {
        tracing::error!(error = %e, "health task panicked");
    }
    Ok(())
}
