use std::sync::Arc;

use {
    relay_config::RelayConfig,
    relay_routing::Router,
    secrecy::ExposeSecret,
    serenity::Client,
    tracing::{info, warn},
};

use crate::{error::Result, handler::RelayHandler};

/// Connect to the Discord gateway and relay messages until shutdown.
///
/// Ctrl-C closes every shard, after which this returns `Ok(())`.
pub async fn run(config: &RelayConfig, router: Arc<Router>) -> Result<()> {
    let handler = RelayHandler::new(router);
    let mut client = Client::builder(config.token.expose_secret(), RelayHandler::intents())
        .event_handler(handler)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested, closing discord connection");
                shard_manager.shutdown_all().await;
            },
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    info!("connecting to discord gateway");
    client.start().await?;
    Ok(())
}
