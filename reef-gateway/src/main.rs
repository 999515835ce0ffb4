use reef_gateway::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first, so config and logger see .env values
    dotenv::dotenv().ok();
    init_logger();

    tracing::info!("Reef gateway starting...");

    let config = Config::from_env();
    if config.shop_domain.is_empty() {
        anyhow::bail!("SHOP_DOMAIN is not configured");
    }

    let state = ServerState::initialize(&config);
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
