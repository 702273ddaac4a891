use anyhow::Context;
use print_bridge::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, config, logging)
    let config = setup_environment();

    print_banner();
    tracing::info!(work_dir = %config.work_dir, "Masa print bridge starting...");

    // 2. Settings store and print engine
    let state = ServerState::initialize(&config).context("failed to initialize server state")?;

    // 3. HTTP server, runs until Ctrl-C
    Server::with_state(config, state)
        .run()
        .await
        .context("server stopped with error")?;

    Ok(())
}
