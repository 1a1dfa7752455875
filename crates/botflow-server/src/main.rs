use anyhow::{Context, Result};
use botflow_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    botflow_server::init_logging(&config.log_level);

    // Run the server using the library's run function
    botflow_server::run(config).await.context("Server error")?;

    Ok(())
}
