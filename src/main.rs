use log::{error, info};

use recipe_vision::config::load_config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Missing vision endpoint or key is fatal
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting recipe-vision on {}", config.server.bind_address);
    recipe_vision::run(config).await?;
    Ok(())
}
