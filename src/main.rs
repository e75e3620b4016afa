// src/main.rs
use bot_utils::config::AppConfig;
use bot_utils::logging::init_logging;
use bot_utils::utils::keys::validate_ec_private_key;
use dotenvy::dotenv;
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> anyhow::Result<ExitCode> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new()?;

    // 2. Logging (guard must outlive every log call)
    let _log_guard = init_logging(&config.logging)?;

    let key_name = config.api_key_name.as_deref().unwrap_or("<unnamed>");

    // 3. Validate API key
    let Some(pem) = config.private_key_pem()? else {
        warn!("No API private key configured (APP_API_PRIVATE_KEY or APP_API_PRIVATE_KEY_FILE)");
        return Ok(ExitCode::SUCCESS);
    };

    match validate_ec_private_key(&pem) {
        Ok(()) => {
            info!(key = key_name, "✅ API private key is valid");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(key = key_name, "{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
