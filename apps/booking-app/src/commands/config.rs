//! # Config Commands
//!
//! Read-only view of the app configuration.

use serde::Serialize;
use tracing::debug;

use crate::BookingApp;

/// Configuration values a host UI may display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub api_base_url: String,
    pub app_origin: String,
    pub message_secs: u64,
    pub countdown_secs: u32,
}

/// Gets the active configuration.
pub fn get_config(app: &BookingApp) -> ConfigResponse {
    debug!("get_config command");
    let config = app.config();
    ConfigResponse {
        api_base_url: config.api_base_url.clone(),
        app_origin: config.app_origin.clone(),
        message_secs: config.message_secs,
        countdown_secs: config.countdown_secs,
    }
}
