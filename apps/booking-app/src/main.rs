//! # Booking App Entry Point
//!
//! Headless launcher: resolves a launch URL the way the browser app would
//! and prints the resulting view as JSON.
//!
//! ## Usage
//! ```text
//! booking-app                                        # app origin, stored session
//! booking-app "http://localhost:5173/?establishmentId=42"
//! booking-app "http://localhost:5173/?token=<jwt>"
//! booking-app "http://localhost:5173/?status=success" # waits out the countdown
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults → file → environment)
//! 3. Build the app (HTTP client, session file, navigator)
//! 4. Bootstrap from the launch URL and mount the view
//! 5. On the payment page, follow the countdown back to the root

use std::process::ExitCode;
use std::sync::Arc;

use booking_app::state::{AppConfig, Navigator};
use booking_app::{commands, BookingApp};
use booking_core::ViewState;
use serde::Serialize;
use tracing::{error, info};
use url::Url;

/// Navigator for a process with no address bar: location changes are logged.
struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace_url(&self, url: &Url) {
        info!(%url, "Address bar replaced");
    }

    fn navigate_root(&self) {
        info!("Navigated to root");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    booking_app::init_tracing();

    let config = AppConfig::load_or_default(None);
    let launch = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.app_origin.clone());
    let launch_url = match Url::parse(&launch) {
        Ok(url) => url,
        Err(e) => {
            error!(%launch, error = %e, "Launch URL is not a valid URL");
            return ExitCode::FAILURE;
        }
    };

    let app = match BookingApp::builder(config)
        .navigator(Arc::new(LogNavigator))
        .build()
    {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Failed to start booking app");
            return ExitCode::FAILURE;
        }
    };

    let view = app.start(&launch_url).await;
    print_json(&view);

    if matches!(view, ViewState::PaymentStatus { .. }) {
        let mut countdown = app.router().subscribe_countdown();
        while countdown.changed().await.is_ok() {
            match *countdown.borrow_and_update() {
                Some(secs) => info!(secs, "Redirecting soon"),
                None => break,
            }
        }
        print_json(&app.sync_view().await);
    }

    if let Some(message) = commands::get_message(&app) {
        print_json(&message);
    }
    ExitCode::SUCCESS
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Could not render output"),
    }
}
