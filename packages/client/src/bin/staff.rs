//! Staff chat console in the terminal.
//!
//! Polls the room list every few seconds and opens the conversation of the
//! selected room.
//!
//! Run with:
//! ```not_rust
//! VELOCHAT_API_TOKEN=... cargo run --bin velochat-staff
//! cargo run --bin velochat-staff -- --api-origin https://shop.example.com --poll-interval-secs 5
//! ```

use std::time::Duration;

use clap::Parser;

use velochat_client::{ChatConfig, ui::run_staff_console};
use velochat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "velochat-staff")]
#[command(about = "Storefront support chat console for staff", long_about = None)]
struct Args {
    /// HTTP origin of the storefront API
    #[arg(long, env = "VELOCHAT_API_ORIGIN", default_value = velochat_client::config::DEFAULT_API_ORIGIN)]
    api_origin: String,

    /// Bearer token for the room listing endpoint
    #[arg(short = 't', long, env = "VELOCHAT_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Room list refresh interval (seconds)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_secs: u64,

    /// Delay before reconnecting after an abnormal closure (milliseconds)
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u64).range(1..))]
    reconnect_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ChatConfig {
        api_token: args.token,
        reconnect_delay: Duration::from_millis(args.reconnect_delay_ms),
        room_poll_interval: Duration::from_secs(args.poll_interval_secs),
        ..ChatConfig::new(args.api_origin)
    };

    if let Err(e) = run_staff_console(config).await {
        tracing::error!("Staff console error: {}", e);
        std::process::exit(1);
    }
}
