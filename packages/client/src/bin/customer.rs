//! Customer chat widget in the terminal.
//!
//! Attaches to the signed-in customer's support room and reconnects on
//! abnormal closures. The `/tab ai` tab keeps a local assistant transcript.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin velochat-customer -- --user-id 42
//! cargo run --bin velochat-customer -- --api-origin https://shop.example.com -u 42
//! ```

use std::time::Duration;

use clap::Parser;

use velochat_client::{ChatConfig, domain::AuthSnapshot, ui::run_customer_widget};
use velochat_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "velochat-customer")]
#[command(about = "Storefront support chat for customers", long_about = None)]
struct Args {
    /// Signed-in customer id; omit to run signed out
    #[arg(short = 'u', long)]
    user_id: Option<i64>,

    /// HTTP origin of the storefront API
    #[arg(long, env = "VELOCHAT_API_ORIGIN", default_value = velochat_client::config::DEFAULT_API_ORIGIN)]
    api_origin: String,

    /// Delay before reconnecting after an abnormal closure (milliseconds)
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u64).range(1..))]
    reconnect_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let auth = match args.user_id {
        Some(user_id) => AuthSnapshot::authenticated(user_id),
        None => AuthSnapshot::anonymous(),
    };
    let config = ChatConfig {
        reconnect_delay: Duration::from_millis(args.reconnect_delay_ms),
        ..ChatConfig::new(args.api_origin)
    };

    if let Err(e) = run_customer_widget(config, auth).await {
        tracing::error!("Customer widget error: {}", e);
        std::process::exit(1);
    }
}
