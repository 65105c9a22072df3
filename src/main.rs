//! bff-gateway
//!
//! ```text
//!     Browser ──▶ listener ──▶ axum router ─┬─▶ /status, /proxy-status
//!                                           ├─▶ OAuth entry ──▶ backend (302 relay)
//!                                           ├─▶ proxy routes ──▶ backend
//!                                           └─▶ static pages / assets
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "bff-gateway", version)]
#[command(about = "Static front-end server and backend gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    bff_gateway::lifecycle::run(args.config.as_deref()).await?;
    Ok(())
}
