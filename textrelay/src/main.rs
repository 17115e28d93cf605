use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use args::{Args, LogStyle};
use clap::Parser;
use server::ServeConfig;

mod args;
mod logger;

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8000));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(args.log_level, args.log_style.unwrap_or_else(LogStyle::detect));

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            std::process::exit(1);
        }
    };

    if let (Some(url), Some(model)) = (&config.relay.api_url, &config.relay.default_model) {
        log::info!("Relaying to {url} with default model {model}");
    }

    if !config.relay.allow_url_override {
        log::info!("Per-request completion service URLs are ignored");
    }

    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    if let Err(e) = server::serve(ServeConfig { listen_address, config }).await {
        log::error!("Server failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}
