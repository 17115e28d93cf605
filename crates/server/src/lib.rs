//! Textrelay server library.
//!
//! Provides a reusable server function to serve the relay either for the binary, or for the integration tests.

#![deny(missing_docs)]

use std::net::SocketAddr;

use anyhow::anyhow;
use axum_server::tls_rustls::RustlsConfig;
use config::Config;
use tokio::net::TcpListener;

/// Configuration for serving Textrelay.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The validated Textrelay configuration.
    pub config: Config,
}

/// Starts and runs the relay server with the provided configuration.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let path = config.relay.path.clone();

    if !config.relay.cors {
        log::debug!("CORS disabled - responses carry no cross-origin headers");
    }

    if !config.relay.allow_url_override {
        log::debug!("Per-request upstream URL override disabled");
    }

    let app = relay::router(config.relay).map_err(|e| anyhow!("Failed to initialize relay: {e}"))?;

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| anyhow!("Failed to load TLS certificate and key: {e}"))?;

            log::info!("Relay endpoint available at: https://{listen_address}{path}");

            axum_server::from_tcp_rustls(listener.into_std()?, rustls_config)
                .serve(app.into_make_service())
                .await
                .map_err(|e| anyhow!("Failed to start HTTPS server: {e}"))?;
        }
        None => {
            log::info!("Relay endpoint available at: http://{listen_address}{path}");

            axum::serve(listener, app)
                .await
                .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;
        }
    }

    Ok(())
}
