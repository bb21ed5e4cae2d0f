use std::net::SocketAddr;

use skyfare_api::{app, AppState, AuthConfig};
use skyfare_store::{fixtures, Config, Repositories};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_api=debug,skyfare_core=info,skyfare_store=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting SkyFare API on port {}", config.server.port);

    let repos = Repositories::connect(&config).await?;
    if config.auth.allow_dev_tokens {
        tracing::warn!("Development tokens are enabled on /api/auth/token");
    }

    let state = AppState::new(
        repos,
        fixtures::public_flights(),
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            allow_dev_tokens: config.auth.allow_dev_tokens,
        },
    );

    let app = app(state, &config.cors.allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
