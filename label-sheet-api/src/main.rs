use anyhow::Context;
use clap::Parser;
use label_sheet_api::{app, AppState, Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "label_sheet_api=debug,label_sheet=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let state = AppState::from_config(&config)?;

    let layout = state.composer.layout();
    let (overflow_x, overflow_y) = layout.overflow_px();
    if overflow_x > 0 || overflow_y > 0 {
        warn!(
            "Slot grid extends {}x{} px past the sheet edge; labels there are clipped",
            overflow_x, overflow_y
        );
    }

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("label-sheet API listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
