mod config;
mod error;
mod fonts;
mod http;
mod page;
mod polaroid;
mod store;

use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter_directive =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,polaroid_server=debug".to_string());
    fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .init();

    let cfg = Arc::new(config::Config::from_env()?);
    let font = Arc::new(fonts::CaptionFont::load(&cfg.font_path));
    let store = Arc::new(store::CloudinaryStore::new(cfg.cloudinary.clone())?);
    let state = http::AppState {
        cfg: cfg.clone(),
        store,
        font,
    };
    let app = http::router(state);
    http::serve(app, &cfg.bind_address).await?;
    Ok(())
}
