#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::sync::Arc;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::config::Config;
use crate::identifier::ThreadRandom;
use crate::lifecycle::NoteLifecycle;
use crate::lifecycle::SystemClock;
use crate::store::Config as StoreConfig;

mod api;
mod base64_bytes;
mod config;
mod graceful_shutdown;
mod identifier;
mod lifecycle;
mod notes;
mod store;
#[cfg(test)]
mod tests;

const DEFAULT_RUST_LOG: &str = "scr=debug,tower_http=debug";

/// Room for the form around the note, like field names and multipart boundaries
const FORM_OVERHEAD: usize = 64 << 10;

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let app = setup_app(StoreConfig::DetectConfig, &config).await?;

    let address = config::address()?;
    tracing::info!("Listening on {}", address);

    let listener = TcpListener::bind(address).await?;
    let shutdown = graceful_shutdown::listen();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if the store can not be set up
pub async fn setup_app(store_config: StoreConfig, config: &Config) -> Result<Router> {
    let store = store::setup(store_config, config.store_timeout).await?;

    let notes = NoteLifecycle::new(
        store,
        Arc::new(ThreadRandom),
        Arc::new(SystemClock),
        config.max_note_size,
    );

    Ok(create_router(notes))
}

/// Create the router for scr
fn create_router(notes: NoteLifecycle) -> Router {
    // twice the note size leaves room for base64 encoded files
    let body_limit = notes
        .max_note_size()
        .saturating_mul(2)
        .saturating_add(FORM_OVERHEAD);

    Router::new()
        .nest("/api", api::router())
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(notes))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
