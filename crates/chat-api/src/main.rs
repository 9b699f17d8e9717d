//! Grocer Chat Storefront Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{OpenApi, swagger_ui::SwaggerUi},
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use grocer_app::{
    context::AppContext,
    notify::{HttpNotifier, HttpNotifierConfig},
    storefront::Storefront,
};

use crate::{config::ServerConfig, delivery::MeteredNotifier, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config;
mod delivery;
mod extensions;
mod healthcheck;
mod observability;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod updates;

/// Grocer chat server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(source) = observability::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("{source}");
        }

        process::exit(1);
    }

    let store = match config.store_info() {
        Ok(store) => store,
        Err(source) => {
            error!("invalid store configuration: {source}");

            process::exit(1);
        }
    };

    let app = match AppContext::migrated(&config.database.database_url).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let notifier = match HttpNotifier::new(HttpNotifierConfig::from(&config.outbound)) {
        Ok(notifier) => MeteredNotifier::new(notifier),
        Err(init_error) => {
            error!("failed to initialize outbound notifier: {init_error}");

            process::exit(1);
        }
    };

    info!(
        store = %store.name,
        currency = store.currency.iso_alpha_code,
        min_order = store.policy.min_order_amount,
        "storefront ready"
    );

    let storefront = Storefront::new(app, Arc::new(notifier), store);

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(State::from_storefront(storefront)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("updates").post(updates::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler));

    let doc = OpenApi::new("Grocer Chat API", env!("CARGO_PKG_VERSION")).merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;
}
