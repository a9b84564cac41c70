use std::net::SocketAddr;
use std::sync::Arc;

use trava_api::{app, scheduler, AppState};
use trava_jobs::{StubFlightProvider, StubHotelProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trava_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = trava_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Trava API on port {}", config.server.port);

    // Stub suppliers until the real flight/hotel adapters are wired in.
    let state = AppState::in_memory(
        config.search.clone(),
        Arc::new(StubFlightProvider),
        Arc::new(StubHotelProvider::new()),
    );

    scheduler::spawn_supervisor_loops(state.supervisor.clone(), &config.search);

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
