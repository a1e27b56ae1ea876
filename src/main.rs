//! Blind timer binary entrypoint wiring configuration, storage, speech cues and the HTTP routes.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blind_timer::{
    config::AppConfig,
    dao::timer_store::memory::MemoryTimerStore,
    render::Renderer,
    routes,
    services::audio::{cache::CachingCueResolver, synth::HttpSpeechSynthesizer},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let renderer = Renderer::for_config(&config).context("loading templates")?;

    let synthesizer = Arc::new(HttpSpeechSynthesizer::new(
        config.audio.speech_endpoint.clone(),
    ));
    let cues = Arc::new(CachingCueResolver::new(
        config.audio.cache_dir.clone(),
        config.audio.voice.clone(),
        synthesizer,
    ));

    let port = config.port;
    let app_state = AppState::new(config, renderer, cues);
    start_storage(&app_state).await;

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Hand storage to the CouchDB supervisor when it is configured, otherwise keep
/// timers in memory for the lifetime of the process.
async fn start_storage(state: &SharedState) {
    #[cfg(feature = "couch-store")]
    {
        use blind_timer::{
            dao::{
                storage::StorageError,
                timer_store::{
                    TimerStore,
                    couchdb::{CouchConfig, CouchTimerStore},
                },
            },
            services::storage_supervisor,
        };

        match CouchConfig::from_env() {
            Ok(couch) => {
                info!(base_url = %couch.base_url, database = %couch.database, "using CouchDB timer store");
                let connect = move || {
                    let couch = couch.clone();
                    async move {
                        let store = CouchTimerStore::connect(couch)
                            .await
                            .map_err(StorageError::from)?;
                        Ok::<_, StorageError>(Arc::new(store) as Arc<dyn TimerStore>)
                    }
                };
                tokio::spawn(storage_supervisor::run(state.clone(), connect));
                return;
            }
            Err(err) => warn!(error = %err, "CouchDB not configured"),
        }
    }

    warn!("timers are kept in memory and lost on restart");
    state
        .install_timer_store(Arc::new(MemoryTimerStore::new()))
        .await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
