use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use event_log::EventLog;
use tracker_api::EventStore;
use tracker_api_server::AppState;

use crate::config::{ServeArgs, ServerConfig};
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::debug!(?args, "serve command");

    // --- Load config ---
    let config = ServerConfig::resolve(&args)?;
    tracing::info!(
        config = args.config.as_deref().unwrap_or("<defaults>"),
        login = ?config.login.variant,
        recommend = ?config.recommend.variant,
        max_events = ?config.max_events,
        "loaded config"
    );

    // --- Event store ---
    let store: Arc<dyn EventStore> = Arc::new(EventLog::new().with_max_events(config.max_events));

    let state = AppState::new(store, &config.api_settings())?;

    // --- Bind ---
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;

    // --- API server ---
    let token = CancellationToken::new();
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(tracker_api_server::serve(listener, state, api_token));

    tracing::info!(%addr, "server ready");

    // --- Ожидание Ctrl+C / SIGTERM или падения сервера ---
    tokio::select! {
        signal = shutdown_signal() => {
            signal?;
            tracing::info!("shutting down...");
            token.cancel();
        }
        result = &mut api_handle => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(ServerError::Serve(e)),
                Err(e) => Err(ServerError::Serve(std::io::Error::other(e))),
            };
        }
    }

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "api server error"),
        Err(e) => tracing::error!(error = %e, "api server task failed"),
    }

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() -> Result<(), std::io::Error> {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await?;
        tracing::info!("received Ctrl+C");
        Ok::<(), std::io::Error>(())
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())?.recv().await;
        tracing::info!("received terminate signal");
        Ok::<(), std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), std::io::Error>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
