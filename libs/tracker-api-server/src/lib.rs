//! HTTP API сервер event tracker'а: `/track` поверх [`EventStore`]
//! плюс сопутствующие endpoints (`/joke`, `/login`, `/recommend`).

pub mod config;
pub mod error;
mod joke;
mod login;
mod recommend;
mod track;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use tracker_api::EventStore;

pub use config::{ApiSettings, JokeSettings, LoginSettings, LoginVariant, RecommendSettings, RecommendVariant};
pub use error::ApiError;
pub use joke::JokeClient;
pub use login::Authenticator;
pub use recommend::Recommender;

/// Общее состояние всех handler'ов.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn EventStore>,
    jokes: Arc<JokeClient>,
    auth: Arc<Authenticator>,
    recommender: Recommender,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, settings: &ApiSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            store,
            jokes: Arc::new(JokeClient::new(&settings.joke)?),
            auth: Arc::new(Authenticator::from_settings(&settings.login)),
            recommender: Recommender::new(settings.recommend.variant),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/track",
            post(track::handle_track)
                .get(track::handle_list)
                .delete(track::handle_clear),
        )
        .route("/health", get(track::handle_health))
        .route("/joke", get(joke::handle_joke))
        .route("/login", post(login::handle_login))
        .route("/recommend", post(recommend::handle_recommend))
        .with_state(state)
}

/// Обслуживать запросы на уже забинженном listener'е до отмены `shutdown`.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "api server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!(%addr, "api server stopped");
    Ok(())
}
