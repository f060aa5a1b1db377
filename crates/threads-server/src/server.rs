//! HTTP server implementation using Axum.

use crate::error::ApiResult;
use crate::handlers::{admin, auth, docs, handle_health, messages, threads, users};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use threads_core::{Argon2Hasher, JwtAuth, Settings, Store};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    pub store: Store,
    pub jwt: JwtAuth,
    pub hasher: Argon2Hasher,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Store, settings: Settings) -> Self {
        let jwt = JwtAuth::new(
            settings.secret_key.as_bytes(),
            settings.access_token_lifetime,
            settings.refresh_token_lifetime,
        );
        Self {
            store,
            jwt,
            hasher: Argon2Hasher::new(),
            settings,
        }
    }

    /// Run store work on the blocking pool.
    ///
    /// Every store call holds the connection mutex and does synchronous
    /// SQLite IO, so handlers go through here instead of calling the
    /// services on a runtime worker.
    pub async fn run_blocking<T, F>(self: &Arc<Self>, f: F) -> ApiResult<T>
    where
        F: FnOnce(&AppState) -> threads_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        Ok(tokio::task::spawn_blocking(move || f(&state)).await??)
    }
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Token endpoints
        .route("/auth/token/", post(auth::obtain_token))
        .route("/auth/token/refresh/", post(auth::refresh_token))
        // Thread endpoints
        .route(
            "/threads/",
            get(threads::list_threads).post(threads::create_thread),
        )
        .route("/threads/:pk/", axum::routing::delete(threads::delete_thread))
        // Messages in thread endpoints
        .route(
            "/threads/:thread_id/messages/",
            get(messages::list_messages)
                .post(messages::create_message)
                .patch(messages::mark_all_read),
        )
        .route(
            "/threads/:thread_id/messages/:pk/",
            patch(messages::mark_message_read),
        )
        // User specific endpoints
        .route("/users/:user_id/threads/", get(users::user_threads))
        .route(
            "/users/:user_id/unread-messages-count/",
            get(users::unread_messages_count),
        )
        // Staff actions
        .route("/admin/messages/read-flag/", post(admin::set_read_flag))
        // API documentation
        .route("/schema/", get(docs::openapi_json))
        .route("/swagger/", get(docs::swagger_ui))
}

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .nest(threads_core::config::AppConfig::API_PREFIX, api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, draining connections");
}

/// Start the HTTP server.
///
/// Returns the actual bound address (useful when port=0) and the task that
/// runs the server until Ctrl-C.
pub async fn start_server(
    state: Arc<AppState>,
    host: &str,
    port: u16,
) -> anyhow::Result<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    Ok((actual_addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use threads_core::ThreadsError;

    fn test_state() -> Arc<AppState> {
        let settings = Settings {
            secret_key: "test-secret".into(),
            ..Settings::default()
        };
        Arc::new(AppState::new(Store::open_in_memory().unwrap(), settings))
    }

    #[tokio::test]
    async fn test_run_blocking_returns_store_results() {
        let state = test_state();

        let exists = state
            .run_blocking(|state| state.store.user_exists(1))
            .await
            .unwrap();
        assert!(!exists);

        let err = state
            .run_blocking(|state| {
                state.store.thread_exists(7)?;
                Err::<(), _>(ThreadsError::ThreadNotFound { thread_id: 7 })
            })
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_server_starts() {
        let state = test_state();

        let (addr, handle) = start_server(state, "127.0.0.1", 0).await.unwrap();
        assert!(addr.port() > 0);
        handle.abort();
    }
}
