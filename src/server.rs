use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
};

use crate::{Res, api, config::Config, types::AuthState};

/// State handed to the callback handler.
#[derive(Clone)]
pub struct CallbackContext {
    pub auth_state: Arc<Mutex<Option<AuthState>>>,
    pub config: Arc<Config>,
}

/// Binds the listener for the authorization redirect.
///
/// # Errors
///
/// Fails if the address is in use or not available on this machine.
pub async fn bind_callback_listener(addr: SocketAddr) -> Res<TcpListener> {
    Ok(TcpListener::bind(addr).await?)
}

/// Routes `GET <callback_path>` to the OAuth callback and `GET /health` to
/// the health check.
pub fn callback_router(callback_path: &str, context: CallbackContext) -> Router {
    let router = Router::new().route(callback_path, get(api::callback));

    let router = if callback_path == "/health" {
        router
    } else {
        router.route("/health", get(api::health))
    };

    router.layer(Extension(context))
}

/// Serves until `shutdown` fires or its sender is dropped.
pub async fn serve(listener: TcpListener, router: Router, shutdown: oneshot::Receiver<()>) -> Res<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await?;
    Ok(())
}
