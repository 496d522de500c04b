mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use errors::HttpError;
pub use middleware::SESSION_COOKIE;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let protected = Router::new()
        .route("/usage", post(handlers::submit_usage))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_identity,
        ));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    Router::new().nest("/api", api).with_state(state)
}
