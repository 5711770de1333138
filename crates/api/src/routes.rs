use crate::handlers;
use crate::middleware::require_api_key;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/config/reload", post(handlers::reload_config))
        .route(
            "/results",
            get(handlers::get_results).post(handlers::push_results),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .with_state(state)
}
