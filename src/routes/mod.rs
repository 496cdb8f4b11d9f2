pub mod buyers;
pub mod drafts;
pub mod offers;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::middleware::auth::require_tenant;
use crate::state::AppState;

/// Every API route, behind the tenant middleware.
pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(drafts::routes())
        .merge(offers::routes())
        .merge(buyers::routes())
        .route_layer(middleware::from_fn_with_state(state, require_tenant))
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state.clone())
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
