use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use crate::auth::resolve_tenant;
use crate::state::AppState;

/// Resolves the tenant from the bearer credential and attaches it as a `TenantContext` extension.
pub async fn require_tenant(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let tenant = match resolve_tenant(authorization, &state.jwt_secret) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected request without a resolvable tenant");
            return e.into_response();
        }
    };

    req.extensions_mut().insert(tenant);

    next.run(req).await
}
