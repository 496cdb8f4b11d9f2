use axum::{routing::{get, post}, Router};
use crate::state::AppState;
use crate::handlers::draft::{create_draft, delete_draft, get_draft, list_drafts, promote_draft, update_draft};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offer-drafts", post(create_draft).get(list_drafts))
        .route(
            "/offer-drafts/{draft_no}",
            get(get_draft).patch(update_draft).delete(delete_draft),
        )
        .route("/offer-drafts/{draft_no}/promote", post(promote_draft))
}
