use axum::{routing::{get, post}, Router};
use crate::state::AppState;
use crate::handlers::buyer::{create_buyer, delete_buyer, get_buyer, list_buyers};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/buyers", post(create_buyer).get(list_buyers))
        .route("/buyers/{id}", get(get_buyer).delete(delete_buyer))
}
