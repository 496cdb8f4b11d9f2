use axum::{routing::get, Router};
use crate::state::AppState;
use crate::handlers::offer::{delete_offer, get_offer, list_offers, update_offer};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers))
        .route("/offers/{id}", get(get_offer).patch(update_offer).delete(delete_offer))
}
