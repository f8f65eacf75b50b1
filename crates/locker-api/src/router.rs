use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{gifts, lockers, owner};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/lockers", post(lockers::create_locker))
        .route("/api/lockers/{slug}", get(lockers::get_locker))
        .route("/api/lockers/{slug}/mine", get(lockers::my_locker))
        .route("/api/lockers/{slug}/gifts", post(gifts::send_gift))
        .route("/api/owner/{token}", get(owner::get_owner_locker))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
