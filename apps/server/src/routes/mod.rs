pub mod tree;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tree", get(tree::get_forest).post(tree::create_node).delete(tree::delete_all))
        .route("/api/tree/move", post(tree::move_node))
        .route("/api/tree/clone", post(tree::clone_node))
        .route("/api/tree/bulk", post(tree::bulk_load))
        .with_state(state)
}
