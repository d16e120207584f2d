use axum::Json;
use axum::extract::State;
use tracker_core::Catalog;

use crate::state::AppState;

/// GET /api/syllabi
///
/// The whole catalog as `{exam: {subject: [topic, ..]}}` in catalog order.
pub async fn list_syllabi(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.services.catalog().as_ref().clone())
}
