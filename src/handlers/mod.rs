pub mod category_handlers;

pub use category_handlers::*;

use axum::response::Json;
use serde_json::{json, Value};

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Successfully running...", "status": "good" }))
}
