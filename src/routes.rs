use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth, handlers, AppState};

pub fn authentication_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::handlers::register_handler))
        .route("/verify-email", post(auth::handlers::verify_email_handler))
        .route("/login", post(auth::handlers::login_handler))
        .route("/logout", post(auth::handlers::logout_handler))
        .route("/me", get(auth::handlers::me_handler))
}

pub fn question_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories_handler).post(handlers::create_category_handler),
        )
        .route(
            "/categories/bulk",
            post(handlers::create_categories_bulk_handler),
        )
        .route("/categories/{id}", patch(handlers::update_category_handler))
        .route(
            "/categories/{id}/questions",
            get(handlers::list_questions_handler).post(handlers::create_question_handler),
        )
        .route(
            "/categories/{id}/questions/bulk",
            post(handlers::create_questions_bulk_handler),
        )
        .route("/questions/{id}", patch(handlers::update_question_handler))
}

/// The full application router with request tracing applied.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/authentication", authentication_routes())
        .nest("/question", question_routes());

    Router::new()
        .route("/", get(handlers::root_handler))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
