/// HTTP router
use crate::{api, state::AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the application router
pub fn create_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/all_records", get(api::records::all_records))
        .route("/get_user/:id", get(api::records::get_user))
        .route("/list_users", get(api::records::list_users))
        .route("/ban_user/:target", put(api::records::ban_user))
        .route("/create_user/:name", post(api::records::create_user));

    Router::new()
        .route("/", get(api::health::index))
        .route("/health", get(api::health::health))
        .route("/update_server", post(api::webhook::update_server))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
