use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all Ent endpoints.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::HEAD])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ORIGIN,
        ]);

    Router::new()
        .route("/", get(handler::list_buckets))
        .route("/:bucket", get(handler::list_files))
        .route(
            "/:bucket/*key",
            get(handler::get_file)
                .head(handler::head_file)
                .post(handler::create_file)
                .delete(handler::delete_file),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
