//! API route configuration.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, link_info_handler, list_links_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get},
};

/// Link management routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /links`          - Create a short link
/// - `GET    /links`          - List links (offset/count)
/// - `DELETE /links/{id}`     - Delete a link by id
/// - `GET    /stats/{code}`   - Link details and access count
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/links",
            get(list_links_handler).post(create_link_handler),
        )
        .route("/links/{id}", delete(delete_link_handler))
        .route("/stats/{code}", get(link_info_handler))
}
