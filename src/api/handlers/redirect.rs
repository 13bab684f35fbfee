//! Handler for short link redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// The access is counted in the background: the redirect is sent as soon as
/// the lookup succeeds and does not wait for the increment.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.link_service.resolve(&code).await?;

    debug!(link_id = resolution.link_id, code = %code, "Redirecting");

    Ok(Redirect::temporary(&resolution.target))
}
