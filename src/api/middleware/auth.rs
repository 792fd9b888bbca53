use crate::api::middleware::error::ApiError;
use crate::datasource::DataSource;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataSource>,
    pub admin_token: String,
}

/// Acting dashboard user for audit stamps, resolved best-effort from the
/// request. `None` when the dashboard did not identify one.
#[derive(Debug, Clone)]
pub struct Actor(pub Option<String>);

/// Guard for dashboard routes: requires the configured admin bearer token.
///
/// The dashboard may also pass the acting admin's id in `X-Actor-Id`, which
/// ends up in the templates' `updated_by` audit column.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    match provided {
        Some(token) if token == state.admin_token => {
            let actor = request
                .headers()
                .get("X-Actor-Id")
                .and_then(|h| h.to_str().ok())
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            request.extensions_mut().insert(Actor(actor));
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!("rejected request with missing or invalid admin token");
            Err(ApiError::Unauthorized)
        }
    }
}
