pub mod diagnostics;
pub mod middleware;
pub mod responses;
pub mod templates;

pub use middleware::*;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router: dashboard routes behind the admin bearer
/// guard, the sponsor-response flow public.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/api/templates",
            get(templates::list_templates).post(templates::save_template_handler),
        )
        .route(
            "/api/templates/placeholders",
            post(templates::preview_placeholders),
        )
        .route(
            "/api/templates/:id",
            put(templates::edit_template).delete(templates::delete_template),
        )
        .route(
            "/api/diagnostics/template-schema",
            get(diagnostics::template_schema_report),
        )
        .route("/api/campaigns/:id/sponsors", post(responses::create_sponsor))
        .layer(from_fn_with_state(state.clone(), middleware::require_admin));

    let public = Router::new().route(
        "/api/sponsor-responses/:token",
        get(responses::get_invite).post(responses::submit_response),
    );

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
