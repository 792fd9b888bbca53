use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    api::middleware::AppState,
    models::TenantSelector,
    services::load_templates,
};

/// GET /api/diagnostics/template-schema - Which column layout the live
/// template table currently accepts
///
/// Probes with a global-only read and reports the detected layout, the SQL
/// equivalent of the query issued, and the explained error when even the
/// fallback layout failed. Operators use this while a migration is rolling
/// out.
pub async fn template_schema_report(State(state): State<AppState>) -> Json<Value> {
    let load = load_templates(state.store.as_ref(), &TenantSelector::GlobalOnly).await;

    Json(json!({
        "mode": load.mode,
        "reachable": load.error.is_none(),
        "row_count": load.rows.len(),
        "last_sql": load.last_sql,
        "error": load.error,
    }))
}
