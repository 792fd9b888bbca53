use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    api::middleware::{Actor, ApiError, ApiResult, AppState},
    datasource::Filter,
    models::{SaveOutcome, TemplateEdit, TemplateForm, TemplateLoad, TenantSelector},
    services::{
        apply_template_update, extract_placeholders, load_templates, save_template,
        TEMPLATES_TABLE,
    },
};

#[derive(Debug, Deserialize)]
pub struct TemplateListQuery {
    /// Club whose templates to load, unioned with the global defaults.
    pub club: Option<String>,
    /// When set, load only the global defaults and skip the missing-club
    /// warning.
    #[serde(default)]
    pub global_only: bool,
}

/// GET /api/templates - List templates for a club plus the global defaults
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateListQuery>,
) -> Json<TemplateLoad> {
    let selector = if params.global_only {
        TenantSelector::GlobalOnly
    } else {
        TenantSelector::from_club_id(params.club.as_deref())
    };

    Json(load_templates(state.store.as_ref(), &selector).await)
}

/// POST /api/templates - Create or update a template against the live layout
///
/// Always answers 200 with an `ok` flag; failures carry the explained error
/// for the dashboard to render.
pub async fn save_template_handler(
    State(state): State<AppState>,
    Json(form): Json<TemplateForm>,
) -> Json<Value> {
    let body = match save_template(state.store.as_ref(), &form).await {
        SaveOutcome::Saved(saved) => json!({
            "ok": true,
            "id": saved.id,
            "mode": saved.mode,
            "action": saved.action,
        }),
        SaveOutcome::Failed(failure) => json!({
            "ok": false,
            "mode": failure.mode,
            "error": failure.error,
        }),
    };
    Json(body)
}

/// PUT /api/templates/:id - Strict editor update with audit stamps
pub async fn edit_template(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(template_id): Path<String>,
    Json(edit): Json<TemplateEdit>,
) -> ApiResult<Json<Value>> {
    let row =
        apply_template_update(state.store.as_ref(), &template_id, &edit, actor.0.as_deref())
            .await?;
    Ok(Json(row))
}

/// DELETE /api/templates/:id - Deletes go straight to the data source
pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .store
        .delete_rows(TEMPLATES_TABLE, &Filter::Eq("id", template_id))
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to delete template: {}", e.message)))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PlaceholderPreviewRequest {
    pub subject: String,
    pub html: String,
}

/// POST /api/templates/placeholders - Editor preview of the {{tokens}} a
/// draft references
pub async fn preview_placeholders(
    Json(req): Json<PlaceholderPreviewRequest>,
) -> Json<Value> {
    let placeholders = extract_placeholders(&[&req.subject, &req.html]);
    Json(json!({ "placeholders": placeholders }))
}
