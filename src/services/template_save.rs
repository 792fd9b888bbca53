use crate::datasource::{
    explain_source_error, is_missing_column_error, pick, DataSource, Filter,
};
use crate::models::{
    SaveAction, SaveFailure, SaveOutcome, SavedTemplate, TemplateEdit, TemplateForm,
};
use crate::services::template_flex::{text_field, SchemaMode, SCHEMA_MODES, TEMPLATES_TABLE};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Update payload for one column layout: subject plus the layout's own key
/// and body columns, nothing else.
fn update_payload(mode: &SchemaMode, form: &TemplateForm) -> Value {
    let mut raw = Map::new();
    raw.insert("subject".to_string(), json!(form.subject));
    raw.insert(mode.key_column.to_string(), json!(form.key));
    raw.insert(mode.html_column.to_string(), json!(form.html));

    let allowed = ["subject", mode.key_column, mode.html_column];
    Value::Object(pick(&raw, &allowed))
}

/// Insert payload: the update columns plus the tenant reference (`null` for a
/// global template) and, when the form carries one, the plain-text body.
fn insert_payload(mode: &SchemaMode, form: &TemplateForm) -> Value {
    let mut raw = Map::new();
    raw.insert("subject".to_string(), json!(form.subject));
    raw.insert(mode.key_column.to_string(), json!(form.key));
    raw.insert(mode.html_column.to_string(), json!(form.html));
    raw.insert("tenant_id".to_string(), json!(form.tenant_id));
    if let Some(text_body) = &form.text_body {
        raw.insert("text_body".to_string(), json!(text_body));
    }

    let mut allowed = vec!["subject", mode.key_column, mode.html_column, "tenant_id"];
    if form.text_body.is_some() {
        allowed.push("text_body");
    }
    Value::Object(pick(&raw, &allowed))
}

/// Save a template against whichever column layout the live table accepts.
///
/// Updates when the form carries an id, inserts otherwise. Each layout is
/// tried at most once; only a missing-column failure moves on to the next
/// one, and the last layout's failure is terminal whatever its kind. Never
/// returns through `Err`: the dashboard renders failures as data.
pub async fn save_template(store: &dyn DataSource, form: &TemplateForm) -> SaveOutcome {
    let action = if form.id.is_some() {
        SaveAction::Update
    } else {
        SaveAction::Insert
    };

    let mut attempt = 0;
    loop {
        let mode = &SCHEMA_MODES[attempt];

        let result = match &form.id {
            Some(id) => {
                store
                    .update_rows(
                        TEMPLATES_TABLE,
                        update_payload(mode, form),
                        &Filter::Eq("id", id.clone()),
                    )
                    .await
            }
            None => store.insert_row(TEMPLATES_TABLE, insert_payload(mode, form)).await,
        };

        match result {
            Ok(rows) => {
                let id = form
                    .id
                    .clone()
                    .or_else(|| rows.first().and_then(|row| text_field(row, "id")));
                tracing::info!(mode = ?mode.name, action = ?action, key = %form.key, "template saved");
                return SaveOutcome::Saved(SavedTemplate {
                    id,
                    mode: mode.name,
                    action,
                });
            }
            Err(error) => {
                if is_missing_column_error(Some(&error)) && attempt + 1 < SCHEMA_MODES.len() {
                    tracing::info!(
                        mode = ?mode.name,
                        action = ?action,
                        "column layout mismatch, retrying with the next layout"
                    );
                    attempt += 1;
                    continue;
                }
                tracing::error!(mode = ?mode.name, message = %error.message, "template save failed");
                return SaveOutcome::Failed(SaveFailure {
                    mode: Some(mode.name),
                    error: explain_source_error(Some(&error)),
                });
            }
        }
    }
}

/// Structured failure from [`apply_template_update`]; editor forms render
/// every field of it, including the column names that were actually sent.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct TemplateWriteError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub sent_keys: Vec<String>,
}

impl TemplateWriteError {
    fn bare(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
            details: None,
            hint: None,
            sent_keys: Vec::new(),
        }
    }
}

/// Columns the editor entry point is allowed to touch.
const EDIT_COLUMNS: [&str; 6] = [
    "subject",
    "key",
    "html",
    "text_body",
    "updated_at",
    "updated_by",
];

/// Apply an editor's changes to one template, stamping the audit columns.
///
/// Expects the current column layout and does not probe. An update the
/// platform accepts but that matches no row is reported as blocked (an
/// access policy swallowing the write) rather than treated as success. The
/// `actor` is whoever the session resolved, `None` when it could not.
pub async fn apply_template_update(
    store: &dyn DataSource,
    template_id: &str,
    edit: &TemplateEdit,
    actor: Option<&str>,
) -> Result<Value, TemplateWriteError> {
    if template_id.trim().is_empty() {
        return Err(TemplateWriteError::bare("Template id is required"));
    }

    let mut raw = Map::new();
    raw.insert("subject".to_string(), json!(edit.subject));
    raw.insert("key".to_string(), json!(edit.key));
    raw.insert("html".to_string(), json!(edit.html));
    if let Some(text_body) = &edit.text_body {
        raw.insert("text_body".to_string(), json!(text_body));
    }
    raw.insert("updated_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    raw.insert("updated_by".to_string(), json!(actor));

    let payload = pick(&raw, &EDIT_COLUMNS);
    let sent_keys: Vec<String> = payload.keys().cloned().collect();

    let rows = store
        .update_rows(
            TEMPLATES_TABLE,
            Value::Object(payload),
            &Filter::Eq("id", template_id.to_string()),
        )
        .await
        .map_err(|error| {
            tracing::error!(template_id, message = %error.message, "template update rejected");
            let explained = explain_source_error(Some(&error));
            TemplateWriteError {
                message: explained.message,
                status: explained.status,
                code: error.code,
                details: error.details,
                hint: error.hint,
                sent_keys: sent_keys.clone(),
            }
        })?;

    match rows.into_iter().next() {
        Some(row) => Ok(row),
        None => {
            tracing::warn!(template_id, "template update matched no rows");
            Err(TemplateWriteError {
                message: "Update matched no rows; likely blocked by a row-level security policy"
                    .to_string(),
                status: None,
                code: None,
                details: None,
                hint: Some("Check that the acting role may update email_templates".to_string()),
                sent_keys,
            })
        }
    }
}
