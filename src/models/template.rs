use crate::datasource::ExplainedError;
use serde::{Deserialize, Serialize};

/// Whether a template applies to every club or to a single one.
///
/// Derived, never stored: a row with no `tenant_id` is global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateScope {
    Global,
    Tenant,
}

/// Canonical template record, independent of which column layout produced it.
///
/// Only `key`, `subject`, `html` and the derived `scope` are guaranteed;
/// everything else depends on the layout the row came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: Option<String>,
    pub tenant_id: Option<String>,
    pub scope: TemplateScope,
    pub key: String,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Tenant scoping for template reads.
///
/// `Unspecified` and `GlobalOnly` issue the same global-only filter; only the
/// former is anomalous (the caller forgot to pass its club) and earns a
/// warning in the load result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantSelector {
    Unspecified,
    GlobalOnly,
    Club(String),
}

impl TenantSelector {
    /// Empty and whitespace-only ids count as missing.
    pub fn from_club_id(club_id: Option<&str>) -> Self {
        match club_id {
            Some(id) if !id.trim().is_empty() => TenantSelector::Club(id.to_string()),
            _ => TenantSelector::Unspecified,
        }
    }
}

/// The two column layouts the live template table may expose mid-migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaModeName {
    A,
    B,
}

/// Outcome of a template load: which layout answered, the normalized rows,
/// and the SQL text shown to operators. Failures are data, not errors.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateLoad {
    pub mode: SchemaModeName,
    pub rows: Vec<EmailTemplate>,
    pub last_sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExplainedError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Dashboard form for creating or updating a template.
///
/// Presence of `id` selects the update path.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateForm {
    pub id: Option<String>,
    pub tenant_id: Option<String>,
    pub key: String,
    pub subject: String,
    pub html: String,
    pub text_body: Option<String>,
}

/// Editor form for the strict single-row update path.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEdit {
    pub key: String,
    pub subject: String,
    pub html: String,
    pub text_body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAction {
    Insert,
    Update,
}

/// A successful save: what happened and under which column layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedTemplate {
    pub id: Option<String>,
    pub mode: SchemaModeName,
    pub action: SaveAction,
}

/// A failed save, with the layout that was being tried when it failed.
#[derive(Debug, Clone, Serialize)]
pub struct SaveFailure {
    pub mode: Option<SchemaModeName>,
    pub error: ExplainedError,
}

/// Result of [`crate::services::save_template`]. Never surfaced as `Err`.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(SavedTemplate),
    Failed(SaveFailure),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}
