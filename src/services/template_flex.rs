use crate::datasource::{
    explain_source_error, is_missing_column_error, order_sql, DataSource, Filter, OrderBy,
};
use crate::models::{EmailTemplate, SchemaModeName, TemplateLoad, TemplateScope, TenantSelector};
use regex::Regex;
use serde_json::Value;

pub const TEMPLATES_TABLE: &str = "email_templates";

/// Warning attached to a load when the caller passed no usable club id.
pub const EMPTY_TENANT_WARNING: &str =
    "Tenant ID est vide ou invalide. Chargement des templates globaux uniquement.";

/// Column layout descriptor for one generation of the template table.
pub struct SchemaMode {
    pub name: SchemaModeName,
    /// Projection for reads.
    pub select_columns: &'static str,
    /// Column holding the "last touched" timestamp in this layout.
    pub touched_column: &'static str,
    /// Column holding the template key.
    pub key_column: &'static str,
    /// Column holding the HTML body.
    pub html_column: &'static str,
}

/// Probe order for the two layouts. Detection runs fresh on every call: a
/// migration can land between two requests, so remembering the last answer
/// would fail exactly when it matters.
pub const SCHEMA_MODES: [SchemaMode; 2] = [
    SchemaMode {
        name: SchemaModeName::A,
        select_columns: "id,tenant_id,key,subject,html,created_at",
        touched_column: "created_at",
        key_column: "key",
        html_column: "html",
    },
    SchemaMode {
        name: SchemaModeName::B,
        select_columns: "id,tenant_id,type,subject,html_body,updated_at",
        touched_column: "updated_at",
        key_column: "type",
        html_column: "html_body",
    },
];

/// String value of a field, accepting numbers for ids that come back numeric.
pub(crate) fn text_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Map a raw row from either column layout into the canonical record.
///
/// Tolerates rows from both layouts and never invents an id: a row without
/// one stays without one.
pub fn normalize_row(row: &Value) -> EmailTemplate {
    let tenant_id = text_field(row, "tenant_id").filter(|id| !id.is_empty());
    let scope = if tenant_id.is_some() {
        TemplateScope::Tenant
    } else {
        TemplateScope::Global
    };

    let placeholders = row.get("placeholders").and_then(Value::as_array).map(|values| {
        values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    });

    EmailTemplate {
        id: text_field(row, "id"),
        tenant_id,
        scope,
        key: text_field(row, "key")
            .or_else(|| text_field(row, "type"))
            .unwrap_or_else(|| "unknown".to_string()),
        subject: text_field(row, "subject").unwrap_or_default(),
        html: text_field(row, "html")
            .or_else(|| text_field(row, "html_body"))
            .unwrap_or_default(),
        text_body: text_field(row, "text_body"),
        placeholders,
        is_active: row.get("is_active").and_then(Value::as_bool),
        updated_at: text_field(row, "updated_at").or_else(|| text_field(row, "created_at")),
        created_at: text_field(row, "created_at"),
    }
}

/// Row predicate for a tenant selector.
///
/// Global templates are always unioned alongside a club's own rows, never
/// replaced by them.
pub fn tenant_filter(selector: &TenantSelector) -> Filter {
    match selector {
        TenantSelector::Club(id) => Filter::AnyOf(vec![
            Filter::IsNull("tenant_id"),
            Filter::Eq("tenant_id", id.clone()),
        ]),
        TenantSelector::Unspecified | TenantSelector::GlobalOnly => Filter::IsNull("tenant_id"),
    }
}

/// SQL text equivalent to the query about to be issued. Display only.
fn describe_query(mode: &SchemaMode, filter: &Filter, order: &[OrderBy]) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {}",
        mode.select_columns.replace(',', ", "),
        TEMPLATES_TABLE,
        filter.to_sql(),
        order_sql(order),
    )
}

/// Load templates for a club (plus the global defaults), probing which column
/// layout the live table currently accepts.
///
/// Tries the first layout's projection; on a missing-column error retries
/// once with the second. Any other failure is terminal for that call, and so
/// is any failure on the last layout. All failures come back as data so the
/// dashboard can render them; this function does not return `Err`.
pub async fn load_templates(store: &dyn DataSource, selector: &TenantSelector) -> TemplateLoad {
    let warning = match selector {
        TenantSelector::Unspecified => {
            tracing::warn!("template load without a club id, serving global templates only");
            Some(EMPTY_TENANT_WARNING.to_string())
        }
        _ => None,
    };

    let filter = tenant_filter(selector);

    let mut attempt = 0;
    loop {
        let mode = &SCHEMA_MODES[attempt];
        let order = [
            OrderBy::asc_nulls_first("tenant_id"),
            OrderBy::desc(mode.touched_column),
        ];
        let last_sql = describe_query(mode, &filter, &order);

        match store
            .select_rows(TEMPLATES_TABLE, mode.select_columns, &filter, &order)
            .await
        {
            Ok(rows) => {
                tracing::debug!(mode = ?mode.name, rows = rows.len(), "templates loaded");
                return TemplateLoad {
                    mode: mode.name,
                    rows: rows.iter().map(normalize_row).collect(),
                    last_sql,
                    error: None,
                    warning,
                };
            }
            Err(error) => {
                if is_missing_column_error(Some(&error)) && attempt + 1 < SCHEMA_MODES.len() {
                    tracing::info!(
                        mode = ?mode.name,
                        "column layout mismatch, retrying with the next layout"
                    );
                    attempt += 1;
                    continue;
                }
                tracing::error!(mode = ?mode.name, message = %error.message, "template load failed");
                return TemplateLoad {
                    mode: mode.name,
                    rows: Vec::new(),
                    last_sql,
                    error: Some(explain_source_error(Some(&error))),
                    warning,
                };
            }
        }
    }
}

/// Collect `{{token}}` names from template parts, each reported once in
/// first-seen order. Tolerates whitespace inside the braces.
pub fn extract_placeholders(parts: &[&str]) -> Vec<String> {
    let re = Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap();
    let mut names: Vec<String> = Vec::new();
    for part in parts {
        for cap in re.captures_iter(part) {
            let name = cap[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
