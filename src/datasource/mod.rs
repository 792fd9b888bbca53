pub mod postgrest;

pub use postgrest::PostgrestClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error body returned by the hosted data platform (PostgREST conventions).
///
/// `code` carries whatever the platform reported: usually a Postgres error
/// code such as `42703`, but the HTTP status code (as a string) when the
/// response body had none. Both signals flow through this one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

/// Normalized error shape rendered by the dashboard for triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainedError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn numeric_code(error: &SourceError) -> Option<u16> {
    error
        .code
        .as_deref()
        .and_then(|code| code.trim().parse::<u16>().ok())
}

/// Decide whether a failure means "the query referenced a column the live
/// schema does not have" as opposed to any other problem.
///
/// The platform has no structured "unknown column" error kind, so this keys
/// on status codes 400/406 and on the error message text. Known fragility:
/// the signature is specific to this platform's error conventions.
pub fn is_missing_column_error(error: Option<&SourceError>) -> bool {
    let Some(error) = error else {
        return false;
    };
    if matches!(numeric_code(error), Some(400) | Some(406)) {
        return true;
    }
    let message = error.message.to_lowercase();
    message.contains("column") && message.contains("does not exist")
}

/// Map a raw platform error into the display shape. Pure.
pub fn explain_source_error(error: Option<&SourceError>) -> ExplainedError {
    match error {
        Some(error) => ExplainedError {
            status: numeric_code(error),
            message: if error.message.is_empty() {
                "Unknown error".to_string()
            } else {
                error.message.clone()
            },
            details: error.details.clone(),
            hint: error.hint.clone(),
        },
        None => ExplainedError {
            status: None,
            message: "Unknown error".to_string(),
            details: None,
            hint: None,
        },
    }
}

/// A data-source failure, classified once at the boundary so downstream code
/// never re-inspects raw codes.
#[derive(Debug, Clone)]
pub enum SourceFailure {
    /// The live schema does not have a column the query referenced.
    SchemaMismatch(SourceError),
    /// Anything else: permissions, constraints, transport.
    Other(SourceError),
}

pub fn classify_failure(error: SourceError) -> SourceFailure {
    if is_missing_column_error(Some(&error)) {
        SourceFailure::SchemaMismatch(error)
    } else {
        SourceFailure::Other(error)
    }
}

/// Copy only whitelisted keys that are actually present on the input.
///
/// JSON `null` is a present value and survives; absent keys are dropped.
/// Every write payload goes through this, so a candidate object may carry
/// every conceptually relevant field and still produce a payload the live
/// column set accepts. Never introduces keys or default values.
pub fn pick(source: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    let mut out = Map::new();
    for key in allowed {
        if let Some(value) = source.get(*key) {
            out.insert((*key).to_string(), value.clone());
        }
    }
    out
}

/// Escape a value for a double-quoted platform filter string.
fn quote_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Row predicate, rendered both as platform query parameters and as the SQL
/// text shown to operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    Eq(&'static str, String),
    IsNull(&'static str),
    /// Disjunction of the listed predicates.
    AnyOf(Vec<Filter>),
}

impl Filter {
    /// Render as platform query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        match self {
            Filter::All => Vec::new(),
            Filter::Eq(column, value) => {
                vec![((*column).to_string(), format!("eq.{}", value))]
            }
            Filter::IsNull(column) => vec![((*column).to_string(), "is.null".to_string())],
            Filter::AnyOf(branches) => {
                let inner: Vec<String> = branches.iter().map(Filter::to_disjunct).collect();
                vec![("or".to_string(), format!("({})", inner.join(",")))]
            }
        }
    }

    fn to_disjunct(&self) -> String {
        match self {
            Filter::All => "and()".to_string(),
            // Inside an or=() expression the platform treats `,`, `(` and `)`
            // as syntax; values are double-quoted so they survive intact.
            Filter::Eq(column, value) => format!("{}.eq.\"{}\"", column, quote_escape(value)),
            Filter::IsNull(column) => format!("{}.is.null", column),
            Filter::AnyOf(branches) => {
                let inner: Vec<String> = branches.iter().map(Filter::to_disjunct).collect();
                format!("or({})", inner.join(","))
            }
        }
    }

    /// Display-only SQL reconstruction for diagnostics. Not executed.
    pub fn to_sql(&self) -> String {
        match self {
            Filter::All => "TRUE".to_string(),
            Filter::Eq(column, value) => {
                format!("{} = '{}'", column, value.replace('\'', "''"))
            }
            Filter::IsNull(column) => format!("{} IS NULL", column),
            Filter::AnyOf(branches) => {
                let parts: Vec<String> = branches.iter().map(Filter::to_sql).collect();
                parts.join(" OR ")
            }
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
    pub nulls_first: bool,
}

impl OrderBy {
    pub fn asc_nulls_first(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
            nulls_first: true,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
            nulls_first: false,
        }
    }
}

/// Render an ordering as a platform `order=` parameter value.
pub fn order_query(order: &[OrderBy]) -> String {
    order
        .iter()
        .map(|term| {
            let mut rendered = format!(
                "{}.{}",
                term.column,
                if term.descending { "desc" } else { "asc" }
            );
            if term.nulls_first {
                rendered.push_str(".nullsfirst");
            }
            rendered
        })
        .collect::<Vec<String>>()
        .join(",")
}

/// Render an ordering as SQL text for diagnostics.
pub fn order_sql(order: &[OrderBy]) -> String {
    order
        .iter()
        .map(|term| {
            let mut rendered = format!(
                "{} {}",
                term.column,
                if term.descending { "DESC" } else { "ASC" }
            );
            if term.nulls_first {
                rendered.push_str(" NULLS FIRST");
            }
            rendered
        })
        .collect::<Vec<String>>()
        .join(", ")
}

/// Minimal surface of the hosted data platform the services rely on.
///
/// Implemented by [`PostgrestClient`] in production and by scripted fakes in
/// tests. Rows travel as raw JSON objects because the live column set is not
/// known until a query answers.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn select_rows(
        &self,
        table: &str,
        columns: &str,
        filter: &Filter,
        order: &[OrderBy],
    ) -> Result<Vec<Value>, SourceError>;

    async fn insert_row(&self, table: &str, payload: Value) -> Result<Vec<Value>, SourceError>;

    async fn update_rows(
        &self,
        table: &str,
        payload: Value,
        filter: &Filter,
    ) -> Result<Vec<Value>, SourceError>;

    async fn delete_rows(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, SourceError>;
}
