#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value};
use sponsorhub::datasource::{DataSource, Filter, OrderBy, SourceError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded call against a fake store.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub op: &'static str,
    pub table: String,
    pub columns: Option<String>,
    pub payload: Option<Value>,
    pub filter_sql: String,
}

/// Fake data source that replays a queued script of results and records
/// every call for assertions.
pub struct ScriptedStore {
    script: Mutex<VecDeque<Result<Vec<Value>, SourceError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedStore {
    pub fn new(script: Vec<Result<Vec<Value>, SourceError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: RecordedCall) -> Result<Vec<Value>, SourceError> {
        self.calls.lock().unwrap().push(call);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("fake store received more calls than were scripted")
    }
}

#[async_trait]
impl DataSource for ScriptedStore {
    async fn select_rows(
        &self,
        table: &str,
        columns: &str,
        filter: &Filter,
        _order: &[OrderBy],
    ) -> Result<Vec<Value>, SourceError> {
        self.next(RecordedCall {
            op: "select",
            table: table.to_string(),
            columns: Some(columns.to_string()),
            payload: None,
            filter_sql: filter.to_sql(),
        })
    }

    async fn insert_row(&self, table: &str, payload: Value) -> Result<Vec<Value>, SourceError> {
        self.next(RecordedCall {
            op: "insert",
            table: table.to_string(),
            columns: None,
            payload: Some(payload),
            filter_sql: String::new(),
        })
    }

    async fn update_rows(
        &self,
        table: &str,
        payload: Value,
        filter: &Filter,
    ) -> Result<Vec<Value>, SourceError> {
        self.next(RecordedCall {
            op: "update",
            table: table.to_string(),
            columns: None,
            payload: Some(payload),
            filter_sql: filter.to_sql(),
        })
    }

    async fn delete_rows(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, SourceError> {
        self.next(RecordedCall {
            op: "delete",
            table: table.to_string(),
            columns: None,
            payload: None,
            filter_sql: filter.to_sql(),
        })
    }
}

/// The error signature the platform produces for an unknown column.
pub fn missing_column_error(column: &str) -> SourceError {
    SourceError {
        code: Some("42703".to_string()),
        message: format!("column email_templates.{} does not exist", column),
        details: None,
        hint: None,
    }
}

/// A denial that must never trigger the layout fallback.
pub fn permission_error() -> SourceError {
    SourceError {
        code: Some("403".to_string()),
        message: "permission denied for table email_templates".to_string(),
        details: Some("row-level security policy rejected the request".to_string()),
        hint: Some("check the acting role's grants".to_string()),
    }
}

/// Columns of a template table that is still on the `type`/`html_body`/
/// `updated_at` layout.
const MODE_B_COLUMNS: [&str; 7] = [
    "id",
    "tenant_id",
    "type",
    "subject",
    "html_body",
    "text_body",
    "updated_at",
];

/// In-memory backend whose template table only has the older column layout,
/// like a live environment the current migration has not reached yet.
pub struct ModeBStore {
    rows: Mutex<Vec<Map<String, Value>>>,
    next_id: Mutex<u32>,
}

impl ModeBStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }

    fn reject_unknown(keys: impl Iterator<Item = String>) -> Result<(), SourceError> {
        for key in keys {
            if !MODE_B_COLUMNS.contains(&key.as_str()) {
                return Err(missing_column_error(&key));
            }
        }
        Ok(())
    }

    fn matches(filter: &Filter, row: &Map<String, Value>) -> bool {
        match filter {
            Filter::All => true,
            Filter::Eq(column, value) => {
                row.get(*column).and_then(Value::as_str) == Some(value.as_str())
            }
            Filter::IsNull(column) => row.get(*column).map_or(true, Value::is_null),
            Filter::AnyOf(branches) => branches.iter().any(|b| Self::matches(b, row)),
        }
    }
}

#[async_trait]
impl DataSource for ModeBStore {
    async fn select_rows(
        &self,
        _table: &str,
        columns: &str,
        filter: &Filter,
        _order: &[OrderBy],
    ) -> Result<Vec<Value>, SourceError> {
        Self::reject_unknown(columns.split(',').map(|c| c.trim().to_string()))?;

        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| Self::matches(filter, row))
            .cloned()
            .map(Value::Object)
            .collect())
    }

    async fn insert_row(&self, _table: &str, payload: Value) -> Result<Vec<Value>, SourceError> {
        let mut fields = payload
            .as_object()
            .cloned()
            .ok_or_else(|| SourceError::new("payload must be an object"))?;
        Self::reject_unknown(fields.keys().cloned())?;

        if !fields.contains_key("id") {
            let mut next_id = self.next_id.lock().unwrap();
            fields.insert("id".to_string(), Value::String(format!("tpl-{}", *next_id)));
            *next_id += 1;
        }
        fields
            .entry("updated_at".to_string())
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

        self.rows.lock().unwrap().push(fields.clone());
        Ok(vec![Value::Object(fields)])
    }

    async fn update_rows(
        &self,
        _table: &str,
        payload: Value,
        filter: &Filter,
    ) -> Result<Vec<Value>, SourceError> {
        let changes = payload
            .as_object()
            .cloned()
            .ok_or_else(|| SourceError::new("payload must be an object"))?;
        Self::reject_unknown(changes.keys().cloned())?;

        let mut rows = self.rows.lock().unwrap();
        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if Self::matches(filter, row) {
                for (key, value) in &changes {
                    row.insert(key.clone(), value.clone());
                }
                updated.push(Value::Object(row.clone()));
            }
        }
        Ok(updated)
    }

    async fn delete_rows(&self, _table: &str, filter: &Filter) -> Result<Vec<Value>, SourceError> {
        let mut rows = self.rows.lock().unwrap();
        let removed: Vec<Value> = rows
            .iter()
            .filter(|row| Self::matches(filter, row))
            .cloned()
            .map(Value::Object)
            .collect();
        rows.retain(|row| !Self::matches(filter, row));
        Ok(removed)
    }
}
