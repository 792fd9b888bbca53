use super::{order_query, DataSource, Filter, OrderBy, SourceError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// REST client for the hosted data platform.
///
/// Speaks the platform's PostgREST dialect: filters and ordering as query
/// parameters, writes echoed back with `Prefer: return=representation`.
/// Timeouts and TLS come from the underlying HTTP client; nothing here
/// retries on its own.
pub struct PostgrestClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        // 30-second timeout on every request
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn read_rows(response: Response) -> Result<Vec<Value>, SourceError> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(parse_error_body(status, &body));
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(SourceError {
                code: None,
                message: format!("Unparseable response body: {}", e),
                details: Some(truncate_body(&body)),
                hint: None,
            }),
        }
    }
}

fn transport_error(e: reqwest::Error) -> SourceError {
    // Timeouts, refused connections and DNS failures all land here; callers
    // treat them like any other data-source error.
    SourceError::new(format!("Network error: {}", e))
}

fn parse_error_body(status: StatusCode, body: &str) -> SourceError {
    let mut error = serde_json::from_str::<SourceError>(body).unwrap_or_else(|_| {
        SourceError {
            code: None,
            message: truncate_body(body),
            details: None,
            hint: None,
        }
    });

    if error.message.is_empty() {
        error.message = format!("HTTP {}", status.as_u16());
    }
    // When the body carried no code, the HTTP status stands in for it
    if error.code.is_none() {
        error.code = Some(status.as_u16().to_string());
    }

    error
}

fn truncate_body(body: &str) -> String {
    // Cut on a character boundary, not a byte offset
    match body.char_indices().nth(500) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[async_trait]
impl DataSource for PostgrestClient {
    async fn select_rows(
        &self,
        table: &str,
        columns: &str,
        filter: &Filter,
        order: &[OrderBy],
    ) -> Result<Vec<Value>, SourceError> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), columns.to_string())];
        query.extend(filter.to_query());
        if !order.is_empty() {
            query.push(("order".to_string(), order_query(order)));
        }

        let response = self
            .authed(self.http.get(self.table_url(table)))
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read_rows(response).await
    }

    async fn insert_row(&self, table: &str, payload: Value) -> Result<Vec<Value>, SourceError> {
        let response = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read_rows(response).await
    }

    async fn update_rows(
        &self,
        table: &str,
        payload: Value,
        filter: &Filter,
    ) -> Result<Vec<Value>, SourceError> {
        let response = self
            .authed(self.http.patch(self.table_url(table)))
            .query(&filter.to_query())
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        Self::read_rows(response).await
    }

    async fn delete_rows(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, SourceError> {
        let response = self
            .authed(self.http.delete(self.table_url(table)))
            .query(&filter.to_query())
            .send()
            .await
            .map_err(transport_error)?;

        Self::read_rows(response).await
    }
}
