//! Remote collection fetcher
//!
//! `ApiClient` turns named backend resources into records. It owns the
//! status/body interpretation (error extraction, JSON parsing, CSRF header)
//! and leaves the wire to a `Transport`, so controllers can be exercised with
//! a scripted transport and no network.

use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::future::Future;

use crate::error::{PortalError, Result};
use crate::record::Record;

pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// State-changing methods carry the CSRF token.
    pub fn is_mutation(self) -> bool {
        !matches!(self, HttpMethod::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as the client wants it sent, before any transport sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, params: &[(&str, String)]) -> Self {
        self.query
            .extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path plus URL-encoded query string.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// Status and raw body of an answered request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The wire. An `Err` means the request never produced a response.
pub trait Transport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = std::result::Result<RawResponse, String>> + Send;
}

/// Client for the portal backend
pub struct ApiClient<T> {
    transport: T,
    csrf_token: Option<String>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        ApiClient {
            transport,
            csrf_token: None,
        }
    }

    /// Attach a CSRF token to every state-changing request.
    ///
    /// `None` leaves the header off entirely; the server decides whether that
    /// is acceptable.
    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a full collection
    ///
    /// Accepts a bare array, or an object wrapping the array under
    /// `submissions` or `data`. Anything else is a parse failure.
    ///
    /// # Arguments
    /// * `path` - Resource path such as `/api/groups`
    /// * `params` - Query parameters (filter/sort hints)
    ///
    /// # Errors
    /// * `Network` when no response arrived
    /// * `Http` for non-2xx statuses or a 2xx body carrying `error`
    /// * `Parse` when the body is not JSON of the expected shape
    pub async fn fetch_collection(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Record>> {
        let request = ApiRequest::new(HttpMethod::Get, path).with_query(params);
        let value = self.execute(request).await?.ok_or(PortalError::Parse)?;

        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map
                .remove("submissions")
                .or_else(|| map.remove("data"))
            {
                Some(Value::Array(items)) => items,
                _ => return Err(PortalError::Parse),
            },
            _ => return Err(PortalError::Parse),
        };

        Ok(items.into_iter().map(Record::from_value).collect())
    }

    /// Fetch a single object (group detail, dashboard statistics).
    pub async fn fetch_record(&self, path: &str, params: &[(&str, String)]) -> Result<Record> {
        let request = ApiRequest::new(HttpMethod::Get, path).with_query(params);
        match self.execute(request).await? {
            Some(value @ Value::Object(_)) => Ok(Record::from_value(value)),
            _ => Err(PortalError::Parse),
        }
    }

    /// Issue a create/update/delete/reorder request
    ///
    /// Returns the decoded success body, or `None` for an empty one (204).
    pub async fn mutate(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.execute(request).await
    }

    async fn execute(&self, mut request: ApiRequest) -> Result<Option<Value>> {
        if request.method.is_mutation() {
            if let Some(token) = &self.csrf_token {
                request
                    .headers
                    .push((CSRF_HEADER.to_string(), token.clone()));
            }
        }

        let method = request.method;
        let target = request.path_and_query();
        debug!("{} {}", method, target);

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("{} {} failed: {}", method, target, e);
            PortalError::Network(e)
        })?;

        interpret(response).inspect_err(|e| warn!("{} {} -> {}", method, target, e))
    }
}

/// Map status and body onto the error taxonomy.
fn interpret(response: RawResponse) -> Result<Option<Value>> {
    let body = response.body.trim();

    if !response.is_success() {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| error_message(&v))
            .unwrap_or_else(|| format!("status {}", response.status));
        return Err(PortalError::Http {
            status: response.status,
            message,
        });
    }

    if body.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(body).map_err(|_| PortalError::Parse)?;
    if let Some(message) = error_message(&value) {
        return Err(PortalError::Http {
            status: response.status,
            message,
        });
    }
    Ok(Some(value))
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
