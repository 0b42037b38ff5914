//! Read-only request facade handed to middleware and handlers

use crate::{Error, Result};
use http::{Method, Uri};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Decoded form values from an url-encoded request body
#[derive(Debug, Clone, Default)]
pub struct FormData {
    values: HashMap<String, Vec<String>>,
}

impl FormData {
    /// Parse form data from an url-encoded body
    pub fn parse(body: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in form_urlencoded::parse(body.as_bytes()) {
            values
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        }
        Self { values }
    }

    /// Get the first value for a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    /// Get all values for a field
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// True if no fields were decoded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read-only view of an inbound request.
///
/// Built once per dispatch by the host. Path parameters are bound by the
/// dispatcher after a route matches; everything else is immutable.
#[derive(Debug, Clone)]
pub struct Request {
    request_id: String,
    method: Method,
    full_url: String,
    path: String,
    body: String,
    form: FormData,
    query: HashMap<String, Vec<String>>,
    params: HashMap<String, String>,
}

impl Request {
    /// Build a request facade from transport-level parts.
    ///
    /// `full_url` may be an absolute URL or an origin-form path. The body is
    /// decoded as form data only when the content type says it is
    /// url-encoded.
    pub fn new(
        method: Method,
        full_url: impl Into<String>,
        body: impl Into<String>,
        content_type: Option<&str>,
    ) -> Result<Self> {
        let full_url = full_url.into();
        let body = body.into();

        let uri = Uri::from_str(&full_url)
            .map_err(|e| Error::InvalidRequest(format!("bad request URL '{full_url}': {e}")))?;

        let mut query: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(q) = uri.query() {
            for (key, value) in form_urlencoded::parse(q.as_bytes()) {
                query
                    .entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }

        let form = match content_type {
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                FormData::parse(&body)
            }
            _ => FormData::default(),
        };

        Ok(Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path: uri.path().to_string(),
            full_url,
            body,
            form,
            query,
            params: HashMap::new(),
        })
    }

    /// Unique id for tracing this request
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path (no query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full URL as received
    pub fn full_url(&self) -> &str {
        &self.full_url
    }

    /// Raw request body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decoded form values
    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// First query value for a name
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    /// All query values for a name
    pub fn query_values(&self, name: &str) -> &[String] {
        self.query.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// A path parameter bound by the matched route
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Bind path parameters from a route match.
    ///
    /// Called by the dispatcher once per request, before the middleware
    /// chain runs.
    pub fn bind_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
