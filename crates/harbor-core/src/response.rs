//! Write-once response facade

use crate::Result;
use bytes::Bytes;
use http_body_util::Full;
use http::{header, StatusCode};
use serde::Serialize;

/// Body type alias
pub type Body = Full<Bytes>;

/// Write-once response builder.
///
/// Chainable setters (`status`, `body`, `add_header`, `remove_cookie`)
/// stage the response; a terminal method (`ok`, `not_found`, ...) finalizes
/// it and marks the response complete. After the first terminal call the
/// dispatcher stops running middleware and handlers for this request; a
/// second terminal call is logged and ignored, never fatal.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
    headers: Vec<(String, String)>,
    removed_cookies: Vec<String>,
    finished: bool,
}

impl Response {
    /// Create an unfinished response
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::new(),
            headers: Vec::new(),
            removed_cookies: Vec::new(),
            finished: false,
        }
    }

    /// Stage a status code
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        if !self.finished {
            self.status = status;
        }
        self
    }

    /// Stage a response body
    pub fn body(&mut self, body: impl Into<String>) -> &mut Self {
        if !self.finished {
            self.body = Bytes::from(body.into());
        }
        self
    }

    /// Stage a response header
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if !self.finished {
            self.headers.push((key.into(), value.into()));
        }
        self
    }

    /// Instruct the client to drop a cookie
    pub fn remove_cookie(&mut self, name: impl Into<String>) -> &mut Self {
        if !self.finished {
            self.removed_cookies.push(name.into());
        }
        self
    }

    /// Terminal: 200 OK with a text body
    pub fn ok(&mut self, body: impl Into<String>) {
        self.finish(StatusCode::OK, Bytes::from(body.into()));
    }

    /// Terminal: 200 OK with raw bytes and an explicit content type.
    ///
    /// Used by the static-asset fallback, where the body is not text.
    pub fn ok_bytes(&mut self, body: Bytes, content_type: impl Into<String>) {
        self.add_header(header::CONTENT_TYPE.as_str(), content_type);
        self.finish(StatusCode::OK, body);
    }

    /// Terminal: 200 OK with an HTML body
    pub fn ok_html(&mut self, body: impl Into<String>) {
        self.add_header(header::CONTENT_TYPE.as_str(), "text/html; charset=utf-8");
        self.finish(StatusCode::OK, Bytes::from(body.into()));
    }

    /// Terminal: 200 OK with a JSON body
    pub fn ok_json<T: Serialize>(&mut self, body: &T) -> Result<()> {
        let json = serde_json::to_string(body)?;
        self.add_header(header::CONTENT_TYPE.as_str(), "application/json");
        self.finish(StatusCode::OK, Bytes::from(json));
        Ok(())
    }

    /// Terminal: 201 Created with a Location header
    pub fn created(&mut self, location: impl Into<String>) {
        let location = location.into();
        self.add_header(header::LOCATION.as_str(), location.clone());
        self.finish(StatusCode::CREATED, Bytes::from(location));
    }

    /// Terminal: 204 No Content
    pub fn no_content(&mut self) {
        self.finish(StatusCode::NO_CONTENT, Bytes::new());
    }

    /// Terminal: 302 redirect
    pub fn redirect(&mut self, location: impl Into<String>) {
        self.add_header(header::LOCATION.as_str(), location.into());
        self.finish(StatusCode::FOUND, Bytes::new());
    }

    /// Terminal: 400 Bad Request
    pub fn bad_request(&mut self, body: impl Into<String>) {
        self.finish(StatusCode::BAD_REQUEST, Bytes::from(body.into()));
    }

    /// Terminal: 404 Not Found
    pub fn not_found(&mut self, body: impl Into<String>) {
        self.finish(StatusCode::NOT_FOUND, Bytes::from(body.into()));
    }

    /// Terminal: 500 Internal Server Error
    pub fn internal_server_error(&mut self, body: impl Into<String>) {
        self.finish(StatusCode::INTERNAL_SERVER_ERROR, Bytes::from(body.into()));
    }

    /// True once a terminal method has run
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Status as currently staged or finalized
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Body bytes as currently staged or finalized
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body as text; non-UTF-8 bytes render as empty
    pub fn body_text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }

    fn finish(&mut self, status: StatusCode, body: Bytes) {
        if self.finished {
            tracing::warn!(
                first_status = self.status.as_u16(),
                second_status = status.as_u16(),
                "second terminal response call ignored"
            );
            return;
        }
        self.status = status;
        self.body = body;
        self.finished = true;
    }

    /// Convert the facade into a transport response.
    ///
    /// An unfinished response is converted as staged; the host decides what
    /// an unfinished response means (usually a fault upstream already
    /// produced one).
    pub fn into_http(self) -> Result<http::Response<Body>> {
        let mut builder = http::Response::builder().status(self.status);

        let has_content_type = self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()));

        for (key, value) in &self.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if !has_content_type && !self.body.is_empty() {
            builder = builder.header(header::CONTENT_TYPE, "text/plain; charset=utf-8");
        }

        for name in &self.removed_cookies {
            builder = builder.header(
                header::SET_COOKIE,
                format!("{name}=; Max-Age=0; Path=/"),
            );
        }

        Ok(builder.body(Full::new(self.body))?)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
