//! Per-request options and their merge semantics.

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

/// Caller-supplied request options.
///
/// Merge semantics match the original dashboard helper: headers overlay a
/// default map carrying a JSON content type (caller wins per header name),
/// while method and body replace the defaults wholesale.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method; `None` means the default (GET).
    pub method: Option<Method>,
    /// Caller headers, overlaid onto the defaults.
    pub headers: HeaderMap,
    /// Serialized request body, if any.
    pub body: Option<String>,
}

impl RequestOptions {
    /// Empty options: GET, JSON content type, no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with an explicit method.
    pub fn method(method: Method) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Shorthand for a POST.
    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    /// Shorthand for a DELETE.
    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    /// Shorthand for a PUT.
    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    /// Add a header. Replaces any previous caller value for the same name.
    pub fn header<K: IntoHeaderName>(mut self, key: K, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set a JSON-serialized body.
    pub fn json<T: Serialize>(mut self, value: &T) -> serde_json::Result<Self> {
        self.body = Some(serde_json::to_string(value)?);
        Ok(self)
    }

    /// Effective method after merging with the GET default.
    pub fn effective_method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// Effective headers: defaults first, caller headers overlaid.
    pub fn effective_headers(&self) -> HeaderMap {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.headers {
            merged.insert(name, value.clone());
        }
        merged
    }
}
