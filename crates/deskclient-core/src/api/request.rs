use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

use super::ApiError;

/// Caller-supplied request configuration for `ApiClient::fetch`.
///
/// Defaults to a GET with no extra headers and no body. Headers are kept as
/// plain strings and validated when the request is built, so a bad header
/// surfaces as an error from `fetch` rather than from the builder.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the body and mark it as JSON
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to serialize body: {}", e)))?;
        Ok(self.header("Content-Type", "application/json").body(body))
    }

    /// Convert the caller's headers, keeping repeated names.
    pub(crate) fn header_map(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(format!("name {:?}", name)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::InvalidHeader(format!("value for {}", name)))?;
            headers.append(header_name, header_value);
        }
        Ok(headers)
    }
}
