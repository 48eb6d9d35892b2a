use reqwest::Method;

/// Caller-side options for an authenticated request.
///
/// Headers are applied after the injected `Authorization` and `Content-Type`
/// headers, so a caller header with the same name replaces the injected one.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method, `GET` by default.
    pub method: Method,
    /// Extra headers in application order; later entries win on collision.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    /// Options for a request with the given method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}
