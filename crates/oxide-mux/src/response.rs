//! Response sink written by handlers.

use std::collections::HashMap;

/// A response under construction.
///
/// Handlers and middleware receive it as `&mut Response` and write status,
/// headers and body into it; serializing it is left to the transport.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a response with plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::ok()
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::ok()
                .header("Content-Type", "application/json")
                .body(body),
            Err(_) => Self::new(500).body("Internal Server Error"),
        }
    }

    /// Creates a 204 No Content response.
    pub fn no_content() -> Self {
        Self::new(204)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::text("Not Found").status(404)
    }

    /// Creates a 405 Method Not Allowed response.
    pub fn method_not_allowed() -> Self {
        Self::text("Method Not Allowed").status(405)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a header in place, replacing any value stored under the same
    /// name regardless of case.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
    }

    /// Gets a header value, ignoring case.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces this response with `other`, keeping headers already set
    /// that `other` does not override.
    pub fn replace(&mut self, other: Self) {
        self.status = other.status;
        self.body = other.body;
        for (k, v) in other.headers {
            self.set_header(k, v);
        }
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let data = serde_json::json!({"name": "test"});
        let res = Response::json(&data);
        assert_eq!(res.status, 200);
        assert_eq!(res.get_header("content-type"), Some("application/json"));
        assert_eq!(res.body_string(), Some(r#"{"name":"test"}"#.to_string()));
    }

    #[test]
    fn test_response_builder() {
        let res = Response::ok().header("X-Custom", "value").body("Hello");

        assert_eq!(res.status, 200);
        assert_eq!(res.get_header("X-Custom"), Some("value"));
        assert_eq!(res.body_string(), Some("Hello".to_string()));
    }

    #[test]
    fn test_set_header_is_case_insensitive() {
        let mut res = Response::ok().header("allow", "GET");
        res.set_header("Allow", "GET, OPTIONS");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("ALLOW"), Some("GET, OPTIONS"));
    }

    #[test]
    fn test_replace_keeps_existing_headers() {
        let mut res = Response::ok().header("Allow", "GET, OPTIONS");
        res.replace(Response::method_not_allowed());

        assert_eq!(res.status, 405);
        assert_eq!(res.get_header("Allow"), Some("GET, OPTIONS"));
        assert_eq!(res.body_string(), Some("Method Not Allowed".to_string()));
    }
}
