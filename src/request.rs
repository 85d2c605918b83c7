use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Immutable description of an outgoing request.
///
/// The descriptor itself never changes once built; whether a dispatch is the
/// original attempt or the post-refresh replay is carried separately as an
/// [`Attempt`], so "already retried" is a plain comparison rather than a
/// mutable flag on shared request state.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Which dispatch of a descriptor this is. A descriptor is replayed at most
/// once; a 401 on the replay is surfaced to the caller as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    First,
    Replay,
}

impl Attempt {
    pub fn is_replay(self) -> bool {
        matches!(self, Attempt::Replay)
    }
}
