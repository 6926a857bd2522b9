use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;

/// Per-attempt timeout applied when a descriptor does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request payload.
#[derive(Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    /// Reference-counted so retries resend the package without copying it.
    Bytes(Bytes),
    Form(Vec<(String, String)>),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            // form fields carry OAuth credentials
            Self::Form(fields) => f
                .debug_list()
                .entries(fields.iter().map(|(name, _)| (name.as_str(), "<redacted>")))
                .finish(),
        }
    }
}

/// One logical HTTP call, resent unchanged on every attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    body: Body,
    timeout: Duration,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: Body::Empty,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> Self {
        self.header(reqwest::header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    pub fn bytes(mut self, bytes: impl Into<Bytes>) -> Self {
        self.body = Body::Bytes(bytes.into());
        self
    }

    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Builds one physical attempt.
    pub(crate) fn to_request(&self, http: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut builder = http
            .request(self.method.clone(), &self.url)
            .timeout(self.timeout);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match &self.body {
            // an explicit empty body yields `Content-Length: 0` on POST
            Body::Empty if self.method != Method::GET => builder.body(Vec::new()),
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes.clone()),
            Body::Form(fields) => builder.form(fields),
        }
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .finish()
    }
}
