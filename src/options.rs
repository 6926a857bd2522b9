use crate::RetryPolicy;

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry policy for upload and publish requests.
    pub retry: RetryPolicy,
    /// Retry policy for OAuth token requests.
    pub auth_retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            retry: RetryPolicy::default(),
            auth_retry: RetryPolicy::auth(),
        }
    }
}
