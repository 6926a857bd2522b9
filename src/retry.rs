//! Timeout, retry and backoff for a single logical HTTP call.
//!
//! A logical call is issued as a bounded sequence of physical attempts. Each
//! attempt failure is classified as retryable or terminal; retryable failures
//! sleep for an exponentially growing, jittered delay before the next attempt.
//!
//! ```text
//! delay = min(initial_delay * multiplier^attempt, max_delay)
//! sleep = floor(delay + uniform[0, 0.3 * delay))
//! ```

use std::error::Error as _;
use std::future::Future;
use std::io;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::{sanitize::sanitize_text, RequestDescriptor, RequestError};

/// Default number of physical attempts: one initial attempt plus three retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Attempts for OAuth token requests: one initial attempt plus two retries.
pub const AUTH_MAX_ATTEMPTS: u32 = 3;

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Upper bound of the jitter, as a fraction of the computed delay.
const JITTER_FACTOR: f64 = 0.3;

/// HTTP statuses worth retrying.
const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Retry configuration for one logical call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1.
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
            multiplier,
        }
    }

    /// Policy used for token requests.
    pub fn auth() -> Self {
        Self::default().with_max_attempts(AUTH_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_delays(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Backoff before the retry that follows `attempt` (0-indexed), without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms(attempt).floor() as u64)
    }

    /// Backoff with jitter, floored to whole milliseconds.
    pub fn delay_with_jitter<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let delay_ms = self.base_delay_ms(attempt);
        let jitter_ms = if delay_ms > 0.0 {
            rng.gen_range(0.0..JITTER_FACTOR * delay_ms)
        } else {
            0.0
        };
        Duration::from_millis((delay_ms + jitter_ms).floor() as u64)
    }

    fn base_delay_ms(&self, attempt: u32) -> f64 {
        let initial_ms = self.initial_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay_ms = initial_ms * self.multiplier.powi(exponent);
        if delay_ms.is_finite() {
            delay_ms.min(max_ms).max(0.0)
        } else {
            max_ms
        }
    }
}

/// Result of one physical attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    RetryableFailure(RequestError),
    TerminalFailure(RequestError),
}

impl<T> AttemptOutcome<T> {
    pub fn classify(result: Result<T, RequestError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) if is_retryable(&err) => Self::RetryableFailure(err),
            Err(err) => Self::TerminalFailure(err),
        }
    }
}

/// Whether a failed attempt may succeed if repeated.
pub fn is_retryable(err: &RequestError) -> bool {
    match err {
        RequestError::Status { status, .. } => is_retryable_status(*status),
        RequestError::Transport(err) => {
            err.status().is_some_and(|status| is_retryable_status(status.as_u16()))
                || is_timeout_or_reset(err)
        }
        RequestError::Decode { .. } | RequestError::Io(_) => false,
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

fn is_timeout_or_reset(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(io_err) = inner.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::TimedOut
            ) {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

/// A 2xx response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Executes `descriptor` under `policy`, returning the first 2xx response or
/// the failure of the last attempt made.
pub async fn execute_with_retry(
    http: &reqwest::Client,
    descriptor: &RequestDescriptor,
    policy: &RetryPolicy,
) -> Result<HttpResponse, RequestError> {
    run_with_retry(
        policy,
        |attempt| {
            debug!(
                method = %descriptor.method(),
                url = descriptor.url(),
                attempt = attempt + 1,
                "sending request"
            );
            send_once(http, descriptor)
        },
        tokio::time::sleep,
    )
    .await
}

async fn send_once(
    http: &reqwest::Client,
    descriptor: &RequestDescriptor,
) -> Result<HttpResponse, RequestError> {
    let response = descriptor
        .to_request(http)
        .send()
        .await
        .map_err(RequestError::Transport)?;

    let status = response.status();
    let body = response.text().await.map_err(RequestError::Transport)?;

    if !status.is_success() {
        return Err(RequestError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(HttpResponse {
        status: status.as_u16(),
        body,
    })
}

/// Attempt loop shared by [`execute_with_retry`].
///
/// `operation` receives the 0-indexed attempt number; `sleep` is awaited
/// between attempts and never after the last one.
pub(crate) async fn run_with_retry<T, Op, OpFut, Sleep, SleepFut>(
    policy: &RetryPolicy,
    mut operation: Op,
    mut sleep: Sleep,
) -> Result<T, RequestError>
where
    Op: FnMut(u32) -> OpFut,
    OpFut: Future<Output = Result<T, RequestError>>,
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0u32;
    loop {
        let err = match AttemptOutcome::classify(operation(attempt).await) {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::TerminalFailure(err) => return Err(err),
            AttemptOutcome::RetryableFailure(err) => err,
        };

        if attempt + 1 >= max_attempts {
            debug!(attempts = max_attempts, "retry attempts exhausted");
            return Err(err);
        }

        let delay = policy.delay_with_jitter(attempt, &mut rand::thread_rng());
        warn!(
            attempt = attempt + 1,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %sanitize_text(&err.to_string()),
            "request failed, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}
