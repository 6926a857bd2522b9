use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{
    retry::{execute_with_retry, HttpResponse},
    wire::{AccessTokenResponse, PublishResponse, UploadResponse},
    AccessToken, ClientOptions, Credentials, ExtensionId, RequestDescriptor, RequestError,
    RetryPolicy, WebStoreError,
};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

const API_VERSION_HEADER: &str = "x-goog-api-version";
const API_VERSION: &str = "2";
const UPLOAD_SUCCESS: &str = "SUCCESS";
const PUBLISH_SUCCESS: [&str; 2] = ["OK", "ITEM_PENDING_REVIEW"];

const TOKEN_FAILED: &str = "Failed to get access token";
const UPLOAD_FAILED: &str = "Failed to upload package";
const PUBLISH_FAILED: &str = "Failed to publish item";

/// Remote endpoints; overridable so tests can point at a local server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub token_url: String,
    pub api_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_owned(),
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }
}

impl Endpoints {
    /// Formats the package upload URL.
    ///
    /// Example: `"https://www.googleapis.com/upload/chromewebstore/v1.1/items/<id>"`
    pub fn upload_url(&self, extension_id: &ExtensionId) -> String {
        format!(
            "{}/upload/chromewebstore/v1.1/items/{extension_id}",
            self.api_base.trim_end_matches('/')
        )
    }

    pub fn publish_url(&self, extension_id: &ExtensionId) -> String {
        format!(
            "{}/chromewebstore/v1.1/items/{extension_id}/publish",
            self.api_base.trim_end_matches('/')
        )
    }
}

#[derive(Clone)]
/// HTTP client for the Chrome Web Store publishing API.
pub struct WebStoreClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    options: ClientOptions,
}

impl fmt::Debug for WebStoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebStoreClient")
            .field("endpoints", &self.endpoints)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for WebStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebStoreClient {
    /// Creates a client for the public Chrome Web Store endpoints.
    pub fn new() -> Self {
        Self::with_endpoints(Endpoints::default())
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            options: ClientOptions::default(),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Exchanges the refresh token for an access token.
    pub async fn fetch_access_token(
        &self,
        credentials: &Credentials,
    ) -> Result<AccessToken, WebStoreError> {
        let descriptor = self
            .descriptor(Method::POST, &self.endpoints.token_url)
            .form([
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ]);

        let token: AccessTokenResponse = self
            .send(&descriptor, &self.options.auth_retry)
            .await
            .and_then(|response| decode(&response))
            .map_err(|err| WebStoreError::from_request_error(err, TOKEN_FAILED))?;

        debug!(expires_in = token.expires_in, "access token acquired");
        Ok(AccessToken::new(token.access_token, token.expires_in))
    }

    /// Uploads the package at `package_path`.
    ///
    /// The file is read once; the same bytes are resent on every retry.
    pub async fn upload_package(
        &self,
        token: &AccessToken,
        extension_id: &ExtensionId,
        package_path: &Path,
    ) -> Result<UploadResponse, WebStoreError> {
        let package = tokio::fs::read(package_path)
            .await
            .map_err(|err| WebStoreError::from_request_error(err.into(), UPLOAD_FAILED))?;
        info!(bytes = package.len(), "uploading package");

        let descriptor = self
            .descriptor(Method::PUT, &self.endpoints.upload_url(extension_id))
            .bearer(token.secret())
            .header(API_VERSION_HEADER, API_VERSION)
            .bytes(package);

        let (upload, payload) = self
            .send_json::<UploadResponse>(&descriptor, &self.options.retry)
            .await
            .map_err(|err| WebStoreError::from_request_error(err, UPLOAD_FAILED))?;

        if upload.upload_state.as_deref() == Some(UPLOAD_SUCCESS) {
            Ok(upload)
        } else {
            Err(WebStoreError::rejected(UPLOAD_FAILED, payload))
        }
    }

    /// Requests publication of the most recently uploaded package.
    pub async fn publish_item(
        &self,
        token: &AccessToken,
        extension_id: &ExtensionId,
    ) -> Result<PublishResponse, WebStoreError> {
        let descriptor = self
            .descriptor(Method::POST, &self.endpoints.publish_url(extension_id))
            .bearer(token.secret())
            .header(API_VERSION_HEADER, API_VERSION);

        let (publish, payload) = self
            .send_json::<PublishResponse>(&descriptor, &self.options.retry)
            .await
            .map_err(|err| WebStoreError::from_request_error(err, PUBLISH_FAILED))?;

        if is_publish_success(&publish) {
            Ok(publish)
        } else {
            Err(WebStoreError::rejected(PUBLISH_FAILED, payload))
        }
    }

    fn descriptor(&self, method: Method, url: &str) -> RequestDescriptor {
        RequestDescriptor::new(method, url).timeout(Duration::from_millis(self.options.timeout_ms))
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        policy: &RetryPolicy,
    ) -> Result<HttpResponse, RequestError> {
        execute_with_retry(&self.http, descriptor, policy).await
    }

    /// Sends and decodes, keeping the raw JSON for rejection details.
    async fn send_json<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        policy: &RetryPolicy,
    ) -> Result<(T, serde_json::Value), RequestError> {
        let response = self.send(descriptor, policy).await?;
        let payload: serde_json::Value = decode(&response)?;
        let typed = serde_json::from_value(payload.clone()).map_err(|err| RequestError::Decode {
            message: format!("unexpected response shape: {err}"),
            body: response.body,
        })?;
        Ok((typed, payload))
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, RequestError> {
    serde_json::from_str(&response.body).map_err(|err| RequestError::Decode {
        message: format!("invalid response JSON: {err}"),
        body: response.body.clone(),
    })
}

fn is_publish_success(response: &PublishResponse) -> bool {
    response
        .status
        .iter()
        .any(|status| PUBLISH_SUCCESS.contains(&status.as_str()))
}
