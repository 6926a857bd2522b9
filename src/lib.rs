//! `webstore-publish` uploads browser extension packages to the Chrome Web
//! Store and optionally requests publication.
//!
//! Remote calls go through a retrying request layer:
//! - [`execute_with_retry`] issues one logical call as bounded attempts
//! - [`WebStoreError`] is the single structured failure for remote operations
//! - [`sanitize_details`] redacts credentials before details are displayed
//!
//! The store operations live on [`WebStoreClient`]; [`deploy`] chains them.

mod client;
mod config;
mod deploy;
mod error;
mod options;
mod request;
mod retry;
mod sanitize;
mod types;
mod validation;
mod wire;

pub use client::{Endpoints, WebStoreClient, DEFAULT_API_BASE, DEFAULT_TOKEN_URL};
pub use config::{Config, ConfigError, ConfigOverrides};
pub use deploy::deploy;
pub use error::{Details, Error, RequestError, WebStoreError, NO_RESPONSE_CODE, REJECTED_CODE};
pub use options::ClientOptions;
pub use request::{Body, RequestDescriptor, DEFAULT_TIMEOUT};
pub use retry::{
    execute_with_retry, is_retryable, is_retryable_status, AttemptOutcome, HttpResponse,
    RetryPolicy,
};
pub use sanitize::{format_secure_message, sanitize_details, sanitize_text, MAX_DETAIL_LENGTH};
pub use types::{AccessToken, Credentials, DeployReport, ExtensionId};
pub use validation::{
    validate_extension_id, validate_oauth_credentials, validate_package_path, ValidationError,
    MAX_PACKAGE_SIZE,
};
pub use wire::{AccessTokenResponse, ItemError, PublishResponse, UploadResponse};

pub type Result<T, E = Error> = std::result::Result<T, E>;
