use std::fmt;

use crate::validation::{validate_extension_id, ValidationError};

/// A Chrome Web Store item id: 32 lowercase ASCII letters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtensionId(String);

impl ExtensionId {
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        validate_extension_id(id).map(|id| Self(id.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// OAuth client credentials used to mint access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Short-lived OAuth bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_in: u64,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            token: token.into(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    /// Lifetime in seconds as reported by the token endpoint.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Outcome of a full deploy run.
#[derive(Clone, Debug, PartialEq)]
pub struct DeployReport {
    pub extension_id: ExtensionId,
    pub upload: crate::UploadResponse,
    /// `None` when publishing was not requested.
    pub publish: Option<crate::PublishResponse>,
}
