use std::fmt;
use std::path::PathBuf;

use crate::Credentials;

pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
pub const EXTENSION_ID: &str = "EXTENSION_ID";
pub const FILE_PATH: &str = "FILE_PATH";
pub const PUBLISH: &str = "PUBLISH";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(&'static str),
    #[error("{0} is set but empty")]
    Empty(&'static str),
}

/// Deploy settings, built once at startup and passed by value.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub extension_id: String,
    pub file_path: PathBuf,
    pub should_publish: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("extension_id", &self.extension_id)
            .field("file_path", &self.file_path)
            .field("should_publish", &self.should_publish)
            .finish()
    }
}

/// Values supplied on the command line, applied before required-variable
/// checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `FILE_PATH`; when set, the variable may be absent.
    pub file_path: Option<PathBuf>,
    /// Enables publishing regardless of `PUBLISH`.
    pub publish: bool,
}

impl Config {
    /// Reads the process environment.
    ///
    /// Reads `CLIENT_ID`, `CLIENT_SECRET`, `REFRESH_TOKEN`, `EXTENSION_ID` and
    /// `FILE_PATH` (all required) plus the optional `PUBLISH` flag, which is
    /// enabled only by the value `true`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(ConfigOverrides::default())
    }

    /// Reads the process environment, letting `overrides` take precedence.
    pub fn from_env_with(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup_with(|name| std::env::var(name).ok(), overrides)
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with(lookup, ConfigOverrides::default())
    }

    pub fn from_lookup_with<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value)
        };

        let client_id = required(CLIENT_ID)?;
        let client_secret = required(CLIENT_SECRET)?;
        let refresh_token = required(REFRESH_TOKEN)?;
        let extension_id = required(EXTENSION_ID)?;
        let file_path = match overrides.file_path {
            Some(path) => path,
            None => PathBuf::from(required(FILE_PATH)?),
        };
        let should_publish = overrides.publish
            || lookup(PUBLISH).is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
            extension_id,
            file_path,
            should_publish,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}
