//! Precondition checks run before any network call.

use std::io;
use std::path::{Path, PathBuf};

/// Largest package the store accepts.
pub const MAX_PACKAGE_SIZE: u64 = 100 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 2] = ["zip", "crx"];

const EXTENSION_ID_LENGTH: usize = 32;
const MIN_CREDENTIAL_LENGTH: usize = 10;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Extension ID is required")]
    MissingExtensionId,
    #[error("Invalid extension ID format. Must be 32 lowercase letters")]
    InvalidExtensionId,
    #[error("All OAuth credentials are required")]
    MissingCredentials,
    #[error("Invalid OAuth credential format")]
    InvalidCredentials,
    #[error("File path is required")]
    MissingFilePath,
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied to access file: {0}")]
    PermissionDenied(PathBuf),
    #[error("Path is not a file: {0}")]
    NotAFile(PathBuf),
    #[error("File size {size} exceeds maximum allowed size of {max} bytes", max = MAX_PACKAGE_SIZE)]
    FileTooLarge { size: u64 },
    #[error("Invalid file type. Allowed extensions: .zip, .crx")]
    InvalidFileType,
    #[error("Failed to validate file path: {0}")]
    Inaccessible(String),
}

/// Returns the trimmed id if it is exactly 32 lowercase ASCII letters.
pub fn validate_extension_id(id: &str) -> Result<&str, ValidationError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingExtensionId);
    }
    if trimmed.len() != EXTENSION_ID_LENGTH || !trimmed.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(ValidationError::InvalidExtensionId);
    }
    Ok(trimmed)
}

pub fn validate_oauth_credentials(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<(), ValidationError> {
    let fields = [client_id, client_secret, refresh_token];
    if fields.iter().any(|value| value.trim().is_empty()) {
        return Err(ValidationError::MissingCredentials);
    }
    if fields.iter().any(|value| value.len() < MIN_CREDENTIAL_LENGTH) {
        return Err(ValidationError::InvalidCredentials);
    }
    Ok(())
}

/// Resolves `path` against `working_dir` and checks it names an uploadable
/// package.
///
/// The returned path is canonical: `..` components and symlinks are resolved
/// before the file type and extension are checked.
pub fn validate_package_path(path: &Path, working_dir: &Path) -> Result<PathBuf, ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::MissingFilePath);
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };

    let resolved = joined
        .canonicalize()
        .map_err(|err| io_failure(err, &joined))?;
    let metadata = std::fs::metadata(&resolved).map_err(|err| io_failure(err, &resolved))?;

    if !metadata.is_file() {
        return Err(ValidationError::NotAFile(resolved));
    }
    if metadata.len() > MAX_PACKAGE_SIZE {
        return Err(ValidationError::FileTooLarge {
            size: metadata.len(),
        });
    }

    let allowed = resolved
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        });
    if !allowed {
        return Err(ValidationError::InvalidFileType);
    }

    Ok(resolved)
}

fn io_failure(err: io::Error, path: &Path) -> ValidationError {
    match err.kind() {
        io::ErrorKind::NotFound => ValidationError::FileNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => ValidationError::PermissionDenied(path.to_path_buf()),
        _ => ValidationError::Inaccessible(err.to_string()),
    }
}
