use std::path::Path;

use tracing::info;

use crate::{
    validation::{validate_oauth_credentials, validate_package_path},
    Config, DeployReport, ExtensionId, Result, WebStoreClient,
};

/// Validates inputs, then uploads the package and optionally publishes it.
///
/// Every precondition is checked before the first network call. Relative
/// package paths are resolved against `working_dir`.
pub async fn deploy(
    client: &WebStoreClient,
    config: &Config,
    working_dir: &Path,
) -> Result<DeployReport> {
    validate_oauth_credentials(&config.client_id, &config.client_secret, &config.refresh_token)?;
    let extension_id = ExtensionId::parse(&config.extension_id)?;
    let package_path = validate_package_path(&config.file_path, working_dir)?;

    info!(%extension_id, package = %package_path.display(), "requesting access token");
    let token = client.fetch_access_token(&config.credentials()).await?;

    info!("uploading package");
    let upload = client
        .upload_package(&token, &extension_id, &package_path)
        .await?;
    info!("package uploaded successfully");

    if !config.should_publish {
        info!("skipping publication, publishing was not requested");
        return Ok(DeployReport {
            extension_id,
            upload,
            publish: None,
        });
    }

    info!("publishing");
    let publish = client.publish_item(&token, &extension_id).await?;
    info!(status = ?publish.status, "published successfully");

    Ok(DeployReport {
        extension_id,
        upload,
        publish: Some(publish),
    })
}
