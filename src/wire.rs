use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub item_id: String,
    #[serde(rename = "uploadState", default)]
    pub upload_state: Option<String>,
    #[serde(rename = "itemError", default)]
    pub item_error: Option<Vec<ItemError>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_detail: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(rename = "statusDetail", default)]
    pub status_detail: Option<serde_json::Value>,
}
