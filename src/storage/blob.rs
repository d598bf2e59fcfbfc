use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{Duration, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::BlobConfig;
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Service version stamped into every signed URL.
const SIGNED_VERSION: &str = "2021-08-06";

/// Issues time-limited, permission-scoped URLs for direct client access to
/// blobs. Bytes never route through this service; we only sign.
pub struct BlobSigner {
    config: BlobConfig,
}

impl BlobSigner {
    pub fn new(config: BlobConfig) -> Self {
        Self { config }
    }

    /// Blob path for an original upload: `user_{owner}/{uuid}{extension}`.
    pub fn upload_blob_name(owner_id: Uuid, file_uuid: Uuid, original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        format!("user_{owner_id}/{file_uuid}{extension}")
    }

    /// Blob path for a transform output: `user_{owner}/{uuid}/{filename}`.
    pub fn transform_blob_name(owner_id: Uuid, file_uuid: Uuid, filename: &str) -> String {
        format!("user_{owner_id}/{file_uuid}/{filename}")
    }

    /// Signed URL granting create+write, for the client-side upload.
    pub fn issue_upload_url(&self, blob_name: &str) -> Result<String, ApiError> {
        self.signed_url(blob_name, "cw")
    }

    /// Signed URL granting read only.
    pub fn issue_download_url(&self, blob_name: &str) -> Result<String, ApiError> {
        self.signed_url(blob_name, "r")
    }

    fn signed_url(&self, blob_name: &str, permissions: &str) -> Result<String, ApiError> {
        let key = BASE64
            .decode(&self.config.account_key)
            .map_err(|_| ApiError::Upstream("storage account key is not valid base64".to_string()))?;

        let start = Utc::now();
        let expiry = start + Duration::minutes(self.config.url_ttl_minutes);
        let start = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let expiry = expiry.to_rfc3339_opts(SecondsFormat::Secs, true);

        let canonical_resource = format!(
            "/blob/{}/{}/{}",
            self.config.account_name, self.config.container, blob_name
        );
        let string_to_sign =
            format!("{permissions}\n{start}\n{expiry}\n{canonical_resource}\n{SIGNED_VERSION}\nb");

        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|_| ApiError::Upstream("storage account key has invalid length".to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!(
            "https://{account}.blob.core.windows.net/{container}/{blob_name}?sv={SIGNED_VERSION}&sr=b&sp={permissions}&st={st}&se={se}&sig={sig}",
            account = self.config.account_name,
            container = self.config.container,
            st = urlencoding::encode(&start),
            se = urlencoding::encode(&expiry),
            sig = urlencoding::encode(&signature),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> BlobSigner {
        BlobSigner::new(BlobConfig {
            account_name: "testaccount".to_string(),
            account_key: BASE64.encode(b"test-account-key"),
            container: "myclr".to_string(),
            url_ttl_minutes: 30,
        })
    }

    #[test]
    fn test_upload_blob_name_uses_user_folder_and_extension() {
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();
        let name = BlobSigner::upload_blob_name(owner, file, "notes.pdf");
        assert_eq!(name, format!("user_{owner}/{file}.pdf"));
    }

    #[test]
    fn test_upload_blob_name_without_extension() {
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();
        let name = BlobSigner::upload_blob_name(owner, file, "README");
        assert_eq!(name, format!("user_{owner}/{file}"));
    }

    #[test]
    fn test_transform_blob_name_nests_under_file_uuid() {
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();
        let name = BlobSigner::transform_blob_name(owner, file, "summary.md");
        assert_eq!(name, format!("user_{owner}/{file}/summary.md"));
    }

    #[test]
    fn test_upload_url_grants_create_write() {
        let url = signer().issue_upload_url("user_x/file.pdf").unwrap();
        assert!(url.starts_with("https://testaccount.blob.core.windows.net/myclr/user_x/file.pdf?"));
        assert!(url.contains("&sp=cw&"));
        assert!(url.contains("&sig="));
    }

    #[test]
    fn test_download_url_grants_read_only() {
        let url = signer().issue_download_url("user_x/file.pdf").unwrap();
        assert!(url.contains("&sp=r&"));
        assert!(!url.contains("&sp=cw&"));
    }

    #[test]
    fn test_invalid_account_key_is_an_upstream_error() {
        let broken = BlobSigner::new(BlobConfig {
            account_key: "not base64 !!!".to_string(),
            ..BlobConfig::default()
        });
        let err = broken.issue_download_url("x").unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
