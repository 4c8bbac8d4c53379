//! Backblaze B2 uploader
//!
//! Upload target exchange:
//! 1. `b2_authorize_account` with HTTP Basic `key_id:application_key`
//! 2. `b2_get_upload_url` on the account's storage API URL
//!
//! The upload itself is a single `POST` of the batch to the returned URL.

use super::{BlobUploader, UploadTarget};
use crate::config::UploaderConfig;
use crate::error::UploadError;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeAccountResponse {
    authorization_token: String,
    api_info: ApiInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiInfo {
    storage_api: StorageApi,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageApi {
    api_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
    authorization_token: String,
}

pub struct B2Uploader {
    client: Client,
    api_url: String,
    key_id: String,
    application_key: String,
    bucket_id: String,
}

impl B2Uploader {
    pub fn new(config: &UploaderConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            application_key: config.application_key.clone(),
            bucket_id: config.bucket_id.clone(),
        })
    }

    async fn authorize_account(&self) -> Result<AuthorizeAccountResponse, UploadError> {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.key_id, self.application_key));

        let response = self
            .client
            .get(format!("{}/b2api/v3/b2_authorize_account", self.api_url))
            .header("Authorization", format!("Basic {}", credentials))
            .send()
            .await
            .map_err(|e| UploadError::Credential(format!("authorize request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Credential(format!(
                "authorize rejected ({}): {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<AuthorizeAccountResponse>()
            .await
            .map_err(|e| UploadError::Credential(format!("malformed authorize response: {}", e)))
    }
}

#[async_trait]
impl BlobUploader for B2Uploader {
    async fn get_upload_target(&self) -> Result<UploadTarget, UploadError> {
        let account = self.authorize_account().await?;

        let response = self
            .client
            .get(format!(
                "{}/b2api/v3/b2_get_upload_url",
                account.api_info.storage_api.api_url.trim_end_matches('/')
            ))
            .query(&[("bucketId", self.bucket_id.as_str())])
            .header("Authorization", &account.authorization_token)
            .send()
            .await
            .map_err(|e| UploadError::Credential(format!("get_upload_url request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Credential(format!(
                "get_upload_url rejected ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let upload = response
            .json::<UploadUrlResponse>()
            .await
            .map_err(|e| UploadError::Credential(format!("malformed upload url response: {}", e)))?;

        Ok(UploadTarget {
            endpoint: upload.upload_url,
            token: upload.authorization_token,
        })
    }

    async fn upload(
        &self,
        target: &UploadTarget,
        payload: Vec<u8>,
        object_name: &str,
    ) -> Result<(), UploadError> {
        let response = self
            .client
            .post(&target.endpoint)
            .header("Authorization", &target.token)
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("X-Bz-File-Name", object_name)
            .header("X-Bz-Content-Sha1", "do_not_verify")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
