//! services/api/src/adapters/object_store.rs
//!
//! This module contains the object-storage adapter, the concrete
//! implementation of the `ObjectStore` port. Voice recordings are uploaded
//! into a private bucket; playback reads go through short-lived signed URLs.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use comfort_core::ports::{ObjectStore, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ObjectStore` port against the hosted
/// storage API of the backend project.
#[derive(Clone)]
pub struct BucketStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl BucketStore {
    /// Creates a new `BucketStore`. `base_url` must already be normalized.
    pub fn new(http: reqwest::Client, base_url: String, api_key: String, bucket: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn sign_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

/// Response of the signed-URL endpoint; the returned path is relative to the
/// storage API root.
#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

//=========================================================================================
// `ObjectStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ObjectStore for BucketStore {
    async fn upload(&self, path: &str, content_type: &str, data: Bytes) -> PortResult<()> {
        self.http
            .post(self.object_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in_seconds: u32) -> PortResult<String> {
        let resp = self
            .http
            .post(self.sign_url(path))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "expiresIn": expires_in_seconds }))
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let signed: SignedUrlResponse = resp
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The endpoint returns a path like `/object/sign/...?token=...`.
        Ok(format!("{}/storage/v1{}", self.base_url, signed.signed_url))
    }
}
