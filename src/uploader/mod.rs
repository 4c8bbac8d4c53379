//! Cold-storage collaborator used by the flusher
//!
//! The flusher only needs two calls: obtain a short-lived upload target,
//! then push one opaque payload to it. Any error from either call is a
//! rollback trigger; the flusher never interprets it further.

pub mod b2;

pub use b2::B2Uploader;

use crate::error::UploadError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone};

/// Short-lived upload endpoint and the bearer token that goes with it
#[derive(Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub endpoint: String,
    pub token: String,
}

impl std::fmt::Debug for UploadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTarget")
            .field("endpoint", &self.endpoint)
            .field("token", &"***")
            .finish()
    }
}

/// Blob storage interface
#[async_trait]
pub trait BlobUploader: Send + Sync + 'static {
    /// Obtain an upload endpoint and token
    async fn get_upload_target(&self) -> Result<UploadTarget, UploadError>;

    /// Upload `payload` as `object_name` (already URL-escaped)
    async fn upload(
        &self,
        target: &UploadTarget,
        payload: Vec<u8>,
        object_name: &str,
    ) -> Result<(), UploadError>;
}

/// Remote object name for a batch flushed at `time`
///
/// `logs/<prefix>_<YYYYMMDDHHMMSS>.log`, URL-escaped segment by segment.
pub fn object_name<Tz: TimeZone>(prefix: &str, time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let file_name = format!("{}_{}.log", prefix, time.format("%Y%m%d%H%M%S"));
    format!("logs/{}", escape_segment(&file_name))
}

/// Percent-encode one path segment
///
/// `form_urlencoded` writes spaces as `+`, which storage APIs read literally.
fn escape_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_object_name() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let time = kst.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap();

        assert_eq!(
            object_name("PRODUCT_RECOMMEND", &time),
            "logs/PRODUCT_RECOMMEND_20250301140509.log"
        );
    }

    #[test]
    fn test_object_name_escapes_prefix() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let time = kst.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        assert_eq!(
            object_name("my app/v2", &time),
            "logs/my%20app%2Fv2_20250301000000.log"
        );
    }

    #[test]
    fn test_upload_target_debug_hides_token() {
        let target = UploadTarget {
            endpoint: "https://pod.example/upload".to_string(),
            token: "secret-token".to_string(),
        };
        assert!(!format!("{:?}", target).contains("secret-token"));
    }
}
