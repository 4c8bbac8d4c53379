// B2 uploader tests against a mock storage API

use base64::Engine;
use log_shipper::config::UploaderConfig;
use log_shipper::error::UploadError;
use log_shipper::uploader::{B2Uploader, BlobUploader, UploadTarget};
use wiremock::{
    matchers::{body_string, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const KEY_ID: &str = "0051234567890abcdef";
const APPLICATION_KEY: &str = "K005secretapplicationkey";
const BUCKET_ID: &str = "bucket-4a5b6c";

fn create_config(server: &MockServer) -> UploaderConfig {
    UploaderConfig {
        api_url: server.uri(),
        key_id: KEY_ID.to_string(),
        application_key: APPLICATION_KEY.to_string(),
        bucket_id: BUCKET_ID.to_string(),
        object_prefix: "PRODUCT_RECOMMEND".to_string(),
        timeout_seconds: 5,
    }
}

fn basic_auth() -> String {
    let credentials = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", KEY_ID, APPLICATION_KEY));
    format!("Basic {}", credentials)
}

/// Mount authorize + get_upload_url, both pointing back at this server
async fn mount_credentials(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/b2api/v3/b2_authorize_account"))
        .and(header("Authorization", basic_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accountId": "account-1",
            "authorizationToken": "account-token",
            "apiInfo": {
                "storageApi": {
                    "apiUrl": server.uri(),
                    "downloadUrl": server.uri(),
                    "recommendedPartSize": 100000000
                }
            }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b2api/v3/b2_get_upload_url"))
        .and(query_param("bucketId", BUCKET_ID))
        .and(header("Authorization", "account-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bucketId": BUCKET_ID,
            "uploadUrl": format!("{}/upload/{}", server.uri(), BUCKET_ID),
            "authorizationToken": "upload-token"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_upload_target() {
    let server = MockServer::start().await;
    mount_credentials(&server).await;

    let uploader = B2Uploader::new(&create_config(&server)).unwrap();
    let target = uploader.get_upload_target().await.unwrap();

    assert_eq!(
        target,
        UploadTarget {
            endpoint: format!("{}/upload/{}", server.uri(), BUCKET_ID),
            token: "upload-token".to_string(),
        }
    );
}

#[tokio::test]
async fn test_upload_sends_batch_with_b2_headers() {
    let server = MockServer::start().await;
    mount_credentials(&server).await;

    let payload = "2025-01-01 09:00:00 | INFO | started\n2025-01-01 09:00:01 | ERROR | failed\n";
    let object_name = "logs/PRODUCT_RECOMMEND_20250101090001.log";

    Mock::given(method("POST"))
        .and(path(format!("/upload/{}", BUCKET_ID)))
        .and(header("Authorization", "upload-token"))
        .and(header("X-Bz-File-Name", object_name))
        .and(header("X-Bz-Content-Sha1", "do_not_verify"))
        .and(header("Content-Type", "text/plain; charset=utf-8"))
        .and(body_string(payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fileId": "file-1",
            "fileName": object_name
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uploader = B2Uploader::new(&create_config(&server)).unwrap();
    let target = uploader.get_upload_target().await.unwrap();

    uploader
        .upload(&target, payload.as_bytes().to_vec(), object_name)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_authorize_failure_is_credential_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/b2api/v3/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "status": 401,
            "code": "unauthorized",
            "message": "bad key"
        })))
        .mount(&server)
        .await;

    let uploader = B2Uploader::new(&create_config(&server)).unwrap();
    let error = uploader.get_upload_target().await.unwrap_err();

    match error {
        UploadError::Credential(message) => {
            assert!(message.contains("401"), "{message}");
            assert!(message.contains("bad key"), "{message}");
        }
        other => panic!("Expected credential error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_upload_url_failure_is_credential_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/b2api/v3/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "authorizationToken": "account-token",
            "apiInfo": { "storageApi": { "apiUrl": server.uri() } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b2api/v3/b2_get_upload_url"))
        .respond_with(ResponseTemplate::new(503).set_body_string("service_unavailable"))
        .mount(&server)
        .await;

    let uploader = B2Uploader::new(&create_config(&server)).unwrap();
    let error = uploader.get_upload_target().await.unwrap_err();

    assert_eq!(error.kind(), "credential_error");
    assert!(error.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_authorize_response_is_credential_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/b2api/v3/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "authorizationToken": "account-token"
        })))
        .mount(&server)
        .await;

    let uploader = B2Uploader::new(&create_config(&server)).unwrap();
    let error = uploader.get_upload_target().await.unwrap_err();

    assert!(matches!(error, UploadError::Credential(_)));
}

#[tokio::test]
async fn test_upload_server_error_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal_error"))
        .mount(&server)
        .await;

    let uploader = B2Uploader::new(&create_config(&server)).unwrap();
    let target = UploadTarget {
        endpoint: format!("{}/upload", server.uri()),
        token: "upload-token".to_string(),
    };

    let error = uploader
        .upload(&target, b"line\n".to_vec(), "logs/APP_20250101000000.log")
        .await
        .unwrap_err();

    match error {
        UploadError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal_error");
        }
        other => panic!("Expected rejected upload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_storage_is_transport_error() {
    let server = MockServer::start().await;
    let endpoint = format!("{}/upload", server.uri());
    drop(server);

    let uploader = B2Uploader::new(&UploaderConfig {
        timeout_seconds: 2,
        ..UploaderConfig::default()
    })
    .unwrap();
    let target = UploadTarget {
        endpoint,
        token: "upload-token".to_string(),
    };

    let error = uploader
        .upload(&target, b"line\n".to_vec(), "logs/APP_20250101000000.log")
        .await
        .unwrap_err();

    assert_eq!(error.kind(), "transport_error");
}
