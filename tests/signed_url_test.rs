//! Signed URL generation through the public client API

mod common;

use common::{client, query_pairs, ACCESS_KEY, SECRET_KEY};
use hyper::Method;
use objstore::api::{
    RequestSigner, SignedUrl, SignedUrlKind, SignedUrlOptions, SignedUrlRequest, Visibility,
};
use objstore::StorageError;

/// Split a pre-signed URL into the signed path and its auth parameters
fn split_presigned(url: &str) -> (String, String, String) {
    let path_start = url.find("/api/").expect("api path");
    let full = &url[path_start..];
    let (signed, auth) = full.split_once("&access_key=").expect("access_key param");
    let pairs = query_pairs(&format!("?access_key={}", auth));

    let value = |name: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| urlencoding::decode(v).unwrap().into_owned())
            .unwrap()
    };
    (signed.to_string(), value("signature"), value("timestamp"))
}

#[tokio::test]
async fn test_upload_url() {
    let (client, transport) = client();

    let options = SignedUrlOptions::new()
        .with_bucket("b")
        .with_key("k")
        .with_visibility(Visibility::Private);
    let url = client
        .generate_signed_url_for("upload", &options)
        .await
        .unwrap()
        .into_url()
        .unwrap();

    assert!(url.starts_with(
        "https://api.objstore.io/api/v1/files/upload?bucket_name=b&region=us-east-1&key=k&visibility=private&access_key=test-access&signature="
    ));
    assert!(url.contains("&timestamp="));

    let (signed_path, signature, timestamp) = split_presigned(&url);
    assert!(!signature.is_empty());
    let signer = RequestSigner::new(ACCESS_KEY, SECRET_KEY);
    assert!(signer.verify("PUT", &signed_path, &timestamp, &signature));

    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_unknown_operation_type() {
    let (client, transport) = client();

    let err = client
        .generate_signed_url_for("invalid-type", &SignedUrlOptions::new().with_key("k"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UnsupportedOperation(_)));
    assert_eq!(err.to_string(), "Unsupported operation type: invalid-type");
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_missing_fields_per_operation() {
    let (client, transport) = client();

    let err = client
        .generate_signed_url_for("delete", &SignedUrlOptions::new().with_bucket("b"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "key is required for delete operation");

    let err = client
        .generate_signed_url_for(
            "start-multipart",
            &SignedUrlOptions::new().with_key("k").with_total_parts(3),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "mime_type is required for start-multipart operation");

    let err = client
        .generate_signed_url_for("uploadpart", &SignedUrlOptions::new().with_key("k"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upload_id is required for uploadpart operation");

    let err = client
        .generate_signed_url_for(
            "completemultipart",
            &SignedUrlOptions::new().with_upload_id("u"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "key is required for completemultipart operation");

    let err = client
        .generate_signed_url(&SignedUrlRequest::cancel_multipart("", "k"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "upload_id is required for cancelmultipart operation");

    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_every_url_variant() {
    let (client, transport) = client();

    let cases = [
        (
            SignedUrlRequest::delete("a b.txt"),
            "DELETE",
            "/api/v1/files/delete?bucket_name=default-bucket&region=us-east-1&key=a%20b.txt",
        ),
        (
            SignedUrlRequest::start_multipart("big.iso", 4, "application/x-iso9660-image", Visibility::Public),
            "POST",
            "/api/v1/files/multipart/start?bucket_name=default-bucket&region=us-east-1&key=big.iso&total_parts=4&mime_type=application%2Fx-iso9660-image&visibility=public",
        ),
        (
            SignedUrlRequest::upload_part("u-9", 2, "big.iso", 4).with_region("eu"),
            "POST",
            "/api/v1/files/multipart/u-9?bucket_name=default-bucket&region=eu&part_number=2&key=big.iso&total_parts=4",
        ),
        (
            SignedUrlRequest::complete_multipart("u-9", "big.iso"),
            "POST",
            "/api/v1/files/multipart/u-9/complete?bucket_name=default-bucket&region=us-east-1&key=big.iso",
        ),
        (
            SignedUrlRequest::cancel_multipart("u-9", "big.iso").with_bucket("other"),
            "DELETE",
            "/api/v1/files/multipart/u-9?bucket_name=other&region=us-east-1&key=big.iso",
        ),
    ];

    let signer = RequestSigner::new(ACCESS_KEY, SECRET_KEY);
    for (request, method, expected_path) in cases {
        assert_eq!(request.operation.method().as_str(), method);

        let url = client
            .generate_signed_url(&request)
            .await
            .unwrap()
            .into_url()
            .unwrap();
        let (signed_path, signature, timestamp) = split_presigned(&url);

        assert_eq!(signed_path, expected_path);
        assert!(signer.verify(method, &signed_path, &timestamp, &signature));
    }

    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_download_calls_server() {
    let (client, transport) = client();
    transport.respond(200, r#"{"url":"https://cdn.example/k?token=abc"}"#);

    let options = SignedUrlOptions::new()
        .with_bucket("b")
        .with_key("reports/q1.pdf")
        .with_expires_in(600);
    let result = client
        .generate_signed_url_for("download", &options)
        .await
        .unwrap();

    assert_eq!(result.url(), None);
    let response = match result {
        SignedUrl::Response(response) => response,
        SignedUrl::Url(url) => panic!("expected a server response, got {}", url),
    };
    assert_eq!(response.text(), r#"{"url":"https://cdn.example/k?token=abc"}"#);

    let request = transport.last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.path_and_query(),
        "/api/v1/files/signed-url?bucket_name=b&region=us-east-1&key=reports%2Fq1.pdf&expires_in=600"
    );
    assert_eq!(request.header("X-Access-Key"), Some(ACCESS_KEY));
    assert!(request.header("X-Signature").is_some());
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn test_download_default_expiry_and_error() {
    let (client, transport) = client();
    transport.respond(404, r#"{"message":"Not found"}"#);

    let request =
        SignedUrlRequest::from_tag("download", &SignedUrlOptions::new().with_key("gone")).unwrap();
    let err = client.generate_signed_url(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "API Error 404: Not found");

    assert!(transport
        .last()
        .path_and_query()
        .ends_with("&key=gone&expires_in=3600"));
}

#[test]
fn test_tags_round_trip() {
    for kind in SignedUrlKind::ALL {
        assert_eq!(kind.as_str().parse::<SignedUrlKind>().unwrap(), kind);
    }
    assert!("Upload".parse::<SignedUrlKind>().is_err());
}
