use super::*;

// =============================================================================
// signing
// =============================================================================

#[test]
fn signing_payload_orders_params() {
    assert_eq!(signing_payload("avatar_1", 1_700_000_000), "public_id=avatar_1&timestamp=1700000000");
}

#[test]
fn sign_request_is_stable_hex() {
    let a = sign_request("public_id=x&timestamp=1", "secret");
    let b = sign_request("public_id=x&timestamp=1", "secret");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn sign_request_differs_per_secret_and_payload() {
    let base = sign_request("public_id=x&timestamp=1", "secret");
    assert_ne!(base, sign_request("public_id=x&timestamp=1", "other"));
    assert_ne!(base, sign_request("public_id=x&timestamp=2", "secret"));
}

// =============================================================================
// public_id_from_filename
// =============================================================================

#[test]
fn public_id_strips_extension_and_lowercases() {
    assert_eq!(public_id_from_filename("Family Photo.JPG"), "family_photo");
}

#[test]
fn public_id_collapses_separator_runs() {
    assert_eq!(public_id_from_filename("my--weird  name!!.png"), "my_weird_name");
}

#[test]
fn public_id_keeps_dotless_names() {
    assert_eq!(public_id_from_filename("avatar"), "avatar");
}

#[test]
fn public_id_falls_back_for_empty_stems() {
    assert_eq!(public_id_from_filename(".png"), "image");
    assert_eq!(public_id_from_filename("!!!.jpg"), "image");
}

// =============================================================================
// config / response parsing
// =============================================================================

#[test]
fn uploaded_image_parses_api_response() {
    let body = r#"{"secure_url":"https://res.example/img/a.jpg","public_id":"a","bytes":1234}"#;
    let parsed: UploadedImage = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.url, "https://res.example/img/a.jpg");
    assert_eq!(parsed.public_id, "a");
}

#[test]
fn upload_url_includes_cloud_name() {
    let uploader = CloudUploader::new(UploadConfig {
        cloud_name: "demo".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
    });
    assert_eq!(uploader.upload_url(), "https://api.cloudinary.com/v1_1/demo/image/upload");
}
