use super::*;

#[test]
fn parse_target_accepts_known_values() {
    assert_eq!(parse_target("direct"), Some(Target::Direct));
    assert_eq!(parse_target("battle"), Some(Target::Battle));
}

#[test]
fn parse_target_rejects_unknown_values() {
    assert_eq!(parse_target("both"), None);
    assert_eq!(parse_target(""), None);
    assert_eq!(parse_target("Direct"), None);
}

#[test]
fn upload_result_serializes_null_when_cleared() {
    let cleared = serde_json::to_value(UploadResult { download_url: None }).unwrap();
    assert_eq!(cleared, serde_json::json!({ "download_url": null }));

    let set = serde_json::to_value(UploadResult {
        download_url: Some("/files/abc.png".into()),
    })
    .unwrap();
    assert_eq!(set, serde_json::json!({ "download_url": "/files/abc.png" }));
}
