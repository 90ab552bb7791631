use super::*;
use std::path::PathBuf;

// =============================================================================
// MockStore
// =============================================================================

struct MockStore {
    result: Result<UploadResponse, ()>,
}

impl MockStore {
    fn ok(download_url: &str) -> Self {
        Self {
            result: Ok(UploadResponse {
                download_url: download_url.into(),
                filename: None,
                size_bytes: None,
                expires_in: None,
                message: None,
            }),
        }
    }

    fn failing() -> Self {
        Self { result: Err(()) }
    }
}

#[async_trait::async_trait]
impl FileStore for MockStore {
    async fn upload(&self, _path: &Path) -> Result<UploadResponse, UploadError> {
        match &self.result {
            Ok(response) => Ok(response.clone()),
            Err(()) => Err(UploadError::Status { status: 500, body: "boom".into() }),
        }
    }
}

fn conversation() -> Conversation {
    Conversation::new(5, "test")
}

// =============================================================================
// handle_file_upload
// =============================================================================

#[tokio::test]
async fn success_sets_pending_image_on_all_conversations() {
    let store = MockStore::ok("/files/abc.png");
    let mut first = conversation();
    let mut second = conversation();

    let response = handle_file_upload(&store, Some(&PathBuf::from("cat.png")), [&mut first, &mut second])
        .await
        .unwrap();

    assert_eq!(response.unwrap().download_url, "/files/abc.png");
    assert_eq!(first.pending_image(), Some("/files/abc.png"));
    assert_eq!(second.pending_image(), Some("/files/abc.png"));
}

#[tokio::test]
async fn failure_leaves_pending_image_unchanged() {
    let store = MockStore::failing();

    // Previously unset stays unset.
    let mut unset = conversation();
    let result = handle_file_upload(&store, Some(&PathBuf::from("cat.png")), [&mut unset]).await;
    assert!(result.is_err());
    assert!(unset.pending_image().is_none());

    // Previously set stays set.
    let mut set = conversation();
    set.set_pending_image(Some("/files/old.png".into()));
    let result = handle_file_upload(&store, Some(&PathBuf::from("cat.png")), [&mut set]).await;
    assert!(result.is_err());
    assert_eq!(set.pending_image(), Some("/files/old.png"));
}

#[tokio::test]
async fn no_file_clears_pending_image() {
    let store = MockStore::failing(); // never called
    let mut target = conversation();
    target.set_pending_image(Some("/files/old.png".into()));

    let response = handle_file_upload(&store, None, [&mut target]).await.unwrap();
    assert!(response.is_none());
    assert!(target.pending_image().is_none());
}

// =============================================================================
// RemoteFileStore — local failure paths
// =============================================================================

#[tokio::test]
async fn unreadable_file_is_an_io_error() {
    let store = RemoteFileStore::new(reqwest::Client::new(), "http://files.invalid/upload/".into());
    let err = store
        .upload(Path::new("/nonexistent/upload.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/upload.png"));
}

#[tokio::test]
async fn unresolvable_host_is_a_request_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.png");
    tokio::fs::write(&path, b"fake png bytes").await.unwrap();

    let store = RemoteFileStore::new(
        reqwest::Client::new(),
        "http://chatarena-test.invalid/upload/".into(),
    );
    let err = store.upload(&path).await.unwrap_err();
    assert!(matches!(err, UploadError::Request(_)));
}
