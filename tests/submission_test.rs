//! アップロード取り込みの統合テスト
//!
//! アップロード連携をモックに差し替えて、保存データへの反映と失敗時の保持を検証

use async_trait::async_trait;
use cleanup_ocr_common::{
    Category, CleanupData, Field, FieldStatus, FieldValue, ImageResult, OcrForm, SubmissionRecord,
    UploadPayload,
};
use cleanup_ocr_rust::collaborators::UploadClient;
use cleanup_ocr_rust::error::{CleanupError, Result};
use cleanup_ocr_rust::store::PersistentStore;
use cleanup_ocr_rust::submission;
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

/// 受け取ったペイロードを記録し、ファイルごとに結果を返すモック
#[derive(Default)]
struct MockUploadClient {
    last_payload: Mutex<Option<UploadPayload>>,
    fail: bool,
}

#[async_trait]
impl UploadClient for MockUploadClient {
    async fn upload(&self, payload: &UploadPayload) -> Result<Vec<ImageResult>> {
        *self.last_payload.lock().unwrap() = Some(payload.clone());

        if self.fail {
            return Err(CleanupError::collaborator("/upload", "HTTP 503"));
        }
        Ok(payload
            .files
            .iter()
            .map(|file| ocr_result(&file.uuid, FieldStatus::NeedsValidation))
            .collect())
    }
}

fn ocr_result(uuid: &str, status: FieldStatus) -> ImageResult {
    ImageResult {
        uuid: uuid.into(),
        image: String::new(),
        form: OcrForm {
            categories: vec![Category {
                name: "Plastics".into(),
                fields: vec![Field {
                    name: "Bottles".into(),
                    value: FieldValue::Int(4),
                    status,
                }],
            }],
        },
    }
}

fn write_images(dir: &Path) {
    std::fs::write(dir.join("card1.jpg"), b"one").unwrap();
    std::fs::write(dir.join("card2.png"), b"two").unwrap();
}

fn metadata(location: &str) -> CleanupData {
    let mut data = CleanupData::new();
    data.insert("location".into(), json!(location));
    data
}

/// 既存の活動情報を保ったままOCR結果を取り込む
#[tokio::test]
async fn test_upload_keeps_cleanup_data_and_replaces_results() {
    let data_dir = tempdir().expect("Failed to create temp dir");
    let images = tempdir().expect("Failed to create temp dir");
    write_images(images.path());

    let store = PersistentStore::open_at(data_dir.path()).unwrap();
    let previous = SubmissionRecord::new(metadata("North Beach"))
        .with_ocr_results(vec![ocr_result("old", FieldStatus::Confident)]);
    store.put(&previous).await;

    let client = MockUploadClient::default();
    let record = submission::upload_folder(&store, &client, images.path(), metadata("ignored"))
        .await
        .unwrap();

    assert_eq!(record.cleanup_data, metadata("North Beach"));
    assert_eq!(record.image_count(), 2);
    assert!(record.ocr_results.iter().all(|r| r.uuid != "old"));
    assert_eq!(record.issue_count(), 2);
    assert_eq!(store.get().await, Some(record));

    let payload = client.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.files.len(), 2);
    assert_eq!(payload.metadata, r#"{"location":"North Beach"}"#);
}

/// 提出データが無い場合は指定の活動情報で作成する
#[tokio::test]
async fn test_upload_without_record_uses_fallback_metadata() {
    let data_dir = tempdir().expect("Failed to create temp dir");
    let images = tempdir().expect("Failed to create temp dir");
    write_images(images.path());

    let store = PersistentStore::open_at(data_dir.path()).unwrap();
    let client = MockUploadClient::default();

    let record = submission::upload_folder(&store, &client, images.path(), metadata("South Pier"))
        .await
        .unwrap();

    assert_eq!(record.cleanup_data, metadata("South Pier"));
    assert_eq!(store.get().await, Some(record));
}

/// アップロード失敗時は保存データを変更しない
#[tokio::test]
async fn test_upload_failure_leaves_record_unchanged() {
    let data_dir = tempdir().expect("Failed to create temp dir");
    let images = tempdir().expect("Failed to create temp dir");
    write_images(images.path());

    let store = PersistentStore::open_at(data_dir.path()).unwrap();
    let previous = SubmissionRecord::new(metadata("North Beach"))
        .with_ocr_results(vec![ocr_result("old", FieldStatus::Confident)]);
    store.put(&previous).await;

    let client = MockUploadClient {
        fail: true,
        ..Default::default()
    };
    let result = submission::upload_folder(&store, &client, images.path(), CleanupData::new()).await;

    assert!(matches!(result, Err(CleanupError::Collaborator { .. })));
    assert_eq!(store.get().await, Some(previous));
}

/// 画像が無いフォルダは送信しない
#[tokio::test]
async fn test_upload_empty_folder_makes_no_call() {
    let data_dir = tempdir().expect("Failed to create temp dir");
    let images = tempdir().expect("Failed to create temp dir");

    let store = PersistentStore::open_at(data_dir.path()).unwrap();
    let client = MockUploadClient::default();

    let result = submission::upload_folder(&store, &client, images.path(), CleanupData::new()).await;

    assert!(matches!(result, Err(CleanupError::NoImagesFound(_))));
    assert!(client.last_payload.lock().unwrap().is_none());
    assert_eq!(store.get().await, None);
}
