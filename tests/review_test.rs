//! レビューセッションの統合テスト
//!
//! 画像間の移動・保存・再読み込みを実際のSQLiteストアで検証

use cleanup_ocr_common::{
    Category, CleanupData, Field, FieldStatus, FieldValue, ImageResult, OcrForm, SubmissionRecord,
};
use cleanup_ocr_rust::review::{Liveness, ReviewSession};
use cleanup_ocr_rust::store::PersistentStore;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn image(uuid: &str, bottles: i64, status: FieldStatus) -> ImageResult {
    ImageResult {
        uuid: uuid.to_string(),
        image: String::new(),
        form: OcrForm {
            categories: vec![
                Category {
                    name: "Plastics".into(),
                    fields: vec![Field {
                        name: "Bottles".into(),
                        value: FieldValue::Int(bottles),
                        status,
                    }],
                },
                Category {
                    name: "Metal".into(),
                    fields: vec![Field {
                        name: "Cans".into(),
                        value: FieldValue::Int(1),
                        status: FieldStatus::Confident,
                    }],
                },
            ],
        },
    }
}

async fn store_with(images: Vec<ImageResult>) -> (TempDir, PersistentStore) {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = PersistentStore::open_at(dir.path()).unwrap();
    let record = SubmissionRecord::new(CleanupData::new()).with_ocr_results(images);
    store.put(&record).await;
    (dir, store)
}

fn three_images() -> Vec<ImageResult> {
    vec![
        image("a", 1, FieldStatus::Confident),
        image("b", 2, FieldStatus::NeedsValidation),
        image("c", 3, FieldStatus::Confident),
    ]
}

/// 移動は両端で止まる
#[tokio::test]
async fn test_go_to_clamps_at_edges() {
    let (_dir, store) = store_with(three_images()).await;
    let mut session = ReviewSession::open(store, &Liveness::new()).await;

    session.go_to(-1).await.unwrap();
    assert_eq!(session.current_index(), 0);

    session.go_to(10).await.unwrap();
    assert_eq!(session.current_index(), 2);
    assert_eq!(session.snapshot().uuid.as_deref(), Some("c"));

    session.go_to(isize::MIN).await.unwrap();
    assert_eq!(session.current_index(), 0);
}

/// 修正は移動時に保存され、再読み込み後も残る
#[tokio::test]
async fn test_edits_persist_across_navigation() {
    let (_dir, store) = store_with(three_images()).await;
    let mut session = ReviewSession::open(store.clone(), &Liveness::new()).await;

    session.go_to(1).await.unwrap();
    session.on_field_focused(0).unwrap();
    session.set_field_value(0, "25").unwrap();
    session.go_to(1).await.unwrap();

    let saved = store.get().await.unwrap();
    let edited = &saved.ocr_results[1].form.categories[0].fields[0];
    assert_eq!(edited.value, FieldValue::Int(25));
    assert_eq!(edited.status, FieldStatus::Confident);

    // 他の画像の同名フィールドは変わらない
    let bottles = |index: usize| saved.ocr_results[index].form.categories[0].fields[0].value.clone();
    assert_eq!(bottles(0), FieldValue::Int(1));
    assert_eq!(bottles(2), FieldValue::Int(3));

    // 戻ると修正後の値が表示される
    session.go_to(-1).await.unwrap();
    assert_eq!(session.rows()[0].field.value, FieldValue::Int(25));

    let saved = store.get().await.unwrap();
    assert_eq!(saved.ocr_results[0].form.categories[0].fields[0].value, FieldValue::Int(1));
    assert_eq!(saved.ocr_results[2].form.categories[0].fields[0].value, FieldValue::Int(3));
}

/// 保存時に他の画像は同じ実体を共有する
#[tokio::test]
async fn test_commit_shares_untouched_images() {
    let (_dir, store) = store_with(three_images()).await;
    let mut session = ReviewSession::open(store, &Liveness::new()).await;

    let before: Vec<Arc<ImageResult>> = session.record().unwrap().ocr_results.clone();
    session.set_field_value(1, "9").unwrap();
    session.commit().await.unwrap();

    let after = &session.record().unwrap().ocr_results;
    assert!(!Arc::ptr_eq(&before[0], &after[0]));
    assert!(Arc::ptr_eq(&before[1], &after[1]));
    assert!(Arc::ptr_eq(&before[2], &after[2]));
    assert_eq!(after[0].form.categories[1].fields[0].value, FieldValue::Int(9));
}

/// 確認済みのフィールドは開いても変わらない
#[tokio::test]
async fn test_focus_keeps_confident_status() {
    let (_dir, store) = store_with(three_images()).await;
    let mut session = ReviewSession::open(store, &Liveness::new()).await;

    session.on_field_focused(0).unwrap();
    assert_eq!(session.rows()[0].field.status, FieldStatus::Confident);
}

/// 画像が減った場合はインデックスを収め直す
#[tokio::test]
async fn test_reload_after_shrink_reclamps() {
    let (_dir, store) = store_with(three_images()).await;
    let liveness = Liveness::new();
    let mut session = ReviewSession::open(store.clone(), &liveness).await;
    session.go_to(2).await.unwrap();

    let shrunk = SubmissionRecord::new(CleanupData::new())
        .with_ocr_results(vec![image("a", 1, FieldStatus::Confident)]);
    store.put(&shrunk).await;
    assert!(session.reload(&liveness).await);
    assert_eq!(session.current_index(), 0);

    store.clear().await;
    assert!(session.reload(&liveness).await);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.image_count(), 0);
    assert!(session.rows().is_empty());
}

/// 破棄後に完了した読み込みは反映しない
#[tokio::test]
async fn test_stale_reload_is_discarded() {
    let (_dir, store) = store_with(three_images()).await;
    let liveness = Liveness::new();
    let mut session = ReviewSession::open(store.clone(), &liveness).await;

    store.clear().await;
    liveness.tear_down();

    assert!(!session.reload(&liveness).await);
    assert_eq!(session.image_count(), 3);
}

/// 画像が無い場合の移動と保存は何もしない
#[tokio::test]
async fn test_empty_session_navigation() {
    let mut session = ReviewSession::new(PersistentStore::unavailable());
    session.go_to(1).await.unwrap();
    session.commit().await.unwrap();
    assert_eq!(session.current_index(), 0);
    assert!(session.snapshot().uuid.is_none());
}

/// 生存確認なしの読み込みでも保存済みのデータから始まる
#[tokio::test]
async fn test_load_starts_from_persisted_record() {
    let (_dir, store) = store_with(three_images()).await;
    let session = ReviewSession::load(store).await;

    assert_eq!(session.image_count(), 3);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.snapshot().uuid.as_deref(), Some("a"));
    assert_eq!(session.rows().len(), 2);
}
