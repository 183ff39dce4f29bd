//! 提出データの作成とアップロード結果の取り込み

use crate::collaborators::UploadClient;
use crate::error::{CleanupError, Result};
use crate::scanner;
use crate::store::PersistentStore;
use cleanup_ocr_common::{CleanupData, SubmissionRecord};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// `key=value` 形式のメタデータを解析
///
/// 数値として読める値は数値、それ以外は文字列として保持する。
pub fn parse_metadata(pairs: &[String]) -> Result<CleanupData> {
    let mut data = CleanupData::new();

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CleanupError::Config(format!("key=value 形式ではありません: {}", pair)))?;

        let key = key.trim();
        if key.is_empty() {
            return Err(CleanupError::Config(format!("キーが空です: {}", pair)));
        }

        data.insert(key.to_string(), metadata_value(value.trim()));
    }

    Ok(data)
}

fn metadata_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(raw.to_string())
}

/// 新しい提出を開始（既存の進行中データは置き換える）
pub async fn start_submission(store: &PersistentStore, cleanup_data: CleanupData) -> SubmissionRecord {
    let record = SubmissionRecord::new(cleanup_data);
    store.put(&record).await;
    info!(fields = record.cleanup_data.len(), "提出データを作成");
    record
}

/// フォルダの画像をアップロードし、結果を提出データに取り込んで保存
///
/// アップロードに失敗した場合は保存データを変更しない。
pub async fn upload_folder(
    store: &PersistentStore,
    client: &dyn UploadClient,
    folder: &Path,
    fallback_metadata: CleanupData,
) -> Result<SubmissionRecord> {
    let base = match store.get().await {
        Some(record) => record,
        None => SubmissionRecord::new(fallback_metadata),
    };

    let payload = scanner::prepare_upload(folder, &base.cleanup_data)?;
    let results = client.upload(&payload).await?;

    let record = base.with_ocr_results(results);
    store.put(&record).await;

    info!(
        images = record.image_count(),
        issues = record.issue_count(),
        "アップロード結果を保存"
    );
    Ok(record)
}
