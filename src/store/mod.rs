//! 進行中の提出データのローカル保存
//!
//! 固定キー1つに `SubmissionRecord` を丸ごと保存する。
//! ストレージが使えない環境（設定で無効・オープン失敗）では全操作が何もしない成功になり、
//! `get` は常に `None` を返す。実行時のストレージエラーはここでログに出して握りつぶす。

pub mod legacy;
pub mod sqlite;

pub use legacy::{LegacyFileStore, LEGACY_OCR_RESULTS_KEY, LEGACY_SUBMISSION_KEY};
pub use sqlite::SqliteEngine;

use crate::config::Config;
use crate::error::{CleanupError, Result};
use cleanup_ocr_common::SubmissionRecord;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 提出データの保存キー
pub const CURRENT_SUBMISSION_KEY: &str = "current";

const DB_FILE_NAME: &str = "submission.db";

/// トランザクション付きキー・バリュー保存エンジン
///
/// 各メソッドはそれぞれ1つのトランザクションで完結すること。
pub trait KvEngine: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// 旧形式データの読み出し元
pub trait LegacyStore: Send + Sync + 'static {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct PersistentStore {
    engine: Option<Arc<dyn KvEngine>>,
    legacy: Option<Arc<dyn LegacyStore>>,
}

impl PersistentStore {
    pub fn new(engine: Arc<dyn KvEngine>, legacy: Option<Arc<dyn LegacyStore>>) -> Self {
        Self {
            engine: Some(engine),
            legacy,
        }
    }

    /// 保存なしで動くストア
    pub fn unavailable() -> Self {
        Self {
            engine: None,
            legacy: None,
        }
    }

    /// 設定に従って開く。開けない場合は保存なしで続行する
    pub fn open(config: &Config) -> Self {
        if !config.storage_enabled {
            info!("ローカル保存は無効に設定されています");
            return Self::unavailable();
        }

        match config.data_dir().and_then(|dir| Self::open_at(&dir)) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "ローカル保存を開けません。保存なしで続行します");
                Self::unavailable()
            }
        }
    }

    /// データディレクトリ配下のSQLiteと旧形式ファイルを使う
    pub fn open_at(dir: &Path) -> Result<Self> {
        let engine = SqliteEngine::open(&dir.join(DB_FILE_NAME))?;
        Ok(Self::new(
            Arc::new(engine),
            Some(Arc::new(LegacyFileStore::new(dir))),
        ))
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// レコードを丸ごと上書き保存
    pub async fn put(&self, record: &SubmissionRecord) {
        absorb("put", self.try_put(record).await);
    }

    /// 保存結果を呼び出し側で判断する場合の `put`
    async fn try_put(&self, record: &SubmissionRecord) -> Result<()> {
        let Some(engine) = self.engine.clone() else {
            return Ok(());
        };
        let json = serde_json::to_string(record)?;
        blocking(move || engine.put(CURRENT_SUBMISSION_KEY, &json)).await
    }

    /// レコードを取得（無ければ旧形式データからの移行を試す）
    pub async fn get(&self) -> Option<SubmissionRecord> {
        let engine = self.engine.clone()?;

        let stored = absorb("get", blocking(move || engine.get(CURRENT_SUBMISSION_KEY)).await)
            .flatten();

        match stored {
            Some(json) => match serde_json::from_str(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "保存済みの提出データを読み込めません");
                    None
                }
            },
            None => self.migrate_legacy().await,
        }
    }

    /// レコードを削除（何度呼んでも同じ）
    pub async fn clear(&self) {
        let Some(engine) = self.engine.clone() else {
            return;
        };
        let result = blocking(move || engine.delete(CURRENT_SUBMISSION_KEY)).await;
        absorb("clear", result);
    }

    /// 旧形式のキーを両方削除
    pub async fn clear_legacy(&self) {
        let Some(legacy) = self.legacy.clone() else {
            return;
        };
        let result = blocking(move || {
            legacy.remove(LEGACY_SUBMISSION_KEY)?;
            legacy.remove(LEGACY_OCR_RESULTS_KEY)
        })
        .await;
        absorb("clear_legacy", result);
    }

    async fn migrate_legacy(&self) -> Option<SubmissionRecord> {
        let legacy = self.legacy.clone()?;

        let reader = legacy.clone();
        let blob = absorb(
            "legacy_read",
            blocking(move || reader.read(LEGACY_SUBMISSION_KEY)).await,
        )
        .flatten()?;

        let record = match SubmissionRecord::from_legacy_json(&blob) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "旧形式データを読み込めないため移行を中止します");
                return None;
            }
        };

        // 保存できなかった場合は旧形式データを残し、次回の読み込みで再度移行する
        if absorb("migrate_put", self.try_put(&record).await).is_none() {
            return Some(record);
        }
        let result = blocking(move || legacy.remove(LEGACY_SUBMISSION_KEY)).await;
        absorb("legacy_remove", result);

        info!(images = record.image_count(), "旧形式データを移行しました");
        Some(record)
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CleanupError::Storage(e.to_string()))?
}

fn absorb<T>(op: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => {
            debug!(op, "ストレージ操作完了");
            Some(value)
        }
        Err(e) => {
            warn!(op, error = %e, "ストレージ操作に失敗しました（無視して続行）");
            None
        }
    }
}
