//! 一括提出（集計 → CSV出力連携 → ローカル保存の削除）

use crate::collaborators::{CsvExport, ExportClient};
use crate::error::{CleanupError, Result};
use crate::review::ReviewSession;
use crate::store::PersistentStore;
use cleanup_ocr_common::{aggregate, build_export_request, SubmissionRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Submitting,
}

/// 書き出し済みのCSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCsv {
    pub path: PathBuf,
    pub export: CsvExport,
}

pub struct ExportCoordinator {
    store: PersistentStore,
    client: Arc<dyn ExportClient>,
    state: ExportState,
}

impl ExportCoordinator {
    pub fn new(store: PersistentStore, client: Arc<dyn ExportClient>) -> Self {
        Self {
            store,
            client,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// 全画像の集計をCSV出力連携に送り、受け取ったCSVを `output_dir` に書き出す
    ///
    /// CSVの書き出しまで成功した場合のみローカル保存（旧形式のキーを含む）を削除する。
    /// 連携・書き出しのどちらで失敗しても保存データはそのまま残るので、再実行できる。
    pub async fn submit(
        &mut self,
        session: &mut ReviewSession,
        output_dir: &Path,
    ) -> Result<SubmittedCsv> {
        self.state = ExportState::Submitting;
        let result = self.run(session, output_dir).await;
        self.state = ExportState::Idle;
        result
    }

    async fn run(&self, session: &mut ReviewSession, output_dir: &Path) -> Result<SubmittedCsv> {
        session.commit().await?;

        let record = self.latest_record(session).await;
        let Some(record) = record.filter(|r| !r.is_empty()) else {
            warn!("提出するデータがないため中止");
            return Err(CleanupError::NoSubmissionData);
        };

        let totals = aggregate(&record.ocr_results);
        let request = build_export_request(&record.cleanup_data, &totals);

        let export = match self.client.generate_csv(&request).await {
            Ok(export) => export,
            Err(e) => {
                warn!(error = %e, "CSV出力に失敗（保存データは保持）");
                return Err(e);
            }
        };

        let path = match save_csv(&export, output_dir) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, dir = %output_dir.display(), "CSVを書き出せません（保存データは保持）");
                return Err(e);
            }
        };

        self.store.clear().await;
        self.store.clear_legacy().await;
        session.reset();

        info!(
            images = record.image_count(),
            categories = totals.len(),
            path = %path.display(),
            "提出完了"
        );
        Ok(SubmittedCsv { path, export })
    }

    /// 保存済みのレコードを正とする（保存が使えない環境ではメモリ上のもの）
    async fn latest_record(&self, session: &ReviewSession) -> Option<SubmissionRecord> {
        if self.store.is_available() {
            self.store.get().await
        } else {
            session.record().cloned()
        }
    }
}

/// CSVを出力ディレクトリに書き出す
pub fn save_csv(export: &CsvExport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&export.file_name);
    std::fs::write(&path, &export.content)?;
    Ok(path)
}
