//! 画像ごとのレビューセッション
//!
//! 現在の画像のフィールドを平坦化した作業用の行リストを持ち、
//! 画像を移動する前に必ず書き戻して保存する。
//! `commit` と `go_to` は `&mut self` を取るため、保存中に移動が割り込むことはない。

pub mod interactive;

use crate::error::Result;
use crate::store::PersistentStore;
use cleanup_ocr_common::{
    apply_rows, flatten_rows, parse_count, with_updated_image, Error as CommonError, FieldRow,
    FieldStatus, FieldValue, ImageResult, SubmissionRecord,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 表示側が生きているかどうかのフラグ
///
/// 破棄後に完了した読み込み結果は反映しない。
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn tear_down(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// 表示用のスナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSnapshot {
    pub current_index: usize,
    pub image_count: usize,
    pub uuid: Option<String>,
    pub rows: Vec<FieldRow>,
    pub issue_count: usize,
}

pub struct ReviewSession {
    store: PersistentStore,
    record: Option<SubmissionRecord>,
    current_index: usize,
    rows: Vec<FieldRow>,
}

impl ReviewSession {
    /// 空のセッション
    pub fn new(store: PersistentStore) -> Self {
        Self {
            store,
            record: None,
            current_index: 0,
            rows: Vec::new(),
        }
    }

    /// ストアから読み込んでセッションを開始（破棄されない呼び出し側向け）
    pub async fn load(store: PersistentStore) -> Self {
        let mut session = Self::new(store);
        let loaded = session.store.get().await;
        session.apply_record(loaded);
        session
    }

    /// 表示側の生存を確認しながら読み込んでセッションを開始
    pub async fn open(store: PersistentStore, liveness: &Liveness) -> Self {
        let mut session = Self::new(store);
        session.reload(liveness).await;
        session
    }

    /// ストアから再読み込み
    ///
    /// 読み込み完了時に表示側が破棄済みなら結果を捨てて `false` を返す。
    pub async fn reload(&mut self, liveness: &Liveness) -> bool {
        let loaded = self.store.get().await;
        if !liveness.is_alive() {
            debug!("破棄済みのため読み込み結果を破棄");
            return false;
        }
        self.apply_record(loaded);
        true
    }

    /// メモリ上のレコードを差し替え（インデックスは範囲内に収め直す）
    pub fn apply_record(&mut self, record: Option<SubmissionRecord>) {
        self.record = record;
        let count = self.image_count();
        if count == 0 {
            self.current_index = 0;
        } else if self.current_index >= count {
            self.current_index = count - 1;
        }
        self.load_rows();
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn image_count(&self) -> usize {
        self.record.as_ref().map_or(0, |r| r.image_count())
    }

    pub fn rows(&self) -> &[FieldRow] {
        &self.rows
    }

    pub fn record(&self) -> Option<&SubmissionRecord> {
        self.record.as_ref()
    }

    pub fn current_image(&self) -> Option<&ImageResult> {
        self.record
            .as_ref()
            .and_then(|r| r.ocr_results.get(self.current_index))
            .map(|image| image.as_ref())
    }

    pub fn snapshot(&self) -> ReviewSnapshot {
        ReviewSnapshot {
            current_index: self.current_index,
            image_count: self.image_count(),
            uuid: self.current_image().map(|i| i.uuid.clone()),
            rows: self.rows.clone(),
            issue_count: self.rows.iter().filter(|r| r.field.status.is_flagged()).count(),
        }
    }

    /// 入力文字列を件数として設定（解析できなければ 0）
    pub fn set_field_value(&mut self, row: usize, raw_text: &str) -> Result<()> {
        let row = self.row_mut(row)?;
        row.field.value = FieldValue::Int(parse_count(raw_text));
        Ok(())
    }

    /// 要確認のフィールドを開いたら確認済みにする
    pub fn on_field_focused(&mut self, row: usize) -> Result<()> {
        let row = self.row_mut(row)?;
        if row.field.status.is_flagged() {
            row.field.status = FieldStatus::Confident;
        }
        Ok(())
    }

    /// 作業中の行を現在の画像へ書き戻して保存
    pub async fn commit(&mut self) -> Result<()> {
        let Some(record) = &self.record else {
            return Ok(());
        };
        let Some(current) = record.ocr_results.get(self.current_index) else {
            return Ok(());
        };

        let image = apply_rows(current, &self.rows);
        let updated = with_updated_image(record, self.current_index, image)?;
        self.store.put(&updated).await;
        self.record = Some(updated);

        debug!(index = self.current_index, "レビュー内容を保存");
        Ok(())
    }

    /// 保存してから移動（範囲外は端に丸める）
    pub async fn go_to(&mut self, delta: isize) -> Result<()> {
        self.commit().await?;

        let count = self.image_count();
        if count == 0 {
            self.current_index = 0;
            self.rows.clear();
            return Ok(());
        }

        let last = (count - 1) as isize;
        let target = (self.current_index as isize).saturating_add(delta).clamp(0, last) as usize;
        if target != self.current_index {
            self.current_index = target;
            self.load_rows();
        }

        debug!(index = self.current_index, count, "画像を移動");
        Ok(())
    }

    /// 提出完了後などにメモリ上の状態を初期化
    pub fn reset(&mut self) {
        self.record = None;
        self.current_index = 0;
        self.rows.clear();
    }

    fn load_rows(&mut self) {
        self.rows = self.current_image().map(flatten_rows).unwrap_or_default();
    }

    fn row_mut(&mut self, row: usize) -> Result<&mut FieldRow> {
        let len = self.rows.len();
        self.rows
            .get_mut(row)
            .ok_or_else(|| CommonError::OutOfRange { index: row, len }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanup_ocr_common::{Category, Field, OcrForm};

    fn image(uuid: &str, status: FieldStatus) -> ImageResult {
        ImageResult {
            uuid: uuid.to_string(),
            image: String::new(),
            form: OcrForm {
                categories: vec![Category {
                    name: "Plastics".into(),
                    fields: vec![Field {
                        name: "Bottles".into(),
                        value: FieldValue::Int(1),
                        status,
                    }],
                }],
            },
        }
    }

    fn session_with(images: Vec<ImageResult>) -> ReviewSession {
        let mut session = ReviewSession::new(PersistentStore::unavailable());
        session.apply_record(Some(SubmissionRecord::default().with_ocr_results(images)));
        session
    }

    #[test]
    fn test_set_field_value_parses_or_zero() {
        let mut session = session_with(vec![image("a", FieldStatus::Confident)]);
        session.set_field_value(0, "12").unwrap();
        assert_eq!(session.rows()[0].field.value, FieldValue::Int(12));

        session.set_field_value(0, "twelve").unwrap();
        assert_eq!(session.rows()[0].field.value, FieldValue::Int(0));
    }

    #[test]
    fn test_row_out_of_range() {
        let mut session = session_with(vec![image("a", FieldStatus::Confident)]);
        assert!(session.set_field_value(5, "1").is_err());
        assert!(session.on_field_focused(1).is_err());
    }

    #[test]
    fn test_focus_confirms_flagged_field() {
        let mut session = session_with(vec![image("a", FieldStatus::Error)]);
        session.on_field_focused(0).unwrap();
        assert_eq!(session.rows()[0].field.status, FieldStatus::Confident);
    }

    #[test]
    fn test_apply_record_reclamps_index() {
        let mut session = session_with(vec![
            image("a", FieldStatus::Confident),
            image("b", FieldStatus::Confident),
            image("c", FieldStatus::Confident),
        ]);
        session.current_index = 2;

        session.apply_record(Some(
            SubmissionRecord::default().with_ocr_results(vec![image("a", FieldStatus::Confident)]),
        ));
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.snapshot().uuid.as_deref(), Some("a"));

        session.apply_record(None);
        assert_eq!(session.current_index(), 0);
        assert!(session.rows().is_empty());
    }

    #[test]
    fn test_snapshot_issue_count() {
        let session = session_with(vec![image("a", FieldStatus::NeedsValidation)]);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.image_count, 1);
        assert_eq!(snapshot.issue_count, 1);
    }
}
