//! 提出データの変換（I/Oなし）
//!
//! - 画像1枚の差し替え（他の画像は共有したまま）
//! - レビュー用の行リストへの平坦化と、名前による書き戻し
//! - 旧形式JSONからの読み込み

use crate::error::{Error, Result};
use crate::types::{Field, ImageResult, SubmissionRecord};
use std::sync::Arc;

/// レビュー表の1行（カテゴリ名 + フィールド）
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub category: String,
    pub field: Field,
}

/// 指定位置の画像だけを差し替えたレコードを返す
///
/// 差し替え対象以外の画像は `Arc` を共有するので、`Arc::ptr_eq` で変更検出できる。
pub fn with_updated_image(
    record: &SubmissionRecord,
    index: usize,
    image: ImageResult,
) -> Result<SubmissionRecord> {
    let len = record.ocr_results.len();
    if index >= len {
        return Err(Error::OutOfRange { index, len });
    }

    let mut ocr_results = record.ocr_results.clone();
    ocr_results[index] = Arc::new(image);

    Ok(SubmissionRecord {
        cleanup_data: record.cleanup_data.clone(),
        ocr_results,
    })
}

/// カテゴリ順 → フィールド順で平坦化
pub fn flatten_rows(image: &ImageResult) -> Vec<FieldRow> {
    image
        .form
        .categories
        .iter()
        .flat_map(|category| {
            category.fields.iter().map(move |field| FieldRow {
                category: category.name.clone(),
                field: field.clone(),
            })
        })
        .collect()
}

/// 行リストの値・ステータスを画像のカテゴリ構造へ書き戻す
///
/// 位置ではなく (カテゴリ名, フィールド名) で対応付ける。同名が複数ある場合は
/// 出現順に1対1で割り当てる。対応する行が無いフィールドは元のまま。
pub fn apply_rows(image: &ImageResult, rows: &[FieldRow]) -> ImageResult {
    let mut used = vec![false; rows.len()];
    let mut updated = image.clone();

    for category in &mut updated.form.categories {
        for field in &mut category.fields {
            let found = rows.iter().enumerate().position(|(i, row)| {
                !used[i] && row.category == category.name && row.field.name == field.name
            });
            if let Some(i) = found {
                used[i] = true;
                field.value = rows[i].field.value.clone();
                field.status = rows[i].field.status;
            }
        }
    }

    updated
}

impl SubmissionRecord {
    /// 旧形式（単一JSON）から読み込み
    pub fn from_legacy_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MigrationParse(e.to_string()))
    }
}
