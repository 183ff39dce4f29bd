//! 集計ロジック
//!
//! 全画像のカテゴリ別・フィールド別の件数を合算し、出力用の1つのデータセットにする。

use crate::numeric::numeric_value;
use crate::types::ImageResult;
use indexmap::IndexMap;
use std::sync::Arc;

/// フィールド名 → 合計
pub type CategoryTotals = IndexMap<String, f64>;

/// カテゴリ名 → フィールド別合計（初出順）
pub type Aggregate = IndexMap<String, CategoryTotals>;

/// 画像リストを集計
///
/// カテゴリ名・フィールド名は大文字小文字を区別した完全一致でまとめる。
/// 出力の並びは初出順（ソートしない）。合計値は画像の順序に依存しない。
pub fn aggregate(images: &[Arc<ImageResult>]) -> Aggregate {
    let mut totals = Aggregate::new();

    for image in images {
        for category in &image.form.categories {
            let fields = totals.entry(category.name.clone()).or_default();
            for field in &category.fields {
                *fields.entry(field.name.clone()).or_insert(0.0) += numeric_value(&field.value);
            }
        }
    }

    totals
}
