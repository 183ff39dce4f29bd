//! 提出データの型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - SubmissionRecord: 保存される唯一のエンティティ（フォーム情報 + 画像ごとの抽出結果）
//! - ImageResult: 画像1枚分の抽出結果
//! - UploadPayload / UploadResponse: アップロード連携の入出力

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// フォーム項目名 → 値（フォーム側の順序を保持）
pub type CleanupData = IndexMap<String, serde_json::Value>;

/// フィールドの値
///
/// 抽出サービスは文字列で返すことがあるため、数値と文字列の両方を受け付ける。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Int(0)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 抽出値の確信度ラベル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldStatus {
    #[default]
    Confident,
    NeedsValidation,
    Error,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Confident => "confident",
            FieldStatus::NeedsValidation => "needs-validation",
            FieldStatus::Error => "error",
        }
    }

    /// 要確認（needs-validation / error）かどうか
    pub fn is_flagged(&self) -> bool {
        matches!(self, FieldStatus::NeedsValidation | FieldStatus::Error)
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カウント項目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub status: FieldStatus,
}

/// カテゴリ（項目のグループ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// 画像1枚分のフォーム
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrForm {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// 画像1枚分の抽出結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    /// アップロード時に割り当てたID（再生成しない）
    pub uuid: String,
    /// 表示用の画像データ（base64）
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub form: OcrForm,
}

impl ImageResult {
    /// 要確認フィールドの件数
    pub fn issue_count(&self) -> usize {
        self.form
            .categories
            .iter()
            .flat_map(|c| c.fields.iter())
            .filter(|f| f.status.is_flagged())
            .count()
    }
}

/// 進行中の提出データ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(default)]
    pub cleanup_data: CleanupData,

    /// アップロード順を保持する
    #[serde(default)]
    pub ocr_results: Vec<Arc<ImageResult>>,
}

impl SubmissionRecord {
    pub fn new(cleanup_data: CleanupData) -> Self {
        Self {
            cleanup_data,
            ocr_results: Vec::new(),
        }
    }

    /// アップロード結果を設定した新しいレコードを返す
    pub fn with_ocr_results(&self, results: Vec<ImageResult>) -> Self {
        Self {
            cleanup_data: self.cleanup_data.clone(),
            ocr_results: results.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn image_count(&self) -> usize {
        self.ocr_results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ocr_results.is_empty()
    }

    /// 全画像の要確認フィールド件数
    pub fn issue_count(&self) -> usize {
        self.ocr_results.iter().map(|r| r.issue_count()).sum()
    }
}

/// アップロードする画像1件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFile {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub base64: String,
}

/// アップロード連携のリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPayload {
    pub files: Vec<UploadFile>,
    /// フォーム情報のJSON文字列
    pub metadata: String,
}

/// アップロード連携のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub results: Vec<ImageResult>,
}
