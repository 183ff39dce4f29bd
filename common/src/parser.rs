//! 連携レスポンスのパーサー
//!
//! - アップロード連携のレスポンスJSON
//! - CSV出力連携の `Content-Disposition` ヘッダー

use crate::error::Result;
use crate::types::{ImageResult, UploadResponse};
use regex::Regex;

/// ファイル名が取れない場合のCSVファイル名
pub const DEFAULT_CSV_FILE_NAME: &str = "cleanup_data.csv";

/// アップロードレスポンスをパース
///
/// `{"results": [...]}` 形式と、配列だけの形式の両方を受け付ける。
pub fn parse_upload_response(body: &str) -> Result<Vec<ImageResult>> {
    let trimmed = body.trim();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }
    let response: UploadResponse = serde_json::from_str(trimmed)?;
    Ok(response.results)
}

/// `Content-Disposition` からファイル名を取り出す
///
/// # Examples
/// ```
/// use cleanup_ocr_common::file_name_from_content_disposition;
///
/// let name = file_name_from_content_disposition(Some(r#"attachment; filename="a.csv""#));
/// assert_eq!(name, "a.csv");
/// assert_eq!(file_name_from_content_disposition(None), "cleanup_data.csv");
/// ```
pub fn file_name_from_content_disposition(header: Option<&str>) -> String {
    lazy_static::lazy_static! {
        static ref QUOTED_RE: Regex = Regex::new(r#"(?i)filename\s*=\s*"([^"]*)""#).unwrap();
        static ref BARE_RE: Regex = Regex::new(r"(?i)filename\s*=\s*([^;\s]+)").unwrap();
    }

    let Some(header) = header else {
        return DEFAULT_CSV_FILE_NAME.to_string();
    };

    let raw = QUOTED_RE
        .captures(header)
        .or_else(|| BARE_RE.captures(header))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    // パス区切りを除去してファイル名部分のみ使う
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();

    if name.is_empty() || name == "." || name == ".." {
        DEFAULT_CSV_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}
