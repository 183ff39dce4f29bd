//! 数値変換
//!
//! 解析できない値は 0 として扱う。フィールド編集と集計の両方でこの規則を使う。

use crate::types::FieldValue;

/// 文字列を件数として解釈する
///
/// 先頭の空白と符号を許し、続く数字列だけを読む（`"12abc"` → 12、`"3.9"` → 3）。
/// 数字が無い・桁あふれの場合は 0。
///
/// # Examples
/// ```
/// use cleanup_ocr_common::parse_count;
///
/// assert_eq!(parse_count("42"), 42);
/// assert_eq!(parse_count(" 7 bags"), 7);
/// assert_eq!(parse_count("abc"), 0);
/// ```
pub fn parse_count(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// フィールド値を集計用の数値に変換
pub fn numeric_value(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Int(n) => *n as f64,
        FieldValue::Float(n) if n.is_finite() => *n,
        FieldValue::Float(_) => 0.0,
        FieldValue::Text(s) => parse_count(s) as f64,
    }
}
