//! CSV出力連携のリクエスト生成

use crate::aggregate::Aggregate;
use crate::types::CleanupData;
use serde::{Deserialize, Serialize};

/// メタデータ1項目（値は文字列で送る）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportField {
    pub name: String,
    pub value: serde_json::Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportCategory {
    pub category: String,
    pub fields: Vec<ExportField>,
}

/// CSV生成リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub metadata: Vec<MetadataField>,
    #[serde(rename = "clean-up-data")]
    pub cleanup_data: Vec<ExportCategory>,
}

/// フォーム情報と集計結果からリクエストを組み立てる
pub fn build_export_request(cleanup_data: &CleanupData, totals: &Aggregate) -> ExportRequest {
    let metadata = cleanup_data
        .iter()
        .map(|(name, value)| MetadataField {
            name: name.clone(),
            value: metadata_value(value),
        })
        .collect();

    let cleanup_data = totals
        .iter()
        .map(|(category, fields)| ExportCategory {
            category: category.clone(),
            fields: fields
                .iter()
                .map(|(name, total)| ExportField {
                    name: name.clone(),
                    value: total_to_number(*total),
                })
                .collect(),
        })
        .collect();

    ExportRequest {
        metadata,
        cleanup_data,
    }
}

fn metadata_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 整数値は整数として、それ以外は小数として送る
fn total_to_number(total: f64) -> serde_json::Number {
    if total.fract() == 0.0 && total.abs() < i64::MAX as f64 {
        serde_json::Number::from(total as i64)
    } else {
        serde_json::Number::from_f64(total).unwrap_or_else(|| serde_json::Number::from(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryTotals;
    use serde_json::json;

    fn totals() -> Aggregate {
        let mut plastics = CategoryTotals::new();
        plastics.insert("Bottles".into(), 8.0);
        plastics.insert("Bags".into(), 1.5);
        let mut totals = Aggregate::new();
        totals.insert("Plastics".into(), plastics);
        totals
    }

    #[test]
    fn test_build_export_request_shape() {
        let mut data = CleanupData::new();
        data.insert("date".into(), json!("2024-06-01"));
        data.insert("volunteers".into(), json!(12));
        data.insert("notes".into(), serde_json::Value::Null);

        let request = build_export_request(&data, &totals());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "metadata": [
                    {"name": "date", "value": "2024-06-01"},
                    {"name": "volunteers", "value": "12"},
                    {"name": "notes", "value": ""}
                ],
                "clean-up-data": [
                    {"category": "Plastics", "fields": [
                        {"name": "Bottles", "value": 8},
                        {"name": "Bags", "value": 1.5}
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_build_export_request_empty() {
        let request = build_export_request(&CleanupData::new(), &Aggregate::new());
        assert!(request.metadata.is_empty());
        assert!(request.cleanup_data.is_empty());
    }

    #[test]
    fn test_total_to_number() {
        assert_eq!(total_to_number(8.0).as_i64(), Some(8));
        assert_eq!(total_to_number(-2.0).as_i64(), Some(-2));
        assert_eq!(total_to_number(0.5).as_f64(), Some(0.5));
    }
}
