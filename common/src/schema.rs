//! カテゴリ定義（フォームスキーマ）
//!
//! 取得時はフィールドが `{"name": ...}` と文字列のどちらでも来る。
//! 更新時は `{"name": ...}` 形式に揃えて送る。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// フィールド定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaField {
    Named { name: String },
    Bare(String),
}

impl SchemaField {
    pub fn name(&self) -> &str {
        match self {
            SchemaField::Named { name } => name,
            SchemaField::Bare(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaCategory {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

/// フォームスキーマ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub categories: Vec<SchemaCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl FormSchema {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// カテゴリ名・フィールド名が空でないことを確認
    pub fn validate(&self) -> Result<()> {
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(Error::Config("カテゴリ名が空です".into()));
            }
            if category.fields.iter().any(|f| f.name().trim().is_empty()) {
                return Err(Error::Config(format!(
                    "カテゴリ {} に空のフィールド名があります",
                    category.name
                )));
            }
        }
        Ok(())
    }

    /// 更新リクエスト用に正規化（`{"name"}` 形式、タイムスタンプなし）
    pub fn to_update_payload(&self) -> FormSchema {
        FormSchema {
            categories: self
                .categories
                .iter()
                .map(|c| SchemaCategory {
                    name: c.name.clone(),
                    fields: c
                        .fields
                        .iter()
                        .map(|f| SchemaField::Named {
                            name: f.name().to_string(),
                        })
                        .collect(),
                })
                .collect(),
            updated_at: None,
        }
    }

    pub fn field_count(&self) -> usize {
        self.categories.iter().map(|c| c.fields.len()).sum()
    }
}
