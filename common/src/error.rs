//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// 画像インデックスが範囲外（呼び出し側の契約違反）
    #[error("Index out of range: {index} (len {len})")]
    OutOfRange { index: usize, len: usize },

    /// 旧形式データの読み込み失敗
    #[error("Legacy data parse error: {0}")]
    MigrationParse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
