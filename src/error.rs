use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIのURLが設定されていません。`cleanup-ocr config --set-api-url URL` で設定してください")]
    MissingApiUrl,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("画像が多すぎます: 最大{max}枚 ({count}枚)")]
    TooManyImages { count: usize, max: usize },

    /// ストレージ内部のエラー（PersistentStoreの外には出さない）
    #[error("ストレージエラー: {0}")]
    Storage(String),

    #[error("提出するデータがありません")]
    NoSubmissionData,

    #[error("連携先エラー ({endpoint}): {message}")]
    Collaborator { endpoint: String, message: String },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] cleanup_ocr_common::Error),
}

impl CleanupError {
    pub fn collaborator(endpoint: impl Into<String>, message: impl ToString) -> Self {
        CleanupError::Collaborator {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}

impl From<rusqlite::Error> for CleanupError {
    fn from(err: rusqlite::Error) -> Self {
        CleanupError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CleanupError>;
