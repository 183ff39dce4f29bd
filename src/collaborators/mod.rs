//! 外部連携（アップロード・CSV出力・スキーマ）のポート定義
//!
//! 実装は `http` のHTTPクライアント。テストでは差し替える。

pub mod http;

pub use http::HttpCollaborator;

use crate::error::Result;
use async_trait::async_trait;
use cleanup_ocr_common::{ExportRequest, FormSchema, ImageResult, UploadPayload};

/// CSV出力連携の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[async_trait]
pub trait ExportClient: Send + Sync {
    async fn generate_csv(&self, request: &ExportRequest) -> Result<CsvExport>;
}

#[async_trait]
pub trait UploadClient: Send + Sync {
    async fn upload(&self, payload: &UploadPayload) -> Result<Vec<ImageResult>>;
}

#[async_trait]
pub trait SchemaClient: Send + Sync {
    async fn fetch_schema(&self) -> Result<FormSchema>;
    async fn update_schema(&self, schema: &FormSchema) -> Result<FormSchema>;
}
