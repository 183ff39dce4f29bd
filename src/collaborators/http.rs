//! HTTPによる連携クライアント

use super::{CsvExport, ExportClient, SchemaClient, UploadClient};
use crate::config::Config;
use crate::error::{CleanupError, Result};
use async_trait::async_trait;
use cleanup_ocr_common::{
    file_name_from_content_disposition, parse_upload_response, ExportRequest, FormSchema,
    ImageResult, UploadPayload,
};
use reqwest::header::CONTENT_DISPOSITION;
use std::time::Duration;
use tracing::{debug, info};

const UPLOAD_PATH: &str = "/upload";
const GENERATE_CSV_PATH: &str = "/generate-csv";
const FORM_SCHEMA_PATH: &str = "/form-schema";
const HEALTH_PATH: &str = "/health";

/// エラー本文はこの文字数まで表示
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Clone)]
pub struct HttpCollaborator {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCollaborator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CleanupError::Config(format!("HTTPクライアントを作成できません: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.get_api_url()?,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 疎通確認
    pub async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(|e| CleanupError::collaborator(HEALTH_PATH, e))?;
        ensure_success(HEALTH_PATH, response).await?;
        Ok(())
    }
}

/// 2xx以外はステータスと本文の先頭をエラーにする
async fn ensure_success(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    Err(CleanupError::collaborator(
        endpoint,
        format!("HTTP {}: {}", status, body),
    ))
}

/// 2xxでも本文を解釈できなければ連携先エラー
fn decode_upload(body: &str) -> Result<Vec<ImageResult>> {
    parse_upload_response(body).map_err(|e| CleanupError::collaborator(UPLOAD_PATH, e))
}

fn decode_schema(body: &str) -> Result<FormSchema> {
    FormSchema::from_json(body).map_err(|e| CleanupError::collaborator(FORM_SCHEMA_PATH, e))
}

#[async_trait]
impl UploadClient for HttpCollaborator {
    async fn upload(&self, payload: &UploadPayload) -> Result<Vec<ImageResult>> {
        info!(files = payload.files.len(), "画像をアップロード");

        let response = self
            .client
            .post(self.url(UPLOAD_PATH))
            .json(payload)
            .send()
            .await
            .map_err(|e| CleanupError::collaborator(UPLOAD_PATH, e))?;
        let response = ensure_success(UPLOAD_PATH, response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| CleanupError::collaborator(UPLOAD_PATH, e))?;
        let results = decode_upload(&body)?;

        debug!(results = results.len(), "アップロード結果を受信");
        Ok(results)
    }
}

#[async_trait]
impl ExportClient for HttpCollaborator {
    async fn generate_csv(&self, request: &ExportRequest) -> Result<CsvExport> {
        let response = self
            .client
            .post(self.url(GENERATE_CSV_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| CleanupError::collaborator(GENERATE_CSV_PATH, e))?;
        let response = ensure_success(GENERATE_CSV_PATH, response).await?;

        let file_name = file_name_from_content_disposition(
            response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
        );
        let content = response
            .bytes()
            .await
            .map_err(|e| CleanupError::collaborator(GENERATE_CSV_PATH, e))?
            .to_vec();

        debug!(file_name = %file_name, bytes = content.len(), "CSVを受信");
        Ok(CsvExport { file_name, content })
    }
}

#[async_trait]
impl SchemaClient for HttpCollaborator {
    async fn fetch_schema(&self) -> Result<FormSchema> {
        let response = self
            .client
            .get(self.url(FORM_SCHEMA_PATH))
            .send()
            .await
            .map_err(|e| CleanupError::collaborator(FORM_SCHEMA_PATH, e))?;
        let response = ensure_success(FORM_SCHEMA_PATH, response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| CleanupError::collaborator(FORM_SCHEMA_PATH, e))?;
        decode_schema(&body)
    }

    async fn update_schema(&self, schema: &FormSchema) -> Result<FormSchema> {
        schema.validate()?;

        let response = self
            .client
            .put(self.url(FORM_SCHEMA_PATH))
            .json(&schema.to_update_payload())
            .send()
            .await
            .map_err(|e| CleanupError::collaborator(FORM_SCHEMA_PATH, e))?;
        let response = ensure_success(FORM_SCHEMA_PATH, response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| CleanupError::collaborator(FORM_SCHEMA_PATH, e))?;
        decode_schema(&body)
    }
}
