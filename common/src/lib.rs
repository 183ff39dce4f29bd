//! Cleanup OCR Common Library
//!
//! CLIと将来のフロントエンドで共有される型と純粋なロジック（I/Oなし）

pub mod types;
pub mod numeric;
pub mod model;
pub mod aggregate;
pub mod export;
pub mod schema;
pub mod error;
pub mod parser;

pub use types::{
    Category, CleanupData, Field, FieldStatus, FieldValue, ImageResult, OcrForm,
    SubmissionRecord, UploadFile, UploadPayload, UploadResponse,
};
pub use numeric::{numeric_value, parse_count};
pub use model::{apply_rows, flatten_rows, with_updated_image, FieldRow};
pub use aggregate::{aggregate, Aggregate, CategoryTotals};
pub use export::{build_export_request, ExportRequest};
pub use schema::{FormSchema, SchemaCategory, SchemaField};
pub use error::{Error, Result};
pub use parser::{file_name_from_content_disposition, parse_upload_response, DEFAULT_CSV_FILE_NAME};
