//! 画像フォルダのスキャンとアップロード用ペイロードの組み立て

use crate::error::{CleanupError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cleanup_ocr_common::{CleanupData, UploadFile, UploadPayload};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 1回のアップロードで送れる最大枚数
pub const MAX_UPLOAD_FILES: usize = 100;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// 拡張子 → MIMEタイプ
fn mime_type_for(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(CleanupError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(mime_type) = path
            .extension()
            .and_then(|ext| mime_type_for(&ext.to_string_lossy()))
        else {
            continue;
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        images.push(ImageInfo {
            path: path.to_path_buf(),
            file_name,
            mime_type,
        });
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// フォルダ内の画像をBase64化してアップロード用ペイロードを作る
///
/// 各画像にはUUID v4を振る。メタデータはJSON文字列として同梱する。
pub fn prepare_upload(folder: &Path, metadata: &CleanupData) -> Result<UploadPayload> {
    let images = scan_folder(folder)?;

    if images.is_empty() {
        return Err(CleanupError::NoImagesFound(folder.display().to_string()));
    }
    if images.len() > MAX_UPLOAD_FILES {
        return Err(CleanupError::TooManyImages {
            count: images.len(),
            max: MAX_UPLOAD_FILES,
        });
    }

    let files = images
        .iter()
        .map(|image| -> Result<UploadFile> {
            let bytes = std::fs::read(&image.path)?;
            Ok(UploadFile {
                uuid: uuid::Uuid::new_v4().to_string(),
                name: image.file_name.clone(),
                mime_type: image.mime_type.to_string(),
                size: bytes.len() as u64,
                base64: STANDARD.encode(&bytes),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(UploadPayload {
        files,
        metadata: serde_json::to_string(metadata)?,
    })
}
