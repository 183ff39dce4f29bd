//! 旧形式データ（単一JSONファイル）の読み出し
//!
//! 以前のバージョンは提出データを `<データディレクトリ>/<キー>.json` に
//! そのまま書き出していた。ここでは読み出しと削除だけを行う。

use super::LegacyStore;
use crate::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 移行対象のキー
pub const LEGACY_SUBMISSION_KEY: &str = "submission";

/// 提出完了時に削除するだけのキー（書き込まれた形跡なし）
pub const LEGACY_OCR_RESULTS_KEY: &str = "ocrResults";

pub struct LegacyFileStore {
    dir: PathBuf,
}

impl LegacyFileStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// キーに対応するファイルパス
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LegacyStore for LegacyFileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
