use crate::error::{CleanupError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    /// falseの場合はローカル保存を使わない（再起動で入力は消える）
    pub storage_enabled: bool,
    pub data_dir: Option<PathBuf>,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CleanupError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("cleanup-ocr").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_base_url: None,
            storage_enabled: true,
            data_dir: None,
            timeout_seconds: 120,
        }
    }

    pub fn get_api_url(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(url) = std::env::var("CLEANUP_API_URL") {
            if !url.trim().is_empty() {
                return Ok(url.trim().trim_end_matches('/').to_string());
            }
        }

        self.api_base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or(CleanupError::MissingApiUrl)
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        self.api_base_url = Some(url);
        self.save()
    }

    /// 保存先ディレクトリ（環境変数 → 設定 → OS標準のデータディレクトリ）
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("CLEANUP_DATA_DIR") {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| CleanupError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("cleanup-ocr"))
    }
}
