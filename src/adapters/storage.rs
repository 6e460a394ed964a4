use crate::domain::ports::FileSaver;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 寫到本機目錄，先寫暫存檔再改名
#[derive(Debug, Clone)]
pub struct LocalFileSaver {
    base_path: PathBuf,
}

impl LocalFileSaver {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl FileSaver for LocalFileSaver {
    async fn save_file(&self, filename: &str, content_type: &str, data: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let full_path = self.base_path.join(filename);
        let temp_path = self.base_path.join(format!("{}.part", filename));

        tracing::debug!(
            "Writing {} ({}, {} bytes)",
            full_path.display(),
            content_type,
            data.len()
        );

        let written = match tokio::fs::write(&temp_path, data).await {
            Ok(()) => tokio::fs::rename(&temp_path, &full_path).await,
            Err(e) => Err(e),
        };

        // 不論成功與否都不留下暫存檔
        if written.is_err() {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        written?;

        Ok(full_path.display().to_string())
    }
}

/// 存在記憶體裡，給 headless 測試與預覽用
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSaver {
    files: Arc<Mutex<HashMap<String, SavedFile>>>,
    order: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl MemoryFileSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, filename: &str) -> Option<SavedFile> {
        self.files.lock().await.get(filename).cloned()
    }

    pub async fn get_text(&self, filename: &str) -> Option<String> {
        self.get(filename)
            .await
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
    }

    /// 依存檔先後順序
    pub async fn filenames(&self) -> Vec<String> {
        self.order.lock().await.clone()
    }
}

impl FileSaver for MemoryFileSaver {
    async fn save_file(&self, filename: &str, content_type: &str, data: &[u8]) -> Result<String> {
        let mut files = self.files.lock().await;
        files.insert(
            filename.to_string(),
            SavedFile {
                content_type: content_type.to_string(),
                data: data.to_vec(),
            },
        );
        self.order.lock().await.push(filename.to_string());
        Ok(format!("memory://{}", filename))
    }
}
