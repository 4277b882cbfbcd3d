use crate::domain::ports::TokenStore;
use crate::utils::error::{DashError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 以 JSON 檔模擬 local storage：一個檔案裡存多組 key/value，token 放在指定 key 底下
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// 寫入前讀取現有內容；檔案無法解析時從空物件重新開始，回傳是否已重設
    async fn entries_for_write(&self) -> Result<(Map<String, Value>, bool)> {
        match self.read_entries().await {
            Ok(entries) => Ok((entries, false)),
            Err(DashError::SerializationError(e)) => {
                tracing::warn!(
                    "⚠️ Replacing unreadable token file {}: {}",
                    self.path.display(),
                    e
                );
                Ok((Map::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(&self.key)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    async fn save(&self, token: &str) -> Result<()> {
        let (mut entries, _) = self.entries_for_write().await?;
        entries.insert(self.key.clone(), Value::String(token.to_string()));
        self.write_entries(&entries).await?;
        tracing::debug!("Token saved under '{}' in {}", self.key, self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let (mut entries, reset) = self.entries_for_write().await?;
        if entries.remove(&self.key).is_some() || reset {
            self.write_entries(&entries).await?;
            tracing::debug!("Token removed from {}", self.path.display());
        }
        Ok(())
    }
}

/// 只存在記憶體中的 token，程式結束即消失
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
