use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Content cache on the local filesystem, one directory per workspace.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Keeps a document title usable as a single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

impl Storage for LocalStorage {
    fn content_path(&self, workspace: &str, name: &str) -> PathBuf {
        let dir = if workspace.is_empty() {
            "default".to_string()
        } else {
            sanitize_file_name(workspace)
        };
        self.base_path.join(dir).join(sanitize_file_name(name))
    }

    async fn cached_len(&self, workspace: &str, name: &str) -> Option<u64> {
        let path = self.content_path(workspace, name);
        tokio::fs::metadata(&path)
            .await
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
    }

    async fn create_file(&self, workspace: &str, name: &str) -> Result<(PathBuf, tokio::fs::File)> {
        let full_path = self.content_path(workspace, name);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = tokio::fs::File::create(&full_path).await?;
        Ok((full_path, file))
    }
}
