use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    error::{AuthError, Result},
    types::TokenBundle,
};

pub const DEFAULT_CACHE_FILE: &str = "oauth_token.json";

/// File-backed store for the most recent [`TokenBundle`].
///
/// The handle carries its own path, so separate sessions (and tests) can use
/// separate files.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when there is no cache file. A file that exists but does
    /// not parse is reported as [`AuthError::CacheCorrupt`].
    pub async fn load(&self) -> Result<Option<TokenBundle>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::storage(&self.path, e)),
        };

        let bundle = serde_json::from_str(&content).map_err(|e| AuthError::CacheCorrupt {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(bundle))
    }

    /// Replaces the cached bundle. The JSON goes to a sibling temp file first
    /// and is renamed over the target, so readers never see a partial write.
    pub async fn save(&self, bundle: &TokenBundle) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::storage(parent, e))?;
        }

        let json = serde_json::to_string_pretty(bundle)
            .map_err(|e| AuthError::storage(&self.path, std::io::Error::other(e)))?;

        let tmp = self.temp_path();
        if let Err(e) = async_fs::write(&tmp, json).await {
            let _ = async_fs::remove_file(&tmp).await;
            return Err(AuthError::storage(&tmp, e));
        }
        if let Err(e) = async_fs::rename(&tmp, &self.path).await {
            let _ = async_fs::remove_file(&tmp).await;
            return Err(AuthError::storage(&self.path, e));
        }
        Ok(())
    }

    /// Deletes the cached bundle. Removing an absent cache is not an error.
    pub async fn invalidate(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::storage(&self.path, e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_CACHE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        TokenCache::new(DEFAULT_CACHE_FILE)
    }
}
