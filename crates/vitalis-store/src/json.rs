//! JSON file backend: one `<key>.json` file per key in a directory.
//!
//! Mirrors the phone's key-value storage, so bucket files can be copied
//! between the app and this host verbatim.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use vitalis_core::{error::VitalisError, shellexpand, traits::KeyValueStore};

/// Key-value store backed by a directory of files.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the storage directory.
    pub async fn open(path: &str) -> Result<Self, VitalisError> {
        let dir = PathBuf::from(shellexpand(path));
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            VitalisError::Storage(format!("failed to create {}: {e}", dir.display()))
        })?;
        info!("JSON storage opened at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, VitalisError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn tmp_path_for(&self, key: &str) -> Result<PathBuf, VitalisError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json.tmp")))
    }
}

/// Keys become file names, so only a safe character set is accepted.
fn validate_key(key: &str) -> Result<(), VitalisError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(VitalisError::Storage(format!("invalid storage key: {key:?}")))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, VitalisError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VitalisError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), VitalisError> {
        self.set_many(&[(key, value.to_string())]).await
    }

    async fn remove(&self, key: &str) -> Result<(), VitalisError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VitalisError::Storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    /// Stage every value in a temp file, then rename them all into place.
    ///
    /// A failed staging write leaves the existing files untouched. If a
    /// rename fails, keys already replaced get their previous content back
    /// and the remaining temp files are removed.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), VitalisError> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let (tmp, dest) = match (self.tmp_path_for(key), self.path_for(key)) {
                (Ok(tmp), Ok(dest)) => (tmp, dest),
                (Err(e), _) | (_, Err(e)) => {
                    discard(&staged).await;
                    return Err(e);
                }
            };
            if let Err(e) = tokio::fs::write(&tmp, value).await {
                // Include the failed path itself, it may be half-written.
                staged.push((tmp.clone(), dest));
                discard(&staged).await;
                return Err(VitalisError::Storage(format!(
                    "failed to write {}: {e}",
                    tmp.display()
                )));
            }
            staged.push((tmp, dest));
        }

        let mut previous: Vec<Option<String>> = Vec::with_capacity(staged.len());
        for (_, dest) in &staged {
            match tokio::fs::read_to_string(dest).await {
                Ok(content) => previous.push(Some(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => previous.push(None),
                Err(e) => {
                    discard(&staged).await;
                    return Err(VitalisError::Storage(format!(
                        "failed to read {}: {e}",
                        dest.display()
                    )));
                }
            }
        }

        for (i, (tmp, dest)) in staged.iter().enumerate() {
            if let Err(e) = tokio::fs::rename(tmp, dest).await {
                restore(&staged[..i], &previous[..i]).await;
                discard(&staged[i..]).await;
                return Err(VitalisError::Storage(format!(
                    "failed to replace {}: {e}",
                    dest.display()
                )));
            }
        }
        debug!("json storage: wrote {} key(s)", staged.len());
        Ok(())
    }
}

async fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = tokio::fs::remove_file(tmp).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("json storage: failed to discard {}: {e}", tmp.display());
            }
        }
    }
}

/// Put back what `dest` held before this write (or remove it if it was new).
async fn restore(replaced: &[(PathBuf, PathBuf)], previous: &[Option<String>]) {
    for ((_, dest), before) in replaced.iter().zip(previous) {
        let result = match before {
            Some(content) => tokio::fs::write(dest, content).await,
            None => tokio::fs::remove_file(dest).await,
        };
        match result {
            Ok(()) => warn!("json storage: rolled back {}", dest.display()),
            Err(e) => error!("json storage: failed to roll back {}: {e}", dest.display()),
        }
    }
}
