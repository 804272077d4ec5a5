use std::{io::ErrorKind, marker::PhantomData, path::{Path, PathBuf}, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON document persisted as a whole file.
///
/// The file is the source of truth: every call re-reads it, nothing is cached.
/// A single mutex per store serializes read-modify-write cycles, and writes go
/// through a sibling temp file that is renamed over the target.
pub struct JsonFileStore<T> {
    file_path: PathBuf,
    lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    /// Initialize the store from a path. Creates the file with an empty document if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let store = Self { file_path, lock: Mutex::new(()), _doc: PhantomData };
        if let Err(e) = fs::metadata(&store.file_path).await {
            if e.kind() != ErrorKind::NotFound {
                return Err(e.into());
            }
            debug!(path = %store.file_path.display(), "creating empty document");
            store.save(&T::default()).await?;
        }
        Ok(Arc::new(store))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the whole document. An absent or blank file reads as `T::default()`.
    pub async fn read(&self) -> Result<T, ServiceError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Read, apply `f`, and write back while holding the store lock.
    ///
    /// When `f` fails nothing is written.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<R, ServiceError> + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }

    async fn load(&self) -> Result<T, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&bytes)
            .map_err(|source| ServiceError::Corrupt { path: self.file_path.clone(), source })
    }

    async fn save(&self, doc: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(ServiceError::Encode)?;
        let tmp = self.tmp_path();
        if let Err(e) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{prefix}_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn new_creates_empty_document() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_new");
        let store = JsonFileStore::<Vec<String>>::new(&tmp).await?;
        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "[]");
        assert!(store.read().await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_persists_and_reloads() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_update");
        let store = JsonFileStore::<Vec<String>>::new(&tmp).await?;

        let len = store
            .update(|v| {
                v.push("a".into());
                v.push("b".into());
                Ok(v.len())
            })
            .await?;
        assert_eq!(len, 2);

        // a second store over the same file sees the data
        let reloaded = JsonFileStore::<Vec<String>>::new(&tmp).await?;
        assert_eq!(reloaded.read().await?, vec!["a".to_string(), "b".to_string()]);
        assert!(tokio::fs::metadata(store.tmp_path()).await.is_err());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_file_untouched() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_fail");
        let store = JsonFileStore::<Vec<String>>::new(&tmp).await?;
        store.update(|v| { v.push("keep".into()); Ok(()) }).await?;
        let before = tokio::fs::read(&tmp).await?;

        let res = store
            .update(|v| -> Result<(), ServiceError> {
                v.clear();
                Err(ServiceError::not_found("nope"))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, before);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_document() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_write_err");
        let store = JsonFileStore::<Vec<String>>::new(&tmp).await?;
        store.update(|v| { v.push("old".into()); Ok(()) }).await?;
        let before = tokio::fs::read(&tmp).await?;

        // a directory squatting on the temp path makes the write fail
        tokio::fs::create_dir(store.tmp_path()).await?;
        let res = store.update(|v| { v.push("new".into()); Ok(()) }).await;
        assert!(matches!(res, Err(ServiceError::Io(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, before);
        assert_eq!(store.read().await?, vec!["old".to_string()]);

        tokio::fs::remove_dir(store.tmp_path()).await?;
        store.update(|v| { v.push("new".into()); Ok(()) }).await?;
        assert!(tokio::fs::metadata(store.tmp_path()).await.is_err());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn blank_file_reads_as_default() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_blank");
        tokio::fs::write(&tmp, "  \n").await?;
        let store = JsonFileStore::<Vec<String>>::new(&tmp).await?;
        assert!(store.read().await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn garbage_is_reported_as_corrupt() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_corrupt");
        tokio::fs::write(&tmp, "{not json").await?;
        let store = JsonFileStore::<Vec<String>>::new(&tmp).await?;
        assert!(matches!(store.read().await, Err(ServiceError::Corrupt { .. })));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() -> Result<(), anyhow::Error> {
        let tmp = tmp_file("json_file_store_concurrent");
        let store = JsonFileStore::<Vec<u32>>::new(&tmp).await?;

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update(move |v| { v.push(i); Ok(()) }).await
            }));
        }
        for h in handles {
            h.await??;
        }
        let mut all = store.read().await?;
        all.sort_unstable();
        assert_eq!(all, (0..16).collect::<Vec<_>>());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
