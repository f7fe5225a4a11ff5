use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
    engine::{executor::BlobStore, types::LibraryFile},
    error::{AppError, AppResult},
};

/// Stored queries kept as files directly inside one folder.
#[derive(Debug, Clone)]
pub struct FolderBlobStore {
    root: PathBuf,
}

impl FolderBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> AppResult<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(AppError::InvalidRequest(format!("invalid file name: {name}")));
        }
        Ok(self.root.join(name))
    }
}

/// A single normal path component: no separators, no `.`/`..`.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    let mut comps = Path::new(name).components();
    matches!((comps.next(), comps.next()), (Some(Component::Normal(_)), None))
        && !name.contains(['/', '\\'])
}

#[async_trait]
impl BlobStore for FolderBlobStore {
    async fn load(&self, name: &str) -> AppResult<Option<String>> {
        let path = self.path_for(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        let path = self.path_for(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(m) => Ok(m.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, name: &str, contents: &str) -> AppResult<()> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, contents).await?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "saved query file");
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<LibraryFile>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".sql") {
                files.push(LibraryFile { name, size: meta.len() });
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("suiteql-helper-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn plain_names_only() {
        assert!(is_plain_file_name("orders.sql"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../etc/passwd"));
        assert!(!is_plain_file_name("a/b.sql"));
        assert!(!is_plain_file_name("/abs.sql"));
    }

    #[tokio::test]
    async fn save_load_list_roundtrip() {
        let dir = scratch("roundtrip");
        let store = FolderBlobStore::new(&dir);

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.load("orders.sql").await.unwrap(), None);
        assert!(!store.exists("orders.sql").await.unwrap());

        store.save("orders.sql", "SELECT 1").await.unwrap();
        store.save("notes.txt", "ignored").await.unwrap();

        assert!(store.exists("orders.sql").await.unwrap());
        assert_eq!(store.load("orders.sql").await.unwrap().as_deref(), Some("SELECT 1"));
        assert_eq!(
            store.list().await.unwrap(),
            vec![LibraryFile {
                name: "orders.sql".into(),
                size: 8
            }]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let store = FolderBlobStore::new(scratch("traversal"));
        let err = store.load("../secret.sql").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
