use std::{io::ErrorKind, path::PathBuf};

use tokio::fs;

use crate::ResultEngine;

use super::SnapshotProvider;

/// Stores each key as `<dir>/<key>.json`.
///
/// The directory is created on the first write; a missing file reads as an
/// absent key.
#[derive(Clone, Debug)]
pub struct FileProvider {
    dir: PathBuf,
}

impl FileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotProvider for FileProvider {
    async fn load(&self, key: &str) -> ResultEngine<Option<String>> {
        match fs::read_to_string(self.path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, key: &str, value: &str) -> ResultEngine<()> {
        fs::create_dir_all(&self.dir).await?;
        let payload = match serde_json::from_str::<serde_json::Value>(value) {
            Ok(document) => serde_json::to_string_pretty(&document)?,
            Err(_) => value.to_string(),
        };
        fs::write(self.path(key), payload).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pocket_files_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn round_trips_documents_through_files() {
        let dir = scratch_dir();
        let provider = FileProvider::new(&dir);

        assert_eq!(provider.load("salary_data").await.unwrap(), None);

        provider
            .save("salary_data", r#"{"basic_salary":100}"#)
            .await
            .unwrap();
        assert!(dir.join("salary_data.json").exists());
        let loaded = provider.load("salary_data").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&loaded).unwrap();
        assert_eq!(value["basic_salary"], 100);

        provider.remove("salary_data").await.unwrap();
        provider.remove("salary_data").await.unwrap();
        assert_eq!(provider.load("salary_data").await.unwrap(), None);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
