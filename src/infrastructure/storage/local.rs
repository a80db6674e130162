use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

/// Local directory holding recorded videos, one sub-directory per request id.
#[derive(Clone, Debug)]
pub struct VideoStorage {
    root: PathBuf,
}

impl VideoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!("📁 Videos directory ready at {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output directory for a single recording.
    pub fn job_dir(&self, request_id: &str) -> PathBuf {
        self.root.join(request_id)
    }

    /// First `.webm` file in a recording's output directory.
    pub async fn find_artifact(&self, request_id: &str) -> io::Result<Option<PathBuf>> {
        let dir = self.job_dir(request_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_webm = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("webm"));
            if is_webm && entry.file_type().await?.is_file() {
                found.push(path);
            }
        }
        // read_dir order is platform dependent
        found.sort();
        Ok(found.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_webm_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let storage = VideoStorage::new(dir.path());
        assert_eq!(storage.find_artifact("job").await.unwrap(), None);

        let job_dir = storage.job_dir("job");
        std::fs::create_dir_all(&job_dir).unwrap();
        std::fs::write(job_dir.join("notes.txt"), b"x").unwrap();
        assert_eq!(storage.find_artifact("job").await.unwrap(), None);

        std::fs::write(job_dir.join("b.webm"), b"x").unwrap();
        std::fs::write(job_dir.join("a.webm"), b"x").unwrap();
        assert_eq!(
            storage.find_artifact("job").await.unwrap(),
            Some(job_dir.join("a.webm"))
        );
    }
}
