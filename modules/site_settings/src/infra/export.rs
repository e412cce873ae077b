//! Export sink writing files into a directory

use crate::provider::export::ExportSink;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    async fn deliver(&self, file_name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating export dir {}", self.dir.display()))?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("writing export {}", path.display()))?;

        tracing::info!(path = %path.display(), bytes = contents.len(), "Settings exported");
        Ok(path)
    }
}
