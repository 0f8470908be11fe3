use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        std::fs::create_dir_all(temp_dir.path().join("config"))?;
        Ok(Self { temp_dir })
    }

    /// Working directory for the binary under test
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Isolated XDG config home so the user's own config is never read
    pub fn config_home(&self) -> PathBuf {
        self.temp_dir.path().join("config")
    }

    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
