use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::error::Result;

pub const ARTIFACT_EXTENSION: &str = "zwo";

/// Local directory of rendered `.zwo` files, one per session.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(format!("{filename}.{ARTIFACT_EXTENSION}"))
    }

    /// Writes the artifact, replacing any previous file of the same name.
    ///
    /// Creates the directory on first use.
    pub fn write(&self, filename: &str, contents: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let path = self.path_for(filename);
        fs::write(&path, contents)?;
        debug!("Wrote artifact: {}", path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path().join("zwo"));

        let path = store.write("2021-11-05_Nine_Hammers", "<workout_file/>").unwrap();

        assert_eq!(path, temp_dir.path().join("zwo/2021-11-05_Nine_Hammers.zwo"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<workout_file/>");
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp_dir.path());

        store.write("session", "first run").unwrap();
        let path = store.write("session", "second run").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "second run");
    }
}
