//! Small JSON state files under the local state directory.
//!
//! This is the workstation's equivalent of browser local storage: one JSON document per key,
//! written whole. A missing file reads as `None`.

use crate::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(state_dir: &Path, filename: &str) -> Self {
        Self {
            path: state_dir.join(filename),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read<T: DeserializeOwned>(&self) -> CoreResult<Option<T>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::FileRead(e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(CoreError::Deserialization)
    }

    /// Write `value`, replacing any previous document.
    ///
    /// The document is written to a sibling temp file and renamed into place so a reader never
    /// sees a half-written file.
    pub fn write<T: Serialize>(&self, value: &T) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(CoreError::StateDirCreation)?;
        }
        let json = serde_json::to_string_pretty(value).map_err(CoreError::Serialization)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(CoreError::FileWrite)?;
        fs::rename(&tmp, &self.path).map_err(CoreError::FileWrite)
    }

    pub fn remove(&self) -> CoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::FileRemove(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path(), "absent.json");
        assert_eq!(file.read::<String>().unwrap(), None);
    }

    #[test]
    fn write_creates_state_dir_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(&dir.path().join("nested"), "value.json");

        file.write(&vec![1, 2, 3]).unwrap();

        assert_eq!(file.read::<Vec<i32>>().unwrap(), Some(vec![1, 2, 3]));
        assert!(!file.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path(), "value.json");
        file.write(&"x").unwrap();
        file.remove().unwrap();
        file.remove().unwrap();
        assert_eq!(file.read::<String>().unwrap(), None);
    }
}
