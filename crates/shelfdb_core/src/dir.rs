//! Collection directory management.
//!
//! This module handles the file system layout of a collection:
//!
//! ```text
//! <store_root>/<store_name>/<collection>/
//! ├─ <id>.sds            # One file per record
//! ├─ <collection>.sdx    # Index file
//! └─ *.tmp               # In-flight writes, renamed into place
//! ```
//!
//! Every write goes to a temporary file first and is renamed over the
//! target, so readers see either the old or the new content of a file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Extension of record files.
pub const RECORD_EXTENSION: &str = "sds";

/// Extension of index files.
pub const INDEX_EXTENSION: &str = "sdx";

/// Extension of temporary files used for write-then-rename.
const TEMP_EXTENSION: &str = "tmp";

/// Filesystem view of a single collection.
#[derive(Debug, Clone)]
pub struct CollectionDir {
    /// Collection directory.
    path: PathBuf,
    /// Collection name, also the index file stem.
    name: String,
    /// Permission bits for created directories.
    dir_mode: u32,
    /// Permission bits for created files.
    file_mode: u32,
}

impl CollectionDir {
    /// Describes the collection `name` under the store directory `root`.
    ///
    /// Nothing is touched on disk until [`CollectionDir::create`].
    pub fn new(root: &Path, name: &str, dir_mode: u32, file_mode: u32) -> Self {
        Self {
            path: root.join(name),
            name: name.to_string(),
            dir_mode,
            file_mode,
        }
    }

    /// Returns the collection directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the directory tree. An existing directory is not an error.
    pub fn create(&self) -> io::Result<()> {
        create_dir_all(&self.path, self.dir_mode)
    }

    /// Returns the path of the record file for `id`.
    #[must_use]
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.path.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Returns the path of the index file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.path.join(format!("{}.{INDEX_EXTENSION}", self.name))
    }

    /// Checks if a record file exists for `id`.
    #[must_use]
    pub fn record_exists(&self, id: &str) -> bool {
        self.record_path(id).is_file()
    }

    /// Reads the record file for `id`.
    pub fn read_record(&self, id: &str) -> io::Result<Vec<u8>> {
        fs::read(self.record_path(id))
    }

    /// Replaces the record file for `id` with `data`.
    pub fn write_record(&self, id: &str, data: &[u8]) -> io::Result<()> {
        self.write_atomic(&self.record_path(id), data)
    }

    /// Removes the record file for `id`.
    pub fn remove_record(&self, id: &str) -> io::Result<()> {
        fs::remove_file(self.record_path(id))
    }

    /// Reads the index file.
    pub fn read_index(&self) -> io::Result<Vec<u8>> {
        fs::read(self.index_path())
    }

    /// Replaces the index file with `data`.
    pub fn write_index(&self, data: &[u8]) -> io::Result<()> {
        self.write_atomic(&self.index_path(), data)
    }

    /// Lists the ids of all record files, sorted.
    ///
    /// Subdirectories, the index file and temporary files are skipped.
    pub fn record_ids(&self) -> io::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Write-then-rename so readers never observe a half-written file.
    fn write_atomic(&self, target: &Path, data: &[u8]) -> io::Result<()> {
        let mut temp = target.as_os_str().to_owned();
        temp.push(".");
        temp.push(TEMP_EXTENSION);
        let temp = PathBuf::from(temp);

        let mut file = open_for_write(&temp, self.file_mode)?;
        if let Err(err) = file.write_all(data).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&temp);
            return Err(err);
        }
        drop(file);

        fs::rename(&temp, target)
    }
}

/// Checks that `id` can be used as a record file stem.
pub fn validate_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("id must not be empty".into());
    }
    if id == "." || id == ".." {
        return Err(format!("id {id:?} is reserved"));
    }
    if id.contains(['/', '\\', '\0']) {
        return Err(format!("id {id:?} contains a path separator"));
    }
    Ok(())
}

#[cfg(unix)]
pub(crate) fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
pub(crate) fn create_dir_all(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn open_for_write(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_dir(temp: &TempDir) -> CollectionDir {
        let dir = CollectionDir::new(temp.path(), "users", 0o700, 0o600);
        dir.create().unwrap();
        dir
    }

    #[test]
    fn layout_paths() {
        let temp = TempDir::new().unwrap();
        let dir = test_dir(&temp);

        assert_eq!(dir.path(), temp.path().join("users"));
        assert_eq!(dir.record_path("42"), temp.path().join("users/42.sds"));
        assert_eq!(dir.index_path(), temp.path().join("users/users.sdx"));
    }

    #[test]
    fn create_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = test_dir(&temp);
        dir.create().unwrap();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn write_read_remove_record() {
        let temp = TempDir::new().unwrap();
        let dir = test_dir(&temp);

        assert!(!dir.record_exists("a"));
        dir.write_record("a", b"first").unwrap();
        dir.write_record("a", b"second").unwrap();
        assert!(dir.record_exists("a"));
        assert_eq!(dir.read_record("a").unwrap(), b"second");

        dir.remove_record("a").unwrap();
        assert!(!dir.record_exists("a"));
        let err = dir.read_record("a").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn record_ids_skip_other_entries() {
        let temp = TempDir::new().unwrap();
        let dir = test_dir(&temp);

        dir.write_record("b", b"2").unwrap();
        dir.write_record("a", b"1").unwrap();
        dir.write_index(b"index").unwrap();
        fs::write(dir.path().join("c.sds.tmp"), b"partial").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.sds")).unwrap();

        assert_eq!(dir.record_ids().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let dir = test_dir(&temp);
        dir.write_record("a", b"1").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.sds")]);
    }

    #[cfg(unix)]
    #[test]
    fn applies_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = test_dir(&temp);
        dir.write_record("a", b"1").unwrap();

        let mode = fs::metadata(dir.record_path("a")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn id_validation() {
        assert!(validate_id("user-1").is_ok());
        assert!(validate_id("a.b").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("..").is_err());
        assert!(validate_id("a/b").is_err());
        assert!(validate_id("a\\b").is_err());
    }
}
