//! Session storage backed by two files in a state directory.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::{debug, warn};

use crate::domain::ports::{SessionStorage, SessionStorageError, StoredSession};

use super::atomic_io::{read_if_present, remove_if_present, write_atomic};

/// File holding the raw credential token.
pub const TOKEN_ENTRY: &str = "token";

/// File holding the identity as JSON.
pub const USER_ENTRY: &str = "user";

/// Durable session storage rooted at a directory.
///
/// Each entry is replaced atomically. Saves and clears are serialised so the
/// two entries are never written by two callers at once.
#[derive(Debug)]
pub struct FileSessionStorage {
    dir: Dir,
    writes: Mutex<()>,
}

impl FileSessionStorage {
    /// Open `state_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStorageError::Read`] when the directory cannot be
    /// created or opened.
    pub fn open(state_dir: &Utf8Path) -> Result<Self, SessionStorageError> {
        Dir::create_ambient_dir_all(state_dir, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(state_dir, ambient_authority()))
            .map(Self::from_dir)
            .map_err(|err| SessionStorageError::read(state_dir.as_str(), err.to_string()))
    }

    /// Use an already opened directory.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            dir,
            writes: Mutex::new(()),
        }
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_entry(&self, entry: &str) -> Result<Option<String>, SessionStorageError> {
        read_if_present(&self.dir, Utf8Path::new(entry))
            .map_err(|err| SessionStorageError::read(entry, err.to_string()))
    }

    fn write_entry(&self, entry: &str, contents: &str) -> Result<(), SessionStorageError> {
        write_atomic(&self.dir, Utf8Path::new(entry), contents)
            .map_err(|err| SessionStorageError::write(entry, err.to_string()))
    }

    fn remove_entry(&self, entry: &str) -> io::Result<()> {
        remove_if_present(&self.dir, Utf8Path::new(entry))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<StoredSession, SessionStorageError> {
        Ok(StoredSession {
            token: self.read_entry(TOKEN_ENTRY)?,
            identity: self.read_entry(USER_ENTRY)?,
        })
    }

    fn save(&self, token: &str, identity: &str) -> Result<(), SessionStorageError> {
        let _guard = self.write_guard();
        self.write_entry(TOKEN_ENTRY, token)?;
        if let Err(error) = self.write_entry(USER_ENTRY, identity) {
            // The new token must not pair with the previous identity.
            for entry in [TOKEN_ENTRY, USER_ENTRY] {
                if let Err(cleanup) = self.remove_entry(entry) {
                    warn!(entry, error = %cleanup, "partial session entry not discarded");
                }
            }
            return Err(error);
        }
        debug!("session entries written");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        let _guard = self.write_guard();
        // Remove both even if the first removal fails.
        let token = self
            .remove_entry(TOKEN_ENTRY)
            .map_err(|err| SessionStorageError::remove(TOKEN_ENTRY, err.to_string()));
        let user = self
            .remove_entry(USER_ENTRY)
            .map_err(|err| SessionStorageError::remove(USER_ENTRY, err.to_string()));
        token.and(user)?;
        debug!("session entries removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for file-backed session entries.
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Scratch {
        _temp: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn scratch() -> Scratch {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("state")).expect("utf8 path");
        Scratch { _temp: temp, root }
    }

    #[rstest]
    fn empty_directory_loads_no_entries(scratch: Scratch) {
        let storage = FileSessionStorage::open(&scratch.root).expect("open");
        assert_eq!(storage.load().expect("load"), StoredSession::default());
    }

    #[rstest]
    fn failed_identity_write_discards_the_new_token(scratch: Scratch) {
        let storage = FileSessionStorage::open(&scratch.root).expect("open");
        storage
            .save("tok-a", r#"{"id":"1","username":"a","role":"admin"}"#)
            .expect("first save");
        // A non-empty directory in place of the identity entry blocks the rename.
        let user_path = scratch.root.join(USER_ENTRY);
        std::fs::remove_file(&user_path).expect("remove user entry");
        std::fs::create_dir(&user_path).expect("user dir");
        std::fs::write(user_path.join("keep"), "x").expect("blocker");

        let err = storage
            .save("tok-b", r#"{"id":"2","username":"b","role":"patient"}"#)
            .expect_err("identity write fails");

        assert!(matches!(err, SessionStorageError::Write { ref entry, .. } if entry == USER_ENTRY));
        assert!(!scratch.root.join(TOKEN_ENTRY).exists());
    }

    #[rstest]
    fn entries_survive_reopening(scratch: Scratch) {
        FileSessionStorage::open(&scratch.root)
            .expect("open")
            .save("tok-1", r#"{"id":"1","username":"a","role":"admin"}"#)
            .expect("save");

        let reopened = FileSessionStorage::open(&scratch.root).expect("reopen");
        let stored = reopened.load().expect("load");
        assert_eq!(stored.token.as_deref(), Some("tok-1"));
        assert!(stored.identity.is_some_and(|raw| raw.contains("\"admin\"")));
        assert_eq!(
            std::fs::read_to_string(scratch.root.join(TOKEN_ENTRY)).expect("token file"),
            "tok-1"
        );
    }

    #[rstest]
    fn clear_removes_both_entries_and_tolerates_absence(scratch: Scratch) {
        let storage = FileSessionStorage::open(&scratch.root).expect("open");
        storage.save("tok", "{}").expect("save");
        storage.clear().expect("clear");
        storage.clear().expect("second clear");
        assert_eq!(storage.load().expect("load"), StoredSession::default());
    }

    #[rstest]
    fn partial_entries_load_as_written(scratch: Scratch) {
        let storage = FileSessionStorage::open(&scratch.root).expect("open");
        std::fs::write(scratch.root.join(USER_ENTRY), "{}").expect("write user");
        let stored = storage.load().expect("load");
        assert!(stored.token.is_none());
        assert_eq!(stored.identity.as_deref(), Some("{}"));
    }
}
