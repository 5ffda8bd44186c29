//! File-based store backend
//!
//! Each item is one `<key>.json` file in a directory created with 0700
//! permissions. Files are written with 0600 permissions.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::{validate_key, SecureStore, StoreBackend};

/// File-based store
#[derive(Debug)]
pub struct FileStore {
    /// Directory holding one file per item
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store
    ///
    /// # Arguments
    ///
    /// * `base_path` - Directory where items will be stored
    pub fn new(base_path: &Path) -> StoreResult<Self> {
        // Create directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(base_path)?;

            // Set directory permissions to 0700 (owner only)
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = fs::Permissions::from_mode(0o700);
                fs::set_permissions(base_path, perms)?;
            }
        }

        if !base_path.is_dir() {
            return Err(StoreError::PermissionDenied(format!(
                "{} is not a directory",
                base_path.display()
            )));
        }

        Ok(Self {
            base_path: base_path.to_path_buf(),
        })
    }

    /// Directory backing this store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn item_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl SecureStore for FileStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.item_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(StoreError::PermissionDenied(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.item_path(key)?;

        // Write beside the target, then rename over it
        let tmp_path = path.with_extension("json.tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        // Owner-only from creation (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);
            // A leftover tmp file keeps its old mode; tighten it before writing
            if tmp_path.exists() {
                fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
            }
        }

        let mut file = options.open(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &path)?;
        debug!(key, path = %path.display(), "Stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        let path = self.item_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::File
    }
}
