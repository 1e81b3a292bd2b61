//! Persisted installation identifier.
//!
//! Contributions carry a random identifier that stays the same across runs
//! of one installation. It is stored as a single line in the data directory.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use uuid::Uuid;

use crate::error::ContributionError;

/// File name of the identifier inside the data directory.
pub const INSTALLATION_ID_FILE: &str = "installation-id";

/// Random per-installation identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstallationId(Uuid);

impl InstallationId {
    /// Read the identifier stored at `path`, creating and storing a fresh one
    /// when the file is missing or does not hold a valid UUID.
    pub fn load_or_create(path: &Path) -> Result<Self, ContributionError> {
        match fs::read_to_string(path) {
            Ok(content) => match Uuid::parse_str(content.trim()) {
                Ok(id) => return Ok(Self(id)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "replacing malformed installation id");
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ContributionError::Identity {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        let id = Self(Uuid::new_v4());
        id.store(path)?;
        tracing::info!(path = %path.display(), "created installation id");
        Ok(id)
    }

    /// Write the identifier through a temp file and rename.
    fn store(&self, path: &Path) -> Result<(), ContributionError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(io_error(&temp_path))?;
        writeln!(file, "{}", self.0).map_err(io_error(&temp_path))?;
        file.sync_all().map_err(io_error(&temp_path))?;
        fs::rename(&temp_path, path).map_err(io_error(path))?;
        Ok(())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ContributionError {
    let path = path.to_path_buf();
    move |source| ContributionError::Identity { path, source }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
