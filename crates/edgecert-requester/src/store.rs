//! Artifact store.
//!
//! Writes the provisioned credential set into the output directory. Every
//! artifact is first written to a temporary file next to its destination;
//! destinations are only replaced once all temporaries are on disk.

use std::collections::BTreeMap;
use std::fs::{self, DirBuilder, OpenOptions, Permissions};
use std::io::Write;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use edgecert_core::{ArtifactKind, ArtifactLayout};

use crate::error::ProvisioningError;

const DIR_MODE: u32 = 0o700;
const FILE_MODE: u32 = 0o600;

/// Contents of a complete credential set, keyed by artifact.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    contents: BTreeMap<ArtifactKind, String>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ArtifactKind, contents: impl Into<String>) -> &mut Self {
        self.contents.insert(kind, contents.into());
        self
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&str> {
        self.contents.get(&kind).map(String::as_str)
    }

    /// Artifacts that have not been provided yet.
    pub fn missing(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| !self.contents.contains_key(kind))
            .collect()
    }
}

/// Writes credential sets into an [`ArtifactLayout`].
pub struct ArtifactStore {
    layout: ArtifactLayout,
}

impl ArtifactStore {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Write every artifact of `set`, replacing previous ones.
    ///
    /// Fails without touching existing artifacts if the set is incomplete or
    /// any temporary file cannot be written.
    pub fn commit(&self, set: &ArtifactSet) -> Result<Vec<PathBuf>, ProvisioningError> {
        if let Some(kind) = set.missing().first() {
            return Err(ProvisioningError::Store {
                path: self.layout.path(*kind),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} was not provided", kind),
                ),
            });
        }

        self.prepare_dir()?;

        let mut staged = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            let target = self.layout.path(kind);
            let temp = temp_path(&target);
            let contents = set.get(kind).unwrap_or_default();
            if let Err(e) = write_private(&temp, contents.as_bytes()) {
                remove_staged(&staged);
                let _ = fs::remove_file(&temp);
                return Err(e);
            }
            staged.push((temp, target));
        }

        for (index, (temp, target)) in staged.iter().enumerate() {
            if let Err(source) = fs::rename(temp, target) {
                remove_staged(&staged[index..]);
                return Err(ProvisioningError::Store {
                    path: target.clone(),
                    source,
                });
            }
            debug!(path = %target.display(), "Artifact written");
        }

        Ok(staged.into_iter().map(|(_, target)| target).collect())
    }

    fn prepare_dir(&self) -> Result<(), ProvisioningError> {
        let dir = self.layout.dir();
        let store_err = |source| ProvisioningError::Store {
            path: dir.to_path_buf(),
            source,
        };

        // An existing directory is used as is.
        if dir.is_dir() {
            return Ok(());
        }

        DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(dir)
            .map_err(store_err)?;
        // Exact mode regardless of umask.
        fs::set_permissions(dir, Permissions::from_mode(DIR_MODE)).map_err(store_err)?;
        debug!(path = %dir.display(), "Output directory created");
        Ok(())
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.tmp", name))
}

fn write_private(path: &Path, contents: &[u8]) -> Result<(), ProvisioningError> {
    let store_err = |source| ProvisioningError::Store {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)
        .map_err(store_err)?;
    file.set_permissions(Permissions::from_mode(FILE_MODE))
        .map_err(store_err)?;
    file.write_all(contents).map_err(store_err)?;
    file.sync_all().map_err(store_err)
}

fn remove_staged(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(e) = fs::remove_file(temp) {
            warn!(path = %temp.display(), error = %e, "Failed to remove temporary artifact");
        }
    }
}
