/*!
Package-owned AppArmor profile files
*/

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::ProfileError;

/// What happened to a single owned profile path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "path", rename_all = "snake_case")]
pub enum ProfileRemoval {
    Removed(PathBuf),
    AlreadyAbsent(PathBuf),
}

/// The fixed set of profile files installed by the package.
#[derive(Debug, Clone)]
pub struct OwnedProfiles {
    paths: Vec<PathBuf>,
}

impl OwnedProfiles {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Delete every owned profile.
    ///
    /// Every path is attempted even after a failure, the same way `rm -f`
    /// walks all of its operands. Missing files are fine. Any other failure
    /// is fatal and the first one is returned once all paths were tried.
    pub fn remove_all(&self) -> Result<Vec<ProfileRemoval>, ProfileError> {
        let mut removals = Vec::with_capacity(self.paths.len());
        let mut first_failure = None;

        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    info!("Removed AppArmor profile {:?}", path);
                    removals.push(ProfileRemoval::Removed(path.clone()));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Profile {:?} already absent", path);
                    removals.push(ProfileRemoval::AlreadyAbsent(path.clone()));
                }
                Err(e) => {
                    error!("Failed to remove profile {:?}: {}", path, e);
                    if first_failure.is_none() {
                        first_failure = Some(ProfileError::DeletionDenied {
                            path: path.clone(),
                            source: e,
                        });
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(removals),
        }
    }
}
