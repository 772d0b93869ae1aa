/*!
Errors raised while removing the profile and signalling a reboot
*/

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Everything that can go wrong during profile removal.
///
/// Only [`ProfileError::DeletionDenied`] is fatal. The remaining variants come
/// from reboot signalling, which is best-effort and must never block removal
/// of the package.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    /// An owned profile file exists but could not be deleted.
    #[error("cannot remove profile {}: {source}", path.display())]
    DeletionDenied {
        /// The profile path that is still present.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// I/O error while writing reboot state.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The notifier path is missing or not executable.
    #[error("notifier {} is not an executable file", program.display())]
    NotifierUnavailable { program: PathBuf },

    /// The notifier could not be started.
    #[error("failed to run notifier {}: {source}", program.display())]
    NotifierSpawn { program: PathBuf, source: io::Error },

    /// The notifier ran and reported failure.
    #[error("notifier {} exited with {status}", program.display())]
    NotifierFailed { program: PathBuf, status: ExitStatus },

    /// Package names end up as lines in the reboot package list.
    #[error("invalid package name {0:?}: must be non-empty and contain no whitespace")]
    InvalidPackageName(String),
}

impl ProfileError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error must abort the removal and surface as a non-zero exit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeletionDenied { .. })
    }
}

/// Check that `name` can be stored as a single line in the reboot package list.
pub fn validate_package_name(name: &str) -> Result<(), ProfileError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(ProfileError::InvalidPackageName(name.to_string()));
    }
    Ok(())
}
