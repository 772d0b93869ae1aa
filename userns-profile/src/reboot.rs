/*!
Host-wide "reboot required" state
*/

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::{ProfileError, validate_package_name};

/// Storage for the reboot-required flag and the list of packages asking for it.
///
/// Implementations never clear state; that belongs to the reboot itself.
pub trait RebootStateStore: Send {
    /// Create the sentinel if it is missing. An existing sentinel stays untouched.
    fn ensure_sentinel(&mut self) -> Result<(), ProfileError>;

    /// Add `package` to the list unless the exact line is already there.
    fn record_package(&mut self, package: &str) -> Result<(), ProfileError>;

    /// Flag the reboot for `package`.
    ///
    /// A failing sentinel does not stop the list update; the first failure is returned.
    fn mark_required(&mut self, package: &str) -> Result<(), ProfileError> {
        let sentinel = self.ensure_sentinel();
        let listed = self.record_package(package);
        sentinel.and(listed)
    }
}

/// The file-based convention read by update-notifier and friends.
#[derive(Debug, Clone)]
pub struct FileRebootState {
    sentinel: PathBuf,
    package_list: PathBuf,
}

impl FileRebootState {
    pub fn new(sentinel: impl Into<PathBuf>, package_list: impl Into<PathBuf>) -> Self {
        Self {
            sentinel: sentinel.into(),
            package_list: package_list.into(),
        }
    }
}

impl RebootStateStore for FileRebootState {
    fn ensure_sentinel(&mut self) -> Result<(), ProfileError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.sentinel)
        {
            Ok(_) => {
                info!("Created reboot sentinel {:?}", self.sentinel);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Reboot sentinel {:?} already present", self.sentinel);
                Ok(())
            }
            Err(e) => Err(ProfileError::io(
                format!("failed to create reboot sentinel {:?}", self.sentinel),
                e,
            )),
        }
    }

    fn record_package(&mut self, package: &str) -> Result<(), ProfileError> {
        validate_package_name(package)?;

        let existing = match fs::read_to_string(&self.package_list) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(ProfileError::io(
                    format!("failed to read reboot package list {:?}", self.package_list),
                    e,
                ));
            }
        };

        if existing.lines().any(|line| line == package) {
            debug!("{} already listed in {:?}", package, self.package_list);
            return Ok(());
        }

        let mut entry = String::with_capacity(package.len() + 2);
        if !existing.is_empty() && !existing.ends_with('\n') {
            entry.push('\n');
        }
        entry.push_str(package);
        entry.push('\n');

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.package_list)
            .and_then(|mut file| file.write_all(entry.as_bytes()))
            .map_err(|e| {
                ProfileError::io(
                    format!("failed to append to reboot package list {:?}", self.package_list),
                    e,
                )
            })?;

        info!("Added {} to {:?}", package, self.package_list);
        Ok(())
    }
}

/// Point-in-time view of a [`MemoryRebootState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebootSnapshot {
    pub sentinel: bool,
    pub packages: Vec<String>,
}

/// In-memory store for exercising the hook without touching the host.
///
/// Clones share state, so a test can keep one handle and give another away.
#[derive(Debug, Clone, Default)]
pub struct MemoryRebootState {
    inner: Arc<Mutex<RebootSnapshot>>,
}

impl MemoryRebootState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RebootSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RebootStateStore for MemoryRebootState {
    fn ensure_sentinel(&mut self) -> Result<(), ProfileError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sentinel = true;
        Ok(())
    }

    fn record_package(&mut self, package: &str) -> Result<(), ProfileError> {
        validate_package_name(package)?;
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.packages.iter().any(|p| p == package) {
            state.packages.push(package.to_string());
        }
        Ok(())
    }
}
