/*!
Pluggable reboot notification
*/

use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{debug, info, warn};
use userns_profile::{FileRebootState, ProfileError, RebootStateStore};

use crate::core::config::{NotifierConfig, NotifierPlugin, RebootConfig};

/// Trait for reboot notification plugins
pub trait RebootNotifier: Send {
    /// Name of the notifier
    fn name(&self) -> &'static str;

    /// Tell the host that `package` needs a reboot
    fn notify(&mut self, package: &str) -> Result<(), ProfileError>;
}

/// Outcome of one round of notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    pub delivered: Vec<String>,
    pub failed: Vec<NotifyFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyFailure {
    pub notifier: String,
    pub reason: String,
}

/// Runs every enabled notifier; a failing one never stops the others.
pub struct NotifierManager {
    notifiers: Vec<Box<dyn RebootNotifier>>,
}

impl NotifierManager {
    pub fn new(configs: &[NotifierConfig], reboot: &RebootConfig) -> Self {
        let mut notifiers: Vec<Box<dyn RebootNotifier>> = Vec::new();

        for config in configs {
            if !config.enabled {
                continue;
            }

            let notifier: Box<dyn RebootNotifier> = match &config.plugin {
                NotifierPlugin::RebootRequired => Box::new(StateStoreNotifier::new(
                    FileRebootState::new(&reboot.sentinel, &reboot.package_list),
                )),
                NotifierPlugin::UpdateNotifier { path } => {
                    Box::new(LegacyScriptNotifier::new(path.clone()))
                }
            };

            notifiers.push(notifier);
        }

        debug!("Initialized notifier manager with {} notifiers", notifiers.len());
        Self { notifiers }
    }

    #[cfg(test)]
    pub fn from_notifiers(notifiers: Vec<Box<dyn RebootNotifier>>) -> Self {
        Self { notifiers }
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Send the reboot notice through every notifier, logging failures.
    pub fn notify_all(&mut self, package: &str) -> NotifyReport {
        let mut report = NotifyReport::default();

        for notifier in &mut self.notifiers {
            match notifier.notify(package) {
                Ok(()) => {
                    debug!("Notifier {} delivered reboot notice for {}", notifier.name(), package);
                    report.delivered.push(notifier.name().to_string());
                }
                Err(e) => {
                    if matches!(e, ProfileError::NotifierUnavailable { .. }) {
                        debug!("Notifier {} skipped: {}", notifier.name(), e);
                    } else {
                        warn!("Notifier {} failed for {}: {}", notifier.name(), package, e);
                    }
                    report.failed.push(NotifyFailure {
                        notifier: notifier.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

/// Current mechanism: write the reboot state through a [`RebootStateStore`].
pub struct StateStoreNotifier<S> {
    store: S,
}

impl<S: RebootStateStore> StateStoreNotifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: RebootStateStore> RebootNotifier for StateStoreNotifier<S> {
    fn name(&self) -> &'static str {
        "reboot-required"
    }

    fn notify(&mut self, package: &str) -> Result<(), ProfileError> {
        self.store.mark_required(package)
    }
}

/// Legacy mechanism: update-notifier's `notify-reboot-required` script.
pub struct LegacyScriptNotifier {
    program: PathBuf,
}

impl LegacyScriptNotifier {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    fn is_executable(&self) -> bool {
        match std::fs::metadata(&self.program) {
            Ok(meta) => meta.is_file() && has_exec_bit(&meta),
            Err(_) => false,
        }
    }
}

#[cfg(unix)]
fn has_exec_bit(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_meta: &std::fs::Metadata) -> bool {
    true
}

impl RebootNotifier for LegacyScriptNotifier {
    fn name(&self) -> &'static str {
        "update-notifier"
    }

    fn notify(&mut self, _package: &str) -> Result<(), ProfileError> {
        if !self.is_executable() {
            return Err(ProfileError::NotifierUnavailable {
                program: self.program.clone(),
            });
        }

        let output = Command::new(&self.program)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProfileError::NotifierSpawn {
                program: self.program.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!("{}: {}", self.name(), line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!("{}: {}", self.name(), line);
        }

        if !output.status.success() {
            return Err(ProfileError::NotifierFailed {
                program: self.program.clone(),
                status: output.status,
            });
        }
        Ok(())
    }
}
