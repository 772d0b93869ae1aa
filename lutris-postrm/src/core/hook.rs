/*!
Removal hook coordinator: probe, decide, remove, signal
*/

use std::path::Path;

use serde::Serialize;
use tracing::info;
use userns_profile::{HostMarkers, OwnedProfiles, ProfileError, ProfileRemoval};

use crate::core::{
    config::HookConfig,
    decision::{Action, SkipReason, decide_action},
    notifiers::{NotifierManager, NotifyReport},
};

/// Terminal state of a hook run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The host does not restrict user namespaces; nothing applies.
    SkippedNoFeature,
    /// The administrator opted out; their configuration is left alone.
    SkippedOverridden,
    /// Profiles are gone and the reboot notice went out on a best-effort basis.
    Removed {
        profiles: Vec<ProfileRemoval>,
        notifications: NotifyReport,
    },
}

/// The package removal hook.
pub struct RemovalHook {
    package: String,
    markers: HostMarkers,
    profiles: OwnedProfiles,
    notifiers: NotifierManager,
}

impl RemovalHook {
    pub fn new(config: &HookConfig) -> Self {
        let notifiers = NotifierManager::new(&config.notifiers, &config.reboot);
        Self::with_notifiers(config, notifiers)
    }

    /// Build a hook with a custom set of notifiers.
    pub fn with_notifiers(config: &HookConfig, notifiers: NotifierManager) -> Self {
        Self {
            package: config.package.name.clone(),
            markers: HostMarkers::new(&config.markers.feature, &config.markers.override_marker),
            profiles: OwnedProfiles::new(&config.profiles.paths),
            notifiers,
        }
    }

    /// Run the hook once.
    ///
    /// Only a failed profile deletion is returned as an error; in that case
    /// no reboot state has been written.
    pub fn run(&mut self) -> Result<Outcome, ProfileError> {
        let host = self.markers.probe();

        match decide_action(host.feature_present, host.override_present) {
            Action::Skip(SkipReason::FeatureAbsent) => {
                info!(
                    "AppArmor user namespace restriction not available ({:?} missing), nothing to do",
                    self.markers.feature
                );
                Ok(Outcome::SkippedNoFeature)
            }
            Action::Skip(SkipReason::OverridePresent) => {
                info!(
                    "Override marker {:?} present, keeping the administrator's profiles",
                    self.markers.override_marker
                );
                Ok(Outcome::SkippedOverridden)
            }
            Action::Remove => {
                let profiles = self.profiles.remove_all()?;
                let notifications = self.notifiers.notify_all(&self.package);
                info!(
                    "🧹 Removed {} profiles, reboot notice delivered by {} of {} notifiers",
                    profiles
                        .iter()
                        .filter(|p| matches!(p, ProfileRemoval::Removed(_)))
                        .count(),
                    notifications.delivered.len(),
                    self.notifiers.len()
                );
                Ok(Outcome::Removed {
                    profiles,
                    notifications,
                })
            }
        }
    }
}

/// Helper function to create a hook from a config file
pub fn create_hook_from_config_file<P: AsRef<Path>>(config_path: P) -> anyhow::Result<RemovalHook> {
    let config = HookConfig::from_file(config_path)?;
    Ok(RemovalHook::new(&config))
}

/// Helper function to create a hook with the built-in configuration
pub fn create_default_hook() -> RemovalHook {
    RemovalHook::new(&HookConfig::with_default_notifiers())
}
