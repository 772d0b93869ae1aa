/*!
Configuration for the removal hook
*/

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use userns_profile::validate_package_name;

/// Profile name shared by the packaged profile and its local override copy.
pub const PROFILE_NAME: &str = "lutris-bwrap-userns-restrict";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HookConfig {
    /// Package identity
    pub package: PackageConfig,
    /// Marker paths probed before removal
    pub markers: MarkerConfig,
    /// Profile files owned by the package
    pub profiles: ProfileConfig,
    /// Reboot-required state files
    pub reboot: RebootConfig,
    /// Reboot notification plugins, run in order
    pub notifiers: Vec<NotifierConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Name written to the reboot package list
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Exists when AppArmor restricts unprivileged user namespaces
    pub feature: PathBuf,
    /// Exists when the administrator opted out of profile removal
    pub override_marker: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RebootConfig {
    pub sentinel: PathBuf,
    pub package_list: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Notifier plugin type
    pub plugin: NotifierPlugin,
    /// Whether this notifier runs
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NotifierPlugin {
    /// Sentinel file plus package list under `[reboot]`
    RebootRequired,
    /// update-notifier's helper script
    UpdateNotifier { path: PathBuf },
}

fn enabled_by_default() -> bool {
    true
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "lutris".to_string(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            feature: PathBuf::from("/proc/sys/kernel/apparmor_restrict_unprivileged_userns"),
            override_marker: Path::new("/etc/apparmor.d/disable").join(PROFILE_NAME),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                Path::new("/etc/apparmor.d").join(PROFILE_NAME),
                Path::new("/etc/apparmor.d/local").join(PROFILE_NAME),
            ],
        }
    }
}

impl Default for RebootConfig {
    fn default() -> Self {
        Self {
            sentinel: PathBuf::from("/run/reboot-required"),
            package_list: PathBuf::from("/run/reboot-required.pkgs"),
        }
    }
}

impl HookConfig {
    /// Built-in configuration with both notifiers enabled.
    pub fn with_default_notifiers() -> Self {
        Self {
            notifiers: default_notifiers(),
            ..Self::default()
        }
    }

    /// Load and validate a TOML configuration file.
    ///
    /// A file without any `[[notifiers]]` entry gets the default pair.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: HookConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        if config.notifiers.is_empty() {
            config.notifiers = default_notifiers();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_package_name(&self.package.name)?;
        Ok(())
    }
}

fn default_notifiers() -> Vec<NotifierConfig> {
    vec![
        NotifierConfig {
            plugin: NotifierPlugin::RebootRequired,
            enabled: true,
        },
        NotifierConfig {
            plugin: NotifierPlugin::UpdateNotifier {
                path: PathBuf::from("/usr/share/update-notifier/notify-reboot-required"),
            },
            enabled: true,
        },
    ]
}
