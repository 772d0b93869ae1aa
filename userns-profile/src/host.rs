/*!
Marker files that decide whether the profile should be removed
*/

use std::path::PathBuf;

use tracing::debug;

/// Paths probed before touching anything.
#[derive(Debug, Clone)]
pub struct HostMarkers {
    /// Present when the kernel restricts unprivileged user namespaces through AppArmor.
    pub feature: PathBuf,
    /// Present when the administrator pinned their own configuration.
    pub override_marker: PathBuf,
}

/// Result of probing the host markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostState {
    pub feature_present: bool,
    pub override_present: bool,
}

impl HostMarkers {
    pub fn new(feature: impl Into<PathBuf>, override_marker: impl Into<PathBuf>) -> Self {
        Self {
            feature: feature.into(),
            override_marker: override_marker.into(),
        }
    }

    /// Check both markers. A path that cannot be stat'ed counts as absent.
    pub fn probe(&self) -> HostState {
        let state = HostState {
            feature_present: self.feature.exists(),
            override_present: self.override_marker.exists(),
        };
        debug!(
            "Probed markers: feature {:?} present={}, override {:?} present={}",
            self.feature, state.feature_present, self.override_marker, state.override_present
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn probe_reports_each_marker_independently() {
        let dir = tempfile::tempdir().expect("temp dir");
        let markers = HostMarkers::new(dir.path().join("feature"), dir.path().join("override"));

        assert_eq!(
            markers.probe(),
            HostState { feature_present: false, override_present: false }
        );

        fs::write(&markers.feature, "1\n").expect("write feature marker");
        assert_eq!(
            markers.probe(),
            HostState { feature_present: true, override_present: false }
        );

        fs::write(&markers.override_marker, "").expect("write override marker");
        assert_eq!(
            markers.probe(),
            HostState { feature_present: true, override_present: true }
        );
    }

    #[test]
    fn directories_count_as_present() {
        let dir = tempfile::tempdir().expect("temp dir");
        let override_dir = dir.path().join("disable");
        fs::create_dir(&override_dir).expect("create dir");

        let markers = HostMarkers::new(dir.path().join("missing"), &override_dir);
        let state = markers.probe();
        assert!(!state.feature_present);
        assert!(state.override_present);
    }
}
