/*!
Pure decision logic for the removal hook
*/

/// Why the hook leaves the host alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The kernel does not restrict user namespaces through AppArmor.
    FeatureAbsent,
    /// The administrator pinned a custom configuration.
    OverridePresent,
}

/// What the hook should do on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Skip(SkipReason),
    Remove,
}

/// Decide from the two marker probes. The feature check wins over the override.
pub fn decide_action(feature_present: bool, override_present: bool) -> Action {
    match (feature_present, override_present) {
        (false, _) => Action::Skip(SkipReason::FeatureAbsent),
        (true, true) => Action::Skip(SkipReason::OverridePresent),
        (true, false) => Action::Remove,
    }
}
