//! Top-level configuration keys

/// Keys recognised at the top level of a configuration document.
///
/// Anything else must be a rule identifier (or alias) holding that rule's
/// configuration, or it is reported as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    CachePath,
    DisabledRules,
    /// Deprecated spelling of `opt_in_rules`
    EnabledRules,
    Excluded,
    Included,
    OptInRules,
    Reporter,
    ToolVersion,
    WarningThreshold,
    OnlyRules,
    Indentation,
    AnalyzerRules,
    AllowZeroLintableFiles,
    Strict,
    Baseline,
    WriteBaseline,
    CheckForUpdates,
    ChildConfig,
    ParentConfig,
    RemoteTimeout,
    RemoteTimeoutIfCached,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 21] = [
        Self::CachePath,
        Self::DisabledRules,
        Self::EnabledRules,
        Self::Excluded,
        Self::Included,
        Self::OptInRules,
        Self::Reporter,
        Self::ToolVersion,
        Self::WarningThreshold,
        Self::OnlyRules,
        Self::Indentation,
        Self::AnalyzerRules,
        Self::AllowZeroLintableFiles,
        Self::Strict,
        Self::Baseline,
        Self::WriteBaseline,
        Self::CheckForUpdates,
        Self::ChildConfig,
        Self::ParentConfig,
        Self::RemoteTimeout,
        Self::RemoteTimeoutIfCached,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CachePath => "cache_path",
            Self::DisabledRules => "disabled_rules",
            Self::EnabledRules => "enabled_rules",
            Self::Excluded => "excluded",
            Self::Included => "included",
            Self::OptInRules => "opt_in_rules",
            Self::Reporter => "reporter",
            Self::ToolVersion => "swiftlint_version",
            Self::WarningThreshold => "warning_threshold",
            Self::OnlyRules => "only_rules",
            Self::Indentation => "indentation",
            Self::AnalyzerRules => "analyzer_rules",
            Self::AllowZeroLintableFiles => "allow_zero_lintable_files",
            Self::Strict => "strict",
            Self::Baseline => "baseline",
            Self::WriteBaseline => "write_baseline",
            Self::CheckForUpdates => "check_for_updates",
            Self::ChildConfig => "child_config",
            Self::ParentConfig => "parent_config",
            Self::RemoteTimeout => "remote_timeout",
            Self::RemoteTimeoutIfCached => "remote_timeout_if_cached",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
