// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration with an environment overlay.
//!
//! The file chooses which components run by default and what each user
//! bundle scope contains. `PROBEKIT_*` variables override the file. Unknown
//! component names are left for the selector to report; only malformed
//! values fail here.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::components::hw_counters::HwEvent;
use crate::error::{ConfigError, ProbeResult};
use crate::selector::{SelectionEntry, SelectionRequest};

/// Path of a configuration file read by [`ProbeConfig::global`].
pub const ENV_CONFIG: &str = "PROBEKIT_CONFIG";
pub const ENV_COMPONENTS: &str = "PROBEKIT_COMPONENTS";
pub const ENV_GLOBAL_COMPONENTS: &str = "PROBEKIT_GLOBAL_COMPONENTS";
pub const ENV_TRACE_COMPONENTS: &str = "PROBEKIT_TRACE_COMPONENTS";
pub const ENV_PROFILER_COMPONENTS: &str = "PROBEKIT_PROFILER_COMPONENTS";
pub const ENV_MPIP_COMPONENTS: &str = "PROBEKIT_MPIP_COMPONENTS";
pub const ENV_OMPT_COMPONENTS: &str = "PROBEKIT_OMPT_COMPONENTS";
pub const ENV_NCCLP_COMPONENTS: &str = "PROBEKIT_NCCLP_COMPONENTS";
pub const ENV_HW_COUNTER_EVENTS: &str = "PROBEKIT_HW_COUNTER_EVENTS";

/// A selection written either as a YAML list or as a single string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSelection {
    List(Vec<SelectionEntry>),
    Text(String),
}

impl Default for RawSelection {
    fn default() -> Self {
        RawSelection::List(Vec::new())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUserBundles {
    #[serde(default)]
    global: RawSelection,
    #[serde(default)]
    trace: RawSelection,
    #[serde(default)]
    profiler: RawSelection,
    #[serde(default)]
    mpip: RawSelection,
    #[serde(default)]
    ompt: RawSelection,
    #[serde(default)]
    ncclp: RawSelection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHwCounters {
    #[serde(default = "default_hw_events")]
    events: Vec<String>,
}

fn default_hw_events() -> Vec<String> {
    vec!["cycles".to_string(), "instructions".to_string()]
}

impl Default for RawHwCounters {
    fn default() -> Self {
        Self {
            events: default_hw_events(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    components: RawSelection,
    #[serde(default)]
    user_bundles: RawUserBundles,
    #[serde(default)]
    hw_counters: RawHwCounters,
}

/// Selections for each user bundle scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserBundleConfig {
    pub global: SelectionRequest,
    pub trace: SelectionRequest,
    pub profiler: SelectionRequest,
    pub mpip: SelectionRequest,
    pub ompt: SelectionRequest,
    pub ncclp: SelectionRequest,
}

/// Hardware counter events to program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HwCounterConfig {
    pub events: Vec<HwEvent>,
}

impl Default for HwCounterConfig {
    fn default() -> Self {
        Self {
            events: vec![HwEvent::Cycles, HwEvent::Instructions],
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeConfig {
    /// Default selection for ad-hoc bundles.
    pub components: SelectionRequest,
    pub user_bundles: UserBundleConfig,
    pub hw_counters: HwCounterConfig,
}

static GLOBAL: OnceLock<ProbeConfig> = OnceLock::new();

impl ProbeConfig {
    /// Process-wide configuration, built on first use and never mutated.
    ///
    /// Reads the file named by `PROBEKIT_CONFIG` if set, then applies the
    /// environment overlay. Errors are logged and the defaults are used.
    pub fn global() -> &'static ProbeConfig {
        GLOBAL.get_or_init(|| match Self::from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid probekit configuration");
                ProbeConfig::default()
            }
        })
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> ProbeResult<Self> {
        let mut config = match std::env::var(ENV_CONFIG) {
            Ok(path) if !path.trim().is_empty() => ConfigLoader::load_file(path.trim())?,
            _ => ProbeConfig::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `PROBEKIT_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Overlay `PROBEKIT_*` variables read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let selections = [
            (ENV_COMPONENTS, &mut self.components),
            (ENV_GLOBAL_COMPONENTS, &mut self.user_bundles.global),
            (ENV_TRACE_COMPONENTS, &mut self.user_bundles.trace),
            (ENV_PROFILER_COMPONENTS, &mut self.user_bundles.profiler),
            (ENV_MPIP_COMPONENTS, &mut self.user_bundles.mpip),
            (ENV_OMPT_COMPONENTS, &mut self.user_bundles.ompt),
            (ENV_NCCLP_COMPONENTS, &mut self.user_bundles.ncclp),
        ];
        for (var, target) in selections {
            if let Some(value) = lookup(var) {
                tracing::debug!(var, value = %value, "Selection overridden from environment");
                *target = SelectionRequest::parse(&value);
            }
        }

        if let Some(value) = lookup(ENV_HW_COUNTER_EVENTS) {
            let names: Vec<String> = value
                .split(|c: char| c == ',' || c == ';' || c == ':' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect();
            self.hw_counters.events = ConfigLoader::validate_events(&names)?;
        }
        Ok(())
    }
}

/// Configuration loader with validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> ProbeResult<ProbeConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            context: "reading config file",
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> ProbeResult<ProbeConfig> {
        // An empty document is an empty configuration.
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Ok(Self::validate(raw)?)
    }

    fn validate(raw: RawConfig) -> Result<ProbeConfig, ConfigError> {
        let user_bundles = UserBundleConfig {
            global: Self::validate_selection("user_bundles.global", raw.user_bundles.global)?,
            trace: Self::validate_selection("user_bundles.trace", raw.user_bundles.trace)?,
            profiler: Self::validate_selection(
                "user_bundles.profiler",
                raw.user_bundles.profiler,
            )?,
            mpip: Self::validate_selection("user_bundles.mpip", raw.user_bundles.mpip)?,
            ompt: Self::validate_selection("user_bundles.ompt", raw.user_bundles.ompt)?,
            ncclp: Self::validate_selection("user_bundles.ncclp", raw.user_bundles.ncclp)?,
        };

        Ok(ProbeConfig {
            components: Self::validate_selection("components", raw.components)?,
            user_bundles,
            hw_counters: HwCounterConfig {
                events: Self::validate_events(&raw.hw_counters.events)?,
            },
        })
    }

    fn validate_selection(
        field: &'static str,
        raw: RawSelection,
    ) -> Result<SelectionRequest, ConfigError> {
        match raw {
            RawSelection::Text(text) => Ok(SelectionRequest::parse(&text)),
            RawSelection::List(entries) => {
                for entry in &entries {
                    if let SelectionEntry::Name(name) = entry {
                        if name.trim().is_empty() {
                            return Err(ConfigError::InvalidFieldValue {
                                field,
                                value: format!("{:?}", name),
                                reason: "Component names must not be empty".to_string(),
                            });
                        }
                    }
                }
                Ok(entries
                    .into_iter()
                    .map(|entry| match entry {
                        SelectionEntry::Name(name) => SelectionEntry::parse(&name),
                        id => id,
                    })
                    .collect())
            }
        }
    }

    fn validate_events(names: &[String]) -> Result<Vec<HwEvent>, ConfigError> {
        let mut events = Vec::with_capacity(names.len());
        for name in names {
            let event = HwEvent::from_name(name).ok_or_else(|| ConfigError::InvalidFieldValue {
                field: "hw_counters.events",
                value: name.clone(),
                reason: format!(
                    "Unknown event, expected one of: {}",
                    HwEvent::ALL
                        .iter()
                        .map(|e| e.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;
            if !events.contains(&event) {
                events.push(event);
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use std::collections::HashMap;

    const VALID_CONFIG: &str = r#"
components: [wall_clock, peak_rss]
user_bundles:
  global: [wall_clock]
  profiler: "cpu_clock, trip_count"
hw_counters:
  events: [cycles, cache-misses]
"#;

    #[test]
    fn test_load_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.components.len(), 2);
        assert_eq!(config.user_bundles.global.len(), 1);
        assert_eq!(config.user_bundles.profiler.len(), 2);
        assert!(config.user_bundles.trace.is_empty());
        assert_eq!(
            config.hw_counters.events,
            vec![HwEvent::Cycles, HwEvent::CacheMisses]
        );
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn test_unknown_component_is_not_a_config_error() {
        let config = ConfigLoader::load_string("components: [bogus_name]").unwrap();
        assert_eq!(
            config.components.entries(),
            &[SelectionEntry::Name("bogus_name".into())]
        );
    }

    #[test]
    fn test_invalid_event_rejected() {
        let result = ConfigLoader::load_string("hw_counters:\n  events: [flops]");
        assert!(matches!(
            result,
            Err(ProbeError::Config(ConfigError::InvalidFieldValue {
                field: "hw_counters.events",
                ..
            }))
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = ConfigLoader::load_string("components: ['wall_clock', '']");
        assert!(matches!(
            result,
            Err(ProbeError::Config(ConfigError::InvalidFieldValue {
                field: "components",
                ..
            }))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::load_string("componets: [wall_clock]");
        assert!(matches!(
            result,
            Err(ProbeError::Config(ConfigError::Parse { .. }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_file("/nonexistent/probekit.yaml");
        assert!(matches!(
            result,
            Err(ProbeError::Config(ConfigError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = [
            (ENV_COMPONENTS, "trip_count;3"),
            (ENV_TRACE_COMPONENTS, "wall_clock"),
            (ENV_HW_COUNTER_EVENTS, "branch-misses"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        config
            .apply_env_with(|var| vars.get(var).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(
            config.components.entries(),
            &[
                SelectionEntry::Name("trip_count".into()),
                SelectionEntry::Id(3)
            ]
        );
        assert_eq!(config.user_bundles.trace.len(), 1);
        // untouched by the overlay
        assert_eq!(config.user_bundles.global.len(), 1);
        assert_eq!(config.hw_counters.events, vec![HwEvent::BranchMisses]);
    }

    #[test]
    fn test_env_overlay_invalid_event() {
        let mut config = ProbeConfig::default();
        let result = config.apply_env_with(|var| {
            (var == ENV_HW_COUNTER_EVENTS).then(|| "cycles,bogus".to_string())
        });
        assert!(result.is_err());
    }
}
