// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for probekit.
//!
//! Every failure in the engine is an explicit enum variant. Nothing here is
//! meant to terminate the host process: selection, usage and component errors
//! are recovered locally and surfaced as diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::ComponentId;
use crate::selector::SelectionEntry;

/// Top-level error type for probekit.
#[derive(Debug, Error)]
pub enum ProbeError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Bundle Usage Errors - Recovered, Bundle Stays Usable
    // =========================================================================
    #[error("Bundle usage error: {0}")]
    Usage(#[from] UsageError),

    // =========================================================================
    // Selection Errors - Offending Entry Dropped
    // =========================================================================
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    // =========================================================================
    // Component Errors - Isolated To One Component
    // =========================================================================
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a selection entry is dropped by the runtime selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Unknown component name: '{name}'")]
    UnknownName { name: String },

    #[error("Unknown component id: {id}")]
    UnknownId { id: usize },

    #[error("Component id out of range: {token}")]
    IdOutOfRange { token: String },

    #[error("Component '{name}' is internal and cannot be selected")]
    Internal { name: &'static str },

    #[error("Component '{name}' is not available in this build")]
    Unavailable { name: &'static str },

    #[error("Component '{name}' is not a member of the target bundle")]
    NotInBundle { name: &'static str },

    #[error("Component '{name}' failed to construct: {reason}")]
    ConstructFailed { name: &'static str, reason: String },
}

/// Lifecycle misuse of a bundle. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Bundle '{label}' stopped without a preceding start")]
    StopWithoutStart { label: String },

    #[error("Bundle '{label}' is already running")]
    AlreadyRunning { label: String },

    #[error("Bundle '{label}' is already constructed")]
    AlreadyConstructed { label: String },
}

/// Failures of an individual component. Other members of the bundle are unaffected.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("Component '{component}' is not supported on this platform")]
    Unsupported { component: &'static str },

    #[error("Component '{component}' could not acquire its resource: {reason}")]
    Resource {
        component: &'static str,
        reason: String,
    },

    #[error("System call failed: {syscall} - {message}")]
    Syscall {
        syscall: &'static str,
        message: String,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// A component that failed to construct inside a bundle.
#[derive(Debug)]
pub struct ComponentFailure {
    pub id: ComponentId,
    pub error: ComponentError,
}

/// A selection entry that was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub entry: SelectionEntry,
    pub error: SelectionError,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.entry, self.error)
    }
}

/// Result type alias using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_error_display() {
        let err = SelectionError::UnknownName {
            name: "bogus_name".to_string(),
        };
        assert!(err.to_string().contains("bogus_name"));
    }

    #[test]
    fn test_error_chain() {
        let usage = UsageError::StopWithoutStart {
            label: "main".to_string(),
        };
        let err: ProbeError = usage.into();
        assert!(matches!(err, ProbeError::Usage(_)));
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection {
            entry: SelectionEntry::Id(999),
            error: SelectionError::UnknownId { id: 999 },
        };
        assert_eq!(rejection.to_string(), "999: Unknown component id: 999");
    }
}
