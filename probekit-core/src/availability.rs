// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Availability filter: optional backends and the build flags behind them.
//!
//! A component is available iff it is compiled for the target platform and
//! every backend it requires is enabled. Both halves are `cfg!` constants, so
//! the filter is a pure `const fn` of the build configuration.

use serde::Serialize;

/// Optional subsystems a component may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Hardware counters read through `perf_event_open`.
    HwCounters,
    /// Function interception.
    Gotcha,
    /// MPI collective communication.
    Mpi,
    /// NCCL collective communication.
    Nccl,
    /// OpenMP tools runtime tracing.
    Ompt,
}

/// Aggregate entries contributed by each backend when its dependency set is enabled.
pub const HW_COUNTERS_AGGREGATE_ENTRIES: usize = 0;
pub const GOTCHA_AGGREGATE_ENTRIES: usize = 0;
pub const MPI_AGGREGATE_ENTRIES: usize = 1;
pub const NCCL_AGGREGATE_ENTRIES: usize = 1;
pub const OMPT_AGGREGATE_ENTRIES: usize = 1;

/// Aggregates present in every build (global, trace, profiler).
pub const BUILTIN_AGGREGATE_ENTRIES: usize = 3;

/// Dependency sets of the optional aggregates.
pub const MPIP_REQUIRES: &[Backend] = &[Backend::Mpi, Backend::Gotcha];
pub const NCCLP_REQUIRES: &[Backend] = &[Backend::Nccl, Backend::Gotcha];
pub const OMPT_REQUIRES: &[Backend] = &[Backend::Ompt];
pub const HW_COUNTERS_REQUIRES: &[Backend] = &[Backend::HwCounters];

impl Backend {
    pub const ALL: [Backend; 5] = [
        Backend::HwCounters,
        Backend::Gotcha,
        Backend::Mpi,
        Backend::Nccl,
        Backend::Ompt,
    ];

    /// Cargo feature name for the backend.
    pub const fn name(self) -> &'static str {
        match self {
            Self::HwCounters => "hw-counters",
            Self::Gotcha => "gotcha",
            Self::Mpi => "mpi",
            Self::Nccl => "nccl",
            Self::Ompt => "ompt",
        }
    }

    /// Whether the backend is enabled in this build.
    pub const fn enabled(self) -> bool {
        match self {
            Self::HwCounters => cfg!(feature = "hw-counters"),
            Self::Gotcha => cfg!(feature = "gotcha"),
            Self::Mpi => cfg!(feature = "mpi"),
            Self::Nccl => cfg!(feature = "nccl"),
            Self::Ompt => cfg!(feature = "ompt"),
        }
    }

    /// Number of aggregate entries this backend contributes when enabled.
    pub const fn aggregate_entries(self) -> usize {
        match self {
            Self::HwCounters => HW_COUNTERS_AGGREGATE_ENTRIES,
            Self::Gotcha => GOTCHA_AGGREGATE_ENTRIES,
            Self::Mpi => MPI_AGGREGATE_ENTRIES,
            Self::Nccl => NCCL_AGGREGATE_ENTRIES,
            Self::Ompt => OMPT_AGGREGATE_ENTRIES,
        }
    }

    /// Backends that must all be enabled for this backend's aggregate to exist.
    pub const fn aggregate_requires(self) -> &'static [Backend] {
        match self {
            Self::HwCounters => HW_COUNTERS_REQUIRES,
            Self::Gotcha => &[Backend::Gotcha],
            Self::Mpi => MPIP_REQUIRES,
            Self::Nccl => NCCLP_REQUIRES,
            Self::Ompt => OMPT_REQUIRES,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// True when every backend in `deps` is enabled. An empty set is always satisfied.
pub const fn requires_satisfied(deps: &[Backend]) -> bool {
    let mut i = 0;
    while i < deps.len() {
        if !deps[i].enabled() {
            return false;
        }
        i += 1;
    }
    true
}

/// The availability predicate: compiled for this target and all dependencies enabled.
pub const fn is_available(compiled: bool, requires: &[Backend]) -> bool {
    compiled && requires_satisfied(requires)
}

/// Total aggregate entries contributed by the enabled optional backends.
pub const fn optional_aggregate_entries() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < Backend::ALL.len() {
        let backend = Backend::ALL[i];
        if requires_satisfied(backend.aggregate_requires()) {
            total += backend.aggregate_entries();
        }
        i += 1;
    }
    total
}

/// Backends enabled in this build, in declaration order.
pub fn enabled_backends() -> Vec<Backend> {
    Backend::ALL.into_iter().filter(|b| b.enabled()).collect()
}
