// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Property registry: component type <-> id <-> name <-> availability.
//!
//! The table below is the single source of truth for every known component.
//! It generates [`ComponentId`], a [`Properties`] impl per component type and
//! the reverse lookup [`ComponentId::visit`]. Everything is resolved at
//! compile time; querying the properties of an unregistered type does not
//! build because the type has no `Properties` impl.

use serde::{Deserialize, Serialize};

use crate::availability::{self, Backend};
use crate::component::Component;
use crate::components::*;

/// Compile-time identity of a registered component type.
pub trait Properties {
    const ID: ComponentId;
    const NAME: &'static str;
    const AVAILABLE: bool;
}

/// Visitor receiving the concrete type behind a [`ComponentId`].
pub trait TypeVisitor {
    type Output;

    fn visit<C: Component>(self) -> Self::Output;
}

/// Id of `T`.
pub const fn id<T: Properties>() -> ComponentId {
    T::ID
}

/// Canonical name of `T`.
pub const fn name<T: Properties>() -> &'static str {
    T::NAME
}

/// Whether `T` is available in this build.
pub const fn available<T: Properties>() -> bool {
    T::AVAILABLE
}

macro_rules! component_registry {
    (
        $(
            $variant:ident = $id:literal => $ty:ty {
                name: $name:literal,
                aliases: [$($alias:literal),* $(,)?],
                description: $desc:literal,
                compiled: $compiled:expr,
                requires: $requires:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// Dense numeric identifier of every known component type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(u16)]
        pub enum ComponentId {
            $($variant = $id),*
        }

        /// Number of known ids, internal ones included.
        pub const COMPONENTS_TOTAL: usize = [$($id),*].len();

        impl ComponentId {
            /// Every known id in ascending order.
            pub const ALL: [ComponentId; COMPONENTS_TOTAL] = [$(ComponentId::$variant),*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),*
                }
            }

            pub const fn aliases(self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($alias),*]),*
                }
            }

            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $desc),*
                }
            }

            /// Whether the implementation is compiled for this target.
            pub const fn is_compiled(self) -> bool {
                match self {
                    $(Self::$variant => $compiled),*
                }
            }

            /// Backends the component depends on.
            pub const fn requires(self) -> &'static [Backend] {
                match self {
                    $(Self::$variant => $requires),*
                }
            }

            pub const fn available(self) -> bool {
                match self {
                    $(Self::$variant => <$ty as Properties>::AVAILABLE),*
                }
            }

            /// Reverse lookup: hand the concrete type behind this id to `visitor`.
            pub fn visit<V: TypeVisitor>(self, visitor: V) -> V::Output {
                match self {
                    $(Self::$variant => visitor.visit::<$ty>()),*
                }
            }
        }

        $(
            impl Properties for $ty {
                const ID: ComponentId = ComponentId::$variant;
                const NAME: &'static str = $name;
                const AVAILABLE: bool = availability::is_available($compiled, $requires);
            }
        )*
    };
}

component_registry! {
    WallClock = 0 => WallClock {
        name: "wall_clock",
        aliases: ["real_clock", "virtual_clock", "wall"],
        description: "Elapsed real time",
        compiled: true,
        requires: &[],
    },
    SystemClock = 1 => SystemClock {
        name: "system_clock",
        aliases: ["sys_clock", "system"],
        description: "CPU time spent in kernel mode",
        compiled: cfg!(unix),
        requires: &[],
    },
    UserClock = 2 => UserClock {
        name: "user_clock",
        aliases: ["user"],
        description: "CPU time spent in user mode",
        compiled: cfg!(unix),
        requires: &[],
    },
    CpuClock = 3 => CpuClock {
        name: "cpu_clock",
        aliases: ["cpu"],
        description: "CPU time spent in user and kernel mode",
        compiled: cfg!(unix),
        requires: &[],
    },
    MonotonicClock = 4 => MonotonicClock {
        name: "monotonic_clock",
        aliases: ["monotonic"],
        description: "Monotonic clock, paused while the system is suspended",
        compiled: cfg!(unix),
        requires: &[],
    },
    MonotonicRawClock = 5 => MonotonicRawClock {
        name: "monotonic_raw_clock",
        aliases: ["monotonic_raw"],
        description: "Monotonic clock not subject to NTP adjustments",
        compiled: cfg!(target_os = "linux"),
        requires: &[],
    },
    ThreadCpuClock = 6 => ThreadCpuClock {
        name: "thread_cpu_clock",
        aliases: ["thread_cpu"],
        description: "CPU time of the calling thread",
        compiled: cfg!(unix),
        requires: &[],
    },
    ProcessCpuClock = 7 => ProcessCpuClock {
        name: "process_cpu_clock",
        aliases: ["process_cpu"],
        description: "CPU time of the process, all threads",
        compiled: cfg!(unix),
        requires: &[],
    },
    CpuUtil = 8 => CpuUtil {
        name: "cpu_util",
        aliases: ["cpu_utilization"],
        description: "CPU time as a percentage of wall time",
        compiled: cfg!(unix),
        requires: &[],
    },
    PeakRss = 9 => PeakRss {
        name: "peak_rss",
        aliases: ["max_rss"],
        description: "Growth of the peak resident set size",
        compiled: cfg!(unix),
        requires: &[],
    },
    PageRss = 10 => PageRss {
        name: "page_rss",
        aliases: ["rss", "current_rss"],
        description: "Growth of the resident set size",
        compiled: cfg!(target_os = "linux"),
        requires: &[],
    },
    VirtualMemory = 11 => VirtualMemory {
        name: "virtual_memory",
        aliases: ["virtual", "vm"],
        description: "Growth of the virtual address space",
        compiled: cfg!(target_os = "linux"),
        requires: &[],
    },
    NumMajorPageFaults = 12 => NumMajorPageFaults {
        name: "num_major_page_faults",
        aliases: ["major_page_faults"],
        description: "Page faults that required IO",
        compiled: cfg!(unix),
        requires: &[],
    },
    NumMinorPageFaults = 13 => NumMinorPageFaults {
        name: "num_minor_page_faults",
        aliases: ["minor_page_faults"],
        description: "Page faults serviced without IO",
        compiled: cfg!(unix),
        requires: &[],
    },
    VoluntaryContextSwitch = 14 => VoluntaryContextSwitch {
        name: "voluntary_context_switch",
        aliases: ["vcs"],
        description: "Context switches due to waiting on a resource",
        compiled: cfg!(unix),
        requires: &[],
    },
    PriorityContextSwitch = 15 => PriorityContextSwitch {
        name: "priority_context_switch",
        aliases: ["ics", "involuntary_context_switch"],
        description: "Context switches due to preemption",
        compiled: cfg!(unix),
        requires: &[],
    },
    ReadChar = 16 => ReadChar {
        name: "read_char",
        aliases: ["rchar"],
        description: "Bytes read through read-like syscalls",
        compiled: cfg!(target_os = "linux"),
        requires: &[],
    },
    WrittenChar = 17 => WrittenChar {
        name: "written_char",
        aliases: ["wchar"],
        description: "Bytes written through write-like syscalls",
        compiled: cfg!(target_os = "linux"),
        requires: &[],
    },
    TripCount = 18 => TripCount {
        name: "trip_count",
        aliases: ["trips"],
        description: "Number of times the measurement was started",
        compiled: true,
        requires: &[],
    },
    HwCounters = 19 => HwCounters {
        name: "hw_counters",
        aliases: ["perf", "papi", "hardware_counters"],
        description: "Hardware performance counters",
        compiled: cfg!(target_os = "linux"),
        requires: availability::HW_COUNTERS_REQUIRES,
    },
    UserGlobalBundle = 20 => UserGlobalBundle {
        name: "user_global_bundle",
        aliases: ["global_bundle"],
        description: "Runtime-selected components applied globally",
        compiled: true,
        requires: &[],
    },
    UserTraceBundle = 21 => UserTraceBundle {
        name: "user_trace_bundle",
        aliases: ["trace_bundle"],
        description: "Runtime-selected components for tracing",
        compiled: true,
        requires: &[],
    },
    UserProfilerBundle = 22 => UserProfilerBundle {
        name: "user_profiler_bundle",
        aliases: ["profiler_bundle"],
        description: "Runtime-selected components for profiling",
        compiled: true,
        requires: &[],
    },
    UserMpipBundle = 23 => UserMpipBundle {
        name: "user_mpip_bundle",
        aliases: ["mpip_bundle", "mpip"],
        description: "Runtime-selected components wrapping MPI calls",
        compiled: true,
        requires: availability::MPIP_REQUIRES,
    },
    UserOmptBundle = 24 => UserOmptBundle {
        name: "user_ompt_bundle",
        aliases: ["ompt_bundle", "ompt"],
        description: "Runtime-selected components for OpenMP regions",
        compiled: true,
        requires: availability::OMPT_REQUIRES,
    },
    UserNcclpBundle = 25 => UserNcclpBundle {
        name: "user_ncclp_bundle",
        aliases: ["ncclp_bundle", "ncclp"],
        description: "Runtime-selected components wrapping NCCL calls",
        compiled: true,
        requires: availability::NCCLP_REQUIRES,
    },
    Nothing = 26 => Nothing {
        name: "nothing",
        aliases: [],
        description: "Placeholder standing in for no component",
        compiled: false,
        requires: &[],
    },
}

/// End of the native id range: leaves plus the built-in aggregates.
pub const NATIVE_COMPONENTS_END: usize = ComponentId::UserMpipBundle as usize;

/// End of the public id range. Ids at or beyond this are internal.
pub const COMPONENTS_END: usize = ComponentId::Nothing as usize;

/// Number of internal ids at the top of the range.
pub const INTERNAL_COMPONENTS: usize = COMPONENTS_TOTAL - COMPONENTS_END;

// Ids must be dense, ascending and fit the membership masks.
const _: () = {
    assert!(COMPONENTS_TOTAL <= 128, "component ids must fit in a u128 mask");
    assert!(NATIVE_COMPONENTS_END <= COMPONENTS_END);
    let mut i = 0;
    while i < COMPONENTS_TOTAL {
        assert!(
            ComponentId::ALL[i] as usize == i,
            "component ids must be dense and declared in ascending order"
        );
        i += 1;
    }
};

impl ComponentId {
    /// Numeric id.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Constant-time reverse lookup of a numeric id.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < COMPONENTS_TOTAL {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Internal ids are never available and never resolvable by name.
    pub const fn is_internal(self) -> bool {
        self.index() >= COMPONENTS_END
    }

    /// Ids in the native range.
    pub const fn is_native(self) -> bool {
        self.index() < NATIVE_COMPONENTS_END
    }

    /// Resolve a public component by canonical name or alias.
    ///
    /// Matching is case-insensitive and treats `-` as `_`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = normalize_name(name);
        Self::ALL[..COMPONENTS_END].iter().copied().find(|id| {
            id.name() == normalized || id.aliases().iter().any(|alias| *alias == normalized)
        })
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}
