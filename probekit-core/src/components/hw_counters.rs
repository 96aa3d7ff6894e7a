// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Hardware performance counters.
//!
//! With the `hw-counters` feature on Linux, each configured event is opened
//! through `perf_event_open` for the calling thread, user space only. A bundle
//! may be constructed on one thread and driven from another, so `start`
//! reopens the counters on the driving thread when the two differ. In any
//! other build the component is unavailable and its type is an empty stub.

use serde::{Deserialize, Serialize};

/// Generalized hardware events (`PERF_TYPE_HARDWARE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HwEvent {
    Cycles,
    Instructions,
    CacheReferences,
    CacheMisses,
    BranchInstructions,
    BranchMisses,
}

impl HwEvent {
    pub const ALL: [HwEvent; 6] = [
        HwEvent::Cycles,
        HwEvent::Instructions,
        HwEvent::CacheReferences,
        HwEvent::CacheMisses,
        HwEvent::BranchInstructions,
        HwEvent::BranchMisses,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            HwEvent::Cycles => "cycles",
            HwEvent::Instructions => "instructions",
            HwEvent::CacheReferences => "cache-references",
            HwEvent::CacheMisses => "cache-misses",
            HwEvent::BranchInstructions => "branch-instructions",
            HwEvent::BranchMisses => "branch-misses",
        }
    }

    /// `PERF_COUNT_HW_*` value.
    pub const fn perf_config(self) -> u64 {
        match self {
            HwEvent::Cycles => 0,
            HwEvent::Instructions => 1,
            HwEvent::CacheReferences => 2,
            HwEvent::CacheMisses => 3,
            HwEvent::BranchInstructions => 4,
            HwEvent::BranchMisses => 5,
        }
    }

    /// Case-insensitive; `_` and `-` are interchangeable.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|e| e.name() == normalized)
    }
}

impl std::fmt::Display for HwEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(all(feature = "hw-counters", target_os = "linux"))]
pub use perf::HwCounters;

#[cfg(not(all(feature = "hw-counters", target_os = "linux")))]
pub use stub::HwCounters;

#[cfg(all(feature = "hw-counters", target_os = "linux"))]
mod perf {
    use std::fs::File;
    use std::io::Read;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use std::thread::{self, ThreadId};

    use super::HwEvent;
    use crate::component::{Component, CounterValue, Value};
    use crate::config::ProbeConfig;
    use crate::error::ComponentError;

    const PERF_TYPE_HARDWARE: u32 = 0;
    const PERF_ATTR_SIZE_VER0: u32 = 64;

    const PERF_EVENT_IOC_ENABLE: u64 = 0x2400;
    const PERF_EVENT_IOC_DISABLE: u64 = 0x2401;
    const PERF_EVENT_IOC_RESET: u64 = 0x2403;

    const FLAG_DISABLED: u64 = 1 << 0;
    const FLAG_EXCLUDE_KERNEL: u64 = 1 << 5;
    const FLAG_EXCLUDE_HV: u64 = 1 << 6;

    /// First revision of `struct perf_event_attr`.
    #[repr(C)]
    #[derive(Default)]
    struct PerfEventAttr {
        type_: u32,
        size: u32,
        config: u64,
        sample_period: u64,
        sample_type: u64,
        read_format: u64,
        flags: u64,
        wakeup_events: u32,
        bp_type: u32,
        config1: u64,
    }

    const _: () = assert!(std::mem::size_of::<PerfEventAttr>() == PERF_ATTR_SIZE_VER0 as usize);

    struct Counter {
        event: HwEvent,
        file: File,
        total: u64,
    }

    impl Counter {
        fn open(event: HwEvent) -> Result<Self, ComponentError> {
            let attr = PerfEventAttr {
                type_: PERF_TYPE_HARDWARE,
                size: PERF_ATTR_SIZE_VER0,
                config: event.perf_config(),
                flags: FLAG_DISABLED | FLAG_EXCLUDE_KERNEL | FLAG_EXCLUDE_HV,
                ..Default::default()
            };

            // SAFETY: attr is a valid, fully initialized perf_event_attr that
            // outlives the call; pid 0 / cpu -1 selects the calling thread.
            let fd = unsafe {
                libc::syscall(
                    libc::SYS_perf_event_open,
                    &attr as *const PerfEventAttr,
                    0 as libc::pid_t,
                    -1 as libc::c_int,
                    -1 as libc::c_int,
                    0 as libc::c_ulong,
                )
            };
            if fd < 0 {
                return Err(ComponentError::Syscall {
                    syscall: "perf_event_open",
                    message: format!("{}: {}", event, std::io::Error::last_os_error()),
                });
            }

            // SAFETY: fd was just returned by perf_event_open and is owned by nobody else.
            let fd = unsafe { OwnedFd::from_raw_fd(fd as libc::c_int) };
            Ok(Self {
                event,
                file: File::from(fd),
                total: 0,
            })
        }

        fn ioctl(&self, request: u64) {
            // SAFETY: the fd stays open for the lifetime of self; these
            // requests take no argument pointer.
            let result = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, 0) };
            if result < 0 {
                tracing::warn!(
                    event = %self.event,
                    error = %std::io::Error::last_os_error(),
                    "perf ioctl failed"
                );
            }
        }

        fn read(&mut self) -> Option<u64> {
            let mut buf = [0u8; 8];
            match self.file.read_exact(&mut buf) {
                Ok(()) => Some(u64::from_ne_bytes(buf)),
                Err(e) => {
                    tracing::warn!(event = %self.event, error = %e, "perf read failed");
                    None
                }
            }
        }
    }

    /// Per-thread hardware counters. The file descriptors close on drop.
    ///
    /// Counts cover only `thread`, the thread that last opened them.
    pub struct HwCounters {
        counters: Vec<Counter>,
        thread: ThreadId,
    }

    impl Default for HwCounters {
        fn default() -> Self {
            Self {
                counters: Vec::new(),
                thread: thread::current().id(),
            }
        }
    }

    impl HwCounters {
        /// Reopen every counter for the current thread, keeping totals.
        fn rebind(&mut self) {
            let current = thread::current().id();
            if current == self.thread {
                return;
            }
            tracing::debug!(
                counters = self.counters.len(),
                "Hardware counters driven from a new thread, reopening"
            );
            let mut reopened = Vec::with_capacity(self.counters.len());
            for counter in &self.counters {
                match Counter::open(counter.event) {
                    Ok(mut fresh) => {
                        fresh.total = counter.total;
                        reopened.push(fresh);
                    }
                    Err(e) => tracing::warn!(error = %e, "Dropping hardware event"),
                }
            }
            self.counters = reopened;
            self.thread = current;
        }
    }

    impl std::fmt::Debug for HwCounters {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_list()
                .entries(self.counters.iter().map(|c| (c.event, c.total)))
                .finish()
        }
    }

    impl Component for HwCounters {
        fn construct(config: &ProbeConfig) -> Result<Self, ComponentError> {
            let mut counters = Vec::with_capacity(config.hw_counters.events.len());
            for event in &config.hw_counters.events {
                match Counter::open(*event) {
                    Ok(counter) => counters.push(counter),
                    Err(e) => tracing::warn!(error = %e, "Skipping hardware event"),
                }
            }
            if counters.is_empty() {
                return Err(ComponentError::Resource {
                    component: "hw_counters",
                    reason: "no hardware event could be opened".to_string(),
                });
            }
            Ok(Self {
                counters,
                thread: thread::current().id(),
            })
        }

        fn start(&mut self) {
            self.rebind();
            for counter in &self.counters {
                counter.ioctl(PERF_EVENT_IOC_RESET);
                counter.ioctl(PERF_EVENT_IOC_ENABLE);
            }
        }

        fn stop(&mut self) {
            for counter in &mut self.counters {
                counter.ioctl(PERF_EVENT_IOC_DISABLE);
                if let Some(value) = counter.read() {
                    counter.total += value;
                }
            }
        }

        fn get(&self) -> Option<Value> {
            Some(Value::Counters(
                self.counters
                    .iter()
                    .map(|c| CounterValue {
                        name: c.event.name(),
                        value: c.total,
                    })
                    .collect(),
            ))
        }

        fn reset(&mut self) {
            for counter in &mut self.counters {
                counter.total = 0;
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_counters_follow_the_driving_thread() {
            // perf may be restricted on this host
            let Ok(counters) = HwCounters::construct(&ProbeConfig::default()) else {
                return;
            };
            let owner = counters.thread;
            let (counters, driver) = thread::spawn(move || {
                let mut counters = counters;
                counters.start();
                counters.stop();
                (counters, thread::current().id())
            })
            .join()
            .unwrap();

            assert_ne!(owner, driver);
            assert_eq!(counters.thread, driver);
        }
    }
}

#[cfg(not(all(feature = "hw-counters", target_os = "linux")))]
mod stub {
    use crate::component::Component;
    use crate::config::ProbeConfig;
    use crate::error::ComponentError;

    /// Hardware counters are not compiled into this build.
    #[derive(Debug, Default)]
    pub struct HwCounters;

    impl Component for HwCounters {
        fn construct(_config: &ProbeConfig) -> Result<Self, ComponentError> {
            Err(ComponentError::Unsupported {
                component: "hw_counters",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::config::ProbeConfig;
    use crate::registry::Properties;

    #[test]
    fn test_event_names() {
        assert_eq!(HwEvent::from_name("CACHE_MISSES"), Some(HwEvent::CacheMisses));
        assert_eq!(HwEvent::from_name("cycles"), Some(HwEvent::Cycles));
        assert_eq!(HwEvent::from_name("flops"), None);
        for event in HwEvent::ALL {
            assert_eq!(HwEvent::from_name(event.name()), Some(event));
        }
    }

    #[test]
    fn test_construct_never_aborts() {
        // Either the counters open, or construction reports an error; perf may
        // be restricted even where the feature is enabled.
        match HwCounters::construct(&ProbeConfig::default()) {
            Ok(mut counters) => {
                assert!(HwCounters::AVAILABLE);
                counters.start();
                counters.stop();
                assert!(matches!(
                    counters.get(),
                    Some(crate::component::Value::Counters(_))
                ));
            }
            Err(e) => assert!(!e.to_string().is_empty()),
        }
    }
}
