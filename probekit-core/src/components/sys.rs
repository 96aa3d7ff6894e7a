// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thin wrappers over the platform calls the built-in components sample.

use crate::error::ComponentError;

/// Kernel clocks read through `clock_gettime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clock {
    Monotonic,
    MonotonicRaw,
    ThreadCpu,
    ProcessCpu,
}

/// Snapshot of `getrusage(RUSAGE_SELF)`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ResourceUsage {
    pub user_nanos: u64,
    pub system_nanos: u64,
    pub max_rss_bytes: u64,
    pub major_faults: u64,
    pub minor_faults: u64,
    pub voluntary_switches: u64,
    pub involuntary_switches: u64,
}

#[cfg(unix)]
pub(crate) fn clock_nanos(clock: Clock) -> Result<u64, ComponentError> {
    use nix::time::{clock_gettime, ClockId};

    let id = match clock {
        Clock::Monotonic => ClockId::CLOCK_MONOTONIC,
        #[cfg(any(target_os = "linux", target_os = "android"))]
        Clock::MonotonicRaw => ClockId::CLOCK_MONOTONIC_RAW,
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        Clock::MonotonicRaw => {
            return Err(ComponentError::Unsupported {
                component: "monotonic_raw_clock",
            })
        }
        Clock::ThreadCpu => ClockId::CLOCK_THREAD_CPUTIME_ID,
        Clock::ProcessCpu => ClockId::CLOCK_PROCESS_CPUTIME_ID,
    };

    let ts = clock_gettime(id).map_err(|e| ComponentError::Syscall {
        syscall: "clock_gettime",
        message: e.to_string(),
    })?;
    Ok(ts.tv_sec() as u64 * 1_000_000_000 + ts.tv_nsec() as u64)
}

#[cfg(not(unix))]
pub(crate) fn clock_nanos(_clock: Clock) -> Result<u64, ComponentError> {
    Err(ComponentError::Unsupported {
        component: "clock_gettime",
    })
}

#[cfg(unix)]
pub(crate) fn resource_usage() -> Result<ResourceUsage, ComponentError> {
    use nix::sys::resource::{getrusage, UsageWho};
    use nix::sys::time::TimeVal;

    fn nanos(tv: TimeVal) -> u64 {
        tv.tv_sec() as u64 * 1_000_000_000 + tv.tv_usec() as u64 * 1_000
    }

    let usage = getrusage(UsageWho::RUSAGE_SELF).map_err(|e| ComponentError::Syscall {
        syscall: "getrusage",
        message: e.to_string(),
    })?;

    // ru_maxrss is KiB on Linux, bytes on the BSDs and macOS.
    let rss_scale = if cfg!(target_os = "linux") { 1024 } else { 1 };

    Ok(ResourceUsage {
        user_nanos: nanos(usage.user_time()),
        system_nanos: nanos(usage.system_time()),
        max_rss_bytes: usage.max_rss().max(0) as u64 * rss_scale,
        major_faults: usage.major_page_faults().max(0) as u64,
        minor_faults: usage.minor_page_faults().max(0) as u64,
        voluntary_switches: usage.voluntary_context_switches().max(0) as u64,
        involuntary_switches: usage.involuntary_context_switches().max(0) as u64,
    })
}

#[cfg(not(unix))]
pub(crate) fn resource_usage() -> Result<ResourceUsage, ComponentError> {
    Err(ComponentError::Unsupported {
        component: "getrusage",
    })
}

/// Memory figures from `/proc/self/statm`, in bytes.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Statm {
    pub virtual_bytes: u64,
    pub resident_bytes: u64,
}

pub(crate) fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads system configuration.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

pub(crate) fn statm() -> Result<Statm, ComponentError> {
    let content = read_proc("/proc/self/statm")?;
    parse_statm(&content, page_size())
}

fn parse_statm(content: &str, page_size: u64) -> Result<Statm, ComponentError> {
    let mut fields = content.split_whitespace().map(str::parse::<u64>);
    match (fields.next(), fields.next()) {
        (Some(Ok(size)), Some(Ok(resident))) => Ok(Statm {
            virtual_bytes: size * page_size,
            resident_bytes: resident * page_size,
        }),
        _ => Err(ComponentError::Resource {
            component: "statm",
            reason: format!("Malformed /proc/self/statm: {:?}", content.trim()),
        }),
    }
}

/// Character IO counters from `/proc/self/io`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ProcIo {
    pub rchar: u64,
    pub wchar: u64,
}

pub(crate) fn proc_io() -> Result<ProcIo, ComponentError> {
    let content = read_proc("/proc/self/io")?;
    Ok(parse_proc_io(&content))
}

fn parse_proc_io(content: &str) -> ProcIo {
    let mut io = ProcIo::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(value) = value.trim().parse::<u64>() else {
            continue;
        };
        match key.trim() {
            "rchar" => io.rchar = value,
            "wchar" => io.wchar = value,
            _ => {}
        }
    }
    io
}

fn read_proc(path: &'static str) -> Result<String, ComponentError> {
    std::fs::read_to_string(path).map_err(|e| ComponentError::Io {
        context: path,
        source: e,
    })
}
