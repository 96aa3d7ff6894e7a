// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Memory, page fault, context switch and IO probes.

use super::sys;
use super::{Delta, Source};
use crate::component::Value;
use crate::error::ComponentError;

pub type PeakRss = Delta<PeakRssBytes>;
pub type PageRss = Delta<ResidentBytes>;
pub type VirtualMemory = Delta<VirtualBytes>;
pub type NumMajorPageFaults = Delta<MajorFaults>;
pub type NumMinorPageFaults = Delta<MinorFaults>;
pub type VoluntaryContextSwitch = Delta<VoluntarySwitches>;
pub type PriorityContextSwitch = Delta<InvoluntarySwitches>;
pub type ReadChar = Delta<ReadBytes>;
pub type WrittenChar = Delta<WrittenBytes>;

pub struct PeakRssBytes;

impl Source for PeakRssBytes {
    const SAMPLEABLE: bool = true;

    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::resource_usage()?.max_rss_bytes)
    }

    fn value(raw: u64) -> Value {
        Value::Bytes(raw)
    }
}

pub struct ResidentBytes;

impl Source for ResidentBytes {
    const SAMPLEABLE: bool = true;

    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::statm()?.resident_bytes)
    }

    fn value(raw: u64) -> Value {
        Value::Bytes(raw)
    }
}

pub struct VirtualBytes;

impl Source for VirtualBytes {
    const SAMPLEABLE: bool = true;

    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::statm()?.virtual_bytes)
    }

    fn value(raw: u64) -> Value {
        Value::Bytes(raw)
    }
}

macro_rules! rusage_counter {
    ($name:ident, $field:ident) => {
        pub struct $name;

        impl Source for $name {
            fn sample() -> Result<u64, ComponentError> {
                Ok(sys::resource_usage()?.$field)
            }

            fn value(raw: u64) -> Value {
                Value::Count(raw)
            }
        }
    };
}

rusage_counter!(MajorFaults, major_faults);
rusage_counter!(MinorFaults, minor_faults);
rusage_counter!(VoluntarySwitches, voluntary_switches);
rusage_counter!(InvoluntarySwitches, involuntary_switches);

pub struct ReadBytes;

impl Source for ReadBytes {
    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::proc_io()?.rchar)
    }

    fn value(raw: u64) -> Value {
        Value::Bytes(raw)
    }
}

pub struct WrittenBytes;

impl Source for WrittenBytes {
    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::proc_io()?.wchar)
    }

    fn value(raw: u64) -> Value {
        Value::Bytes(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::config::ProbeConfig;

    #[cfg(unix)]
    #[test]
    fn test_peak_rss_records_gauge() {
        let mut rss = PeakRss::construct(&ProbeConfig::default()).unwrap();
        assert!(matches!(rss.record(), Some(Value::Bytes(b)) if b > 0));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_page_rss_tracks_growth() {
        let mut rss = PageRss::construct(&ProbeConfig::default()).unwrap();
        rss.start();
        let buffer = vec![1u8; 8 * 1024 * 1024];
        std::hint::black_box(&buffer);
        rss.stop();
        assert!(matches!(rss.get(), Some(Value::Bytes(_))));
        drop(buffer);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_written_char_counts_writes() {
        use std::io::Write;

        let mut written = WrittenChar::construct(&ProbeConfig::default()).unwrap();
        let mut file = tempfile::tempfile().unwrap();
        written.start();
        file.write_all(&[0u8; 4096]).unwrap();
        written.stop();
        assert!(matches!(written.get(), Some(Value::Bytes(b)) if b >= 4096));
    }
}
