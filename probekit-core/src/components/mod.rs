// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Built-in components.
//!
//! Most leaves are a [`Delta`] over a [`Source`]: sample at start, sample at
//! stop, accumulate the difference. Components that need more state
//! implement [`Component`] directly.

use std::marker::PhantomData;

use crate::component::{Component, Value};
use crate::config::ProbeConfig;
use crate::error::ComponentError;
use crate::registry::Properties;

pub mod hw_counters;
mod placeholder;
mod resource;
pub(crate) mod sys;
mod timing;
mod trip_count;
pub mod user_bundle;

pub use hw_counters::{HwCounters, HwEvent};
pub use placeholder::Nothing;
pub use resource::*;
pub use timing::*;
pub use trip_count::TripCount;
pub use user_bundle::{
    BundleScope, GlobalScope, MpipScope, NcclpScope, OmptScope, ProfilerScope, TraceScope,
    UserBundle, UserGlobalBundle, UserMpipBundle, UserNcclpBundle, UserOmptBundle,
    UserProfilerBundle, UserTraceBundle,
};

/// A monotonically sampled quantity.
pub trait Source: Send + 'static {
    /// `record` reports the instantaneous sample. Set for gauges.
    const SAMPLEABLE: bool = false;

    fn sample() -> Result<u64, ComponentError>;

    /// Wrap a raw sample or difference in its unit.
    fn value(raw: u64) -> Value;
}

/// Accumulates `stop - start` of a [`Source`] over every lap.
pub struct Delta<S> {
    begin: Option<u64>,
    total: u64,
    laps: u64,
    _source: PhantomData<fn() -> S>,
}

impl<S> Default for Delta<S> {
    fn default() -> Self {
        Self {
            begin: None,
            total: 0,
            laps: 0,
            _source: PhantomData,
        }
    }
}

impl<S> std::fmt::Debug for Delta<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delta")
            .field("begin", &self.begin)
            .field("total", &self.total)
            .field("laps", &self.laps)
            .finish()
    }
}

impl<S: Source> Component for Delta<S>
where
    Self: Properties,
{
    fn construct(_config: &ProbeConfig) -> Result<Self, ComponentError> {
        // Fail here rather than on every start.
        S::sample()?;
        Ok(Self::default())
    }

    fn start(&mut self) {
        match S::sample() {
            Ok(raw) => self.begin = Some(raw),
            Err(e) => {
                tracing::warn!(component = Self::NAME, error = %e, "Sample failed at start");
                self.begin = None;
            }
        }
    }

    fn stop(&mut self) {
        let Some(begin) = self.begin.take() else {
            return;
        };
        match S::sample() {
            Ok(end) => {
                self.total += end.saturating_sub(begin);
                self.laps += 1;
            }
            Err(e) => {
                tracing::warn!(component = Self::NAME, error = %e, "Sample failed at stop");
            }
        }
    }

    fn record(&mut self) -> Option<Value> {
        if S::SAMPLEABLE {
            S::sample().ok().map(S::value)
        } else {
            None
        }
    }

    /// Mean per lap.
    fn compute(&self) -> Option<Value> {
        (self.laps > 0).then(|| S::value(self.total / self.laps))
    }

    fn get(&self) -> Option<Value> {
        Some(S::value(self.total))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Every leaf component, in id order. User bundles select from this list.
pub type LeafComponents = (
    WallClock,
    SystemClock,
    UserClock,
    CpuClock,
    MonotonicClock,
    MonotonicRawClock,
    ThreadCpuClock,
    ProcessCpuClock,
    CpuUtil,
    PeakRss,
    PageRss,
    VirtualMemory,
    NumMajorPageFaults,
    NumMinorPageFaults,
    VoluntaryContextSwitch,
    PriorityContextSwitch,
    ReadChar,
    WrittenChar,
    TripCount,
    HwCounters,
);

/// Every registered component type, in id order.
pub type ComponentTypes = (
    WallClock,
    SystemClock,
    UserClock,
    CpuClock,
    MonotonicClock,
    MonotonicRawClock,
    ThreadCpuClock,
    ProcessCpuClock,
    CpuUtil,
    PeakRss,
    PageRss,
    VirtualMemory,
    NumMajorPageFaults,
    NumMinorPageFaults,
    VoluntaryContextSwitch,
    PriorityContextSwitch,
    ReadChar,
    WrittenChar,
    TripCount,
    HwCounters,
    UserGlobalBundle,
    UserTraceBundle,
    UserProfilerBundle,
    UserMpipBundle,
    UserOmptBundle,
    UserNcclpBundle,
    Nothing,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ComponentId, COMPONENTS_TOTAL, NATIVE_COMPONENTS_END};
    use crate::type_list::ComponentList;

    #[test]
    fn test_component_types_cover_registry() {
        let ids = ComponentTypes::ids();
        assert_eq!(ids.len(), COMPONENTS_TOTAL);
        assert_eq!(ids, ComponentId::ALL.to_vec());
    }

    #[test]
    fn test_leaf_components_are_native() {
        for id in LeafComponents::ids() {
            assert!(id.index() < NATIVE_COMPONENTS_END);
        }
    }

    struct Counter;

    static NEXT: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

    impl Source for Counter {
        fn sample() -> Result<u64, ComponentError> {
            Ok(NEXT.fetch_add(10, std::sync::atomic::Ordering::SeqCst))
        }

        fn value(raw: u64) -> Value {
            Value::Count(raw)
        }
    }

    impl Properties for Delta<Counter> {
        const ID: ComponentId = ComponentId::TripCount;
        const NAME: &'static str = "counter";
        const AVAILABLE: bool = true;
    }

    #[test]
    fn test_delta_accumulates_laps() {
        let mut delta = Delta::<Counter>::construct(&ProbeConfig::default()).unwrap();
        assert_eq!(delta.compute(), None);
        delta.start();
        delta.stop();
        delta.start();
        delta.stop();
        assert_eq!(delta.get(), Some(Value::Count(20)));
        assert_eq!(delta.compute(), Some(Value::Count(10)));
        assert_eq!(delta.record(), None);

        // stop without a start leaves the total untouched
        delta.stop();
        assert_eq!(delta.get(), Some(Value::Count(20)));

        delta.reset();
        assert_eq!(delta.get(), Some(Value::Count(0)));
    }
}
