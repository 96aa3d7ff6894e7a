// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timers.

use std::sync::OnceLock;
use std::time::Instant;

use super::sys::{self, Clock};
use super::{Delta, Source};
use crate::component::{Component, Value};
use crate::config::ProbeConfig;
use crate::error::ComponentError;

pub type WallClock = Delta<WallTime>;
pub type SystemClock = Delta<SystemCpuTime>;
pub type UserClock = Delta<UserCpuTime>;
pub type CpuClock = Delta<CpuTime>;
pub type MonotonicClock = Delta<MonotonicTime>;
pub type MonotonicRawClock = Delta<MonotonicRawTime>;
pub type ThreadCpuClock = Delta<ThreadCpuTime>;
pub type ProcessCpuClock = Delta<ProcessCpuTime>;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds since the first wall clock sample in this process.
pub struct WallTime;

impl Source for WallTime {
    fn sample() -> Result<u64, ComponentError> {
        let epoch = *EPOCH.get_or_init(Instant::now);
        Ok(epoch.elapsed().as_nanos() as u64)
    }

    fn value(raw: u64) -> Value {
        Value::from_nanos(raw)
    }
}

pub struct SystemCpuTime;

impl Source for SystemCpuTime {
    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::resource_usage()?.system_nanos)
    }

    fn value(raw: u64) -> Value {
        Value::from_nanos(raw)
    }
}

pub struct UserCpuTime;

impl Source for UserCpuTime {
    fn sample() -> Result<u64, ComponentError> {
        Ok(sys::resource_usage()?.user_nanos)
    }

    fn value(raw: u64) -> Value {
        Value::from_nanos(raw)
    }
}

/// User plus system time.
pub struct CpuTime;

impl Source for CpuTime {
    fn sample() -> Result<u64, ComponentError> {
        let usage = sys::resource_usage()?;
        Ok(usage.user_nanos + usage.system_nanos)
    }

    fn value(raw: u64) -> Value {
        Value::from_nanos(raw)
    }
}

macro_rules! clock_source {
    ($name:ident, $clock:expr) => {
        pub struct $name;

        impl Source for $name {
            fn sample() -> Result<u64, ComponentError> {
                sys::clock_nanos($clock)
            }

            fn value(raw: u64) -> Value {
                Value::from_nanos(raw)
            }
        }
    };
}

clock_source!(MonotonicTime, Clock::Monotonic);
clock_source!(MonotonicRawTime, Clock::MonotonicRaw);
clock_source!(ThreadCpuTime, Clock::ThreadCpu);
clock_source!(ProcessCpuTime, Clock::ProcessCpu);

/// CPU time as a percentage of elapsed wall time.
#[derive(Debug, Default)]
pub struct CpuUtil {
    begin: Option<(u64, u64)>,
    wall_nanos: u64,
    cpu_nanos: u64,
}

impl CpuUtil {
    fn sample() -> Result<(u64, u64), ComponentError> {
        Ok((WallTime::sample()?, CpuTime::sample()?))
    }
}

impl Component for CpuUtil {
    fn construct(_config: &ProbeConfig) -> Result<Self, ComponentError> {
        Self::sample()?;
        Ok(Self::default())
    }

    fn start(&mut self) {
        self.begin = Self::sample().ok();
    }

    fn stop(&mut self) {
        let (Some((wall0, cpu0)), Ok((wall1, cpu1))) = (self.begin.take(), Self::sample()) else {
            return;
        };
        self.wall_nanos += wall1.saturating_sub(wall0);
        self.cpu_nanos += cpu1.saturating_sub(cpu0);
    }

    fn get(&self) -> Option<Value> {
        if self.wall_nanos == 0 {
            return Some(Value::Percent(0.0));
        }
        Some(Value::Percent(
            self.cpu_nanos as f64 / self.wall_nanos as f64 * 100.0,
        ))
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
