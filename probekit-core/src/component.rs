// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The component contract.
//!
//! Every lifecycle operation has a default no-op body. A component overrides
//! only the operations it supports; calls to the others resolve statically to
//! the default and compile away. New operations are added here, with a
//! default, without touching existing components.

use serde::Serialize;

use crate::config::ProbeConfig;
use crate::error::ComponentError;
use crate::registry::{ComponentId, Properties};

/// A measurement component.
pub trait Component: Properties + Default + Send + 'static {
    /// Acquire per-instance state and resources.
    ///
    /// Resources may be tied to the calling thread. A component holding such
    /// resources rebinds them in `start` when driven from another thread.
    fn construct(_config: &ProbeConfig) -> Result<Self, ComponentError> {
        Ok(Self::default())
    }

    fn start(&mut self) {}

    fn stop(&mut self) {}

    /// Take an instantaneous sample outside of start/stop.
    fn record(&mut self) -> Option<Value> {
        None
    }

    /// Derived quantity from the accumulated state.
    fn compute(&self) -> Option<Value> {
        None
    }

    /// Accumulated value.
    fn get(&self) -> Option<Value> {
        None
    }

    /// Clear accumulated state, keeping acquired resources.
    fn reset(&mut self) {}
}

/// A value produced by a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Seconds(f64),
    Count(u64),
    Bytes(u64),
    Percent(f64),
    Counters(Vec<CounterValue>),
    Nested(Vec<OperationResult>),
}

impl Value {
    /// Seconds from a nanosecond count.
    pub fn from_nanos(nanos: u64) -> Self {
        Self::Seconds(nanos as f64 / 1_000_000_000.0)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Seconds(secs) => format_seconds(f, *secs),
            Value::Count(count) => write!(f, "{}", count),
            Value::Bytes(bytes) => format_bytes(f, *bytes),
            Value::Percent(pct) => write!(f, "{:.1}%", pct),
            Value::Counters(counters) => {
                let parts: Vec<String> = counters
                    .iter()
                    .map(|c| format!("{}={}", c.name, c.value))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
            Value::Nested(results) => {
                let parts: Vec<String> = results.iter().map(|r| r.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

fn format_seconds(f: &mut std::fmt::Formatter<'_>, secs: f64) -> std::fmt::Result {
    if secs < 1e-6 {
        write!(f, "{:.0}ns", secs * 1e9)
    } else if secs < 1e-3 {
        write!(f, "{:.2}μs", secs * 1e6)
    } else if secs < 1.0 {
        write!(f, "{:.2}ms", secs * 1e3)
    } else {
        write!(f, "{:.3}s", secs)
    }
}

fn format_bytes(f: &mut std::fmt::Formatter<'_>, bytes: u64) -> std::fmt::Result {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    if bytes < KB {
        write!(f, "{}B", bytes)
    } else if bytes < MB {
        write!(f, "{:.2}KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        write!(f, "{:.2}MB", bytes as f64 / MB as f64)
    } else {
        write!(f, "{:.2}GB", bytes as f64 / GB as f64)
    }
}

/// One named hardware or software counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterValue {
    pub name: &'static str,
    pub value: u64,
}

/// Per-component outcome of an operation. `value == None` is the no-result marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub id: ComponentId,
    pub value: Option<Value>,
}

impl OperationResult {
    pub fn new(id: ComponentId, value: Option<Value>) -> Self {
        Self { id, value }
    }

    /// The component does not implement the operation.
    pub fn is_no_result(&self) -> bool {
        self.value.is_none()
    }
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {}", self.id, value),
            None => write!(f, "{}: -", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Seconds(0.0000005).to_string(), "500ns");
        assert_eq!(Value::Seconds(0.0015).to_string(), "1.50ms");
        assert_eq!(Value::Seconds(2.5).to_string(), "2.500s");
        assert_eq!(Value::Bytes(512).to_string(), "512B");
        assert_eq!(Value::Bytes(2048).to_string(), "2.00KB");
        assert_eq!(Value::Percent(42.0).to_string(), "42.0%");
    }

    #[test]
    fn test_from_nanos() {
        assert_eq!(Value::from_nanos(1_500_000_000), Value::Seconds(1.5));
    }

    #[test]
    fn test_no_result_marker() {
        let result = OperationResult::new(ComponentId::TripCount, None);
        assert!(result.is_no_result());
        assert_eq!(result.to_string(), "trip_count: -");
    }

    #[test]
    fn test_value_serialization() {
        let result = OperationResult::new(ComponentId::WallClock, Some(Value::Seconds(1.0)));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("wall_clock"));
        assert!(json.contains("seconds"));
    }
}
