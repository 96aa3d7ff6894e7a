// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

use crate::component::{Component, Value};

/// Number of times the measurement was started.
#[derive(Debug, Default)]
pub struct TripCount {
    count: u64,
}

impl Component for TripCount {
    fn start(&mut self) {
        self.count += 1;
    }

    fn get(&self) -> Option<Value> {
        Some(Value::Count(self.count))
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}
