// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

use crate::component::Component;

/// Stands in for "no component" in generic code. Never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nothing;

impl Component for Nothing {}
