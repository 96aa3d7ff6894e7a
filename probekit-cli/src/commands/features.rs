// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `probe features` command - Show build configuration.

use probekit_core::availability::{enabled_backends, BUILTIN_AGGREGATE_ENTRIES};
use probekit_core::{
    optional_aggregate_entries, Backend, ComponentList, LeafComponents, AVAILABLE_COUNT,
    COMPONENTS_TOTAL, NATIVE_AVAILABLE_COUNT,
};

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let enabled = enabled_backends();

    println!("Backends:");
    for backend in Backend::ALL {
        let mark = if enabled.contains(&backend) { "✓" } else { "✗" };
        println!(
            "  {} {:<12} (+{} aggregate)",
            mark,
            backend.name(),
            backend.aggregate_entries()
        );
    }
    println!();
    println!("Components:");
    println!("  Known:              {}", COMPONENTS_TOTAL);
    println!("  Available (global): {}", AVAILABLE_COUNT);
    println!("  Available (native): {}", NATIVE_AVAILABLE_COUNT);
    println!("  Available leaves:   {}", LeafComponents::AVAILABLE_LEN);
    println!("  Built-in bundles:   {}", BUILTIN_AGGREGATE_ENTRIES);
    println!("  Optional bundles:   {}", optional_aggregate_entries());

    Ok(())
}
