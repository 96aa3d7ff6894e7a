// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `probe overhead` command - Measure start/stop cost of a selected bundle.

use std::time::Instant;

use probekit_core::{ComponentTypes, Report, SelectionRequest, Selector};
use serde::Serialize;

use super::load_config;

const DEFAULT_SELECTION: &str = "wall_clock";

#[derive(Serialize)]
struct Output<'a> {
    report: &'a Report,
    rejected: Vec<String>,
    iterations: u64,
    mean_lap_ns: f64,
}

pub fn execute(
    config_path: Option<&str>,
    components: Option<&str>,
    iterations: u64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    let request = match components {
        Some(text) => SelectionRequest::parse(text),
        None if !config.components.is_empty() => config.components.clone(),
        None => SelectionRequest::parse(DEFAULT_SELECTION),
    };
    tracing::debug!(selection = %request, iterations, "Building bundle");

    let mut selection = Selector::new(&config).select::<ComponentTypes>("overhead", &request);
    let bundle = &mut selection.bundle;

    let begin = Instant::now();
    for _ in 0..iterations {
        bundle.start()?;
        bundle.stop()?;
    }
    let elapsed = begin.elapsed();
    let mean_lap_ns = if iterations == 0 {
        0.0
    } else {
        elapsed.as_nanos() as f64 / iterations as f64
    };

    let report = bundle.stop_and_report();
    let rejected: Vec<String> = selection.rejected.iter().map(|r| r.to_string()).collect();

    if json {
        let output = Output {
            report: &report,
            rejected,
            iterations,
            mean_lap_ns,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", report);
    for rejection in &rejected {
        println!("  ✗ skipped {}", rejection);
    }
    println!();
    println!(
        "{} lap(s) over {} component(s): {:.1} ns/lap",
        iterations,
        selection.bundle.active_count(),
        mean_lap_ns
    );

    Ok(())
}
