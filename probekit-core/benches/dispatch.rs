// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Dispatch overhead microbenchmarks.
//!
//! Measures one start/stop lap over bundles of increasing width, and the
//! cost of building a bundle from a runtime selection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use probekit_core::components::{CpuClock, PeakRss, TripCount, WallClock};
use probekit_core::{Bundle, LeafComponents, ProbeConfig, SelectionRequest, Selector};
use std::time::Duration;

/// Start/stop lap on statically typed bundles.
fn bench_static_lap(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_lap");
    group.measurement_time(Duration::from_secs(5));

    let config = ProbeConfig::default();

    group.bench_function("empty", |b| {
        let mut bundle = Bundle::<()>::new("empty");
        bundle.construct_with(&config).ok();
        b.iter(|| {
            bundle.start().ok();
            bundle.stop().ok();
        });
    });

    group.bench_function("trip_count", |b| {
        let mut bundle = Bundle::<(TripCount,)>::new("trip_count");
        bundle.construct_with(&config).ok();
        b.iter(|| {
            bundle.start().ok();
            bundle.stop().ok();
        });
        black_box(bundle.get());
    });

    group.bench_function("wall_clock", |b| {
        let mut bundle = Bundle::<(WallClock,)>::new("wall_clock");
        bundle.construct_with(&config).ok();
        b.iter(|| {
            bundle.start().ok();
            bundle.stop().ok();
        });
    });

    group.bench_function("wall_cpu_rss_trips", |b| {
        let mut bundle = Bundle::<(WallClock, CpuClock, PeakRss, TripCount)>::new("mixed");
        bundle.construct_with(&config).ok();
        b.iter(|| {
            bundle.start().ok();
            bundle.stop().ok();
        });
    });

    group.finish();
}

/// Lap on the widest bundle with only one member active.
fn bench_sparse_lap(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_lap");
    group.measurement_time(Duration::from_secs(5));

    let config = ProbeConfig::default();
    let request = SelectionRequest::parse("trip_count");
    let mut selection = Selector::new(&config).select::<LeafComponents>("sparse", &request);

    group.bench_function("leaf_components_one_active", |b| {
        b.iter(|| {
            selection.bundle.start().ok();
            selection.bundle.stop().ok();
        });
    });

    group.finish();
}

/// Building a bundle from a runtime selection.
fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    let config = ProbeConfig::default();
    let request = SelectionRequest::parse("wall_clock,cpu_clock,bogus_name,trip_count,wall_clock");

    group.bench_function("select_leaf_components", |b| {
        b.iter(|| {
            let selection =
                Selector::new(&config).select::<LeafComponents>("bench", black_box(&request));
            black_box(selection.bundle.active_count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_static_lap, bench_sparse_lap, bench_selection);
criterion_main!(benches);
