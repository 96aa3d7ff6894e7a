// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Integration tests for probekit.
//!
//! These tests drive the public API: registry queries, available sets,
//! runtime selection and the bundle lifecycle.

use std::io::Write;

use probekit_core::availability::{optional_aggregate_entries, BUILTIN_AGGREGATE_ENTRIES};
use probekit_core::components::{
    CpuClock, PeakRss, TripCount, UserGlobalBundle, UserMpipBundle, WallClock,
};
use probekit_core::registry::{available, id, name};
use probekit_core::type_list::round_trip_ids;
use probekit_core::{
    Bundle, ComponentId, ComponentList, ComponentTypes, ConfigLoader, LeafComponents, ProbeConfig,
    SelectionEntry, SelectionError, SelectionRequest, Selector, Value, AVAILABLE,
    AVAILABLE_COUNT, COMPONENTS_END, NATIVE_AVAILABLE, NATIVE_AVAILABLE_COUNT,
};
use tempfile::NamedTempFile;

/// Available types and available ids agree in cardinality.
#[test]
fn test_available_types_match_available_ids() {
    assert_eq!(ComponentTypes::AVAILABLE_LEN, AVAILABLE_COUNT);
    assert_eq!(ComponentTypes::available_ids(), AVAILABLE.to_vec());
    assert_eq!(
        LeafComponents::AVAILABLE_LEN + BUILTIN_AGGREGATE_ENTRIES + optional_aggregate_entries(),
        AVAILABLE_COUNT
    );
    assert!(AVAILABLE.iter().all(|id| id.index() < COMPONENTS_END));
}

#[test]
fn test_global_minus_native_counts_optional_aggregates() {
    assert_eq!(
        AVAILABLE_COUNT - NATIVE_AVAILABLE_COUNT,
        optional_aggregate_entries()
    );
    assert_eq!(&AVAILABLE[..NATIVE_AVAILABLE_COUNT], &NATIVE_AVAILABLE[..]);
}

#[test]
fn test_type_queries_are_consistent() {
    assert_eq!(id::<WallClock>(), ComponentId::WallClock);
    assert_eq!(name::<WallClock>(), "wall_clock");
    assert!(available::<TripCount>());
    assert_eq!(id::<UserGlobalBundle>().name(), "user_global_bundle");
}

#[test]
fn test_available_set_round_trips_through_types() {
    assert_eq!(round_trip_ids(&AVAILABLE), AVAILABLE.to_vec());
    assert_eq!(round_trip_ids(&ComponentId::ALL), ComponentId::ALL.to_vec());
}

/// Zero optional subsystems: native and global counts coincide and an
/// optional-only component is rejected.
#[cfg(not(any(feature = "mpi", feature = "nccl", feature = "ompt")))]
#[test]
fn test_scenario_no_optional_subsystems() {
    assert_eq!(AVAILABLE_COUNT, NATIVE_AVAILABLE_COUNT);
    assert!(!available::<UserMpipBundle>());

    let config = ProbeConfig::default();
    let request = SelectionRequest::parse("user_mpip_bundle");
    let selection = Selector::new(&config).select::<ComponentTypes>("optional", &request);

    assert_eq!(selection.bundle.active_count(), 0);
    assert_eq!(selection.rejected.len(), 1);
    assert_eq!(
        selection.rejected[0].error,
        SelectionError::Unavailable {
            name: "user_mpip_bundle"
        }
    );
}

#[test]
fn test_scenario_duplicate_and_unknown_names() {
    let config = ProbeConfig::default();
    let request = SelectionRequest::parse("wall_clock,bogus_name,wall_clock");
    let selection = Selector::new(&config).select::<LeafComponents>("scenario", &request);

    assert_eq!(selection.bundle.active_ids(), vec![ComponentId::WallClock]);
    assert_eq!(selection.rejected.len(), 1);
    assert_eq!(
        selection.rejected[0].entry,
        SelectionEntry::Name("bogus_name".to_string())
    );
    assert!(matches!(
        selection.rejected[0].error,
        SelectionError::UnknownName { .. }
    ));
}

#[test]
fn test_scenario_empty_selection() {
    let config = ProbeConfig::default();
    let mut selection =
        Selector::new(&config).select::<LeafComponents>("empty", &SelectionRequest::new());

    assert_eq!(selection.bundle.active_count(), 0);
    assert!(selection.rejected.is_empty());
    selection.bundle.start().unwrap();
    selection.bundle.stop().unwrap();
    assert!(selection.bundle.get().is_empty());
}

#[test]
fn test_scenario_record_without_implementation() {
    let mut bundle = Bundle::<(TripCount,)>::new("record");
    bundle.start().unwrap();
    let results = bundle.record();
    assert_eq!(results.len(), 1);
    assert!(results[0].is_no_result());
    bundle.stop().unwrap();
}

#[test]
fn test_duplicate_request_does_not_change_active_count() {
    let config = ProbeConfig::default();
    let once = Selector::new(&config)
        .select::<LeafComponents>("once", &SelectionRequest::parse("cpu_clock,trip_count"));
    let twice = Selector::new(&config).select::<LeafComponents>(
        "twice",
        &SelectionRequest::parse("cpu_clock,trip_count,cpu,trip_count"),
    );
    assert_eq!(once.bundle.active_count(), twice.bundle.active_count());
    assert!(twice.rejected.is_empty());
}

#[test]
fn test_unknown_id_rejected() {
    let config = ProbeConfig::default();
    let request: SelectionRequest = [SelectionEntry::Id(4096)].into_iter().collect();
    let selection = Selector::new(&config).select::<LeafComponents>("ids", &request);
    assert_eq!(
        selection.rejected[0].error,
        SelectionError::UnknownId { id: 4096 }
    );
}

#[test]
fn test_bundle_reuse_across_scopes() {
    let mut bundle = Bundle::<(WallClock, CpuClock, PeakRss, TripCount)>::new("reuse");
    for _ in 0..3 {
        bundle.start().unwrap();
        bundle.stop().unwrap();
    }
    let report = bundle.stop_and_report();
    assert_eq!(report.laps, 3);

    bundle.reset();
    bundle.start().unwrap();
    let report = bundle.stop_and_report();
    assert_eq!(report.laps, 1);
    let trips = report
        .results
        .iter()
        .find(|r| r.id == ComponentId::TripCount)
        .unwrap();
    assert_eq!(trips.value, Some(Value::Count(1)));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"label\":\"reuse\""));
}

#[test]
fn test_concurrent_selection() {
    let config = ProbeConfig::default();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let config = config.clone();
            std::thread::spawn(move || {
                let request = SelectionRequest::parse("wall_clock,trip_count,bogus_name");
                let mut selection = Selector::new(&config)
                    .select::<LeafComponents>(format!("thread-{}", i), &request);
                for _ in 0..100 {
                    selection.bundle.start().unwrap();
                    selection.bundle.stop().unwrap();
                }
                (
                    selection.bundle.active_count(),
                    selection.rejected.len(),
                    selection.bundle.laps(),
                )
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (2, 1, 100));
    }
}

#[test]
fn test_config_file_drives_user_bundles() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "components: [wall_clock, trip_count]\n\
         user_bundles:\n  global: [trip_count, bogus_name]\n"
    )
    .unwrap();

    let config = ConfigLoader::load_file(file.path()).unwrap();
    let selection = Selector::new(&config)
        .select::<(WallClock, TripCount, UserGlobalBundle)>("file", &config.components);
    assert_eq!(
        selection.bundle.active_ids(),
        vec![ComponentId::WallClock, ComponentId::TripCount]
    );

    let mut bundle = Bundle::<(UserGlobalBundle,)>::new("aggregate");
    bundle.construct_with(&config).unwrap();
    bundle.start().unwrap();
    bundle.stop().unwrap();
    let inner = bundle.component::<UserGlobalBundle>().unwrap().inner();
    assert_eq!(inner.active_ids(), vec![ComponentId::TripCount]);
    assert_eq!(inner.laps(), 1);
}
