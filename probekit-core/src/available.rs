// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Available-set generator.
//!
//! Produces the ascending sequences of ids whose component is available in
//! this build. Both sets are `const` arrays evaluated by the compiler, so
//! they cost nothing at runtime and are identical across runs with the same
//! feature flags.

use crate::registry::{ComponentId, COMPONENTS_TOTAL, NATIVE_COMPONENTS_END};

/// Number of available ids in `[0, end)`.
pub const fn count_available(end: usize) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < end && i < COMPONENTS_TOTAL {
        if ComponentId::ALL[i].available() {
            count += 1;
        }
        i += 1;
    }
    count
}

/// Ascending available ids in `[0, end)`. `N` must equal `count_available(end)`.
pub const fn make_available_set<const N: usize>(end: usize) -> [ComponentId; N] {
    let mut out = [ComponentId::Nothing; N];
    let mut filled = 0;
    let mut i = 0;
    while i < end && i < COMPONENTS_TOTAL {
        let id = ComponentId::ALL[i];
        if id.available() {
            assert!(filled < N, "available set is larger than its declared size");
            out[filled] = id;
            filled += 1;
        }
        i += 1;
    }
    assert!(filled == N, "available set is smaller than its declared size");
    out
}

pub const AVAILABLE_COUNT: usize = count_available(COMPONENTS_TOTAL);

/// Every available id, aggregates included.
pub const AVAILABLE: [ComponentId; AVAILABLE_COUNT] = make_available_set(COMPONENTS_TOTAL);

pub const NATIVE_AVAILABLE_COUNT: usize = count_available(NATIVE_COMPONENTS_END);

/// Available ids in the native range.
pub const NATIVE_AVAILABLE: [ComponentId; NATIVE_AVAILABLE_COUNT] =
    make_available_set(NATIVE_COMPONENTS_END);

/// Canonical names of every available component.
pub fn available_names() -> impl Iterator<Item = &'static str> {
    AVAILABLE.iter().map(|id| id.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::optional_aggregate_entries;

    #[test]
    fn test_sets_are_ascending() {
        assert!(AVAILABLE.windows(2).all(|w| w[0] < w[1]));
        assert!(NATIVE_AVAILABLE.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_native_is_prefix_of_global() {
        assert_eq!(&AVAILABLE[..NATIVE_AVAILABLE_COUNT], &NATIVE_AVAILABLE[..]);
    }

    #[test]
    fn test_membership_matches_predicate() {
        for id in ComponentId::ALL {
            let occurrences = AVAILABLE.iter().filter(|a| **a == id).count();
            assert_eq!(occurrences, usize::from(id.available()));
            if !id.available() {
                assert!(!NATIVE_AVAILABLE.contains(&id));
            }
        }
    }

    #[test]
    fn test_global_minus_native_is_optional_aggregates() {
        assert_eq!(
            AVAILABLE_COUNT - NATIVE_AVAILABLE_COUNT,
            optional_aggregate_entries()
        );
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(count_available(0), 0);
        let empty: [ComponentId; 0] = make_available_set(0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_available_names() {
        let names: Vec<_> = available_names().collect();
        assert!(names.contains(&"wall_clock"));
        assert!(!names.contains(&"nothing"));
    }
}
