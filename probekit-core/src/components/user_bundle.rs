// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! User bundles: aggregate components whose members are chosen at runtime.
//!
//! Each scope reads its own selection from [`ProbeConfig`] and runs the
//! selector over [`LeafComponents`] when constructed. The aggregate then
//! forwards every operation to its inner bundle.

use std::marker::PhantomData;

use super::LeafComponents;
use crate::bundle::Bundle;
use crate::component::{Component, Value};
use crate::config::ProbeConfig;
use crate::error::{ComponentError, Rejection};
use crate::registry::Properties;
use crate::selector::{SelectionRequest, Selector};

/// Where a user bundle finds its selection.
pub trait BundleScope: Send + 'static {
    const SCOPE: &'static str;

    fn selection(config: &ProbeConfig) -> &SelectionRequest;
}

macro_rules! bundle_scope {
    ($(#[$doc:meta])* $name:ident, $scope:literal, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name;

        impl BundleScope for $name {
            const SCOPE: &'static str = $scope;

            fn selection(config: &ProbeConfig) -> &SelectionRequest {
                &config.user_bundles.$field
            }
        }
    };
}

bundle_scope!(GlobalScope, "global", global);
bundle_scope!(TraceScope, "trace", trace);
bundle_scope!(ProfilerScope, "profiler", profiler);
bundle_scope!(
    /// Components wrapped around intercepted MPI calls.
    MpipScope,
    "mpip",
    mpip
);
bundle_scope!(
    /// Components measuring OpenMP parallel regions.
    OmptScope,
    "ompt",
    ompt
);
bundle_scope!(
    /// Components wrapped around intercepted NCCL calls.
    NcclpScope,
    "ncclp",
    ncclp
);

pub type UserGlobalBundle = UserBundle<GlobalScope>;
pub type UserTraceBundle = UserBundle<TraceScope>;
pub type UserProfilerBundle = UserBundle<ProfilerScope>;
pub type UserMpipBundle = UserBundle<MpipScope>;
pub type UserOmptBundle = UserBundle<OmptScope>;
pub type UserNcclpBundle = UserBundle<NcclpScope>;

/// A runtime-selected group of leaf components.
pub struct UserBundle<S: BundleScope> {
    inner: Bundle<LeafComponents>,
    rejected: Vec<Rejection>,
    _scope: PhantomData<fn() -> S>,
}

impl<S: BundleScope> UserBundle<S> {
    pub fn inner(&self) -> &Bundle<LeafComponents> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut Bundle<LeafComponents> {
        &mut self.inner
    }

    /// Entries of the scope's selection that were dropped at construction.
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }
}

impl<S: BundleScope> Default for UserBundle<S> {
    fn default() -> Self {
        Self {
            inner: Bundle::empty(S::SCOPE),
            rejected: Vec::new(),
            _scope: PhantomData,
        }
    }
}

impl<S: BundleScope> std::fmt::Debug for UserBundle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserBundle")
            .field("inner", &self.inner)
            .field("rejected", &self.rejected)
            .finish()
    }
}

impl<S: BundleScope> Component for UserBundle<S>
where
    Self: Properties,
{
    fn construct(config: &ProbeConfig) -> Result<Self, ComponentError> {
        let selection =
            Selector::new(config).select::<LeafComponents>(S::SCOPE, S::selection(config));
        tracing::debug!(
            component = Self::NAME,
            active = selection.bundle.active_count(),
            rejected = selection.rejected.len(),
            "User bundle constructed"
        );
        Ok(Self {
            inner: selection.bundle,
            rejected: selection.rejected,
            _scope: PhantomData,
        })
    }

    fn start(&mut self) {
        // Misuse is already logged by the inner bundle.
        let _ = self.inner.start();
    }

    fn stop(&mut self) {
        let _ = self.inner.stop();
    }

    fn record(&mut self) -> Option<Value> {
        Some(Value::Nested(self.inner.record()))
    }

    fn compute(&self) -> Option<Value> {
        Some(Value::Nested(self.inner.compute()))
    }

    fn get(&self) -> Option<Value> {
        Some(Value::Nested(self.inner.get()))
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
