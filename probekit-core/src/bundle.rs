// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Component bundle: a fixed-shape, heterogeneous container.
//!
//! `Bundle<L>` holds zero or one instance of each component type in `L`.
//! Start runs members in declaration order, stop in reverse order. Misuse is
//! reported as a [`UsageError`] and leaves the bundle usable.

use serde::Serialize;

use crate::component::{Component, OperationResult};
use crate::config::ProbeConfig;
use crate::dispatch::{
    ActivateOp, ComputeOp, ConstructOp, GetOp, MarkOp, MembersOp, RecordOp, ResetOp, StartOp,
    StopOp,
};
use crate::error::{ComponentFailure, SelectionError, UsageError};
use crate::registry::ComponentId;
use crate::type_list::{ComponentList, Slots};

/// Per-type storage inside a bundle.
#[derive(Debug)]
pub struct Slot<C> {
    /// Selected for this bundle instance.
    pub(crate) marked: bool,
    pub(crate) instance: Option<C>,
}

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self {
            marked: false,
            instance: None,
        }
    }
}

impl<C> Slot<C> {
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn is_active(&self) -> bool {
        self.instance.is_some()
    }

    pub fn instance(&self) -> Option<&C> {
        self.instance.as_ref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut C> {
        self.instance.as_mut()
    }
}

/// Outcome of activating a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The member was constructed.
    Activated,
    /// The member was already active; nothing was constructed.
    AlreadyActive,
}

/// Final values of a measurement scope.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub label: String,
    pub laps: u64,
    pub results: Vec<OperationResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<OperationResult>,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] laps: {}", self.label, self.laps)?;
        for result in &self.results {
            writeln!(f, "  {}", result)?;
        }
        for result in &self.derived {
            writeln!(f, "  {} (per lap)", result)?;
        }
        Ok(())
    }
}

/// A heterogeneous set of components driven as one.
pub struct Bundle<L: ComponentList> {
    label: String,
    slots: L::Slots,
    constructed: bool,
    running: bool,
    laps: u64,
    failures: Vec<ComponentFailure>,
}

impl<L: ComponentList> Bundle<L> {
    const DISTINCT_MEMBERS: () = assert!(
        <L::Slots as Slots>::DISTINCT,
        "a bundle's component list must not repeat a component type"
    );

    /// A bundle with no member marked active.
    pub fn empty(label: impl Into<String>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::DISTINCT_MEMBERS;
        Self {
            label: label.into(),
            slots: L::Slots::default(),
            constructed: false,
            running: false,
            laps: 0,
            failures: Vec::new(),
        }
    }

    /// A bundle with every available member marked active.
    pub fn new(label: impl Into<String>) -> Self {
        let mut bundle = Self::empty(label);
        bundle.slots.visit(&mut MarkOp::all());
        bundle
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Mark a member active for the next construction.
    ///
    /// Returns false if `id` is not an available member of this bundle, or
    /// if the bundle is already constructed.
    pub fn mark(&mut self, id: ComponentId) -> bool {
        if self.constructed {
            tracing::debug!(
                label = %self.label,
                component = %id,
                "Bundle already constructed, mark ignored"
            );
            return false;
        }
        let mut op = MarkOp::one(id);
        self.slots.visit(&mut op);
        op.marked > 0
    }

    /// Construct every marked member using the process-wide configuration.
    pub fn construct(&mut self) -> Result<(), UsageError> {
        self.construct_with(ProbeConfig::global())
    }

    /// Construct every marked member. Members that fail are left inactive.
    pub fn construct_with(&mut self, config: &ProbeConfig) -> Result<(), UsageError> {
        if self.constructed {
            let err = UsageError::AlreadyConstructed {
                label: self.label.clone(),
            };
            tracing::warn!(label = %self.label, "{}", err);
            return Err(err);
        }
        let mut op = ConstructOp::new(config, &self.label);
        self.slots.visit(&mut op);
        self.failures.extend(op.failures);
        self.constructed = true;
        Ok(())
    }

    /// Mark and construct one member.
    pub(crate) fn activate(
        &mut self,
        id: ComponentId,
        config: &ProbeConfig,
    ) -> Result<Activation, SelectionError> {
        let mut op = ActivateOp::new(id, config);
        self.slots.visit(&mut op);
        op.outcome
            .unwrap_or(Err(SelectionError::NotInBundle { name: id.name() }))
    }

    pub(crate) fn set_constructed(&mut self) {
        self.constructed = true;
    }

    /// Start every active member, in declaration order.
    ///
    /// Constructs the bundle first if that has not happened yet.
    pub fn start(&mut self) -> Result<(), UsageError> {
        if self.running {
            let err = UsageError::AlreadyRunning {
                label: self.label.clone(),
            };
            tracing::warn!(label = %self.label, "{}", err);
            return Err(err);
        }
        if !self.constructed {
            self.construct()?;
        }
        self.slots.visit(&mut StartOp);
        self.running = true;
        Ok(())
    }

    /// Stop every active member, in reverse declaration order.
    pub fn stop(&mut self) -> Result<(), UsageError> {
        if !self.running {
            let err = UsageError::StopWithoutStart {
                label: self.label.clone(),
            };
            tracing::warn!(label = %self.label, "{}", err);
            return Err(err);
        }
        self.slots.visit_rev(&mut StopOp);
        self.running = false;
        self.laps += 1;
        Ok(())
    }

    /// Instantaneous sample from every active member.
    pub fn record(&mut self) -> Vec<OperationResult> {
        let mut op = RecordOp::default();
        self.slots.visit(&mut op);
        op.results
    }

    /// Derived values from every active member.
    pub fn compute(&self) -> Vec<OperationResult> {
        let mut op = ComputeOp::default();
        self.slots.inspect(&mut op);
        op.results
    }

    /// Accumulated values from every active member.
    pub fn get(&self) -> Vec<OperationResult> {
        let mut op = GetOp::default();
        self.slots.inspect(&mut op);
        op.results
    }

    /// Clear accumulated state so the bundle can measure a new scope.
    pub fn reset(&mut self) {
        self.slots.visit(&mut ResetOp);
        self.running = false;
        self.laps = 0;
    }

    /// Stop if running and produce the report.
    pub fn stop_and_report(&mut self) -> Report {
        if self.running {
            let _ = self.stop();
        } else {
            tracing::debug!(label = %self.label, "Reporting a bundle that is not running");
        }
        self.report()
    }

    pub fn report(&self) -> Report {
        Report {
            label: self.label.clone(),
            laps: self.laps,
            results: self.get(),
            derived: self
                .compute()
                .into_iter()
                .filter(|r| !r.is_no_result())
                .collect(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Completed start/stop pairs since construction or the last reset.
    pub fn laps(&self) -> u64 {
        self.laps
    }

    /// Ids of the members holding an instance, in declaration order.
    pub fn active_ids(&self) -> Vec<ComponentId> {
        let mut op = MembersOp::active();
        self.slots.inspect(&mut op);
        op.ids
    }

    /// Ids of the members marked for construction, in declaration order.
    pub fn marked_ids(&self) -> Vec<ComponentId> {
        let mut op = MembersOp::marked();
        self.slots.inspect(&mut op);
        op.ids
    }

    pub fn active_count(&self) -> usize {
        self.active_ids().len()
    }

    pub fn is_active(&self, id: ComponentId) -> bool {
        L::contains(id) && self.active_ids().contains(&id)
    }

    /// Typed access to an active member.
    pub fn component<C: Component>(&self) -> Option<&C> {
        self.slots.find::<C>().and_then(Slot::instance)
    }

    pub fn component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.slots.find_mut::<C>().and_then(Slot::instance_mut)
    }

    /// Members that failed to construct.
    pub fn failures(&self) -> &[ComponentFailure] {
        &self.failures
    }
}

impl<L: ComponentList> Default for Bundle<L> {
    fn default() -> Self {
        Self::empty("")
    }
}

impl<L: ComponentList> std::fmt::Debug for Bundle<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("label", &self.label)
            .field("active", &self.active_ids())
            .field("constructed", &self.constructed)
            .field("running", &self.running)
            .field("laps", &self.laps)
            .finish()
    }
}
