// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Operation dispatch over a bundle's slots.
//!
//! Each operation is a visitor whose `visit` is generic over the component
//! type, so every call into a component is resolved at compile time. Slots of
//! components unavailable in this build are skipped by a constant test that
//! the optimizer removes.

use crate::bundle::{Activation, Slot};
use crate::component::{Component, OperationResult};
use crate::config::ProbeConfig;
use crate::error::{ComponentFailure, SelectionError};
use crate::registry::ComponentId;
use crate::type_list::{SlotInspector, SlotVisitor};

/// Marks available members active, either all of them or a single id.
pub(crate) struct MarkOp {
    target: Option<ComponentId>,
    pub marked: usize,
}

impl MarkOp {
    pub fn all() -> Self {
        Self {
            target: None,
            marked: 0,
        }
    }

    pub fn one(id: ComponentId) -> Self {
        Self {
            target: Some(id),
            marked: 0,
        }
    }
}

impl SlotVisitor for MarkOp {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if self.target.map_or(true, |id| id == C::ID) {
            slot.marked = true;
            self.marked += 1;
        }
    }
}

/// Builds an instance for every marked member that has none yet.
pub(crate) struct ConstructOp<'a> {
    config: &'a ProbeConfig,
    label: &'a str,
    pub failures: Vec<ComponentFailure>,
}

impl<'a> ConstructOp<'a> {
    pub fn new(config: &'a ProbeConfig, label: &'a str) -> Self {
        Self {
            config,
            label,
            failures: Vec::new(),
        }
    }
}

impl SlotVisitor for ConstructOp<'_> {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if !C::AVAILABLE || !slot.marked || slot.instance.is_some() {
            return;
        }
        match C::construct(self.config) {
            Ok(instance) => slot.instance = Some(instance),
            Err(error) => {
                tracing::warn!(
                    label = self.label,
                    component = C::NAME,
                    error = %error,
                    "Component failed to construct, skipping"
                );
                slot.marked = false;
                self.failures.push(ComponentFailure { id: C::ID, error });
            }
        }
    }
}

/// Marks and constructs a single member, used by the runtime selector.
pub(crate) struct ActivateOp<'a> {
    id: ComponentId,
    config: &'a ProbeConfig,
    pub outcome: Option<Result<Activation, SelectionError>>,
}

impl<'a> ActivateOp<'a> {
    pub fn new(id: ComponentId, config: &'a ProbeConfig) -> Self {
        Self {
            id,
            config,
            outcome: None,
        }
    }
}

impl SlotVisitor for ActivateOp<'_> {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if C::ID != self.id {
            return;
        }
        if !C::AVAILABLE {
            self.outcome = Some(Err(SelectionError::Unavailable { name: C::NAME }));
            return;
        }
        if slot.instance.is_some() {
            self.outcome = Some(Ok(Activation::AlreadyActive));
            return;
        }
        self.outcome = Some(match C::construct(self.config) {
            Ok(instance) => {
                slot.marked = true;
                slot.instance = Some(instance);
                Ok(Activation::Activated)
            }
            Err(error) => Err(SelectionError::ConstructFailed {
                name: C::NAME,
                reason: error.to_string(),
            }),
        });
    }
}

pub(crate) struct StartOp;

impl SlotVisitor for StartOp {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if let Some(instance) = slot.instance.as_mut() {
            instance.start();
        }
    }
}

pub(crate) struct StopOp;

impl SlotVisitor for StopOp {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if let Some(instance) = slot.instance.as_mut() {
            instance.stop();
        }
    }
}

pub(crate) struct ResetOp;

impl SlotVisitor for ResetOp {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if let Some(instance) = slot.instance.as_mut() {
            instance.reset();
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordOp {
    pub results: Vec<OperationResult>,
}

impl SlotVisitor for RecordOp {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if let Some(instance) = slot.instance.as_mut() {
            self.results
                .push(OperationResult::new(C::ID, instance.record()));
        }
    }
}

#[derive(Default)]
pub(crate) struct GetOp {
    pub results: Vec<OperationResult>,
}

impl SlotInspector for GetOp {
    fn inspect<C: Component>(&mut self, slot: &Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if let Some(instance) = slot.instance.as_ref() {
            self.results.push(OperationResult::new(C::ID, instance.get()));
        }
    }
}

#[derive(Default)]
pub(crate) struct ComputeOp {
    pub results: Vec<OperationResult>,
}

impl SlotInspector for ComputeOp {
    fn inspect<C: Component>(&mut self, slot: &Slot<C>) {
        if !C::AVAILABLE {
            return;
        }
        if let Some(instance) = slot.instance.as_ref() {
            self.results
                .push(OperationResult::new(C::ID, instance.compute()));
        }
    }
}

/// Collects the ids of active members, or of marked ones.
pub(crate) struct MembersOp {
    marked: bool,
    pub ids: Vec<ComponentId>,
}

impl MembersOp {
    pub fn active() -> Self {
        Self {
            marked: false,
            ids: Vec::new(),
        }
    }

    pub fn marked() -> Self {
        Self {
            marked: true,
            ids: Vec::new(),
        }
    }
}

impl SlotInspector for MembersOp {
    fn inspect<C: Component>(&mut self, slot: &Slot<C>) {
        let selected = if self.marked {
            slot.marked
        } else {
            slot.instance.is_some()
        };
        if selected {
            self.ids.push(C::ID);
        }
    }
}
