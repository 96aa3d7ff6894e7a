// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Type lists: tuples of component types and their slot storage.
//!
//! A component list is written as a tuple, `(WallClock, PeakRss)`. Internally
//! it is converted to a cons list of [`Slot`]s so operations can walk the
//! members front-to-back or back-to-front with plain recursion, fully
//! monomorphized. The empty tuple is a valid, empty list.

use std::any::{Any, TypeId};

use crate::bundle::Slot;
use crate::component::Component;
use crate::registry::{ComponentId, TypeVisitor};

/// End of a slot list.
#[derive(Debug, Default)]
pub struct Nil;

/// A slot followed by the rest of the list.
#[derive(Debug, Default)]
pub struct Cons<H, T> {
    pub head: H,
    pub tail: T,
}

/// Operation applied to each slot of a list, mutably.
pub trait SlotVisitor {
    fn visit<C: Component>(&mut self, slot: &mut Slot<C>);
}

/// Operation applied to each slot of a list, read-only.
pub trait SlotInspector {
    fn inspect<C: Component>(&mut self, slot: &Slot<C>);
}

/// Heterogeneous storage for the members of a component list.
pub trait Slots: Default + Send + 'static {
    const LEN: usize;
    /// Members whose component is available in this build.
    const AVAILABLE_LEN: usize;
    /// Bit `id` is set for every member.
    const MASK: u128;
    /// No component type appears twice.
    const DISTINCT: bool;

    fn collect_ids(out: &mut Vec<ComponentId>, available_only: bool);

    /// Declaration order.
    fn visit<V: SlotVisitor>(&mut self, visitor: &mut V);

    /// Reverse declaration order.
    fn visit_rev<V: SlotVisitor>(&mut self, visitor: &mut V);

    fn inspect<V: SlotInspector>(&self, inspector: &mut V);

    fn find<C: Component>(&self) -> Option<&Slot<C>>;

    fn find_mut<C: Component>(&mut self) -> Option<&mut Slot<C>>;
}

impl Slots for Nil {
    const LEN: usize = 0;
    const AVAILABLE_LEN: usize = 0;
    const MASK: u128 = 0;
    const DISTINCT: bool = true;

    fn collect_ids(_out: &mut Vec<ComponentId>, _available_only: bool) {}

    fn visit<V: SlotVisitor>(&mut self, _visitor: &mut V) {}

    fn visit_rev<V: SlotVisitor>(&mut self, _visitor: &mut V) {}

    fn inspect<V: SlotInspector>(&self, _inspector: &mut V) {}

    fn find<C: Component>(&self) -> Option<&Slot<C>> {
        None
    }

    fn find_mut<C: Component>(&mut self) -> Option<&mut Slot<C>> {
        None
    }
}

impl<H: Component, T: Slots> Slots for Cons<Slot<H>, T> {
    const LEN: usize = 1 + T::LEN;
    const AVAILABLE_LEN: usize = H::AVAILABLE as usize + T::AVAILABLE_LEN;
    const MASK: u128 = (1u128 << H::ID as u32) | T::MASK;
    const DISTINCT: bool = T::DISTINCT && (T::MASK & (1u128 << H::ID as u32)) == 0;

    fn collect_ids(out: &mut Vec<ComponentId>, available_only: bool) {
        if !available_only || H::AVAILABLE {
            out.push(H::ID);
        }
        T::collect_ids(out, available_only);
    }

    fn visit<V: SlotVisitor>(&mut self, visitor: &mut V) {
        visitor.visit(&mut self.head);
        self.tail.visit(visitor);
    }

    fn visit_rev<V: SlotVisitor>(&mut self, visitor: &mut V) {
        self.tail.visit_rev(visitor);
        visitor.visit(&mut self.head);
    }

    fn inspect<V: SlotInspector>(&self, inspector: &mut V) {
        inspector.inspect(&self.head);
        self.tail.inspect(inspector);
    }

    fn find<C: Component>(&self) -> Option<&Slot<C>> {
        if TypeId::of::<H>() == TypeId::of::<C>() {
            (&self.head as &dyn Any).downcast_ref::<Slot<C>>()
        } else {
            self.tail.find::<C>()
        }
    }

    fn find_mut<C: Component>(&mut self) -> Option<&mut Slot<C>> {
        if TypeId::of::<H>() == TypeId::of::<C>() {
            (&mut self.head as &mut dyn Any).downcast_mut::<Slot<C>>()
        } else {
            self.tail.find_mut::<C>()
        }
    }
}

/// An ordered list of component types, written as a tuple.
pub trait ComponentList: 'static {
    type Slots: Slots;

    const LEN: usize = <Self::Slots as Slots>::LEN;
    const AVAILABLE_LEN: usize = <Self::Slots as Slots>::AVAILABLE_LEN;

    /// Ids of every member, in declaration order.
    fn ids() -> Vec<ComponentId> {
        let mut out = Vec::with_capacity(Self::LEN);
        <Self::Slots as Slots>::collect_ids(&mut out, false);
        out
    }

    /// Ids of the members available in this build, in declaration order.
    fn available_ids() -> Vec<ComponentId> {
        let mut out = Vec::with_capacity(Self::AVAILABLE_LEN);
        <Self::Slots as Slots>::collect_ids(&mut out, true);
        out
    }

    /// Whether `id` is a member of the list.
    fn contains(id: ComponentId) -> bool {
        <Self::Slots as Slots>::MASK & (1u128 << id.index()) != 0
    }
}

impl ComponentList for () {
    type Slots = Nil;
}

macro_rules! impl_component_list {
    () => {};
    ($head:ident $(, $tail:ident)*) => {
        impl<$head: Component, $($tail: Component),*> ComponentList for ($head, $($tail,)*) {
            type Slots = Cons<Slot<$head>, <($($tail,)*) as ComponentList>::Slots>;
        }

        impl_component_list!($($tail),*);
    };
}

impl_component_list!(
    C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11, C12, C13, C14, C15, C16, C17, C18, C19, C20,
    C21, C22, C23, C24, C25, C26, C27, C28, C29, C30, C31, C32
);

/// Converts a sequence of ids to their types and back, through the registry.
///
/// For any list of known ids this returns the input unchanged; it exists so
/// callers can check that id-level and type-level views agree.
pub fn round_trip_ids(ids: &[ComponentId]) -> Vec<ComponentId> {
    struct IdOf;

    impl TypeVisitor for IdOf {
        type Output = ComponentId;

        fn visit<C: Component>(self) -> ComponentId {
            C::ID
        }
    }

    ids.iter().map(|id| id.visit(IdOf)).collect()
}

/// Canonical names of the members of `L`, in declaration order.
pub fn type_names<L: ComponentList>() -> Vec<&'static str> {
    L::ids().into_iter().map(ComponentId::name).collect()
}

/// Name of the concrete type registered under `id`.
pub fn rust_type_name(id: ComponentId) -> &'static str {
    struct TypeName;

    impl TypeVisitor for TypeName {
        type Output = &'static str;

        fn visit<C: Component>(self) -> &'static str {
            std::any::type_name::<C>()
        }
    }

    id.visit(TypeName)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{PeakRss, TripCount, WallClock};

    #[test]
    fn test_empty_list() {
        assert_eq!(<() as ComponentList>::LEN, 0);
        assert!(<() as ComponentList>::ids().is_empty());
    }

    #[test]
    fn test_ids_in_declaration_order() {
        type L = (TripCount, WallClock, PeakRss);
        assert_eq!(
            L::ids(),
            vec![
                ComponentId::TripCount,
                ComponentId::WallClock,
                ComponentId::PeakRss
            ]
        );
        assert_eq!(L::LEN, 3);
        assert!(L::contains(ComponentId::WallClock));
        assert!(!L::contains(ComponentId::CpuClock));
    }

    #[test]
    fn test_distinct_detection() {
        type Unique = (WallClock, TripCount);
        type Repeated = (WallClock, TripCount, WallClock);
        assert!(<<Unique as ComponentList>::Slots as Slots>::DISTINCT);
        assert!(!<<Repeated as ComponentList>::Slots as Slots>::DISTINCT);
    }

    #[test]
    fn test_round_trip_ids() {
        let ids = vec![ComponentId::PeakRss, ComponentId::WallClock];
        assert_eq!(round_trip_ids(&ids), ids);
    }

    #[test]
    fn test_rust_type_name() {
        assert!(rust_type_name(ComponentId::TripCount).ends_with("TripCount"));
    }
}
