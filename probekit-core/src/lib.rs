//! Probekit Core Library
//!
//! Component registry and heterogeneous invocation engine. Measurement
//! components are identified at compile time, filtered by the features
//! enabled in this build, composed into fixed-shape bundles and driven
//! through one lifecycle (construct, start, stop, record, compute, get,
//! reset) without dynamic dispatch. A runtime selector activates a subset
//! of a bundle from names or ids read from configuration.

pub mod availability;
pub mod available;
pub mod bundle;
pub mod component;
pub mod components;
pub mod config;
mod dispatch;
pub mod error;
pub mod registry;
pub mod selector;
pub mod type_list;

// Re-export commonly used types
pub use availability::{optional_aggregate_entries, Backend};
pub use available::{AVAILABLE, AVAILABLE_COUNT, NATIVE_AVAILABLE, NATIVE_AVAILABLE_COUNT};
pub use bundle::{Activation, Bundle, Report, Slot};
pub use component::{Component, CounterValue, OperationResult, Value};
pub use components::{ComponentTypes, LeafComponents};
pub use config::{ConfigLoader, ProbeConfig};
pub use error::{
    ComponentError, ConfigError, ProbeError, ProbeResult, Rejection, SelectionError, UsageError,
};
pub use registry::{
    ComponentId, Properties, TypeVisitor, COMPONENTS_END, COMPONENTS_TOTAL, NATIVE_COMPONENTS_END,
};
pub use selector::{Selection, SelectionEntry, SelectionRequest, Selector};
pub use type_list::ComponentList;
