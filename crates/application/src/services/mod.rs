pub mod registry;

pub use registry::{DomainRegistry, ObservedRequest};
