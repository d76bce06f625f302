//! Typed declaration sets for cloud infrastructure
//!
//! This crate describes a deployable unit of AWS resources (network,
//! firewall, compute, identity and object storage) as an immutable,
//! validated graph and synthesizes it into a template an external
//! provisioning engine can apply.

pub mod blueprints;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod resources;
pub mod stack;

// Re-export commonly used types
pub use blueprints::Blueprint;
pub use domain::{NamePrefix, ValidationError};
pub use engine::{deploy, teardown, ProvisioningEngine, ProvisioningError};
pub use errors::{StackError, StackResult};
pub use stack::{CloudAssembly, ResourceRef, Stack, StackConfig};
