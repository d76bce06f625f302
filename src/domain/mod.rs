// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declaration Domain Models
//!
//! Value objects and invariants shared by every resource declaration.
//!
//! # Value Objects with Invariants
//!
//! - [`Cidr`] - IPv4 address block, host bits cleared
//! - [`Port`] / [`PortRange`] - 0-65535
//! - [`Protocol`] / [`Peer`] - traffic rule vocabulary
//! - [`NamePrefix`] / [`ResourceName`] - namespaced physical names
//! - [`LogicalId`] - template identifiers derived from names
//! - [`BucketName`] - S3 naming rules
//! - [`ResourceKind`] - entity taxonomy
//!
//! Validation failures all surface as [`ValidationError`] at declaration
//! time, before anything is submitted to a provisioning engine.

pub mod invariants;
pub mod naming;
pub mod network;
pub mod resource_kind;

pub use invariants::{ValidationError, ValidationResult};
pub use naming::{BucketName, LogicalId, NameError, NamePrefix, ResourceName};
pub use network::{Cidr, NetworkError, Peer, Port, PortRange, Protocol};
pub use resource_kind::{ResourceCategory, ResourceKind};
