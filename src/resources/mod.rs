// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarable Resources
//!
//! One module per entity family. Each entity is an immutable desired-state
//! description built through a `declare` constructor that takes the owning
//! [`Stack`](crate::stack::Stack) explicitly.
//!
//! | Module | Entities |
//! |---|---|
//! | [`vpc`] | `Vpc`, `Subnet`, `NatGateway` |
//! | [`security_group`] | `SecurityGroup` |
//! | [`iam`] | `Role` |
//! | [`instance`] | `Instance` |
//! | [`bucket`] | `Bucket`, `BucketPolicy` |

/// Implement [`Declarable`] for an entity stored in `Resource::$variant`
macro_rules! declarable {
    ($entity:ident, $kind:ident, |$this:ident| $refs:expr) => {
        impl $crate::stack::Declarable for $entity {
            const KIND: $crate::domain::ResourceKind = $crate::domain::ResourceKind::$kind;

            fn references(&self) -> Vec<$crate::stack::AnyRef> {
                let $this = self;
                $refs
            }

            fn into_resource(self) -> $crate::resources::Resource {
                $crate::resources::Resource::$kind(self)
            }

            fn from_resource(resource: &$crate::resources::Resource) -> Option<&Self> {
                match resource {
                    $crate::resources::Resource::$kind(entity) => Some(entity),
                    _ => None,
                }
            }
        }
    };
}

pub mod bucket;
pub mod iam;
pub mod instance;
pub mod security_group;
pub mod vpc;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{ResourceKind, ValidationError};
use crate::stack::template::{SynthContext, Synthesize};
use crate::stack::{AnyRef, Declarable, Declaration};

use bucket::{Bucket, BucketPolicy};
use iam::Role;
use instance::Instance;
use security_group::SecurityGroup;
use vpc::{NatGateway, Subnet, Vpc};

/// What happens to a resource when it leaves the declaration set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Delete the live resource
    Destroy,
    /// Orphan the live resource
    #[default]
    Retain,
}

impl RemovalPolicy {
    /// Value of `DeletionPolicy` / `UpdateReplacePolicy`
    pub fn as_deletion_policy(&self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
        }
    }
}

impl FromStr for RemovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "destroy" | "delete" => Ok(Self::Destroy),
            "retain" => Ok(Self::Retain),
            other => Err(format!("unknown removal policy: {other}")),
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Destroy => write!(f, "destroy"),
            Self::Retain => write!(f, "retain"),
        }
    }
}

/// Storage for every declared entity
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Vpc(Vpc),
    Subnet(Subnet),
    NatGateway(NatGateway),
    SecurityGroup(SecurityGroup),
    Role(Role),
    Instance(Instance),
    Bucket(Bucket),
    BucketPolicy(BucketPolicy),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Vpc(_) => ResourceKind::Vpc,
            Self::Subnet(_) => ResourceKind::Subnet,
            Self::NatGateway(_) => ResourceKind::NatGateway,
            Self::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Self::Role(_) => ResourceKind::Role,
            Self::Instance(_) => ResourceKind::Instance,
            Self::Bucket(_) => ResourceKind::Bucket,
            Self::BucketPolicy(_) => ResourceKind::BucketPolicy,
        }
    }

    /// Outgoing references of the wrapped entity
    pub fn references(&self) -> Vec<AnyRef> {
        match self {
            Self::Vpc(r) => r.references(),
            Self::Subnet(r) => r.references(),
            Self::NatGateway(r) => r.references(),
            Self::SecurityGroup(r) => r.references(),
            Self::Role(r) => r.references(),
            Self::Instance(r) => r.references(),
            Self::Bucket(r) => r.references(),
            Self::BucketPolicy(r) => r.references(),
        }
    }

    /// Only buckets hold data worth retaining; everything else is destroyed
    pub fn removal_policy(&self) -> RemovalPolicy {
        match self {
            Self::Bucket(bucket) => bucket.removal_policy(),
            _ => RemovalPolicy::Destroy,
        }
    }

    pub(crate) fn synthesize(
        &self,
        declaration: &Declaration,
        ctx: &mut SynthContext<'_>,
    ) -> Result<(), ValidationError> {
        match self {
            Self::Vpc(r) => r.synthesize(declaration, ctx),
            Self::Subnet(r) => r.synthesize(declaration, ctx),
            Self::NatGateway(r) => r.synthesize(declaration, ctx),
            Self::SecurityGroup(r) => r.synthesize(declaration, ctx),
            Self::Role(r) => r.synthesize(declaration, ctx),
            Self::Instance(r) => r.synthesize(declaration, ctx),
            Self::Bucket(r) => r.synthesize(declaration, ctx),
            Self::BucketPolicy(r) => r.synthesize(declaration, ctx),
        }
    }
}
