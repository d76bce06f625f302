// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared Resource Kind Taxonomy
//!
//! Defines the kinds of entity that can appear in a declaration set and the
//! provider resource types each one synthesizes to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity in a declaration set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Network
    /// Virtual private cloud
    Vpc,
    /// Subnet owned by a VPC
    Subnet,
    /// Managed NAT gateway placed in a public subnet
    NatGateway,

    // Security
    /// Security group attached to a VPC
    SecurityGroup,

    // Identity
    /// IAM role with a single trust principal
    Role,

    // Compute
    /// EC2 instance
    Instance,

    // Storage
    /// S3 bucket
    Bucket,
    /// Resource policy of an S3 bucket
    BucketPolicy,
}

impl ResourceKind {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::NatGateway => "nat_gateway",
            Self::SecurityGroup => "security_group",
            Self::Role => "role",
            Self::Instance => "instance",
            Self::Bucket => "bucket",
            Self::BucketPolicy => "bucket_policy",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Vpc => "VPC",
            Self::Subnet => "Subnet",
            Self::NatGateway => "NAT Gateway",
            Self::SecurityGroup => "Security Group",
            Self::Role => "IAM Role",
            Self::Instance => "EC2 Instance",
            Self::Bucket => "S3 Bucket",
            Self::BucketPolicy => "S3 Bucket Policy",
        }
    }

    /// Provider type of the primary synthesized resource
    pub fn cloudformation_type(&self) -> &'static str {
        match self {
            Self::Vpc => "AWS::EC2::VPC",
            Self::Subnet => "AWS::EC2::Subnet",
            Self::NatGateway => "AWS::EC2::NatGateway",
            Self::SecurityGroup => "AWS::EC2::SecurityGroup",
            Self::Role => "AWS::IAM::Role",
            Self::Instance => "AWS::EC2::Instance",
            Self::Bucket => "AWS::S3::Bucket",
            Self::BucketPolicy => "AWS::S3::BucketPolicy",
        }
    }

    /// Get the category for this kind
    pub fn category(&self) -> ResourceCategory {
        match self {
            Self::Vpc | Self::Subnet | Self::NatGateway => ResourceCategory::Network,
            Self::SecurityGroup => ResourceCategory::Security,
            Self::Role => ResourceCategory::Identity,
            Self::Instance => ResourceCategory::Compute,
            Self::Bucket | Self::BucketPolicy => ResourceCategory::Storage,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Resource category (high-level grouping)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    /// VPCs, subnets, gateways
    Network,
    /// Traffic filtering
    Security,
    /// Roles and policies
    Identity,
    /// Instances
    Compute,
    /// Buckets and bucket policies
    Storage,
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "Network"),
            Self::Security => write!(f, "Security"),
            Self::Identity => write!(f, "Identity"),
            Self::Compute => write!(f, "Compute"),
            Self::Storage => write!(f, "Storage"),
        }
    }
}
