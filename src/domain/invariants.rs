// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Declaration Invariants
//!
//! Every rule that can be checked before a declaration set is handed to the
//! provisioning engine lives here. All functions are pure and return a
//! detailed [`ValidationError`] on failure.
//!
//! # Invariant Categories
//!
//! 1. **Structural**: value formats (CIDR, ports, names, IAM actions)
//! 2. **Layout**: subnets inside the VPC block, NAT gateway placement
//! 3. **Referential**: references resolve inside the same declaration set
//! 4. **Lifecycle**: removal policy and auto-delete combinations

use super::naming::NameError;
use super::network::{Cidr, NetworkError, Port};
use super::resource_kind::ResourceKind;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Declaration-time validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Malformed address block, port or protocol
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Malformed resource name
    #[error(transparent)]
    Name(#[from] NameError),

    /// Two entities derive the same physical name
    #[error("Duplicate resource name in declaration set: {0}")]
    DuplicateName(String),

    /// Name was derived from another declaration set's prefix
    #[error("Resource name {name} is outside namespace {prefix}")]
    OutsideNamespace { name: String, prefix: String },

    /// Two entities derive the same logical id
    #[error("Duplicate logical id in declaration set: {0}")]
    DuplicateLogicalId(String),

    /// Reference to an entity that is not declared in this set
    #[error("Unresolved {kind} reference: {logical_id}")]
    UnresolvedReference {
        kind: ResourceKind,
        logical_id: String,
    },

    /// Reference resolves to an entity of another kind
    #[error("Reference {logical_id} expected {expected}, found {actual}")]
    KindMismatch {
        logical_id: String,
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// Dependency cycle between declared entities
    #[error("Dependency cycle involving {0}")]
    DependencyCycle(String),

    #[error("VPC address block {0} must be a /16 to /28 range")]
    VpcBlockSize(String),

    #[error("Subnet {subnet} does not fit inside VPC block {vpc}")]
    SubnetOutsideVpc { subnet: String, vpc: String },

    #[error("Subnets {first} and {second} overlap")]
    OverlappingSubnets { first: String, second: String },

    #[error("Subnet mask /{mask} must be between the VPC prefix and /28")]
    SubnetMaskSize { mask: u8 },

    #[error("VPC declares no subnet groups")]
    NoSubnetGroups,

    #[error("Duplicate subnet group name: {0}")]
    DuplicateSubnetGroup(String),

    #[error("Availability zone count {0} must be between 1 and 6")]
    AvailabilityZoneCount(u8),

    #[error("{0} NAT gateway(s) requested but no public subnet group declared")]
    NatWithoutPublicSubnet(u8),

    #[error("{requested} NAT gateway(s) requested but only {available} public subnet(s)")]
    TooManyNatGateways { requested: u8, available: usize },

    #[error("Subnet group {0} needs egress through a NAT gateway but NAT gateway count is 0")]
    EgressWithoutNat(String),

    #[error("No {subnet_type} subnet available in {vpc}")]
    NoMatchingSubnet { subnet_type: String, vpc: String },

    #[error("Security group {security_group} belongs to a VPC other than {vpc}")]
    SecurityGroupVpcMismatch { security_group: String, vpc: String },

    #[error("Invalid instance type: {0}")]
    InvalidInstanceType(String),

    #[error("Invalid machine image: {0}")]
    InvalidMachineImage(String),

    #[error("Invalid key pair name: {0}")]
    InvalidKeyName(String),

    #[error("Invalid service principal: {0}")]
    InvalidServicePrincipal(String),

    #[error("Invalid managed policy name: {0}")]
    InvalidManagedPolicy(String),

    #[error("Invalid IAM action (expected service:Action): {0}")]
    InvalidAction(String),

    #[error("Policy statement declares no {0}")]
    EmptyStatement(&'static str),

    /// Bucket policy statement targets another bucket
    #[error("Policy statement for bucket {owner} references bucket {referenced}")]
    PolicyResourceMismatch { owner: String, referenced: String },

    #[error("Bucket {0}: auto-delete objects requires removal policy Destroy")]
    AutoDeleteRequiresDestroy(String),

    #[error("Bucket {0} is versioned: auto-delete must remove all object versions")]
    AutoDeleteIgnoresVersions(String),

    #[error("Invalid CORS rule: {0}")]
    InvalidCorsRule(String),

    #[error("Invalid lifecycle rule: {0}")]
    InvalidLifecycleRule(String),

    #[error("Invalid description: {0}")]
    InvalidDescription(String),
}

/// Validate a raw port value
pub fn validate_port(port: i64) -> Result<Port, ValidationError> {
    Ok(Port::new(port)?)
}

/// Validate the VPC address block size
///
/// # Rules
/// - Prefix between /16 and /28 (provider limits)
pub fn validate_vpc_block(block: &Cidr) -> ValidationResult {
    if !(16..=28).contains(&block.prefix_length()) {
        return Err(ValidationError::VpcBlockSize(block.to_string()));
    }
    Ok(())
}

/// Validate subnets sit inside the VPC block without overlapping
///
/// # Rules
/// - Every subnet contained in `vpc`
/// - No two subnets share an address
pub fn validate_subnet_layout(vpc: &Cidr, subnets: &[Cidr]) -> ValidationResult {
    for subnet in subnets {
        if !vpc.contains(subnet) {
            return Err(ValidationError::SubnetOutsideVpc {
                subnet: subnet.to_string(),
                vpc: vpc.to_string(),
            });
        }
    }

    for (i, first) in subnets.iter().enumerate() {
        if let Some(second) = subnets[i + 1..].iter().find(|other| first.overlaps(other)) {
            return Err(ValidationError::OverlappingSubnets {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
    }

    Ok(())
}

/// Validate NAT gateway placement against the subnet layout
///
/// # Rules
/// - NAT gateways need a public subnet group
/// - At most one NAT gateway per public subnet
/// - Subnet groups routing egress through NAT need at least one gateway
pub fn validate_nat_layout(
    nat_gateways: u8,
    public_subnets: usize,
    egress_groups: &[&str],
) -> ValidationResult {
    if nat_gateways > 0 && public_subnets == 0 {
        return Err(ValidationError::NatWithoutPublicSubnet(nat_gateways));
    }

    if usize::from(nat_gateways) > public_subnets {
        return Err(ValidationError::TooManyNatGateways {
            requested: nat_gateways,
            available: public_subnets,
        });
    }

    if nat_gateways == 0 {
        if let Some(group) = egress_groups.first() {
            return Err(ValidationError::EgressWithoutNat(group.to_string()));
        }
    }

    Ok(())
}

/// Validate an IAM action
///
/// # Rules
/// - `service:Action` with a lowercase service prefix
/// - Action part alphanumeric, `*` wildcards allowed
pub fn validate_iam_action(action: &str) -> ValidationResult {
    let invalid = || ValidationError::InvalidAction(action.to_string());

    if action == "*" {
        return Ok(());
    }

    let (service, operation) = action.split_once(':').ok_or_else(invalid)?;

    let service_ok = !service.is_empty()
        && service
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let operation_ok = !operation.is_empty()
        && operation
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '*');

    if !service_ok || !operation_ok {
        return Err(invalid());
    }
    Ok(())
}

/// Validate a bucket policy statement only targets its owning bucket
pub fn validate_policy_resource(owner: &str, referenced: &str) -> ValidationResult {
    if owner != referenced {
        return Err(ValidationError::PolicyResourceMismatch {
            owner: owner.to_string(),
            referenced: referenced.to_string(),
        });
    }
    Ok(())
}

/// Validate auto-delete against removal policy and versioning
///
/// # Rules
/// - Auto-delete only applies to buckets destroyed with the stack
/// - A versioned bucket can only be emptied by removing every version
pub fn validate_auto_delete(
    bucket: &str,
    auto_delete: bool,
    removes_all_versions: bool,
    destroy_on_removal: bool,
    versioned: bool,
) -> ValidationResult {
    if !auto_delete {
        return Ok(());
    }

    if !destroy_on_removal {
        return Err(ValidationError::AutoDeleteRequiresDestroy(bucket.to_string()));
    }

    if versioned && !removes_all_versions {
        return Err(ValidationError::AutoDeleteIgnoresVersions(bucket.to_string()));
    }

    Ok(())
}

/// Validate a CORS allowed origin
///
/// # Rules
/// - `*`, or an `http://` / `https://` origin with at most one `*`
pub fn validate_origin(origin: &str) -> ValidationResult {
    if origin == "*" {
        return Ok(());
    }

    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .ok_or_else(|| ValidationError::InvalidCorsRule(format!("origin {origin}")))?;

    if host.is_empty() || host.matches('*').count() > 1 || host.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidCorsRule(format!("origin {origin}")));
    }

    Ok(())
}

/// Validate a free-text description
///
/// # Rules
/// - At most 255 characters
/// - Printable ASCII only (provider restriction on rule descriptions)
pub fn validate_description(description: &str) -> ValidationResult {
    if description.len() > 255 || !description.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
    {
        return Err(ValidationError::InvalidDescription(description.to_string()));
    }
    Ok(())
}
