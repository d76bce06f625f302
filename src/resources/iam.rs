// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity: Roles and Policy Statements
//!
//! A [`Role`] is assumed by exactly one [`ServicePrincipal`] and carries a
//! set of AWS managed policies. [`PolicyStatement`] is the shared statement
//! model used by resource policies such as
//! [`BucketPolicy`](super::bucket::BucketPolicy).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use super::bucket::BucketResource;
use crate::domain::invariants::{validate_description, validate_iam_action};
use crate::domain::{ValidationError, ValidationResult};
use crate::stack::template::{aws_managed_policy_arn, SynthContext, Synthesize};
use crate::stack::{Declaration, ResourceRef, Stack};

/// IAM policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// AWS service allowed to assume a role (`ec2.amazonaws.com`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServicePrincipal(String);

impl ServicePrincipal {
    const DOMAIN: &'static str = ".amazonaws.com";

    pub fn new(principal: impl Into<String>) -> Result<Self, ValidationError> {
        let principal = principal.into();
        let service = principal
            .strip_suffix(Self::DOMAIN)
            .ok_or_else(|| ValidationError::InvalidServicePrincipal(principal.clone()))?;

        let valid = !service.is_empty()
            && service
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
        if !valid {
            return Err(ValidationError::InvalidServicePrincipal(principal));
        }
        Ok(Self(principal))
    }

    /// Service principal for compute instances
    pub fn ec2() -> Self {
        Self(format!("ec2{}", Self::DOMAIN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ServicePrincipal {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServicePrincipal> for String {
    fn from(value: ServicePrincipal) -> Self {
        value.0
    }
}

/// Provider-maintained policy attached by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ManagedPolicy(String);

impl ManagedPolicy {
    pub const MAX_LENGTH: usize = 128;

    /// AWS managed policy by name, optionally with a path (`service-role/...`)
    pub fn aws_managed(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.len() <= Self::MAX_LENGTH
            && !name.starts_with('/')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+=,.@-_/".contains(c));
        if !valid {
            return Err(ValidationError::InvalidManagedPolicy(name));
        }
        Ok(Self(name))
    }

    /// Read-only access to every bucket
    pub fn s3_read_only() -> Self {
        Self("AmazonS3ReadOnlyAccess".to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Partition-aware ARN expression
    pub fn arn(&self) -> Value {
        aws_managed_policy_arn(&self.0)
    }
}

impl fmt::Display for ManagedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ManagedPolicy {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::aws_managed(value)
    }
}

impl From<ManagedPolicy> for String {
    fn from(value: ManagedPolicy) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Who a resource policy statement applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    Service(ServicePrincipal),
    /// Every caller, authenticated or not
    Anyone,
}

/// One statement of a resource policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    sid: Option<String>,
    effect: Effect,
    principals: Vec<Principal>,
    actions: Vec<String>,
    resources: Vec<BucketResource>,
}

impl PolicyStatement {
    fn with_effect(effect: Effect) -> Self {
        Self {
            sid: None,
            effect,
            principals: Vec::new(),
            actions: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn allow() -> Self {
        Self::with_effect(Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::with_effect(Effect::Deny)
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        if !self.principals.contains(&principal) {
            self.principals.push(principal);
        }
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        let action = action.into();
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        self
    }

    pub fn with_actions<I, S>(self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        actions
            .into_iter()
            .fold(self, |statement, action| statement.with_action(action))
    }

    pub fn on(mut self, resource: BucketResource) -> Self {
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
        self
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn principals(&self) -> &[Principal] {
        &self.principals
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &[BucketResource] {
        &self.resources
    }

    /// Check the statement is complete and every action well-formed
    pub fn validate(&self) -> ValidationResult {
        if self.principals.is_empty() {
            return Err(ValidationError::EmptyStatement("principals"));
        }
        if self.actions.is_empty() {
            return Err(ValidationError::EmptyStatement("actions"));
        }
        if self.resources.is_empty() {
            return Err(ValidationError::EmptyStatement("resources"));
        }
        for action in &self.actions {
            validate_iam_action(action)?;
        }
        if let Some(sid) = &self.sid {
            if sid.is_empty() || !sid.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ValidationError::InvalidDescription(sid.clone()));
            }
        }
        Ok(())
    }

    pub(crate) fn to_template(&self) -> Value {
        let principal = if self.principals.contains(&Principal::Anyone) {
            json!("*")
        } else {
            let services: Vec<&str> = self
                .principals
                .iter()
                .filter_map(|p| match p {
                    Principal::Service(service) => Some(service.as_str()),
                    Principal::Anyone => None,
                })
                .collect();
            json!({ "Service": one_or_many(services) })
        };

        let mut statement = json!({
            "Effect": self.effect.as_str(),
            "Principal": principal,
            "Action": one_or_many(self.actions.iter().map(String::as_str).collect()),
            "Resource": one_or_many(self.resources.iter().map(BucketResource::arn).collect()),
        });
        if let Some(sid) = &self.sid {
            statement["Sid"] = json!(sid);
        }
        statement
    }
}

/// Render a single element bare and several as a list
fn one_or_many<T: Serialize>(mut items: Vec<T>) -> Value {
    if items.len() == 1 {
        json!(items.remove(0))
    } else {
        json!(items)
    }
}

/// Inputs to [`Role::declare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleProps {
    suffix: String,
    assumed_by: ServicePrincipal,
    managed_policies: Vec<ManagedPolicy>,
    description: Option<String>,
}

impl RoleProps {
    pub fn new(suffix: impl Into<String>, assumed_by: ServicePrincipal) -> Self {
        Self {
            suffix: suffix.into(),
            assumed_by,
            managed_policies: Vec::new(),
            description: None,
        }
    }

    pub fn with_managed_policy(mut self, policy: ManagedPolicy) -> Self {
        if !self.managed_policies.contains(&policy) {
            self.managed_policies.push(policy);
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Identity assumed by a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    assumed_by: ServicePrincipal,
    managed_policies: Vec<ManagedPolicy>,
    description: Option<String>,
}

declarable!(Role, Role, |_role| Vec::new());

impl Role {
    pub fn declare(stack: &mut Stack, props: RoleProps) -> Result<ResourceRef<Role>, ValidationError> {
        let name = stack.derive_name(&props.suffix)?;
        if let Some(description) = &props.description {
            validate_description(description)?;
        }

        stack.declare(
            name,
            Role {
                assumed_by: props.assumed_by,
                managed_policies: props.managed_policies,
                description: props.description,
            },
        )
    }

    pub fn assumed_by(&self) -> &ServicePrincipal {
        &self.assumed_by
    }

    pub fn managed_policies(&self) -> &[ManagedPolicy] {
        &self.managed_policies
    }

    /// Trust policy letting the principal assume the role
    pub fn trust_policy(&self) -> Value {
        json!({
            "Statement": [{
                "Action": "sts:AssumeRole",
                "Effect": "Allow",
                "Principal": { "Service": self.assumed_by.as_str() },
            }],
            "Version": POLICY_VERSION,
        })
    }
}

impl Synthesize for Role {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let mut properties = json!({
            "AssumeRolePolicyDocument": self.trust_policy(),
            "RoleName": declaration.name().as_str(),
        });
        if !self.managed_policies.is_empty() {
            properties["ManagedPolicyArns"] =
                Value::Array(self.managed_policies.iter().map(ManagedPolicy::arn).collect());
        }
        if let Some(description) = &self.description {
            properties["Description"] = json!(description);
        }

        ctx.add_resource(
            declaration.logical_id(),
            json!({ "Type": "AWS::IAM::Role", "Properties": properties }),
        )
    }
}
