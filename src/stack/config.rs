// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Configuration
//!
//! Tunables shared by the blueprints. Defaults reproduce the reference
//! deployment: a `10.0.0.0/16` VPC without NAT gateways, a `t2.micro`
//! Amazon Linux 2 instance reachable on 22/80/443, and a bucket destroyed
//! and emptied with the stack.
//!
//! Every field can be overridden from `STACK_*` environment variables or a
//! JSON document; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::domain::invariants::validate_origin;
use crate::domain::{Cidr, Port};
use crate::errors::{StackError, StackResult};
use crate::resources::bucket::StorageClass;
use crate::resources::instance::{AmazonLinuxGeneration, InstanceType};
use crate::resources::RemovalPolicy;

/// Configuration for blueprint stacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// VPC address block
    pub vpc_cidr: Cidr,
    /// Availability zones spanned by the VPC
    pub max_azs: u8,
    /// NAT gateways (0 keeps private subnets isolated)
    pub nat_gateways: u8,
    /// Prefix length of every subnet
    pub subnet_cidr_mask: u8,
    pub instance_type: InstanceType,
    pub machine_image: AmazonLinuxGeneration,
    /// Key pair for instance login; blueprints derive one when unset
    pub key_name: Option<String>,
    /// TCP ports open to the internet on the instance security group
    pub ingress_ports: Vec<Port>,
    pub cors_allowed_origins: Vec<String>,
    pub transition_storage_class: StorageClass,
    pub transition_after_days: u32,
    pub removal_policy: RemovalPolicy,
    pub auto_delete_objects: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            vpc_cidr: Cidr::from_parts(std::net::Ipv4Addr::new(10, 0, 0, 0), 16)
                .unwrap_or(Cidr::ANY),
            max_azs: 2,
            nat_gateways: 0,
            subnet_cidr_mask: 24,
            instance_type: InstanceType::default(),
            machine_image: AmazonLinuxGeneration::AmazonLinux2,
            key_name: None,
            ingress_ports: vec![Port::SSH, Port::HTTP, Port::HTTPS],
            cors_allowed_origins: vec!["http://localhost:6000".to_string()],
            transition_storage_class: StorageClass::InfrequentAccess,
            transition_after_days: 30,
            removal_policy: RemovalPolicy::Destroy,
            auto_delete_objects: true,
        }
    }
}

impl StackConfig {
    /// Load configuration from environment variables
    ///
    /// | Variable | Example |
    /// |---|---|
    /// | `STACK_VPC_CIDR` | `10.0.0.0/16` |
    /// | `STACK_MAX_AZS` | `2` |
    /// | `STACK_NAT_GATEWAYS` | `0` |
    /// | `STACK_SUBNET_CIDR_MASK` | `24` |
    /// | `STACK_INSTANCE_TYPE` | `t3.micro` |
    /// | `STACK_MACHINE_IMAGE` | `amazon-linux-2023` |
    /// | `STACK_KEY_NAME` | `deploy-key` |
    /// | `STACK_INGRESS_PORTS` | `22,80,443` |
    /// | `STACK_CORS_ORIGINS` | `https://app.example.com,http://localhost:6000` |
    /// | `STACK_TRANSITION_STORAGE_CLASS` | `STANDARD_IA` |
    /// | `STACK_TRANSITION_AFTER_DAYS` | `30` |
    /// | `STACK_REMOVAL_POLICY` | `retain` |
    /// | `STACK_AUTO_DELETE_OBJECTS` | `false` |
    pub fn from_env() -> StackResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> StackResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            vpc_cidr: parse_var(&lookup, "STACK_VPC_CIDR", defaults.vpc_cidr)?,
            max_azs: parse_var(&lookup, "STACK_MAX_AZS", defaults.max_azs)?,
            nat_gateways: parse_var(&lookup, "STACK_NAT_GATEWAYS", defaults.nat_gateways)?,
            subnet_cidr_mask: parse_var(&lookup, "STACK_SUBNET_CIDR_MASK", defaults.subnet_cidr_mask)?,
            instance_type: parse_var(&lookup, "STACK_INSTANCE_TYPE", defaults.instance_type)?,
            machine_image: parse_var(&lookup, "STACK_MACHINE_IMAGE", defaults.machine_image)?,
            key_name: lookup("STACK_KEY_NAME").filter(|k| !k.trim().is_empty()),
            ingress_ports: parse_list(&lookup, "STACK_INGRESS_PORTS", defaults.ingress_ports)?,
            cors_allowed_origins: parse_list(
                &lookup,
                "STACK_CORS_ORIGINS",
                defaults.cors_allowed_origins,
            )?,
            transition_storage_class: parse_var(
                &lookup,
                "STACK_TRANSITION_STORAGE_CLASS",
                defaults.transition_storage_class,
            )?,
            transition_after_days: parse_var(
                &lookup,
                "STACK_TRANSITION_AFTER_DAYS",
                defaults.transition_after_days,
            )?,
            removal_policy: parse_var(&lookup, "STACK_REMOVAL_POLICY", defaults.removal_policy)?,
            auto_delete_objects: parse_var(
                &lookup,
                "STACK_AUTO_DELETE_OBJECTS",
                defaults.auto_delete_objects,
            )?,
        };

        config.validate()?;
        debug!(?config, "Loaded stack configuration");
        Ok(config)
    }

    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json(json: &str) -> StackResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> StackResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Check settings no single resource can check on its own
    pub fn validate(&self) -> StackResult<()> {
        if self.ingress_ports.is_empty() {
            return Err(StackError::Configuration(
                "at least one ingress port is required".to_string(),
            ));
        }
        for origin in &self.cors_allowed_origins {
            validate_origin(origin)?;
        }
        if self.auto_delete_objects && self.removal_policy == RemovalPolicy::Retain {
            return Err(StackError::Configuration(
                "auto_delete_objects requires removal_policy destroy".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> StackResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| StackError::Configuration(format!("{key}: {e}"))),
        _ => Ok(default),
    }
}

fn parse_list<T, F>(lookup: &F, key: &str, default: Vec<T>) -> StackResult<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse()
                    .map_err(|e| StackError::Configuration(format!("{key}: {e}")))
            })
            .collect(),
        _ => Ok(default),
    }
}
