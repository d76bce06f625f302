// Copyright (c) 2025 - Cowboy AI, Inc.
//! Backend API blueprint
//!
//! A public-only VPC with one internet-facing instance. Every name derives
//! from the prefix: with prefix `backend-api` the stack declares
//! `backend-api-vpc`, `backend-api-security-group`, `backend-api-role` and
//! `backend-api-ec2-instance`, and the instance logs in with the
//! `backend-api-ec2-key-pair` key pair unless one is configured.

use tracing::info;

use crate::domain::NamePrefix;
use crate::errors::StackResult;
use crate::resources::iam::{ManagedPolicy, Role, RoleProps, ServicePrincipal};
use crate::resources::instance::{Instance, InstanceProps, MachineImage, SubnetSelection};
use crate::resources::security_group::{IngressRule, SecurityGroup, SecurityGroupProps};
use crate::resources::vpc::{SubnetConfiguration, SubnetType, Vpc, VpcProps};
use crate::stack::{ResourceRef, Stack, StackConfig};

/// Declared backend API stack with handles to its entities
#[derive(Debug, Clone)]
pub struct BackendApiStack {
    stack: Stack,
    pub vpc: ResourceRef<Vpc>,
    pub security_group: ResourceRef<SecurityGroup>,
    pub role: ResourceRef<Role>,
    pub instance: ResourceRef<Instance>,
}

impl BackendApiStack {
    pub fn declare(prefix: NamePrefix, config: &StackConfig) -> StackResult<Self> {
        let key_name = config
            .key_name
            .clone()
            .unwrap_or_else(|| format!("{prefix}-ec2-key-pair"));

        let mut stack = Stack::new(prefix).with_description("Backend API network, role and instance");

        let vpc = Vpc::declare(
            &mut stack,
            "vpc",
            VpcProps::default()
                .with_cidr(config.vpc_cidr)
                .with_max_azs(config.max_azs)
                .with_nat_gateways(config.nat_gateways)
                .with_subnets(vec![SubnetConfiguration::public(
                    "public",
                    config.subnet_cidr_mask,
                )]),
        )?;

        let mut sg_props = SecurityGroupProps::new("security-group").allow_all_outbound(true);
        for port in &config.ingress_ports {
            sg_props = sg_props.with_ingress(IngressRule::tcp_from_anywhere(*port)?);
        }
        let security_group = SecurityGroup::declare(&mut stack, &vpc, sg_props)?;

        let role = Role::declare(
            &mut stack,
            RoleProps::new("role", ServicePrincipal::ec2())
                .with_managed_policy(ManagedPolicy::s3_read_only()),
        )?;

        let instance = Instance::declare(
            &mut stack,
            &vpc,
            &security_group,
            InstanceProps::new("ec2-instance")
                .with_instance_type(config.instance_type)
                .with_machine_image(MachineImage::LatestAmazonLinux(config.machine_image))
                .with_key_name(key_name)
                .with_subnet_selection(SubnetSelection::SubnetType(SubnetType::Public))
                .with_role(role.clone()),
        )?;

        info!(stack = stack.name(), entities = stack.len(), "🏗️  Declared backend API stack");

        Ok(Self {
            stack,
            vpc,
            security_group,
            role,
            instance,
        })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }
}
