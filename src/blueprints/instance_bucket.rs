// Copyright (c) 2025 - Cowboy AI, Inc.
//! Instance and bucket blueprint
//!
//! A VPC with public and private subnets, an instance with no inbound
//! access placed in the most private subnet, and a bucket whose policy
//! lets compute instances read, write and list its objects.
//!
//! Private subnets are isolated when no NAT gateway is configured and
//! route through NAT otherwise.

use tracing::info;

use crate::domain::NamePrefix;
use crate::errors::StackResult;
use crate::resources::bucket::{
    Bucket, BucketEncryption, BucketPolicy, BucketProps, BucketResource, CorsRule, HttpMethod,
    LifecycleRule, Transition,
};
use crate::resources::iam::{PolicyStatement, Principal, ServicePrincipal};
use crate::resources::instance::{Instance, InstanceProps, MachineImage};
use crate::resources::security_group::{SecurityGroup, SecurityGroupProps};
use crate::resources::vpc::{SubnetConfiguration, Vpc, VpcProps};
use crate::stack::{ResourceRef, Stack, StackConfig};

/// Declared instance and bucket stack with handles to its entities
#[derive(Debug, Clone)]
pub struct InstanceBucketStack {
    stack: Stack,
    pub vpc: ResourceRef<Vpc>,
    pub security_group: ResourceRef<SecurityGroup>,
    pub instance: ResourceRef<Instance>,
    pub bucket: ResourceRef<Bucket>,
    pub bucket_policy: ResourceRef<BucketPolicy>,
}

impl InstanceBucketStack {
    pub fn declare(prefix: NamePrefix, config: &StackConfig) -> StackResult<Self> {
        let mut stack = Stack::new(prefix).with_description("Instance with an object bucket");

        let private = if config.nat_gateways > 0 {
            SubnetConfiguration::private_with_egress("private", config.subnet_cidr_mask)
        } else {
            SubnetConfiguration::isolated("isolated", config.subnet_cidr_mask)
        };
        let vpc = Vpc::declare(
            &mut stack,
            "vpc",
            VpcProps::default()
                .with_cidr(config.vpc_cidr)
                .with_max_azs(config.max_azs)
                .with_nat_gateways(config.nat_gateways)
                .with_subnets(vec![
                    SubnetConfiguration::public("public", config.subnet_cidr_mask),
                    private,
                ]),
        )?;

        let security_group = SecurityGroup::declare(
            &mut stack,
            &vpc,
            SecurityGroupProps::new("security-group").allow_all_outbound(true),
        )?;

        let mut instance_props = InstanceProps::new("ec2-instance")
            .with_instance_type(config.instance_type)
            .with_machine_image(MachineImage::LatestAmazonLinux(config.machine_image));
        if let Some(key_name) = &config.key_name {
            instance_props = instance_props.with_key_name(key_name.clone());
        }
        let instance = Instance::declare(&mut stack, &vpc, &security_group, instance_props)?;

        let mut bucket_props = BucketProps::new("bucket")
            .with_encryption(BucketEncryption::S3Managed)
            .versioned(false)
            .public_read_access(false)
            .with_lifecycle_rule(LifecycleRule::new().with_transition(Transition::new(
                config.transition_storage_class,
                config.transition_after_days,
            )?))
            .with_removal_policy(config.removal_policy)
            .auto_delete_objects(config.auto_delete_objects);
        if !config.cors_allowed_origins.is_empty() {
            bucket_props = bucket_props.with_cors_rule(
                CorsRule::new(
                    vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put],
                    config.cors_allowed_origins.clone(),
                )?
                .with_allowed_headers(vec!["*".to_string()]),
            );
        }
        let bucket = Bucket::declare(&mut stack, bucket_props)?;

        let ec2 = Principal::Service(ServicePrincipal::ec2());
        let bucket_policy = BucketPolicy::declare(
            &mut stack,
            &bucket,
            vec![
                PolicyStatement::allow()
                    .with_sid("ObjectAccess")
                    .with_principal(ec2.clone())
                    .with_actions(["s3:GetObject", "s3:PutObject", "s3:DeleteObject"])
                    .on(BucketResource::objects(bucket.clone())),
                PolicyStatement::allow()
                    .with_sid("ListObjects")
                    .with_principal(ec2)
                    .with_action("s3:ListBucket")
                    .on(BucketResource::Bucket(bucket.clone())),
            ],
        )?;

        info!(stack = stack.name(), entities = stack.len(), "🪣 Declared instance bucket stack");

        Ok(Self {
            stack,
            vpc,
            security_group,
            instance,
            bucket,
            bucket_policy,
        })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }
}
