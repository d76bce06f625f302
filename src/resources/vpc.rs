// Copyright (c) 2025 - Cowboy AI, Inc.
//! Virtual Network: VPC, Subnets, NAT Gateways
//!
//! [`Vpc::declare`] records the VPC and carves its address block into one
//! subnet per availability zone per [`SubnetConfiguration`] group. Blocks are
//! allocated sequentially in group order, so the first `/24` group of a
//! `10.0.0.0/16` VPC over two zones gets `10.0.0.0/24` and `10.0.1.0/24`.
//!
//! NAT gateways live in the first `nat_gateways` public subnets; subnets of
//! type [`SubnetType::PrivateWithEgress`] route through them round-robin.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::debug;

use crate::domain::invariants::{validate_nat_layout, validate_subnet_layout, validate_vpc_block};
use crate::domain::{Cidr, LogicalId, ValidationError, ValidationResult};
use crate::stack::template::{availability_zone, get_att, name_tags, reference, SynthContext, Synthesize};
use crate::stack::{Declaration, ResourceRef, Stack};

/// Maximum availability zones a VPC spans
pub const MAX_AVAILABILITY_ZONES: u8 = 6;

/// Smallest subnet the provider accepts
pub const MIN_SUBNET_PREFIX: u8 = 28;

/// Routing class of a subnet group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetType {
    /// Default route to the internet gateway
    Public,
    /// Default route to a NAT gateway
    PrivateWithEgress,
    /// No route out of the VPC
    PrivateIsolated,
}

impl SubnetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::PrivateWithEgress => "private-with-egress",
            Self::PrivateIsolated => "private-isolated",
        }
    }

    /// Tag value recorded on synthesized subnets
    fn tag_value(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::PrivateWithEgress => "Private",
            Self::PrivateIsolated => "Isolated",
        }
    }
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubnetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "public" => Ok(Self::Public),
            "private-with-egress" | "private" => Ok(Self::PrivateWithEgress),
            "private-isolated" | "isolated" => Ok(Self::PrivateIsolated),
            other => Err(format!("unknown subnet type: {other}")),
        }
    }
}

/// One subnet group, repeated in every availability zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfiguration {
    pub name: String,
    pub subnet_type: SubnetType,
    pub cidr_mask: u8,
}

impl SubnetConfiguration {
    pub fn new(name: impl Into<String>, subnet_type: SubnetType, cidr_mask: u8) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask,
        }
    }

    pub fn public(name: impl Into<String>, cidr_mask: u8) -> Self {
        Self::new(name, SubnetType::Public, cidr_mask)
    }

    pub fn private_with_egress(name: impl Into<String>, cidr_mask: u8) -> Self {
        Self::new(name, SubnetType::PrivateWithEgress, cidr_mask)
    }

    pub fn isolated(name: impl Into<String>, cidr_mask: u8) -> Self {
        Self::new(name, SubnetType::PrivateIsolated, cidr_mask)
    }
}

/// Inputs to [`Vpc::declare`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcProps {
    pub cidr: Cidr,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub subnet_configuration: Vec<SubnetConfiguration>,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
}

impl Default for VpcProps {
    /// `10.0.0.0/16` over two zones, one public `/24` group, no NAT
    fn default() -> Self {
        Self {
            cidr: Cidr::from_parts(Ipv4Addr::new(10, 0, 0, 0), 16).unwrap_or(Cidr::ANY),
            max_azs: 2,
            nat_gateways: 0,
            subnet_configuration: vec![SubnetConfiguration::public("public", 24)],
            enable_dns_hostnames: true,
            enable_dns_support: true,
        }
    }
}

impl VpcProps {
    pub fn with_cidr(mut self, cidr: Cidr) -> Self {
        self.cidr = cidr;
        self
    }

    pub fn with_max_azs(mut self, max_azs: u8) -> Self {
        self.max_azs = max_azs;
        self
    }

    pub fn with_nat_gateways(mut self, nat_gateways: u8) -> Self {
        self.nat_gateways = nat_gateways;
        self
    }

    pub fn with_subnets(mut self, subnets: Vec<SubnetConfiguration>) -> Self {
        self.subnet_configuration = subnets;
        self
    }
}

/// Isolated virtual network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    cidr: Cidr,
    max_azs: u8,
    nat_gateways: u8,
    subnet_groups: Vec<SubnetConfiguration>,
    enable_dns_hostnames: bool,
    enable_dns_support: bool,
}

declarable!(Vpc, Vpc, |_vpc| Vec::new());

/// Subnet block planned for one group in one zone
struct PlannedSubnet<'a> {
    group: &'a SubnetConfiguration,
    zone: u8,
    cidr: Cidr,
}

impl Vpc {
    /// Validate props into a VPC entity without declaring subnets
    pub fn from_props(props: &VpcProps) -> Result<Self, ValidationError> {
        validate_vpc_block(&props.cidr)?;

        if props.max_azs == 0 || props.max_azs > MAX_AVAILABILITY_ZONES {
            return Err(ValidationError::AvailabilityZoneCount(props.max_azs));
        }
        if props.subnet_configuration.is_empty() {
            return Err(ValidationError::NoSubnetGroups);
        }

        let mut groups = HashSet::new();
        for group in &props.subnet_configuration {
            if !groups.insert(group.name.as_str()) {
                return Err(ValidationError::DuplicateSubnetGroup(group.name.clone()));
            }
            if group.cidr_mask < props.cidr.prefix_length() || group.cidr_mask > MIN_SUBNET_PREFIX {
                return Err(ValidationError::SubnetMaskSize {
                    mask: group.cidr_mask,
                });
            }
        }

        let public = props
            .subnet_configuration
            .iter()
            .filter(|g| g.subnet_type == SubnetType::Public)
            .count()
            * usize::from(props.max_azs);
        let egress: Vec<&str> = props
            .subnet_configuration
            .iter()
            .filter(|g| g.subnet_type == SubnetType::PrivateWithEgress)
            .map(|g| g.name.as_str())
            .collect();
        validate_nat_layout(props.nat_gateways, public, &egress)?;

        Ok(Self {
            cidr: props.cidr,
            max_azs: props.max_azs,
            nat_gateways: props.nat_gateways,
            subnet_groups: props.subnet_configuration.clone(),
            enable_dns_hostnames: props.enable_dns_hostnames,
            enable_dns_support: props.enable_dns_support,
        })
    }

    /// Declare the VPC with its subnets and NAT gateways
    ///
    /// # Invariants
    /// - Every subnet lies inside the VPC block, none overlap
    /// - NAT gateway count 0 declares no NAT gateway entity
    /// - Nothing is added to `stack` when validation fails
    pub fn declare(
        stack: &mut Stack,
        suffix: &str,
        props: VpcProps,
    ) -> Result<ResourceRef<Vpc>, ValidationError> {
        let vpc = Self::from_props(&props)?;
        let plan = vpc.plan_subnets()?;

        // Derive and check every name up front so a failure leaves the stack untouched
        let vpc_name = stack.derive_name(suffix)?;
        let mut subnet_names = Vec::with_capacity(plan.len());
        for planned in &plan {
            subnet_names.push(stack.derive_name(&format!(
                "{suffix}-{}-subnet-{}",
                planned.group.name,
                planned.zone + 1
            ))?);
        }
        let nat_names = (1..=vpc.nat_gateways)
            .map(|n| stack.derive_name(&format!("{suffix}-nat-gateway-{n}")))
            .collect::<Result<Vec<_>, _>>()?;

        let mut planned_ids = HashSet::new();
        for name in std::iter::once(&vpc_name)
            .chain(&subnet_names)
            .chain(&nat_names)
        {
            stack.check_available(name)?;
            if !planned_ids.insert(name.logical_id()) {
                return Err(ValidationError::DuplicateLogicalId(
                    name.logical_id().to_string(),
                ));
            }
        }

        let vpc_ref = stack.declare(vpc_name, vpc.clone())?;

        // Public and isolated subnets first; NAT gateways need public subnets
        // and egress subnets need NAT gateways.
        let mut public_subnets = Vec::new();
        let mut egress = Vec::new();
        for (planned, name) in plan.iter().zip(subnet_names) {
            let subnet = Subnet {
                vpc: vpc_ref.clone(),
                group: planned.group.name.clone(),
                subnet_type: planned.group.subnet_type,
                cidr: planned.cidr,
                availability_zone: planned.zone,
                nat_gateway: None,
            };
            match planned.group.subnet_type {
                SubnetType::PrivateWithEgress => egress.push((subnet, name)),
                SubnetType::Public => public_subnets.push(stack.declare(name, subnet)?),
                SubnetType::PrivateIsolated => {
                    stack.declare(name, subnet)?;
                }
            }
        }

        let mut nat_refs = Vec::with_capacity(nat_names.len());
        for (name, subnet) in nat_names.into_iter().zip(&public_subnets) {
            nat_refs.push(stack.declare(
                name,
                NatGateway {
                    subnet: subnet.clone(),
                },
            )?);
        }

        for (index, (mut subnet, name)) in egress.into_iter().enumerate() {
            subnet.nat_gateway = nat_refs.get(index % nat_refs.len().max(1)).cloned();
            stack.declare(name, subnet)?;
        }

        debug!(
            vpc = %vpc_ref.logical_id(),
            subnets = plan.len(),
            nat_gateways = nat_refs.len(),
            "Declared VPC {}", vpc.cidr
        );

        Ok(vpc_ref)
    }

    /// Carve one block per group per zone, in group order
    fn plan_subnets(&self) -> Result<Vec<PlannedSubnet<'_>>, ValidationError> {
        let mut used = 0u64;
        let mut plan = Vec::new();

        for group in &self.subnet_groups {
            let block_size = 1u64 << (32 - u32::from(group.cidr_mask));
            for zone in 0..self.max_azs {
                let index = used.div_ceil(block_size);
                let cidr = u32::try_from(index)
                    .ok()
                    .and_then(|index| self.cidr.subdivide(group.cidr_mask, index).ok())
                    .ok_or_else(|| ValidationError::SubnetOutsideVpc {
                        subnet: format!("{}-{}", group.name, zone + 1),
                        vpc: self.cidr.to_string(),
                    })?;
                plan.push(PlannedSubnet { group, zone, cidr });
                used = (index + 1) * block_size;
            }
        }

        let blocks: Vec<Cidr> = plan.iter().map(|p| p.cidr).collect();
        validate_subnet_layout(&self.cidr, &blocks)?;
        Ok(plan)
    }

    pub fn cidr(&self) -> Cidr {
        self.cidr
    }

    pub fn nat_gateways(&self) -> u8 {
        self.nat_gateways
    }

    pub fn has_subnet_type(&self, subnet_type: SubnetType) -> bool {
        self.subnet_groups.iter().any(|g| g.subnet_type == subnet_type)
    }
}

impl Synthesize for Vpc {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let id = declaration.logical_id();
        ctx.add_resource(
            id,
            json!({
                "Type": "AWS::EC2::VPC",
                "Properties": {
                    "CidrBlock": self.cidr.to_string(),
                    "EnableDnsHostnames": self.enable_dns_hostnames,
                    "EnableDnsSupport": self.enable_dns_support,
                    "InstanceTenancy": "default",
                    "Tags": name_tags(declaration.name()),
                }
            }),
        )?;

        if self.has_subnet_type(SubnetType::Public) {
            ctx.add_resource(
                &internet_gateway_id(id),
                json!({
                    "Type": "AWS::EC2::InternetGateway",
                    "Properties": { "Tags": name_tags(declaration.name()) }
                }),
            )?;
            ctx.add_resource(
                &gateway_attachment_id(id),
                json!({
                    "Type": "AWS::EC2::VPCGatewayAttachment",
                    "Properties": {
                        "VpcId": reference(id),
                        "InternetGatewayId": reference(&internet_gateway_id(id)),
                    }
                }),
            )?;
        }
        Ok(())
    }
}

fn internet_gateway_id(vpc: &LogicalId) -> LogicalId {
    vpc.child("igw")
}

fn gateway_attachment_id(vpc: &LogicalId) -> LogicalId {
    vpc.child("vpcgw")
}

/// Address range inside a VPC, bound to one availability zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    vpc: ResourceRef<Vpc>,
    group: String,
    subnet_type: SubnetType,
    cidr: Cidr,
    availability_zone: u8,
    nat_gateway: Option<ResourceRef<NatGateway>>,
}

declarable!(Subnet, Subnet, |subnet| {
    let mut refs = vec![subnet.vpc.erase()];
    refs.extend(subnet.nat_gateway.iter().map(ResourceRef::erase));
    refs
});

impl Subnet {
    pub fn vpc(&self) -> &ResourceRef<Vpc> {
        &self.vpc
    }

    /// Name of the subnet group this subnet belongs to
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn subnet_type(&self) -> SubnetType {
        self.subnet_type
    }

    pub fn cidr(&self) -> Cidr {
        self.cidr
    }

    /// Zero-based availability zone index
    pub fn availability_zone(&self) -> u8 {
        self.availability_zone
    }

    pub fn nat_gateway(&self) -> Option<&ResourceRef<NatGateway>> {
        self.nat_gateway.as_ref()
    }
}

impl Synthesize for Subnet {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let id = declaration.logical_id();
        let route_table = id.child("route-table");
        let vpc = self.vpc.logical_id();

        ctx.add_resource(
            id,
            json!({
                "Type": "AWS::EC2::Subnet",
                "Properties": {
                    "VpcId": reference(vpc),
                    "CidrBlock": self.cidr.to_string(),
                    "AvailabilityZone": availability_zone(self.availability_zone),
                    "MapPublicIpOnLaunch": self.subnet_type == SubnetType::Public,
                    "Tags": [
                        { "Key": "Name", "Value": declaration.name().as_str() },
                        { "Key": "cim:subnet-name", "Value": self.group },
                        { "Key": "cim:subnet-type", "Value": self.subnet_type.tag_value() },
                    ],
                }
            }),
        )?;
        ctx.add_resource(
            &route_table,
            json!({
                "Type": "AWS::EC2::RouteTable",
                "Properties": {
                    "VpcId": reference(vpc),
                    "Tags": name_tags(declaration.name()),
                }
            }),
        )?;
        ctx.add_resource(
            &id.child("route-table-association"),
            json!({
                "Type": "AWS::EC2::SubnetRouteTableAssociation",
                "Properties": {
                    "RouteTableId": reference(&route_table),
                    "SubnetId": reference(id),
                }
            }),
        )?;

        match (self.subnet_type, &self.nat_gateway) {
            (SubnetType::Public, _) => ctx.add_resource(
                &id.child("default-route"),
                json!({
                    "Type": "AWS::EC2::Route",
                    "Properties": {
                        "RouteTableId": reference(&route_table),
                        "DestinationCidrBlock": Cidr::ANY.to_string(),
                        "GatewayId": reference(&internet_gateway_id(vpc)),
                    },
                    "DependsOn": [gateway_attachment_id(vpc).as_str()],
                }),
            ),
            (SubnetType::PrivateWithEgress, Some(nat)) => ctx.add_resource(
                &id.child("default-route"),
                json!({
                    "Type": "AWS::EC2::Route",
                    "Properties": {
                        "RouteTableId": reference(&route_table),
                        "DestinationCidrBlock": Cidr::ANY.to_string(),
                        "NatGatewayId": reference(nat.logical_id()),
                    }
                }),
            ),
            (SubnetType::PrivateWithEgress, None) => {
                Err(ValidationError::EgressWithoutNat(self.group.clone()))
            }
            (SubnetType::PrivateIsolated, _) => Ok(()),
        }
    }
}

/// Managed NAT gateway in a public subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatGateway {
    subnet: ResourceRef<Subnet>,
}

declarable!(NatGateway, NatGateway, |nat| vec![nat.subnet.erase()]);

impl NatGateway {
    pub fn subnet(&self) -> &ResourceRef<Subnet> {
        &self.subnet
    }
}

impl Synthesize for NatGateway {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let id = declaration.logical_id();
        let eip = id.child("eip");
        let subnet = self.subnet.logical_id();

        ctx.add_resource(
            &eip,
            json!({
                "Type": "AWS::EC2::EIP",
                "Properties": {
                    "Domain": "vpc",
                    "Tags": name_tags(declaration.name()),
                }
            }),
        )?;
        ctx.add_resource(
            id,
            json!({
                "Type": "AWS::EC2::NatGateway",
                "Properties": {
                    "SubnetId": reference(subnet),
                    "AllocationId": get_att(&eip, "AllocationId"),
                    "Tags": name_tags(declaration.name()),
                },
                "DependsOn": [
                    subnet.child("default-route").as_str(),
                    subnet.child("route-table-association").as_str(),
                ],
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceKind;

    fn stack() -> Stack {
        Stack::try_from("net").unwrap()
    }

    fn cidrs(stack: &Stack, subnet_type: SubnetType) -> Vec<String> {
        stack
            .entities::<Subnet>()
            .filter(|(_, s)| s.subnet_type() == subnet_type)
            .map(|(_, s)| s.cidr().to_string())
            .collect()
    }

    #[test]
    fn test_default_layout() {
        let mut stack = stack();
        let vpc = Vpc::declare(&mut stack, "vpc", VpcProps::default()).unwrap();

        assert_eq!(stack.count(ResourceKind::Vpc), 1);
        assert_eq!(stack.count(ResourceKind::Subnet), 2);
        assert_eq!(stack.count(ResourceKind::NatGateway), 0);
        assert_eq!(
            cidrs(&stack, SubnetType::Public),
            vec!["10.0.0.0/24", "10.0.1.0/24"]
        );
        assert_eq!(stack.owned_by::<Subnet, Vpc>(&vpc).len(), 2);
        assert!(stack
            .declaration(&LogicalId::from_name("net-vpc-public-subnet-1"))
            .is_some());
    }

    #[test]
    fn test_mixed_groups_with_nat() {
        let mut stack = stack();
        let props = VpcProps::default().with_nat_gateways(1).with_subnets(vec![
            SubnetConfiguration::public("ingress", 24),
            SubnetConfiguration::private_with_egress("application", 20),
            SubnetConfiguration::isolated("data", 28),
        ]);
        Vpc::declare(&mut stack, "vpc", props).unwrap();

        assert_eq!(stack.count(ResourceKind::Subnet), 6);
        assert_eq!(stack.count(ResourceKind::NatGateway), 1);
        assert_eq!(
            cidrs(&stack, SubnetType::PrivateWithEgress),
            vec!["10.0.16.0/20", "10.0.32.0/20"]
        );
        assert_eq!(
            cidrs(&stack, SubnetType::PrivateIsolated),
            vec!["10.0.48.0/28", "10.0.48.16/28"]
        );
        assert!(stack
            .entities::<Subnet>()
            .filter(|(_, s)| s.subnet_type() == SubnetType::PrivateWithEgress)
            .all(|(_, s)| s.nat_gateway().is_some()));
        assert!(stack.validate().is_ok());
    }

    #[test]
    fn test_zero_nat_with_egress_rejected() {
        let mut stack = stack();
        let props = VpcProps::default().with_subnets(vec![
            SubnetConfiguration::public("public", 24),
            SubnetConfiguration::private_with_egress("private", 24),
        ]);
        assert_eq!(
            Vpc::declare(&mut stack, "vpc", props),
            Err(ValidationError::EgressWithoutNat("private".to_string()))
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn test_block_exhaustion_rejected() {
        let mut stack = stack();
        let props = VpcProps::default()
            .with_cidr(Cidr::new("10.0.0.0/24").unwrap())
            .with_subnets(vec![SubnetConfiguration::public("public", 24)]);
        assert!(matches!(
            Vpc::declare(&mut stack, "vpc", props),
            Err(ValidationError::SubnetOutsideVpc { .. })
        ));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_colliding_logical_ids_leave_stack_empty() {
        let mut stack = stack();
        let props = VpcProps::default().with_subnets(vec![
            SubnetConfiguration::public("a1", 24),
            SubnetConfiguration::isolated("a-1", 24),
        ]);
        assert_eq!(
            Vpc::declare(&mut stack, "vpc", props),
            Err(ValidationError::DuplicateLogicalId("NetVpcA1Subnet1".to_string()))
        );
        assert!(stack.is_empty());
    }

    #[test]
    fn test_clash_with_declared_subnet_leaves_stack_unchanged() {
        let mut stack = stack();
        let props = VpcProps::default().with_subnets(vec![SubnetConfiguration::public("a1", 24)]);
        Vpc::declare(&mut stack, "vpc", props).unwrap();
        let before = stack.len();

        // net-vpc-a-1-subnet-1 and net-vpc-a1-subnet-1 share NetVpcA1Subnet1
        let props = VpcProps::default().with_subnets(vec![SubnetConfiguration::public("1", 24)]);
        assert_eq!(
            Vpc::declare(&mut stack, "vpc-a", props),
            Err(ValidationError::DuplicateLogicalId("NetVpcA1Subnet1".to_string()))
        );
        assert_eq!(stack.len(), before);
    }

    #[test]
    fn test_invalid_props() {
        let too_wide = VpcProps::default().with_cidr(Cidr::new("10.0.0.0/8").unwrap());
        assert!(matches!(
            Vpc::from_props(&too_wide),
            Err(ValidationError::VpcBlockSize(_))
        ));
        assert_eq!(
            Vpc::from_props(&VpcProps::default().with_max_azs(0)),
            Err(ValidationError::AvailabilityZoneCount(0))
        );
        assert_eq!(
            Vpc::from_props(&VpcProps::default().with_subnets(vec![])),
            Err(ValidationError::NoSubnetGroups)
        );
        assert_eq!(
            Vpc::from_props(&VpcProps::default().with_subnets(vec![
                SubnetConfiguration::public("a", 24),
                SubnetConfiguration::isolated("a", 24),
            ])),
            Err(ValidationError::DuplicateSubnetGroup("a".to_string()))
        );
        assert_eq!(
            Vpc::from_props(
                &VpcProps::default().with_subnets(vec![SubnetConfiguration::public("a", 29)])
            ),
            Err(ValidationError::SubnetMaskSize { mask: 29 })
        );
    }

    #[test]
    fn test_public_subnet_synthesis() {
        let mut stack = stack();
        Vpc::declare(&mut stack, "vpc", VpcProps::default().with_max_azs(1)).unwrap();
        let assembly = stack.synthesize().unwrap();

        let subnet = assembly.template_resource("NetVpcPublicSubnet1").unwrap();
        assert_eq!(subnet["Properties"]["CidrBlock"], "10.0.0.0/24");
        assert_eq!(subnet["Properties"]["VpcId"], json!({"Ref": "NetVpc"}));
        assert_eq!(subnet["Properties"]["MapPublicIpOnLaunch"], true);

        let route = assembly
            .template_resource("NetVpcPublicSubnet1DefaultRoute")
            .unwrap();
        assert_eq!(route["Properties"]["GatewayId"], json!({"Ref": "NetVpcIgw"}));
        assert_eq!(route["DependsOn"], json!(["NetVpcVpcgw"]));
        assert!(assembly.template_resource("NetVpcIgw").is_some());
    }

    #[test]
    fn test_subnet_type_parsing() {
        assert_eq!("public".parse::<SubnetType>(), Ok(SubnetType::Public));
        assert_eq!("private_with_egress".parse::<SubnetType>(), Ok(SubnetType::PrivateWithEgress));
        assert_eq!("isolated".parse::<SubnetType>(), Ok(SubnetType::PrivateIsolated));
        assert!("dmz".parse::<SubnetType>().is_err());
    }
}
