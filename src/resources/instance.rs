// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Instances
//!
//! An [`Instance`] is placed in one subnet of its VPC, protected by one
//! security group and optionally granted a role through a derived instance
//! profile. The machine image is resolved at deploy time from the
//! provider's public parameter store, so the template always targets the
//! latest build of the chosen image family.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use super::iam::{Role, ServicePrincipal};
use super::security_group::SecurityGroup;
use super::vpc::{Subnet, SubnetType, Vpc};
use crate::domain::{LogicalId, ValidationError, ValidationResult};
use crate::stack::template::{availability_zone, get_att, name_tags, reference, SynthContext, Synthesize};
use crate::stack::{Declaration, ResourceRef, Stack};

/// CPU architecture of an instance family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    X86_64,
    Arm64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }
}

/// Instance family (`t3`, `m5`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceClass {
    Burstable2,
    Burstable3,
    Burstable3Amd,
    Burstable4Graviton,
    Standard5,
    Standard6Graviton,
    Compute5,
    Compute6Graviton,
    Memory5,
}

impl InstanceClass {
    const ALL: [InstanceClass; 9] = [
        Self::Burstable2,
        Self::Burstable3,
        Self::Burstable3Amd,
        Self::Burstable4Graviton,
        Self::Standard5,
        Self::Standard6Graviton,
        Self::Compute5,
        Self::Compute6Graviton,
        Self::Memory5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Burstable2 => "t2",
            Self::Burstable3 => "t3",
            Self::Burstable3Amd => "t3a",
            Self::Burstable4Graviton => "t4g",
            Self::Standard5 => "m5",
            Self::Standard6Graviton => "m6g",
            Self::Compute5 => "c5",
            Self::Compute6Graviton => "c6g",
            Self::Memory5 => "r5",
        }
    }

    pub fn is_burstable(&self) -> bool {
        matches!(
            self,
            Self::Burstable2 | Self::Burstable3 | Self::Burstable3Amd | Self::Burstable4Graviton
        )
    }

    pub fn architecture(&self) -> Architecture {
        match self {
            Self::Burstable4Graviton | Self::Standard6Graviton | Self::Compute6Graviton => {
                Architecture::Arm64
            }
            _ => Architecture::X86_64,
        }
    }

    /// Smallest size offered in this family
    fn smallest_size(&self) -> InstanceSize {
        match self {
            Self::Burstable2 | Self::Burstable3 | Self::Burstable3Amd | Self::Burstable4Graviton => {
                InstanceSize::Nano
            }
            Self::Standard6Graviton | Self::Compute6Graviton => InstanceSize::Medium,
            Self::Standard5 | Self::Compute5 | Self::Memory5 => InstanceSize::Large,
        }
    }
}

/// Instance size within a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstanceSize {
    Nano,
    Micro,
    Small,
    Medium,
    Large,
    Xlarge,
    Xlarge2,
    Xlarge4,
}

impl InstanceSize {
    const ALL: [InstanceSize; 8] = [
        Self::Nano,
        Self::Micro,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Xlarge,
        Self::Xlarge2,
        Self::Xlarge4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Micro => "micro",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
            Self::Xlarge2 => "2xlarge",
            Self::Xlarge4 => "4xlarge",
        }
    }
}

/// Hardware profile, rendered as `<family>.<size>`
///
/// # Examples
///
/// ```rust
/// use cim_cloud_stack::resources::instance::InstanceType;
///
/// let micro: InstanceType = "t2.micro".parse().unwrap();
/// assert_eq!(micro.to_string(), "t2.micro");
/// assert!("m5.nano".parse::<InstanceType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceType {
    class: InstanceClass,
    size: InstanceSize,
}

impl InstanceType {
    /// Combine a family and size the provider actually offers
    pub fn of(class: InstanceClass, size: InstanceSize) -> Result<Self, ValidationError> {
        if size < class.smallest_size() {
            return Err(ValidationError::InvalidInstanceType(format!(
                "{}.{}",
                class.as_str(),
                size.as_str()
            )));
        }
        Ok(Self { class, size })
    }

    pub fn class(&self) -> InstanceClass {
        self.class
    }

    pub fn size(&self) -> InstanceSize {
        self.size
    }

    pub fn architecture(&self) -> Architecture {
        self.class.architecture()
    }
}

impl Default for InstanceType {
    /// `t2.micro`
    fn default() -> Self {
        Self {
            class: InstanceClass::Burstable2,
            size: InstanceSize::Micro,
        }
    }
}

impl FromStr for InstanceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidInstanceType(s.to_string());
        let (family, size) = s.trim().split_once('.').ok_or_else(invalid)?;

        let class = InstanceClass::ALL
            .into_iter()
            .find(|c| c.as_str() == family)
            .ok_or_else(invalid)?;
        let size = InstanceSize::ALL
            .into_iter()
            .find(|z| z.as_str() == size)
            .ok_or_else(invalid)?;

        Self::of(class, size)
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class.as_str(), self.size.as_str())
    }
}

impl TryFrom<String> for InstanceType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InstanceType> for String {
    fn from(value: InstanceType) -> Self {
        value.to_string()
    }
}

/// Amazon Linux release line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AmazonLinuxGeneration {
    #[default]
    AmazonLinux2,
    AmazonLinux2023,
}

impl AmazonLinuxGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmazonLinux2 => "amazon-linux-2",
            Self::AmazonLinux2023 => "amazon-linux-2023",
        }
    }
}

impl fmt::Display for AmazonLinuxGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AmazonLinuxGeneration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amazon-linux-2" | "al2" => Ok(Self::AmazonLinux2),
            "amazon-linux-2023" | "al2023" => Ok(Self::AmazonLinux2023),
            other => Err(ValidationError::InvalidMachineImage(other.to_string())),
        }
    }
}

impl TryFrom<String> for AmazonLinuxGeneration {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AmazonLinuxGeneration> for String {
    fn from(value: AmazonLinuxGeneration) -> Self {
        value.as_str().to_string()
    }
}

/// Where the instance boots from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineImage {
    /// Latest published Amazon Linux build for the instance architecture
    LatestAmazonLinux(AmazonLinuxGeneration),
    /// A fixed image id (`ami-0123456789abcdef0`)
    Ami(String),
}

impl Default for MachineImage {
    fn default() -> Self {
        Self::LatestAmazonLinux(AmazonLinuxGeneration::default())
    }
}

impl MachineImage {
    const PARAMETER_ROOT: &'static str = "/aws/service/ami-amazon-linux-latest";

    /// A fixed image id
    pub fn ami(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let valid = id.strip_prefix("ami-").is_some_and(|hex| {
            matches!(hex.len(), 8 | 17)
                && hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        });
        if !valid {
            return Err(ValidationError::InvalidMachineImage(id));
        }
        Ok(Self::Ami(id))
    }

    /// Public parameter holding the latest image id for `architecture`
    pub fn ssm_parameter(&self, architecture: Architecture) -> Option<String> {
        let image = match (self, architecture) {
            (Self::Ami(_), _) => return None,
            (Self::LatestAmazonLinux(AmazonLinuxGeneration::AmazonLinux2), arch) => {
                format!("amzn2-ami-hvm-{}-gp2", arch.as_str())
            }
            (Self::LatestAmazonLinux(AmazonLinuxGeneration::AmazonLinux2023), arch) => {
                format!("al2023-ami-kernel-default-{}", arch.as_str())
            }
        };
        Some(format!("{}/{}", Self::PARAMETER_ROOT, image))
    }
}

/// How an instance's subnet is chosen
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetSelection {
    /// Most private subnet type the VPC offers
    #[default]
    Automatic,
    /// First subnet of one type
    SubnetType(SubnetType),
    /// First subnet of one named group
    Group(String),
}

impl SubnetSelection {
    fn matches(&self, subnet: &Subnet) -> bool {
        match self {
            Self::Automatic => true,
            Self::SubnetType(subnet_type) => subnet.subnet_type() == *subnet_type,
            Self::Group(group) => subnet.group() == group,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Automatic => "any".to_string(),
            Self::SubnetType(subnet_type) => subnet_type.to_string(),
            Self::Group(group) => format!("group {group}"),
        }
    }
}

/// Rank used by [`SubnetSelection::Automatic`]; lower wins
fn privacy_rank(subnet_type: SubnetType) -> u8 {
    match subnet_type {
        SubnetType::PrivateWithEgress => 0,
        SubnetType::PrivateIsolated => 1,
        SubnetType::Public => 2,
    }
}

fn validate_key_name(key_name: &str) -> ValidationResult {
    let valid = !key_name.is_empty()
        && key_name.len() <= 255
        && key_name.chars().all(|c| c.is_ascii() && !c.is_ascii_control());
    if !valid {
        return Err(ValidationError::InvalidKeyName(key_name.to_string()));
    }
    Ok(())
}

/// Inputs to [`Instance::declare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceProps {
    suffix: String,
    instance_type: InstanceType,
    machine_image: MachineImage,
    key_name: Option<String>,
    subnet_selection: SubnetSelection,
    role: Option<ResourceRef<Role>>,
}

impl InstanceProps {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            instance_type: InstanceType::default(),
            machine_image: MachineImage::default(),
            key_name: None,
            subnet_selection: SubnetSelection::default(),
            role: None,
        }
    }

    pub fn with_instance_type(mut self, instance_type: InstanceType) -> Self {
        self.instance_type = instance_type;
        self
    }

    pub fn with_machine_image(mut self, machine_image: MachineImage) -> Self {
        self.machine_image = machine_image;
        self
    }

    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    pub fn with_subnet_selection(mut self, selection: SubnetSelection) -> Self {
        self.subnet_selection = selection;
        self
    }

    pub fn with_role(mut self, role: ResourceRef<Role>) -> Self {
        self.role = Some(role);
        self
    }
}

/// Virtual machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    vpc: ResourceRef<Vpc>,
    security_group: ResourceRef<SecurityGroup>,
    subnet: ResourceRef<Subnet>,
    role: Option<ResourceRef<Role>>,
    instance_type: InstanceType,
    machine_image: MachineImage,
    key_name: Option<String>,
    availability_zone: u8,
}

declarable!(Instance, Instance, |instance| {
    let mut refs = vec![
        instance.vpc.erase(),
        instance.security_group.erase(),
        instance.subnet.erase(),
    ];
    refs.extend(instance.role.iter().map(ResourceRef::erase));
    refs
});

impl Instance {
    /// Declare an instance in `vpc` behind `security_group`
    ///
    /// # Invariants
    /// - The security group belongs to `vpc`
    /// - The role, when present, is assumable by compute instances
    /// - The subnet selection resolves to a subnet of `vpc`
    pub fn declare(
        stack: &mut Stack,
        vpc: &ResourceRef<Vpc>,
        security_group: &ResourceRef<SecurityGroup>,
        props: InstanceProps,
    ) -> Result<ResourceRef<Instance>, ValidationError> {
        stack.resolve(vpc)?;

        if stack.resolve(security_group)?.vpc() != vpc {
            return Err(ValidationError::SecurityGroupVpcMismatch {
                security_group: security_group.logical_id().to_string(),
                vpc: vpc.logical_id().to_string(),
            });
        }

        if let Some(role) = &props.role {
            let principal = stack.resolve(role)?.assumed_by();
            if *principal != ServicePrincipal::ec2() {
                return Err(ValidationError::InvalidServicePrincipal(principal.to_string()));
            }
        }

        if let Some(key_name) = &props.key_name {
            validate_key_name(key_name)?;
        }

        if let MachineImage::LatestAmazonLinux(_) = &props.machine_image {
            if props
                .machine_image
                .ssm_parameter(props.instance_type.architecture())
                .is_none()
            {
                return Err(ValidationError::InvalidMachineImage(format!(
                    "{:?}",
                    props.machine_image
                )));
            }
        }

        let (subnet, zone) = Self::select_subnet(stack, vpc, &props.subnet_selection)?;
        let name = stack.derive_name(&props.suffix)?;

        stack.declare(
            name,
            Instance {
                vpc: vpc.clone(),
                security_group: security_group.clone(),
                subnet,
                role: props.role,
                instance_type: props.instance_type,
                machine_image: props.machine_image,
                key_name: props.key_name,
                availability_zone: zone,
            },
        )
    }

    fn select_subnet(
        stack: &Stack,
        vpc: &ResourceRef<Vpc>,
        selection: &SubnetSelection,
    ) -> Result<(ResourceRef<Subnet>, u8), ValidationError> {
        let candidates: Vec<(&Declaration, &Subnet)> = stack
            .owned_by::<Subnet, Vpc>(vpc)
            .into_iter()
            .filter(|(_, subnet)| selection.matches(subnet))
            .collect();

        let chosen = match selection {
            SubnetSelection::Automatic => candidates
                .iter()
                .min_by_key(|(_, subnet)| (privacy_rank(subnet.subnet_type()), subnet.availability_zone())),
            _ => candidates
                .iter()
                .min_by_key(|(_, subnet)| subnet.availability_zone()),
        };

        chosen
            .map(|(declaration, subnet)| {
                (
                    ResourceRef::new(stack.id(), declaration.logical_id().clone()),
                    subnet.availability_zone(),
                )
            })
            .ok_or_else(|| ValidationError::NoMatchingSubnet {
                subnet_type: selection.describe(),
                vpc: vpc.logical_id().to_string(),
            })
    }

    pub fn vpc(&self) -> &ResourceRef<Vpc> {
        &self.vpc
    }

    pub fn security_group(&self) -> &ResourceRef<SecurityGroup> {
        &self.security_group
    }

    pub fn subnet(&self) -> &ResourceRef<Subnet> {
        &self.subnet
    }

    pub fn role(&self) -> Option<&ResourceRef<Role>> {
        self.role.as_ref()
    }

    pub fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    pub fn machine_image(&self) -> &MachineImage {
        &self.machine_image
    }

    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }
}

impl Synthesize for Instance {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let id = declaration.logical_id();

        let image_id = match (&self.machine_image, self.machine_image.ssm_parameter(self.instance_type.architecture())) {
            (MachineImage::Ami(ami), _) => json!(ami),
            (_, Some(path)) => {
                let parameter = LogicalId::from_name(&path).child("parameter");
                ctx.add_parameter(
                    parameter.as_str(),
                    json!({
                        "Type": "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>",
                        "Default": path,
                    }),
                );
                reference(&parameter)
            }
            (image, None) => {
                return Err(ValidationError::InvalidMachineImage(format!("{image:?}")));
            }
        };

        let mut properties = json!({
            "AvailabilityZone": availability_zone(self.availability_zone),
            "ImageId": image_id,
            "InstanceType": self.instance_type.to_string(),
            "SecurityGroupIds": [get_att(self.security_group.logical_id(), "GroupId")],
            "SubnetId": reference(self.subnet.logical_id()),
            "Tags": name_tags(declaration.name()),
        });
        if let Some(key_name) = &self.key_name {
            properties["KeyName"] = json!(key_name);
        }

        let mut resource = json!({ "Type": "AWS::EC2::Instance" });
        if let Some(role) = &self.role {
            let profile = id.child("instance-profile");
            ctx.add_resource(
                &profile,
                json!({
                    "Type": "AWS::IAM::InstanceProfile",
                    "Properties": { "Roles": [reference(role.logical_id())] }
                }),
            )?;
            properties["IamInstanceProfile"] = reference(&profile);
            resource["DependsOn"] = json!([role.logical_id().as_str()]);
        }
        resource["Properties"] = properties;

        ctx.add_resource(id, resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::iam::RoleProps;
    use crate::resources::security_group::SecurityGroupProps;
    use crate::resources::vpc::{SubnetConfiguration, VpcProps};
    use test_case::test_case;

    struct Fixture {
        stack: Stack,
        vpc: ResourceRef<Vpc>,
        sg: ResourceRef<SecurityGroup>,
    }

    fn fixture(subnets: Vec<SubnetConfiguration>, nat_gateways: u8) -> Fixture {
        let mut stack = Stack::try_from("app").unwrap();
        let vpc = Vpc::declare(
            &mut stack,
            "vpc",
            VpcProps::default()
                .with_subnets(subnets)
                .with_nat_gateways(nat_gateways),
        )
        .unwrap();
        let sg = SecurityGroup::declare(&mut stack, &vpc, SecurityGroupProps::new("sg")).unwrap();
        Fixture { stack, vpc, sg }
    }

    #[test_case("t2.micro", true ; "t2 micro")]
    #[test_case("t3a.2xlarge", true ; "t3a double xlarge")]
    #[test_case("t4g.nano", true ; "graviton nano")]
    #[test_case("m5.large", true ; "m5 large")]
    #[test_case("m5.micro", false ; "m5 too small")]
    #[test_case("x9.micro", false ; "unknown family")]
    #[test_case("t2", false ; "missing size")]
    fn test_instance_type_parsing(raw: &str, valid: bool) {
        assert_eq!(raw.parse::<InstanceType>().is_ok(), valid);
    }

    #[test]
    fn test_image_parameter_follows_architecture() {
        let image = MachineImage::default();
        assert_eq!(
            image.ssm_parameter(Architecture::X86_64).as_deref(),
            Some("/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2")
        );
        assert_eq!(
            image.ssm_parameter(Architecture::Arm64).as_deref(),
            Some("/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-arm64-gp2")
        );
        assert!(MachineImage::ami("ami-0123456789abcdef0").is_ok());
        assert!(MachineImage::ami("ami-XYZ").is_err());
    }

    #[test]
    fn test_automatic_selection_prefers_private() {
        let mut f = fixture(
            vec![
                SubnetConfiguration::public("public", 24),
                SubnetConfiguration::isolated("isolated", 24),
            ],
            0,
        );
        let instance = Instance::declare(&mut f.stack, &f.vpc, &f.sg, InstanceProps::new("server")).unwrap();

        let instance = f.stack.resolve(&instance).unwrap();
        let subnet = f.stack.resolve(instance.subnet()).unwrap();
        assert_eq!(subnet.subnet_type(), SubnetType::PrivateIsolated);
        assert_eq!(subnet.availability_zone(), 0);
    }

    #[test]
    fn test_missing_subnet_type_rejected() {
        let mut f = fixture(vec![SubnetConfiguration::public("public", 24)], 0);
        let result = Instance::declare(
            &mut f.stack,
            &f.vpc,
            &f.sg,
            InstanceProps::new("server")
                .with_subnet_selection(SubnetSelection::SubnetType(SubnetType::PrivateIsolated)),
        );
        assert!(matches!(result, Err(ValidationError::NoMatchingSubnet { .. })));
    }

    #[test]
    fn test_security_group_from_other_vpc_rejected() {
        let mut f = fixture(vec![SubnetConfiguration::public("public", 24)], 0);
        let other_vpc = Vpc::declare(&mut f.stack, "other-vpc", VpcProps::default()).unwrap();

        let result = Instance::declare(&mut f.stack, &other_vpc, &f.sg, InstanceProps::new("server"));
        assert!(matches!(
            result,
            Err(ValidationError::SecurityGroupVpcMismatch { .. })
        ));
    }

    #[test]
    fn test_role_must_trust_compute() {
        let mut f = fixture(vec![SubnetConfiguration::public("public", 24)], 0);
        let lambda = ServicePrincipal::new("lambda.amazonaws.com").unwrap();
        let role = Role::declare(&mut f.stack, RoleProps::new("role", lambda)).unwrap();

        let result = Instance::declare(
            &mut f.stack,
            &f.vpc,
            &f.sg,
            InstanceProps::new("server").with_role(role),
        );
        assert_eq!(
            result,
            Err(ValidationError::InvalidServicePrincipal(
                "lambda.amazonaws.com".to_string()
            ))
        );
    }

    #[test]
    fn test_synthesis_with_role() {
        let mut f = fixture(vec![SubnetConfiguration::public("public", 24)], 0);
        let role = Role::declare(&mut f.stack, RoleProps::new("role", ServicePrincipal::ec2())).unwrap();
        Instance::declare(
            &mut f.stack,
            &f.vpc,
            &f.sg,
            InstanceProps::new("server")
                .with_role(role)
                .with_key_name("app-key")
                .with_subnet_selection(SubnetSelection::SubnetType(SubnetType::Public)),
        )
        .unwrap();

        let assembly = f.stack.synthesize().unwrap();
        let instance = assembly.template_resource("AppServer").unwrap();
        let props = &instance["Properties"];

        assert_eq!(props["InstanceType"], "t2.micro");
        assert_eq!(props["KeyName"], "app-key");
        assert_eq!(props["SubnetId"], json!({"Ref": "AppVpcPublicSubnet1"}));
        assert_eq!(
            props["SecurityGroupIds"],
            json!([{"Fn::GetAtt": ["AppSg", "GroupId"]}])
        );
        assert_eq!(props["IamInstanceProfile"], json!({"Ref": "AppServerInstanceProfile"}));
        assert_eq!(instance["DependsOn"], json!(["AppRole"]));

        let parameter = "AwsServiceAmiAmazonLinuxLatestAmzn2AmiHvmX8664Gp2Parameter";
        assert_eq!(props["ImageId"], json!({"Ref": parameter}));
        assert!(assembly.template["Parameters"][parameter].is_object());
    }
}
