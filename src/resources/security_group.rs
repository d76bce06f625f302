// Copyright (c) 2025 - Cowboy AI, Inc.
//! Security Groups
//!
//! A stateful virtual firewall attached to a VPC. Inbound traffic is denied
//! unless an [`IngressRule`] allows it; outbound traffic is either fully
//! open or fully closed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::vpc::Vpc;
use crate::domain::invariants::validate_description;
use crate::domain::{Cidr, NetworkError, Peer, Port, PortRange, Protocol, ValidationError, ValidationResult};
use crate::stack::template::{reference, SynthContext, Synthesize};
use crate::stack::{Declaration, ResourceRef, Stack};

/// One inbound allowance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngressRule {
    peer: Peer,
    protocol: Protocol,
    ports: Option<PortRange>,
    description: String,
}

impl IngressRule {
    /// Build a rule, checking the protocol/port combination
    ///
    /// TCP and UDP rules need a port range; ICMP and all-traffic rules
    /// must not carry one.
    pub fn new(
        peer: Peer,
        protocol: Protocol,
        ports: Option<PortRange>,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        validate_description(&description)?;

        match (protocol.requires_ports(), ports) {
            (true, None) => return Err(NetworkError::PortsRequired(protocol).into()),
            (false, Some(_)) => return Err(NetworkError::PortsNotAllowed(protocol).into()),
            _ => {}
        }

        Ok(Self {
            peer,
            protocol,
            ports,
            description,
        })
    }

    /// TCP on a single port
    pub fn tcp(peer: Peer, port: Port, description: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(peer, Protocol::Tcp, Some(PortRange::single(port)), description)
    }

    /// TCP on `port` from anywhere, described after the well-known service
    pub fn tcp_from_anywhere(port: Port) -> Result<Self, ValidationError> {
        let description = match port.service_name() {
            Some("SSH") => "allow SSH access from anywhere".to_string(),
            Some(service) => format!("allow {service} traffic from anywhere"),
            None => format!("allow TCP port {port} traffic from anywhere"),
        };
        Self::tcp(Peer::any_ipv4(), port, description)
    }

    pub fn peer(&self) -> Peer {
        self.peer
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn ports(&self) -> Option<PortRange> {
        self.ports
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn to_template(&self) -> Value {
        let mut rule = json!({
            "CidrIp": self.peer.cidr().to_string(),
            "Description": self.description,
            "IpProtocol": self.protocol.as_str(),
        });
        match (self.protocol, self.ports) {
            (_, Some(range)) => {
                rule["FromPort"] = json!(range.from_port().value());
                rule["ToPort"] = json!(range.to_port().value());
            }
            (Protocol::Icmp, None) => {
                rule["FromPort"] = json!(-1);
                rule["ToPort"] = json!(-1);
            }
            _ => {}
        }
        rule
    }
}

/// Inputs to [`SecurityGroup::declare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupProps {
    suffix: String,
    description: Option<String>,
    allow_all_outbound: bool,
    ingress: Vec<IngressRule>,
}

impl SecurityGroupProps {
    /// Open outbound, no inbound
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            description: None,
            allow_all_outbound: true,
            ingress: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn allow_all_outbound(mut self, allow: bool) -> Self {
        self.allow_all_outbound = allow;
        self
    }

    pub fn with_ingress(mut self, rule: IngressRule) -> Self {
        self.ingress.push(rule);
        self
    }
}

/// Virtual firewall scoped to one VPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    vpc: ResourceRef<Vpc>,
    description: String,
    allow_all_outbound: bool,
    ingress: Vec<IngressRule>,
}

declarable!(SecurityGroup, SecurityGroup, |sg| vec![sg.vpc.erase()]);

impl SecurityGroup {
    /// Declare a security group inside `vpc`
    ///
    /// Identical ingress rules are recorded once. Without an explicit
    /// description the group is described as `<stack>/<name>`.
    pub fn declare(
        stack: &mut Stack,
        vpc: &ResourceRef<Vpc>,
        props: SecurityGroupProps,
    ) -> Result<ResourceRef<SecurityGroup>, ValidationError> {
        stack.resolve(vpc)?;
        let name = stack.derive_name(&props.suffix)?;

        let description = props
            .description
            .unwrap_or_else(|| format!("{}/{}", stack.name(), name));
        validate_description(&description)?;

        let mut ingress: Vec<IngressRule> = Vec::with_capacity(props.ingress.len());
        for rule in props.ingress {
            if !ingress.contains(&rule) {
                ingress.push(rule);
            }
        }

        stack.declare(
            name,
            SecurityGroup {
                vpc: vpc.clone(),
                description,
                allow_all_outbound: props.allow_all_outbound,
                ingress,
            },
        )
    }

    pub fn vpc(&self) -> &ResourceRef<Vpc> {
        &self.vpc
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn allows_all_outbound(&self) -> bool {
        self.allow_all_outbound
    }

    pub fn ingress_rules(&self) -> &[IngressRule] {
        &self.ingress
    }

    /// Whether some rule admits TCP `port` from `source`
    pub fn allows_tcp_from(&self, source: &Cidr, port: Port) -> bool {
        self.ingress.iter().any(|rule| {
            rule.peer.cidr().contains(source)
                && match (rule.protocol, rule.ports) {
                    (Protocol::All, _) => true,
                    (Protocol::Tcp, Some(range)) => {
                        range.from_port() <= port && port <= range.to_port()
                    }
                    _ => false,
                }
        })
    }
}

impl Synthesize for SecurityGroup {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let egress = if self.allow_all_outbound {
            json!([{
                "CidrIp": Cidr::ANY.to_string(),
                "Description": "Allow all outbound traffic by default",
                "IpProtocol": "-1",
            }])
        } else {
            // A rule matching no traffic replaces the provider's implicit allow-all
            json!([{
                "CidrIp": "255.255.255.255/32",
                "Description": "Disallow all traffic",
                "FromPort": 252,
                "IpProtocol": "icmp",
                "ToPort": 86,
            }])
        };

        let ingress: Vec<Value> = self.ingress.iter().map(IngressRule::to_template).collect();

        ctx.add_resource(
            declaration.logical_id(),
            json!({
                "Type": "AWS::EC2::SecurityGroup",
                "Properties": {
                    "GroupDescription": self.description,
                    "GroupName": declaration.name().as_str(),
                    "VpcId": reference(self.vpc.logical_id()),
                    "SecurityGroupIngress": ingress,
                    "SecurityGroupEgress": egress,
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::vpc::VpcProps;

    fn stack_with_vpc() -> (Stack, ResourceRef<Vpc>) {
        let mut stack = Stack::try_from("web").unwrap();
        let vpc = Vpc::declare(&mut stack, "vpc", VpcProps::default()).unwrap();
        (stack, vpc)
    }

    #[test]
    fn test_rule_protocol_port_combinations() {
        let anywhere = Peer::any_ipv4();
        let range = PortRange::new(Port::from(1024), Port::from(2048)).unwrap();

        assert!(IngressRule::new(anywhere, Protocol::Tcp, Some(range), "ephemeral").is_ok());
        assert!(IngressRule::new(anywhere, Protocol::Icmp, None, "ping").is_ok());
        assert!(matches!(
            IngressRule::new(anywhere, Protocol::Udp, None, "dns"),
            Err(ValidationError::Network(NetworkError::PortsRequired(Protocol::Udp)))
        ));
        assert!(matches!(
            IngressRule::new(anywhere, Protocol::All, Some(range), "everything"),
            Err(ValidationError::Network(NetworkError::PortsNotAllowed(Protocol::All)))
        ));
    }

    #[test]
    fn test_well_known_descriptions() {
        let ssh = IngressRule::tcp_from_anywhere(Port::SSH).unwrap();
        assert_eq!(ssh.description(), "allow SSH access from anywhere");
        assert_eq!(
            IngressRule::tcp_from_anywhere(Port::HTTPS).unwrap().description(),
            "allow HTTPS traffic from anywhere"
        );
        assert_eq!(
            IngressRule::tcp_from_anywhere(Port::from(9000)).unwrap().description(),
            "allow TCP port 9000 traffic from anywhere"
        );
    }

    #[test]
    fn test_declare_dedupes_rules() {
        let (mut stack, vpc) = stack_with_vpc();
        let ssh = IngressRule::tcp_from_anywhere(Port::SSH).unwrap();
        let sg = SecurityGroup::declare(
            &mut stack,
            &vpc,
            SecurityGroupProps::new("security-group")
                .with_ingress(ssh.clone())
                .with_ingress(ssh),
        )
        .unwrap();

        let group = stack.resolve(&sg).unwrap();
        assert_eq!(group.ingress_rules().len(), 1);
        assert_eq!(group.description(), "web/web-security-group");
        assert!(group.allows_tcp_from(&Cidr::new("203.0.113.0/24").unwrap(), Port::SSH));
        assert!(!group.allows_tcp_from(&Cidr::ANY, Port::HTTP));
    }

    #[test]
    fn test_synthesized_rules() {
        let (mut stack, vpc) = stack_with_vpc();
        SecurityGroup::declare(
            &mut stack,
            &vpc,
            SecurityGroupProps::new("security-group")
                .allow_all_outbound(false)
                .with_ingress(IngressRule::tcp_from_anywhere(Port::HTTP).unwrap()),
        )
        .unwrap();

        let assembly = stack.synthesize().unwrap();
        let sg = assembly.template_resource("WebSecurityGroup").unwrap();
        assert_eq!(
            sg["Properties"]["SecurityGroupIngress"],
            json!([{
                "CidrIp": "0.0.0.0/0",
                "Description": "allow HTTP traffic from anywhere",
                "FromPort": 80,
                "IpProtocol": "tcp",
                "ToPort": 80,
            }])
        );
        assert_eq!(
            sg["Properties"]["SecurityGroupEgress"][0]["Description"],
            "Disallow all traffic"
        );
        assert_eq!(sg["Properties"]["VpcId"], json!({"Ref": "WebVpc"}));
    }
}
