// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Synthesis
//!
//! Turns a validated [`Stack`] into a [`CloudAssembly`]: a CloudFormation
//! template plus a per-entity summary the provisioning engine can diff
//! against live state.
//!
//! Each entity synthesizes itself through [`Synthesize`] and may emit more
//! than one provider resource (a public subnet also emits its route table,
//! association and default route). Entities are visited in dependency order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{Declaration, Stack, StackId};
use crate::domain::{LogicalId, ResourceKind, ResourceName, ValidationError, ValidationResult};
use crate::errors::StackResult;
use crate::resources::RemovalPolicy;

/// Template format version emitted in every assembly
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Emit the provider resources for one declared entity
pub trait Synthesize {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>)
        -> ValidationResult;
}

/// Accumulates template sections while a stack is synthesized
pub struct SynthContext<'a> {
    stack: &'a Stack,
    resources: Map<String, Value>,
    parameters: Map<String, Value>,
}

impl<'a> SynthContext<'a> {
    fn new(stack: &'a Stack) -> Self {
        Self {
            stack,
            resources: Map::new(),
            parameters: Map::new(),
        }
    }

    /// The stack being synthesized, for resolving references
    pub fn stack(&self) -> &'a Stack {
        self.stack
    }

    /// Add a provider resource under `logical_id`
    pub fn add_resource(&mut self, logical_id: &LogicalId, resource: Value) -> ValidationResult {
        if self.resources.contains_key(logical_id.as_str()) {
            return Err(ValidationError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    /// Add a template parameter; repeated additions keep the first
    pub fn add_parameter(&mut self, name: &str, parameter: Value) {
        self.parameters.entry(name.to_string()).or_insert(parameter);
    }
}

/// `{"Ref": id}`
pub(crate) fn reference(logical_id: &LogicalId) -> Value {
    json!({ "Ref": logical_id.as_str() })
}

/// `{"Fn::GetAtt": [id, attribute]}`
pub(crate) fn get_att(logical_id: &LogicalId, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id.as_str(), attribute] })
}

/// `Name` tag list
pub(crate) fn name_tags(name: &ResourceName) -> Value {
    json!([{ "Key": "Name", "Value": name.as_str() }])
}

/// The `index`-th availability zone of the deployment region
pub(crate) fn availability_zone(index: u8) -> Value {
    json!({ "Fn::Select": [index, { "Fn::GetAZs": "" }] })
}

/// ARN of an AWS managed policy in the current partition
pub(crate) fn aws_managed_policy_arn(policy: &str) -> Value {
    json!({
        "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }, ":iam::aws:policy/", policy]]
    })
}

/// What the engine needs to know about one declared entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub logical_id: LogicalId,
    pub kind: ResourceKind,
    pub name: String,
    pub removal_policy: RemovalPolicy,
    pub depends_on: Vec<LogicalId>,
}

/// Synthesized output of one stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudAssembly {
    pub stack_id: StackId,
    pub stack_name: String,
    pub template: Value,
    pub resources: Vec<ResourceSummary>,
    pub synthesized_at: DateTime<Utc>,
}

impl CloudAssembly {
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn template(&self) -> &Value {
        &self.template
    }

    /// Template body of one provider resource
    pub fn template_resource(&self, logical_id: &str) -> Option<&Value> {
        self.template.get("Resources")?.get(logical_id)
    }

    /// Number of provider resources in the template
    pub fn template_resource_count(&self) -> usize {
        self.template
            .get("Resources")
            .and_then(Value::as_object)
            .map_or(0, Map::len)
    }

    /// Logical ids of template resources with the given provider type
    pub fn template_resources_of_type(&self, resource_type: &str) -> Vec<&str> {
        self.template
            .get("Resources")
            .and_then(Value::as_object)
            .map(|resources| {
                resources
                    .iter()
                    .filter(|(_, body)| body["Type"] == resource_type)
                    .map(|(id, _)| id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn summary(&self, logical_id: &LogicalId) -> Option<&ResourceSummary> {
        self.resources.iter().find(|r| &r.logical_id == logical_id)
    }

    /// Entities left in place when the stack is destroyed
    pub fn retained(&self) -> impl Iterator<Item = &ResourceSummary> {
        self.resources
            .iter()
            .filter(|r| r.removal_policy == RemovalPolicy::Retain)
    }

    pub fn to_json_pretty(&self) -> StackResult<String> {
        Ok(serde_json::to_string_pretty(&self.template)?)
    }
}

impl Stack {
    /// Validate the declaration set and render it as a template
    pub fn synthesize(&self) -> StackResult<CloudAssembly> {
        self.validate()?;

        let ordered = self.dependency_order()?;
        let mut ctx = SynthContext::new(self);
        let mut summaries = Vec::with_capacity(ordered.len());

        for declaration in ordered {
            declaration.resource().synthesize(declaration, &mut ctx)?;

            let mut depends_on: Vec<LogicalId> = declaration
                .resource()
                .references()
                .into_iter()
                .map(|r| r.logical_id)
                .collect();
            depends_on.sort();
            depends_on.dedup();

            debug!(
                logical_id = %declaration.logical_id(),
                depends_on = depends_on.len(),
                "Synthesized {}", declaration.kind()
            );

            summaries.push(ResourceSummary {
                logical_id: declaration.logical_id().clone(),
                kind: declaration.kind(),
                name: declaration.name().to_string(),
                removal_policy: declaration.removal_policy(),
                depends_on,
            });
        }

        let SynthContext {
            resources,
            parameters,
            ..
        } = ctx;

        let mut template = Map::new();
        template.insert(
            "AWSTemplateFormatVersion".to_string(),
            json!(TEMPLATE_FORMAT_VERSION),
        );
        if let Some(description) = self.description() {
            template.insert("Description".to_string(), json!(description));
        }
        if !parameters.is_empty() {
            template.insert("Parameters".to_string(), Value::Object(parameters));
        }
        template.insert("Resources".to_string(), Value::Object(resources));

        let assembly = CloudAssembly {
            stack_id: self.id(),
            stack_name: self.name().to_string(),
            template: Value::Object(template),
            resources: summaries,
            synthesized_at: Utc::now(),
        };

        info!(
            stack = assembly.stack_name(),
            entities = assembly.resources.len(),
            template_resources = assembly.template_resource_count(),
            "Synthesized cloud assembly"
        );

        Ok(assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::vpc::{Vpc, VpcProps};

    #[test]
    fn test_empty_stack_template() {
        let stack = Stack::try_from("empty").unwrap().with_description("nothing here");
        let assembly = stack.synthesize().unwrap();

        assert_eq!(
            assembly.template,
            json!({
                "AWSTemplateFormatVersion": "2010-09-09",
                "Description": "nothing here",
                "Resources": {}
            })
        );
        assert_eq!(assembly.template_resource_count(), 0);
    }

    #[test]
    fn test_duplicate_template_resource_rejected() {
        let stack = Stack::try_from("dup").unwrap();
        let mut ctx = SynthContext::new(&stack);
        let id = LogicalId::from_name("dup-thing");

        assert!(ctx.add_resource(&id, json!({})).is_ok());
        assert_eq!(
            ctx.add_resource(&id, json!({})),
            Err(ValidationError::DuplicateLogicalId("DupThing".to_string()))
        );
    }

    #[test]
    fn test_summaries_follow_dependency_order() {
        let mut stack = Stack::try_from("net").unwrap();
        Vpc::declare(&mut stack, "vpc", VpcProps::default()).unwrap();

        let assembly = stack.synthesize().unwrap();
        assert_eq!(assembly.resources[0].logical_id.as_str(), "NetVpc");
        assert!(assembly.resources[1..]
            .iter()
            .all(|r| r.depends_on.iter().any(|d| d.as_str() == "NetVpc")));
        assert_eq!(assembly.retained().count(), 0);
    }

    #[test]
    fn test_intrinsic_helpers() {
        let id = LogicalId::from_name("web-sg");
        assert_eq!(reference(&id), json!({"Ref": "WebSg"}));
        assert_eq!(get_att(&id, "GroupId"), json!({"Fn::GetAtt": ["WebSg", "GroupId"]}));
        assert_eq!(
            availability_zone(1),
            json!({"Fn::Select": [1, {"Fn::GetAZs": ""}]})
        );
    }
}
