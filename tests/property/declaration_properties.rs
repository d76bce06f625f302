// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Declaration Sets
//!
//! For any valid namespace prefix and any accepted configuration, an
//! assembled blueprint must be closed (no dangling references), keep every
//! name inside its namespace and synthesize to a template containing every
//! declared entity.

use std::collections::HashSet;

use cim_cloud_stack::blueprints::Blueprint;
use cim_cloud_stack::domain::{NamePrefix, Port, ResourceKind};
use cim_cloud_stack::stack::StackConfig;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn prefix_strategy() -> impl Strategy<Value = NamePrefix> {
    "[a-z][a-z0-9]{0,8}(-[a-z0-9]{1,6}){0,2}"
        .prop_map(|raw| NamePrefix::new(raw).expect("strategy yields valid prefixes"))
}

fn blueprint_strategy() -> impl Strategy<Value = Blueprint> {
    prop_oneof![Just(Blueprint::BackendApi), Just(Blueprint::InstanceBucket)]
}

fn config_strategy() -> impl Strategy<Value = StackConfig> {
    (
        1u8..=3,
        0u8..=1,
        prop::collection::vec(1u16..=65535, 1..5),
        any::<bool>(),
    )
        .prop_map(|(max_azs, nat_gateways, ports, auto_delete)| StackConfig {
            max_azs,
            nat_gateways,
            ingress_ports: ports.into_iter().map(Port::from).collect(),
            auto_delete_objects: auto_delete,
            ..StackConfig::default()
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Every reference resolves to a declared entity of the expected kind
    #[test]
    fn prop_graph_is_closed(
        prefix in prefix_strategy(),
        blueprint in blueprint_strategy(),
        config in config_strategy(),
    ) {
        let stack = blueprint.declare(prefix, &config).unwrap();

        for declaration in stack.declarations() {
            for reference in declaration.resource().references() {
                let target = stack.declaration(&reference.logical_id);
                prop_assert!(target.is_some(), "{} dangles", reference);
                prop_assert_eq!(target.map(|t| t.kind()), Some(reference.kind));
            }
        }
        prop_assert!(stack.validate().is_ok());
    }

    /// Names carry the prefix and, like logical ids, are unique
    #[test]
    fn prop_names_prefixed_and_unique(
        prefix in prefix_strategy(),
        blueprint in blueprint_strategy(),
    ) {
        let expected_start = format!("{}-", prefix);
        let stack = blueprint.declare(prefix, &StackConfig::default()).unwrap();

        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for declaration in stack.declarations() {
            prop_assert!(declaration.name().as_str().starts_with(&expected_start));
            prop_assert!(names.insert(declaration.name().clone()));
            prop_assert!(ids.insert(declaration.logical_id().clone()));
        }
    }

    /// NAT gateway entities exist exactly when a count above zero is configured
    #[test]
    fn prop_nat_gateway_count_matches_config(
        max_azs in 1u8..=3,
        nat_gateways in 0u8..=3,
    ) {
        prop_assume!(nat_gateways <= max_azs);
        let config = StackConfig { max_azs, nat_gateways, ..StackConfig::default() };
        let stack = Blueprint::InstanceBucket
            .declare(NamePrefix::new("nat").unwrap(), &config)
            .unwrap();

        prop_assert_eq!(stack.count(ResourceKind::NatGateway), usize::from(nat_gateways));
    }

    /// Every declared entity appears in the synthesized template
    #[test]
    fn prop_synthesis_covers_every_entity(
        prefix in prefix_strategy(),
        blueprint in blueprint_strategy(),
        config in config_strategy(),
    ) {
        let stack = blueprint.declare(prefix, &config).unwrap();
        let assembly = stack.synthesize().unwrap();

        prop_assert_eq!(assembly.resources.len(), stack.len());
        for declaration in stack.declarations() {
            let body = assembly.template_resource(declaration.logical_id().as_str());
            prop_assert!(body.is_some(), "{} missing", declaration.logical_id());
            prop_assert_eq!(
                body.and_then(|b| b["Type"].as_str()),
                Some(declaration.kind().cloudformation_type())
            );
        }
    }

    /// Ports outside 0..=65535 never construct
    #[test]
    fn prop_port_range(raw in -100_000i64..200_000) {
        prop_assert_eq!(Port::new(raw).is_ok(), (0..=65535).contains(&raw));
    }
}
