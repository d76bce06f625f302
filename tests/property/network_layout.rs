// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for VPC Address Layout
//!
//! Subnets carved from a VPC block must stay inside it and never overlap,
//! whatever the zone count and masks, or the declaration must fail.

use std::net::Ipv4Addr;

use cim_cloud_stack::domain::{Cidr, NamePrefix, ValidationError};
use cim_cloud_stack::resources::vpc::{Subnet, SubnetConfiguration, Vpc, VpcProps};
use cim_cloud_stack::stack::Stack;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_subnets_inside_block_and_disjoint(
        second_octet in 0u8..=255,
        vpc_prefix in 16u8..=22,
        public_mask in 20u8..=28,
        isolated_mask in 20u8..=28,
        max_azs in 1u8..=4,
    ) {
        prop_assume!(public_mask >= vpc_prefix && isolated_mask >= vpc_prefix);

        let block = Cidr::from_parts(Ipv4Addr::new(10, second_octet, 0, 0), vpc_prefix).unwrap();
        let props = VpcProps::default()
            .with_cidr(block)
            .with_max_azs(max_azs)
            .with_subnets(vec![
                SubnetConfiguration::public("public", public_mask),
                SubnetConfiguration::isolated("isolated", isolated_mask),
            ]);
        let mut stack = Stack::new(NamePrefix::new("layout").unwrap());

        match Vpc::declare(&mut stack, "vpc", props) {
            Ok(_) => {
                let blocks: Vec<Cidr> = stack.entities::<Subnet>().map(|(_, s)| s.cidr()).collect();
                prop_assert_eq!(blocks.len(), usize::from(max_azs) * 2);
                for (i, a) in blocks.iter().enumerate() {
                    prop_assert!(block.contains(a), "{} outside {}", a, block);
                    for b in &blocks[i + 1..] {
                        prop_assert!(!a.overlaps(b), "{} overlaps {}", a, b);
                    }
                }
            }
            Err(error) => {
                prop_assert!(
                    matches!(error, ValidationError::SubnetOutsideVpc { .. }),
                    "unexpected error {}", error
                );
                prop_assert!(stack.is_empty());
            }
        }
    }
}
