// Copyright (c) 2025 - Cowboy AI, Inc.
//! Blueprint Declaration Sets
//!
//! Ready-made stacks assembled from a [`NamePrefix`] and a [`StackConfig`].
//!
//! | Blueprint | Entities |
//! |---|---|
//! | [`BackendApiStack`] | public VPC, security group open on the configured ports, EC2 role, instance |
//! | [`InstanceBucketStack`] | VPC, closed security group, instance, bucket, bucket policy |

pub mod backend_api;
pub mod instance_bucket;

pub use backend_api::BackendApiStack;
pub use instance_bucket::InstanceBucketStack;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::NamePrefix;
use crate::errors::{StackError, StackResult};
use crate::stack::{Stack, StackConfig};

/// Selects which declaration set to assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Blueprint {
    #[default]
    BackendApi,
    InstanceBucket,
}

impl Blueprint {
    pub const ALL: [Blueprint; 2] = [Blueprint::BackendApi, Blueprint::InstanceBucket];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BackendApi => "backend-api",
            Self::InstanceBucket => "instance-bucket",
        }
    }

    /// Assemble the blueprint under `prefix`
    pub fn declare(&self, prefix: NamePrefix, config: &StackConfig) -> StackResult<Stack> {
        match self {
            Self::BackendApi => Ok(BackendApiStack::declare(prefix, config)?.into_stack()),
            Self::InstanceBucket => Ok(InstanceBucketStack::declare(prefix, config)?.into_stack()),
        }
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Blueprint {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backend-api" | "backend_api" => Ok(Self::BackendApi),
            "instance-bucket" | "instance_bucket" | "bucket" => Ok(Self::InstanceBucket),
            other => Err(StackError::Configuration(format!(
                "unknown blueprint {other:?}, expected one of: backend-api, instance-bucket"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_parsing() {
        for blueprint in Blueprint::ALL {
            assert_eq!(blueprint.as_str().parse::<Blueprint>().unwrap(), blueprint);
        }
        assert_eq!("bucket".parse::<Blueprint>().unwrap(), Blueprint::InstanceBucket);
        assert!(matches!(
            "lambda".parse::<Blueprint>(),
            Err(StackError::Configuration(_))
        ));
    }

    #[test]
    fn test_every_blueprint_validates_with_defaults() {
        let config = StackConfig::default();
        for blueprint in Blueprint::ALL {
            let stack = blueprint
                .declare(NamePrefix::new("demo").unwrap(), &config)
                .unwrap();
            assert!(stack.validate().is_ok(), "{blueprint} failed validation");
        }
    }
}
