// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-cloud-stack
//!
//! Deterministic stacks and a scripted provisioning engine shared by the
//! integration tests. Prefixes are fixed so names and logical ids can be
//! asserted literally.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

use cim_cloud_stack::blueprints::{BackendApiStack, InstanceBucketStack};
use cim_cloud_stack::domain::NamePrefix;
use cim_cloud_stack::engine::{
    ApplyResult, ChangeAction, Changeset, ProvisioningEngine, ProvisioningError, ResourceChange,
    StackStatus,
};
use cim_cloud_stack::stack::{CloudAssembly, Stack, StackConfig};

pub const BACKEND_PREFIX: &str = "backend-api";
pub const BUCKET_PREFIX: &str = "test";

pub const CHANGESET_ID: &str = "01934f4a-c001-7000-8000-00000000c001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub fn prefix(value: &str) -> NamePrefix {
    NamePrefix::new(value).expect("Invalid prefix in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn backend_api() -> BackendApiStack {
    BackendApiStack::declare(prefix(BACKEND_PREFIX), &StackConfig::default())
        .expect("Default backend API stack must declare")
}

pub fn instance_bucket() -> InstanceBucketStack {
    InstanceBucketStack::declare(prefix(BUCKET_PREFIX), &StackConfig::default())
        .expect("Default instance bucket stack must declare")
}

pub fn empty_stack(value: &str) -> Stack {
    Stack::new(prefix(value))
}

/// Engine double: plans every entity with a fixed action and fails the
/// steps it was scripted to fail
pub struct ScriptedEngine {
    action: ChangeAction,
    failures: Mutex<VecDeque<(&'static str, ProvisioningError)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new(action: ChangeAction) -> Self {
        Self {
            action,
            failures: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `step` call (`plan`, `apply` or `destroy`) with `error`
    pub fn failing_at(self, step: &'static str, error: ProvisioningError) -> Self {
        self.failures.lock().unwrap().push_back((step, error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, step: &str) -> Result<(), ProvisioningError> {
        self.calls.lock().unwrap().push(step.to_string());
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(failing, _)| *failing == step) {
            Some(index) => Err(failures.remove(index).map(|(_, error)| error).unwrap()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProvisioningEngine for ScriptedEngine {
    async fn plan(&self, assembly: &CloudAssembly) -> Result<Changeset, ProvisioningError> {
        self.record("plan")?;
        let changes = assembly
            .resources
            .iter()
            .map(|summary| ResourceChange {
                logical_id: summary.logical_id.clone(),
                resource_type: summary.kind.cloudformation_type().to_string(),
                action: self.action,
            })
            .collect();

        Ok(Changeset {
            id: Uuid::parse_str(CHANGESET_ID).expect("Invalid UUID in test fixture"),
            stack_name: assembly.stack_name().to_string(),
            created_at: fixed_timestamp(),
            changes,
        })
    }

    async fn apply(&self, changeset: &Changeset) -> Result<ApplyResult, ProvisioningError> {
        self.record("apply")?;
        Ok(ApplyResult {
            stack_name: changeset.stack_name.clone(),
            changeset_id: Some(changeset.id),
            status: StackStatus::CreateComplete,
            completed_at: fixed_timestamp(),
        })
    }

    async fn destroy(&self, assembly: &CloudAssembly) -> Result<ApplyResult, ProvisioningError> {
        self.record("destroy")?;
        Ok(ApplyResult {
            stack_name: assembly.stack_name().to_string(),
            changeset_id: None,
            status: StackStatus::DeleteComplete,
            completed_at: fixed_timestamp(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
