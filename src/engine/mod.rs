// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Engine Seam
//!
//! The crate stops at a synthesized [`CloudAssembly`]. Computing a diff
//! against live state and applying it belongs to an external engine, which
//! plugs in through [`ProvisioningEngine`].
//!
//! # Flow
//!
//! ```text
//! Stack ──synthesize──► CloudAssembly ──plan──► Changeset ──apply──► ApplyResult
//!   (validation errors)               (engine errors: auth, quota, drift, ...)
//! ```
//!
//! [`deploy`] and [`teardown`] run the whole flow. Declaration-time failures
//! surface as [`StackError::Validation`] before the engine is ever called;
//! runtime failures surface as [`StackError::Provisioning`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::LogicalId;
use crate::errors::{StackError, StackResult};
use crate::stack::{CloudAssembly, Stack};

/// Runtime failures reported by a provisioning engine
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProvisioningError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Access denied for {action} on {resource}")]
    AccessDenied { action: String, resource: String },

    /// Physical name already taken outside this stack (bucket names are global)
    #[error("Name {name} for {logical_id} is already in use")]
    NameCollision { logical_id: LogicalId, name: String },

    #[error("Quota exceeded for {resource_type}: {detail}")]
    QuotaExceeded { resource_type: String, detail: String },

    /// Live resource diverged from the last applied state
    #[error("Drift detected on {logical_id}: {detail}")]
    Drift { logical_id: LogicalId, detail: String },

    /// Engine rejected the template or changeset
    #[error("Rejected by provisioning engine: {0}")]
    Rejected(String),

    #[error("Provisioning engine unavailable: {0}")]
    Unavailable(String),
}

impl ProvisioningError {
    /// Entity the failure is attributed to, when the engine names one
    pub fn logical_id(&self) -> Option<&LogicalId> {
        match self {
            Self::NameCollision { logical_id, .. } | Self::Drift { logical_id, .. } => {
                Some(logical_id)
            }
            _ => None,
        }
    }

    /// Whether retrying the same changeset later might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// What the engine will do to one template resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAction {
    Create,
    Update,
    /// Update that replaces the live resource
    Replace,
    Delete,
    NoChange,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::NoChange => "no-change",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub logical_id: LogicalId,
    pub resource_type: String,
    pub action: ChangeAction,
}

/// Planned changes for one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    pub id: Uuid,
    pub stack_name: String,
    pub created_at: DateTime<Utc>,
    pub changes: Vec<ResourceChange>,
}

impl Changeset {
    pub fn new(stack_name: impl Into<String>, changes: Vec<ResourceChange>) -> Self {
        Self {
            id: Uuid::now_v7(),
            stack_name: stack_name.into(),
            created_at: Utc::now(),
            changes,
        }
    }

    /// Whether applying this changeset would touch anything
    pub fn has_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.action != ChangeAction::NoChange)
    }

    pub fn count(&self, action: ChangeAction) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }
}

/// Final state reported after an apply or destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackStatus {
    CreateComplete,
    UpdateComplete,
    DeleteComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub stack_name: String,
    pub changeset_id: Option<Uuid>,
    pub status: StackStatus,
    pub completed_at: DateTime<Utc>,
}

/// External engine that reconciles live resources with an assembly
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Diff the assembly against live state
    async fn plan(&self, assembly: &CloudAssembly) -> Result<Changeset, ProvisioningError>;

    /// Apply a previously planned changeset
    async fn apply(&self, changeset: &Changeset) -> Result<ApplyResult, ProvisioningError>;

    /// Remove every live resource of the assembly not marked retained
    async fn destroy(&self, assembly: &CloudAssembly) -> Result<ApplyResult, ProvisioningError>;

    /// Name of this engine, for logs
    fn name(&self) -> &str;
}

/// Outcome of [`deploy`]
#[derive(Debug, Clone)]
pub struct Deployment {
    pub assembly: CloudAssembly,
    pub changeset: Changeset,
    /// `None` when the changeset was empty and nothing was applied
    pub result: Option<ApplyResult>,
}

/// Validate, synthesize, plan and apply `stack`
pub async fn deploy<E>(engine: &E, stack: &Stack) -> StackResult<Deployment>
where
    E: ProvisioningEngine + ?Sized,
{
    let assembly = stack.synthesize()?;

    let changeset = engine
        .plan(&assembly)
        .await
        .map_err(|e| log_failure(engine, "plan", e))?;

    info!(
        engine = engine.name(),
        stack = assembly.stack_name(),
        changeset = %changeset.id,
        create = changeset.count(ChangeAction::Create),
        update = changeset.count(ChangeAction::Update),
        replace = changeset.count(ChangeAction::Replace),
        delete = changeset.count(ChangeAction::Delete),
        "Planned changeset"
    );

    if !changeset.has_changes() {
        info!(stack = assembly.stack_name(), "No changes to apply");
        return Ok(Deployment {
            assembly,
            changeset,
            result: None,
        });
    }

    let result = engine
        .apply(&changeset)
        .await
        .map_err(|e| log_failure(engine, "apply", e))?;

    info!(stack = assembly.stack_name(), status = ?result.status, "Applied changeset");

    Ok(Deployment {
        assembly,
        changeset,
        result: Some(result),
    })
}

/// Synthesize `stack` and ask the engine to remove it
///
/// Entities with [`RemovalPolicy::Retain`](crate::resources::RemovalPolicy)
/// stay behind; they are logged before the engine is called.
pub async fn teardown<E>(engine: &E, stack: &Stack) -> StackResult<ApplyResult>
where
    E: ProvisioningEngine + ?Sized,
{
    let assembly = stack.synthesize()?;

    for retained in assembly.retained() {
        warn!(
            stack = assembly.stack_name(),
            logical_id = %retained.logical_id,
            "{} {} will be retained", retained.kind, retained.name
        );
    }

    let result = engine
        .destroy(&assembly)
        .await
        .map_err(|e| log_failure(engine, "destroy", e))?;

    info!(stack = assembly.stack_name(), status = ?result.status, "Destroyed stack");
    Ok(result)
}

fn log_failure<E>(engine: &E, step: &str, error: ProvisioningError) -> StackError
where
    E: ProvisioningEngine + ?Sized,
{
    warn!(engine = engine.name(), step, error = %error, "Provisioning failed");
    StackError::Provisioning(error)
}
