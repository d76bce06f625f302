// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed References Between Declared Entities
//!
//! A [`ResourceRef`] is handed out by [`Stack::declare`](super::Stack::declare)
//! and is the only way one entity can point at another. Each reference
//! carries the id of the stack that issued it, so a reference can never
//! silently resolve inside a different declaration set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::domain::{LogicalId, ResourceKind};
use crate::resources::Resource;

/// Identity of one declaration set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(Uuid);

impl StackId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for StackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity type that can be declared in a [`Stack`](super::Stack)
pub trait Declarable: Sized {
    /// Kind recorded for every entity of this type
    const KIND: ResourceKind;

    /// Outgoing references to other entities
    fn references(&self) -> Vec<AnyRef>;

    /// Wrap into the stack's storage enum
    fn into_resource(self) -> Resource;

    /// Borrow back out of the storage enum
    fn from_resource(resource: &Resource) -> Option<&Self>;
}

/// Typed handle to a declared entity
pub struct ResourceRef<T> {
    stack: StackId,
    logical_id: LogicalId,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Declarable> ResourceRef<T> {
    pub(crate) fn new(stack: StackId, logical_id: LogicalId) -> Self {
        Self {
            stack,
            logical_id,
            _kind: PhantomData,
        }
    }

    pub fn stack_id(&self) -> StackId {
        self.stack
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }

    /// Drop the static type, keeping the kind as data
    pub fn erase(&self) -> AnyRef {
        AnyRef {
            stack: self.stack,
            logical_id: self.logical_id.clone(),
            kind: T::KIND,
        }
    }
}

impl<T> Clone for ResourceRef<T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack,
            logical_id: self.logical_id.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T> PartialEq for ResourceRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.stack == other.stack && self.logical_id == other.logical_id
    }
}

impl<T> Eq for ResourceRef<T> {}

impl<T> Hash for ResourceRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stack.hash(state);
        self.logical_id.hash(state);
    }
}

impl<T: Declarable> fmt::Debug for ResourceRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRef")
            .field("kind", &T::KIND)
            .field("logical_id", &self.logical_id)
            .field("stack", &self.stack)
            .finish()
    }
}

/// Untyped reference, used for graph walks and validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyRef {
    pub stack: StackId,
    pub logical_id: LogicalId,
    pub kind: ResourceKind,
}

impl fmt::Display for AnyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.logical_id)
    }
}
