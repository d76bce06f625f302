// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Declaration Set
//!
//! A [`Stack`] is the in-memory graph of desired-state entities for one
//! deployable unit. It is built in a single synchronous pass and is pure data
//! until handed to a provisioning engine.
//!
//! # Construction
//!
//! ```text
//! NamePrefix → Stack::new
//!     ↓
//! Entity::declare(&mut stack, ...) → ResourceRef<Entity>
//!     ↓            (references checked here, fail fast)
//! Stack::validate → Stack::synthesize → CloudAssembly
//! ```
//!
//! Every entity constructor takes the stack explicitly; there is no ambient
//! construction scope. Entities are never mutated once declared: the stack
//! only hands out shared references.
//!
//! # Example
//!
//! ```rust
//! use cim_cloud_stack::domain::NamePrefix;
//! use cim_cloud_stack::resources::vpc::{Vpc, VpcProps};
//! use cim_cloud_stack::stack::Stack;
//!
//! let mut stack = Stack::new(NamePrefix::new("backend-api").unwrap());
//! let vpc = Vpc::declare(&mut stack, "vpc", VpcProps::default()).unwrap();
//!
//! assert_eq!(vpc.logical_id().as_str(), "BackendApiVpc");
//! assert!(stack.validate().is_ok());
//! ```

pub mod config;
pub mod reference;
pub mod template;

pub use config::StackConfig;
pub use reference::{AnyRef, Declarable, ResourceRef, StackId};
pub use template::CloudAssembly;

use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::domain::{
    LogicalId, NameError, NamePrefix, ResourceKind, ResourceName, ValidationError,
    ValidationResult,
};
use crate::resources::{RemovalPolicy, Resource};

/// One entity as recorded in the declaration set
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    logical_id: LogicalId,
    name: ResourceName,
    resource: Resource,
}

impl Declaration {
    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.resource.removal_policy()
    }

    /// Borrow the entity as `T` if it is one
    pub fn as_entity<T: Declarable>(&self) -> Option<&T> {
        T::from_resource(&self.resource)
    }
}

/// Declaration set for one deployable unit
#[derive(Debug, Clone)]
pub struct Stack {
    id: StackId,
    prefix: NamePrefix,
    description: Option<String>,
    declarations: Vec<Declaration>,
    by_logical_id: HashMap<LogicalId, usize>,
    names: HashSet<ResourceName>,
}

impl Stack {
    /// Create an empty declaration set in `prefix`'s namespace
    pub fn new(prefix: NamePrefix) -> Self {
        Self {
            id: StackId::new(),
            prefix,
            description: None,
            declarations: Vec::new(),
            by_logical_id: HashMap::new(),
            names: HashSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> StackId {
        self.id
    }

    pub fn prefix(&self) -> &NamePrefix {
        &self.prefix
    }

    /// Stack name as submitted to the engine
    pub fn name(&self) -> &str {
        self.prefix.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Derive `<prefix>-<suffix>` in this stack's namespace
    pub fn derive_name(&self, suffix: &str) -> Result<ResourceName, ValidationError> {
        Ok(self.prefix.derive(suffix)?)
    }

    /// Record a new entity under `name`
    ///
    /// # Invariants
    /// - `name` lives in this stack's namespace
    /// - Name and derived logical id are unique in the set
    /// - Every outgoing reference resolves to an entity of the expected kind
    pub fn declare<T: Declarable>(
        &mut self,
        name: ResourceName,
        entity: T,
    ) -> Result<ResourceRef<T>, ValidationError> {
        if !name.has_prefix(&self.prefix) {
            return Err(ValidationError::OutsideNamespace {
                name: name.to_string(),
                prefix: self.prefix.to_string(),
            });
        }
        self.check_available(&name)?;
        let logical_id = name.logical_id();

        for reference in entity.references() {
            self.check_reference(&reference)?;
        }

        debug!(
            stack = %self.prefix,
            kind = T::KIND.as_str(),
            category = %T::KIND.category(),
            logical_id = %logical_id,
            "Declared {}", name
        );

        self.by_logical_id
            .insert(logical_id.clone(), self.declarations.len());
        self.names.insert(name.clone());
        self.declarations.push(Declaration {
            logical_id: logical_id.clone(),
            name,
            resource: entity.into_resource(),
        });

        Ok(ResourceRef::new(self.id, logical_id))
    }

    fn check_reference(&self, reference: &AnyRef) -> ValidationResult {
        let unresolved = || ValidationError::UnresolvedReference {
            kind: reference.kind,
            logical_id: reference.logical_id.to_string(),
        };

        if reference.stack != self.id {
            return Err(unresolved());
        }

        let declaration = self
            .by_logical_id
            .get(&reference.logical_id)
            .map(|&index| &self.declarations[index])
            .ok_or_else(unresolved)?;

        if declaration.kind() != reference.kind {
            return Err(ValidationError::KindMismatch {
                logical_id: reference.logical_id.to_string(),
                expected: reference.kind,
                actual: declaration.kind(),
            });
        }

        Ok(())
    }

    /// Look up the declaration a reference points at
    pub fn declaration_of<T: Declarable>(
        &self,
        reference: &ResourceRef<T>,
    ) -> Result<&Declaration, ValidationError> {
        self.check_reference(&reference.erase())?;
        self.by_logical_id
            .get(reference.logical_id())
            .map(|&index| &self.declarations[index])
            .ok_or_else(|| ValidationError::UnresolvedReference {
                kind: T::KIND,
                logical_id: reference.logical_id().to_string(),
            })
    }

    /// Resolve a reference to the declared entity
    pub fn resolve<T: Declarable>(&self, reference: &ResourceRef<T>) -> Result<&T, ValidationError> {
        let declaration = self.declaration_of(reference)?;
        declaration
            .as_entity::<T>()
            .ok_or_else(|| ValidationError::KindMismatch {
                logical_id: reference.logical_id().to_string(),
                expected: T::KIND,
                actual: declaration.kind(),
            })
    }

    pub fn declaration(&self, logical_id: &LogicalId) -> Option<&Declaration> {
        self.by_logical_id
            .get(logical_id)
            .map(|&index| &self.declarations[index])
    }

    /// All declarations in declaration order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Declarations of one kind
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.kind() == kind)
    }

    /// Typed view over every entity of type `T`
    pub fn entities<'a, T: Declarable + 'a>(&'a self) -> impl Iterator<Item = (&'a Declaration, &'a T)> {
        self.declarations
            .iter()
            .filter_map(|d| d.as_entity::<T>().map(|entity| (d, entity)))
    }

    /// Entities of type `T` that reference `owner`
    pub fn owned_by<T: Declarable, O: Declarable>(
        &self,
        owner: &ResourceRef<O>,
    ) -> Vec<(&Declaration, &T)> {
        let owner = owner.erase();
        self.entities::<T>()
            .filter(|(_, entity)| entity.references().contains(&owner))
            .collect()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Re-check every invariant of the assembled graph
    ///
    /// # Invariants
    /// - Every name carries the prefix and is unique
    /// - Every reference resolves inside this set (no dangling references)
    /// - The dependency graph is acyclic
    pub fn validate(&self) -> ValidationResult {
        let mut seen = HashSet::new();
        for declaration in &self.declarations {
            if !declaration.name.has_prefix(&self.prefix) {
                return Err(ValidationError::OutsideNamespace {
                    name: declaration.name.to_string(),
                    prefix: self.prefix.to_string(),
                });
            }
            if !seen.insert(&declaration.name) {
                return Err(ValidationError::DuplicateName(declaration.name.to_string()));
            }
            for reference in declaration.resource.references() {
                self.check_reference(&reference)?;
            }
        }

        self.dependency_order().map(|_| ())
    }

    /// Declarations ordered so that each comes after everything it references
    ///
    /// Ties keep declaration order.
    pub fn dependency_order(&self) -> Result<Vec<&Declaration>, ValidationError> {
        let count = self.declarations.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for (index, declaration) in self.declarations.iter().enumerate() {
            let mut targets: Vec<usize> = declaration
                .resource
                .references()
                .iter()
                .filter_map(|r| self.by_logical_id.get(&r.logical_id).copied())
                .collect();
            targets.sort_unstable();
            targets.dedup();

            for target in targets {
                in_degree[index] += 1;
                dependents[target].push(index);
            }
        }

        let mut ready: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut ordered = Vec::with_capacity(count);

        while let Some(index) = ready.pop_front() {
            ordered.push(&self.declarations[index]);
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }

        if ordered.len() != count {
            let stuck = (0..count)
                .find(|&i| in_degree[i] > 0)
                .map(|i| self.declarations[i].logical_id.to_string())
                .unwrap_or_default();
            return Err(ValidationError::DependencyCycle(stuck));
        }

        Ok(ordered)
    }

    /// Check `name` and its logical id are free without declaring anything
    pub fn check_available(&self, name: &ResourceName) -> Result<(), ValidationError> {
        if self.names.contains(name) {
            return Err(ValidationError::DuplicateName(name.to_string()));
        }
        let logical_id = name.logical_id();
        if self.by_logical_id.contains_key(&logical_id) {
            return Err(ValidationError::DuplicateLogicalId(logical_id.to_string()));
        }
        Ok(())
    }
}

impl TryFrom<&str> for Stack {
    type Error = NameError;

    fn try_from(prefix: &str) -> Result<Self, Self::Error> {
        Ok(Self::new(NamePrefix::new(prefix)?))
    }
}
