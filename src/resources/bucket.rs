// Copyright (c) 2025 - Cowboy AI, Inc.
//! Object Storage: Buckets and Bucket Policies
//!
//! # Lifecycle Invariants
//!
//! - Auto-deleting objects requires [`RemovalPolicy::Destroy`]
//! - A versioned bucket can only be auto-emptied by removing every version
//! - A [`BucketPolicy`] only grants access to its owning bucket
//!
//! Emptying a bucket before deletion is delegated to an external function
//! whose ARN the template takes as the `AutoDeleteObjectsServiceToken`
//! parameter.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::iam::{Principal, PolicyStatement, POLICY_VERSION};
use super::RemovalPolicy;
use crate::domain::invariants::{validate_auto_delete, validate_origin, validate_policy_resource};
use crate::domain::{BucketName, ValidationError, ValidationResult};
use crate::stack::template::{get_att, reference, SynthContext, Synthesize};
use crate::stack::{Declaration, ResourceRef, Stack};

/// Template parameter carrying the object-emptying function ARN
pub const AUTO_DELETE_SERVICE_TOKEN: &str = "AutoDeleteObjectsServiceToken";

/// Server-side encryption at rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketEncryption {
    Unencrypted,
    /// Keys managed by the storage service (AES-256)
    #[default]
    S3Managed,
    /// Keys managed by the key management service
    KmsManaged,
}

impl BucketEncryption {
    fn algorithm(&self) -> Option<&'static str> {
        match self {
            Self::Unencrypted => None,
            Self::S3Managed => Some("AES256"),
            Self::KmsManaged => Some("aws:kms"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(ValidationError::InvalidCorsRule(format!("method {other}"))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cross-origin access rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorsRule {
    allowed_methods: Vec<HttpMethod>,
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    max_age_seconds: Option<u32>,
}

impl CorsRule {
    pub fn new(
        allowed_methods: Vec<HttpMethod>,
        allowed_origins: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if allowed_methods.is_empty() {
            return Err(ValidationError::InvalidCorsRule("no allowed methods".to_string()));
        }
        if allowed_origins.is_empty() {
            return Err(ValidationError::InvalidCorsRule("no allowed origins".to_string()));
        }
        for origin in &allowed_origins {
            validate_origin(origin)?;
        }

        Ok(Self {
            allowed_methods,
            allowed_origins,
            allowed_headers: Vec::new(),
            max_age_seconds: None,
        })
    }

    pub fn with_allowed_headers(mut self, headers: Vec<String>) -> Self {
        self.allowed_headers = headers;
        self
    }

    pub fn with_max_age(mut self, seconds: u32) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    pub fn allowed_methods(&self) -> &[HttpMethod] {
        &self.allowed_methods
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    fn to_template(&self) -> Value {
        let mut rule = json!({
            "AllowedMethods": self.allowed_methods.iter().map(HttpMethod::as_str).collect::<Vec<_>>(),
            "AllowedOrigins": self.allowed_origins,
        });
        if !self.allowed_headers.is_empty() {
            rule["AllowedHeaders"] = json!(self.allowed_headers);
        }
        if let Some(max_age) = self.max_age_seconds {
            rule["MaxAge"] = json!(max_age);
        }
        rule
    }
}

/// Storage tier objects can transition to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageClass {
    InfrequentAccess,
    OneZoneInfrequentAccess,
    IntelligentTiering,
    GlacierInstantRetrieval,
    Glacier,
    DeepArchive,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InfrequentAccess => "STANDARD_IA",
            Self::OneZoneInfrequentAccess => "ONEZONE_IA",
            Self::IntelligentTiering => "INTELLIGENT_TIERING",
            Self::GlacierInstantRetrieval => "GLACIER_IR",
            Self::Glacier => "GLACIER",
            Self::DeepArchive => "DEEP_ARCHIVE",
        }
    }

    /// Minimum object age before a transition into this class
    pub fn minimum_days(&self) -> u32 {
        match self {
            Self::InfrequentAccess | Self::OneZoneInfrequentAccess => 30,
            _ => 0,
        }
    }
}

impl FromStr for StorageClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "STANDARD_IA" | "INFREQUENT_ACCESS" => Ok(Self::InfrequentAccess),
            "ONEZONE_IA" => Ok(Self::OneZoneInfrequentAccess),
            "INTELLIGENT_TIERING" => Ok(Self::IntelligentTiering),
            "GLACIER_IR" => Ok(Self::GlacierInstantRetrieval),
            "GLACIER" => Ok(Self::Glacier),
            "DEEP_ARCHIVE" => Ok(Self::DeepArchive),
            other => Err(ValidationError::InvalidLifecycleRule(format!(
                "unknown storage class {other}"
            ))),
        }
    }
}

impl TryFrom<String> for StorageClass {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StorageClass> for String {
    fn from(value: StorageClass) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Transition {
    storage_class: StorageClass,
    after_days: u32,
}

impl Transition {
    pub fn new(storage_class: StorageClass, after_days: u32) -> Result<Self, ValidationError> {
        if after_days < storage_class.minimum_days() {
            return Err(ValidationError::InvalidLifecycleRule(format!(
                "transition to {} needs at least {} days, got {}",
                storage_class.as_str(),
                storage_class.minimum_days(),
                after_days
            )));
        }
        Ok(Self {
            storage_class,
            after_days,
        })
    }

    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }

    pub fn after_days(&self) -> u32 {
        self.after_days
    }
}

/// Age-based object lifecycle rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LifecycleRule {
    id: Option<String>,
    transitions: Vec<Transition>,
    expiration_days: Option<u32>,
    abort_incomplete_upload_days: Option<u32>,
}

impl LifecycleRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn with_expiration(mut self, days: u32) -> Self {
        self.expiration_days = Some(days);
        self
    }

    pub fn with_abort_incomplete_upload(mut self, days: u32) -> Self {
        self.abort_incomplete_upload_days = Some(days);
        self
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// # Rules
    /// - At least one action
    /// - Expiration later than every transition
    /// - Id at most 255 characters
    pub fn validate(&self) -> ValidationResult {
        if self.transitions.is_empty()
            && self.expiration_days.is_none()
            && self.abort_incomplete_upload_days.is_none()
        {
            return Err(ValidationError::InvalidLifecycleRule("rule has no action".to_string()));
        }

        if let Some(expiration) = self.expiration_days {
            if let Some(latest) = self.transitions.iter().map(Transition::after_days).max() {
                if expiration <= latest {
                    return Err(ValidationError::InvalidLifecycleRule(format!(
                        "expiration after {expiration} days precedes transition after {latest} days"
                    )));
                }
            }
        }

        if self.id.as_ref().is_some_and(|id| id.is_empty() || id.len() > 255) {
            return Err(ValidationError::InvalidLifecycleRule("rule id length".to_string()));
        }
        Ok(())
    }

    fn to_template(&self) -> Value {
        let mut rule = json!({ "Status": "Enabled" });
        if let Some(id) = &self.id {
            rule["Id"] = json!(id);
        }
        if !self.transitions.is_empty() {
            rule["Transitions"] = self
                .transitions
                .iter()
                .map(|t| {
                    json!({
                        "StorageClass": t.storage_class.as_str(),
                        "TransitionInDays": t.after_days,
                    })
                })
                .collect();
        }
        if let Some(days) = self.expiration_days {
            rule["ExpirationInDays"] = json!(days);
        }
        if let Some(days) = self.abort_incomplete_upload_days {
            rule["AbortIncompleteMultipartUpload"] = json!({ "DaysAfterInitiation": days });
        }
        rule
    }
}

/// Whether objects are removed before the bucket is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoDeleteObjects {
    #[default]
    Off,
    /// Remove current objects only
    CurrentVersions,
    /// Remove every object version and delete marker
    AllVersions,
}

impl AutoDeleteObjects {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// Inputs to [`Bucket::declare`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketProps {
    suffix: String,
    encryption: BucketEncryption,
    versioned: bool,
    public_read_access: bool,
    cors: Vec<CorsRule>,
    lifecycle_rules: Vec<LifecycleRule>,
    removal_policy: RemovalPolicy,
    auto_delete: AutoDeleteObjects,
}

impl Default for BucketProps {
    fn default() -> Self {
        Self::new("bucket")
    }
}

impl BucketProps {
    /// Encrypted, private, unversioned and retained on removal
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            encryption: BucketEncryption::default(),
            versioned: false,
            public_read_access: false,
            cors: Vec::new(),
            lifecycle_rules: Vec::new(),
            removal_policy: RemovalPolicy::Retain,
            auto_delete: AutoDeleteObjects::Off,
        }
    }

    pub fn with_encryption(mut self, encryption: BucketEncryption) -> Self {
        self.encryption = encryption;
        self
    }

    pub fn versioned(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    pub fn public_read_access(mut self, public: bool) -> Self {
        self.public_read_access = public;
        self
    }

    pub fn with_cors_rule(mut self, rule: CorsRule) -> Self {
        self.cors.push(rule);
        self
    }

    pub fn with_lifecycle_rule(mut self, rule: LifecycleRule) -> Self {
        self.lifecycle_rules.push(rule);
        self
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Empty the bucket, every version included, before deleting it
    pub fn auto_delete_objects(mut self, enabled: bool) -> Self {
        self.auto_delete = if enabled {
            AutoDeleteObjects::AllVersions
        } else {
            AutoDeleteObjects::Off
        };
        self
    }

    pub fn with_auto_delete(mut self, auto_delete: AutoDeleteObjects) -> Self {
        self.auto_delete = auto_delete;
        self
    }
}

/// Object storage container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    bucket_name: BucketName,
    encryption: BucketEncryption,
    versioned: bool,
    public_read_access: bool,
    cors: Vec<CorsRule>,
    lifecycle_rules: Vec<LifecycleRule>,
    removal_policy: RemovalPolicy,
    auto_delete: AutoDeleteObjects,
}

declarable!(Bucket, Bucket, |_bucket| Vec::new());

impl Bucket {
    pub fn declare(stack: &mut Stack, props: BucketProps) -> Result<ResourceRef<Bucket>, ValidationError> {
        let name = stack.derive_name(&props.suffix)?;
        let bucket_name = BucketName::new(name.as_str())?;

        validate_auto_delete(
            bucket_name.as_str(),
            props.auto_delete.is_enabled(),
            props.auto_delete == AutoDeleteObjects::AllVersions,
            props.removal_policy == RemovalPolicy::Destroy,
            props.versioned,
        )?;
        for rule in &props.lifecycle_rules {
            rule.validate()?;
        }

        stack.declare(
            name,
            Bucket {
                bucket_name,
                encryption: props.encryption,
                versioned: props.versioned,
                public_read_access: props.public_read_access,
                cors: props.cors,
                lifecycle_rules: props.lifecycle_rules,
                removal_policy: props.removal_policy,
                auto_delete: props.auto_delete,
            },
        )
    }

    pub fn bucket_name(&self) -> &BucketName {
        &self.bucket_name
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    pub fn encryption(&self) -> BucketEncryption {
        self.encryption
    }

    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    pub fn public_read_access(&self) -> bool {
        self.public_read_access
    }

    pub fn auto_delete(&self) -> AutoDeleteObjects {
        self.auto_delete
    }

    pub fn cors_rules(&self) -> &[CorsRule] {
        &self.cors
    }

    pub fn lifecycle_rules(&self) -> &[LifecycleRule] {
        &self.lifecycle_rules
    }

    /// Statements the bucket's own settings contribute to its policy
    fn implicit_statements(&self, own: &ResourceRef<Bucket>) -> Vec<PolicyStatement> {
        if !self.public_read_access {
            return Vec::new();
        }
        vec![PolicyStatement::allow()
            .with_principal(Principal::Anyone)
            .with_action("s3:GetObject")
            .on(BucketResource::objects(own.clone()))]
    }
}

impl Synthesize for Bucket {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let id = declaration.logical_id();
        let own = ResourceRef::<Bucket>::new(ctx.stack().id(), id.clone());

        let mut properties = json!({ "BucketName": self.bucket_name.as_str() });
        if let Some(algorithm) = self.encryption.algorithm() {
            properties["BucketEncryption"] = json!({
                "ServerSideEncryptionConfiguration": [{
                    "ServerSideEncryptionByDefault": { "SSEAlgorithm": algorithm }
                }]
            });
        }
        if self.versioned {
            properties["VersioningConfiguration"] = json!({ "Status": "Enabled" });
        }
        if !self.cors.is_empty() {
            properties["CorsConfiguration"] = json!({
                "CorsRules": self.cors.iter().map(CorsRule::to_template).collect::<Vec<_>>()
            });
        }
        if !self.lifecycle_rules.is_empty() {
            properties["LifecycleConfiguration"] = json!({
                "Rules": self.lifecycle_rules.iter().map(LifecycleRule::to_template).collect::<Vec<_>>()
            });
        }
        properties["PublicAccessBlockConfiguration"] = json!({
            "BlockPublicAcls": true,
            "BlockPublicPolicy": !self.public_read_access,
            "IgnorePublicAcls": true,
            "RestrictPublicBuckets": !self.public_read_access,
        });
        if self.auto_delete.is_enabled() {
            properties["Tags"] = json!([{ "Key": "cim:auto-delete-objects", "Value": "true" }]);
        }

        let deletion = self.removal_policy.as_deletion_policy();
        ctx.add_resource(
            id,
            json!({
                "Type": "AWS::S3::Bucket",
                "Properties": properties,
                "UpdateReplacePolicy": deletion,
                "DeletionPolicy": deletion,
            }),
        )?;

        // A declared policy absorbs the implicit statements; otherwise emit one here
        let policy_id = id.child("policy");
        let has_declared_policy = !ctx
            .stack()
            .owned_by::<BucketPolicy, Bucket>(&own)
            .is_empty();
        let implicit = self.implicit_statements(&own);
        let emits_policy = has_declared_policy || !implicit.is_empty();
        if !has_declared_policy && !implicit.is_empty() {
            ctx.add_resource(&policy_id, policy_resource(&own, &implicit))?;
        }

        if self.auto_delete.is_enabled() {
            ctx.add_parameter(
                AUTO_DELETE_SERVICE_TOKEN,
                json!({
                    "Type": "String",
                    "Description": "ARN of the function that empties buckets before deletion",
                }),
            );
            let mut custom = json!({
                "Type": "Custom::S3AutoDeleteObjects",
                "Properties": {
                    "ServiceToken": { "Ref": AUTO_DELETE_SERVICE_TOKEN },
                    "BucketName": reference(id),
                    "DeleteAllVersions": self.auto_delete == AutoDeleteObjects::AllVersions,
                },
                "UpdateReplacePolicy": "Delete",
                "DeletionPolicy": "Delete",
            });
            if emits_policy {
                custom["DependsOn"] = json!([policy_id.as_str()]);
            }
            ctx.add_resource(&id.child("auto-delete-objects"), custom)?;
        }
        Ok(())
    }
}

/// What a bucket policy statement grants access to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketResource {
    /// The bucket itself (listing, configuration)
    Bucket(ResourceRef<Bucket>),
    /// Objects whose key matches `key_pattern`
    Objects {
        bucket: ResourceRef<Bucket>,
        key_pattern: String,
    },
}

impl BucketResource {
    /// Every object in `bucket`
    pub fn objects(bucket: ResourceRef<Bucket>) -> Self {
        Self::Objects {
            bucket,
            key_pattern: "*".to_string(),
        }
    }

    pub fn bucket(&self) -> &ResourceRef<Bucket> {
        match self {
            Self::Bucket(bucket) | Self::Objects { bucket, .. } => bucket,
        }
    }

    pub(crate) fn arn(&self) -> Value {
        match self {
            Self::Bucket(bucket) => get_att(bucket.logical_id(), "Arn"),
            Self::Objects {
                bucket,
                key_pattern,
            } => json!({
                "Fn::Join": ["", [get_att(bucket.logical_id(), "Arn"), format!("/{key_pattern}")]]
            }),
        }
    }

    fn validate(&self) -> ValidationResult {
        if let Self::Objects { key_pattern, .. } = self {
            if key_pattern.is_empty() || key_pattern.starts_with('/') || key_pattern.contains(char::is_whitespace) {
                return Err(ValidationError::InvalidAction(format!("object key pattern {key_pattern:?}")));
            }
        }
        Ok(())
    }
}

fn policy_resource(bucket: &ResourceRef<Bucket>, statements: &[PolicyStatement]) -> Value {
    json!({
        "Type": "AWS::S3::BucketPolicy",
        "Properties": {
            "Bucket": reference(bucket.logical_id()),
            "PolicyDocument": {
                "Statement": statements.iter().map(PolicyStatement::to_template).collect::<Vec<_>>(),
                "Version": POLICY_VERSION,
            },
        }
    })
}

/// Resource policy attached to one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicy {
    bucket: ResourceRef<Bucket>,
    statements: Vec<PolicyStatement>,
}

declarable!(BucketPolicy, BucketPolicy, |policy| {
    let mut refs = vec![policy.bucket.erase()];
    for statement in &policy.statements {
        refs.extend(statement.resources().iter().map(|r| r.bucket().erase()));
    }
    refs
});

impl BucketPolicy {
    /// Attach `statements` to `bucket`, named `<bucket>-policy`
    ///
    /// # Invariants
    /// - `bucket` and every bucket a statement names are declared in `stack`
    /// - Every statement targets `bucket` and nothing else
    /// - Statements are complete and their actions well-formed
    pub fn declare(
        stack: &mut Stack,
        bucket: &ResourceRef<Bucket>,
        statements: Vec<PolicyStatement>,
    ) -> Result<ResourceRef<BucketPolicy>, ValidationError> {
        let owner = stack.declaration_of(bucket)?;
        let suffix = owner
            .name()
            .as_str()
            .strip_prefix(stack.name())
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(owner.name().as_str())
            .to_string();

        if statements.is_empty() {
            return Err(ValidationError::EmptyStatement("statements"));
        }

        for statement in &statements {
            for resource in statement.resources() {
                let referenced = stack.declaration_of(resource.bucket())?;
                validate_policy_resource(bucket.logical_id().as_str(), referenced.logical_id().as_str())?;
                resource.validate()?;
            }
            statement.validate()?;
        }

        let name = stack.derive_name(&format!("{suffix}-policy"))?;
        stack.declare(
            name,
            BucketPolicy {
                bucket: bucket.clone(),
                statements,
            },
        )
    }

    pub fn bucket(&self) -> &ResourceRef<Bucket> {
        &self.bucket
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }
}

impl Synthesize for BucketPolicy {
    fn synthesize(&self, declaration: &Declaration, ctx: &mut SynthContext<'_>) -> ValidationResult {
        let mut statements = ctx.stack().resolve(&self.bucket)?.implicit_statements(&self.bucket);
        statements.extend(self.statements.iter().cloned());

        ctx.add_resource(declaration.logical_id(), policy_resource(&self.bucket, &statements))
    }
}
