// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Synthesizer
//!
//! Assembles a blueprint stack from configuration and writes its
//! synthesized template as JSON, ready to hand to a provisioning engine.
//!
//! Run with: cargo run --bin synth-stack
//!
//! Environment:
//! - `STACK_BLUEPRINT`: `backend-api` (default) or `instance-bucket`
//! - `STACK_PREFIX`: name prefix, defaults to the blueprint name
//! - `STACK_CONFIG_FILE`: JSON configuration; otherwise `STACK_*` variables are read
//! - `STACK_OUTPUT`: file to write the template to; stdout when unset

use anyhow::{Context, Result};
use cim_cloud_stack::{Blueprint, NamePrefix, StackConfig};
use tracing::info;

/// Configuration for one synthesis run
#[derive(Debug, Clone)]
struct SynthConfig {
    blueprint: Blueprint,
    prefix: NamePrefix,
    stack: StackConfig,
    output: Option<String>,
}

impl SynthConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let blueprint: Blueprint = match std::env::var("STACK_BLUEPRINT") {
            Ok(value) => value.parse().context("Invalid STACK_BLUEPRINT")?,
            Err(_) => Blueprint::default(),
        };

        let prefix = std::env::var("STACK_PREFIX").unwrap_or_else(|_| blueprint.to_string());
        let prefix = NamePrefix::new(prefix).context("Invalid STACK_PREFIX")?;

        let stack = match std::env::var("STACK_CONFIG_FILE") {
            Ok(path) => StackConfig::from_file(&path)
                .with_context(|| format!("Failed to load configuration from {path}"))?,
            Err(_) => StackConfig::from_env().context("Invalid STACK_* configuration")?,
        };

        Ok(Self {
            blueprint,
            prefix,
            stack,
            output: std::env::var("STACK_OUTPUT").ok(),
        })
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Starting stack synthesis");

    let config = SynthConfig::from_env()?;
    info!("📋 Configuration loaded:");
    info!("  - Blueprint: {}", config.blueprint);
    info!("  - Prefix: {}", config.prefix);
    info!("  - VPC: {}", config.stack.vpc_cidr);
    info!("  - Instance type: {}", config.stack.instance_type);

    let stack = config
        .blueprint
        .declare(config.prefix.clone(), &config.stack)
        .context("Failed to declare stack")?;
    info!("✅ Declared {} entities", stack.len());

    let assembly = stack.synthesize().context("Failed to synthesize stack")?;
    let template = assembly.to_json_pretty()?;

    for summary in assembly.retained() {
        info!("📦 {} {} is retained on removal", summary.kind, summary.name);
    }

    match &config.output {
        Some(path) => {
            std::fs::write(path, &template)
                .with_context(|| format!("Failed to write template to {path}"))?;
            info!(
                "💾 Wrote {} template resources to {}",
                assembly.template_resource_count(),
                path
            );
        }
        None => println!("{template}"),
    }

    Ok(())
}
