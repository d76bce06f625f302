// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Naming, reference closure and address layout properties of declaration
//! sets, checked with proptest.

mod declaration_properties;
mod network_layout;
