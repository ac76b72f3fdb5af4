//! Common test utilities for integration tests
//!
//! This module provides:
//! - A deterministic random number generator
//! - Tolerance assertions
//! - Literal scenario data and the matching filter models

#![allow(dead_code)]

#[macro_use]
pub mod harness;
pub mod scenarios;
