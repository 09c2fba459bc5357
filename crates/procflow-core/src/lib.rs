//! Procflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by every stage of the
//! Procflow pipeline. It includes:
//!
//! - **Registry**: The static element type table ([`registry::ElementType`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Model**: The JSON wire model of a process ([`model::ProcessDefinition`])
//! - **Semantic**: The validated, typed process tree ([`semantic::Process`])

pub mod geometry;
pub mod model;
pub mod registry;
pub mod semantic;
