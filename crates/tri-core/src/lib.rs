//! # tri-core
//!
//! Core types and error types shared by every crate in the triathlon query engine.
//!
//! This crate provides:
//! - Entity structs for conversations, filters, row sets, and attempt records
//! - The retry state machine and terminal states
//! - Write-only audit record shapes
//! - Cross-cutting error types
//! - Response types returned by the engine and rendered by the CLI

pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
