//! Collaborator boundary helpers.
//!
//! # Responsibility
//! - Classify access failures returned by the backend (401 vs 403).
//! - Carry a typed pending intent across the login flow.

pub mod access;
pub mod intent;
