//! Domain layer for the Bilkollen backend.
//!
//! This crate contains:
//! - Domain models (vehicle cases, case audits, locations, org membership)
//! - Business logic services (klar transition guard, guarded-update rules,
//!   statistics aggregation, optimistic-edit tracking)
//! - Domain error types

pub mod models;
pub mod services;
