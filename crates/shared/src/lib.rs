//! Shared utilities and common types for the Bilkollen backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT token utilities for bearer authentication
//! - Offset-based pagination helpers
//! - Common validation logic (registration numbers, free-text fields)

pub mod jwt;
pub mod pagination;
pub mod validation;
