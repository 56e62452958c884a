//! Business logic services.

pub mod case_update;
pub mod klar_guard;
pub mod optimistic;
pub mod statistics;
