//! Schedule use-case services.
//!
//! # Responsibility
//! - Mediate every mutation so blocks and summary text stay in sync.
//! - Keep presentation layers decoupled through the observer contract.

pub mod observer;
pub mod schedule_service;
