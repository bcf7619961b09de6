//! Schedule domain model.
//!
//! # Responsibility
//! - Define the value types shared by the window model, codec and service.
//!
//! # Invariants
//! - Every block carries a stable `BlockId` for its whole lifetime.
//! - Times are minute-resolution offsets from midnight of a single day.

pub mod block;
pub mod time;
