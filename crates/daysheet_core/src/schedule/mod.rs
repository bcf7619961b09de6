//! Schedule algorithms: snapping, window tiling and the summary codec.
//!
//! # Responsibility
//! - Hold the pure and model-level building blocks used by the
//!   synchronization service.
//!
//! # Invariants
//! - Nothing in this module triggers synchronization on its own; callers in
//!   `service` decide when an encode or decode runs.

pub mod codec;
pub mod snap;
pub mod window;
