//! Core schedule logic for daysheet.
//! This crate owns the block/summary invariants; hosts only render and call in.

pub mod config;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod service;

pub use config::{ConfigError, ReflowPolicy, ScheduleConfig};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::block::{Block, BlockId, BlockLabel};
pub use model::time::{TimeOfDay, TimeParseError, MINUTES_PER_DAY};
pub use schedule::codec::{
    compress, encode, parse_summary, DecodeReport, ParsedLine, ParsedSummary, Run,
};
pub use schedule::snap::Snapper;
pub use schedule::window::{BoundaryField, BoundaryOutcome, WindowModel};
pub use service::observer::{ObserverId, ObserverRegistry, ScheduleObserver, ScheduleProperty};
pub use service::schedule_service::{ScheduleController, SyncStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
