//! Bulk PSK rotation between `pskrotate-api` and the command surface.
//!
//! - **[`Directory`]**: the remote directory seam: organizations, networks,
//!   SSIDs and the single PSK write. [`DashboardDirectory`] adapts the
//!   Dashboard client; [`Throttled`] puts any directory behind the shared
//!   [`RateLimiter`].
//!
//! - **[`select`]**: pure, order-preserving tag selection under a
//!   configurable [`TagPolicy`].
//!
//! - **[`Engine`]**: per-network state machine
//!   (`Pending → ResolvingSsid → Updating → Done | Skipped | Failed`) with
//!   bounded exponential backoff for transient failures.
//!
//! - **[`Aggregator`]**: drives the engine over the selected networks and
//!   folds every outcome into a [`RunSummary`]. Only authentication and
//!   enumeration failures escape it.
//!
//! - **[`Notifier`]**: fire-and-forget fan-out to [`MessageSink`]s on a
//!   background task; delivery failures are logged, never propagated.

pub mod aggregator;
pub mod config;
pub mod convert;
pub mod directory;
pub mod engine;
pub mod error;
pub mod limiter;
pub mod model;
pub mod notify;
pub mod report;
pub mod selector;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::Aggregator;
pub use config::{DashboardSettings, OrgSelector, RotationPlan, RotationPlanBuilder, validate_psk};
pub use directory::{DashboardDirectory, Directory, TagFilter, Throttled};
pub use engine::{Engine, RetryPolicy, UpdateRequest};
pub use error::{CoreError, ErrorKind, TransientCause};
pub use limiter::RateLimiter;
pub use model::{
    DeviceFamily, FamilyOverrides, Network, Organization, Outcome, RunSummary, SkipReason, Ssid,
    SsidSelector, UpdateResult, UpdateState,
};
pub use notify::{MessageSink, Notifier, NotifyError, StderrSink, WebexSink};
pub use report::{progress_line, render_summary, write_report};
pub use selector::{TagCase, TagMatchMode, TagPolicy, select};
