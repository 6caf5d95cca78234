// ── Domain model ──
//
// Canonical types shared by the selector, engine and aggregator. Wire
// types from `pskrotate-api` are converted into these in `convert`.

pub mod network;
pub mod result;
pub mod ssid;

pub use network::{DeviceFamily, FamilyOverrides, Network, Organization};
pub use result::{Outcome, RunSummary, SkipReason, UpdateResult, UpdateState};
pub use ssid::{Ssid, SsidSelector};
