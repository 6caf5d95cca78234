// pskrotate-api: Async Rust client for the Dashboard management API and chat-bot notifications

pub mod dashboard;
pub mod error;
pub mod transport;
pub mod webex;

pub use dashboard::DashboardClient;
pub use dashboard::types as dashboard_types;
pub use error::Error;
pub use transport::TransportConfig;
pub use webex::WebexClient;
