// Dashboard management API client.
//
// `client` holds transport mechanics (auth header, URL joining, error
// classification, Link-header pagination). Endpoint groups live in their
// own files as inherent impl blocks, one per device family.

mod appliance;
pub mod client;
mod organizations;
pub mod types;
mod wireless;

pub use client::DashboardClient;
