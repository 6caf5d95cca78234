// Organization-scoped endpoints: organization and network listing.

use tracing::debug;

use super::client::DashboardClient;
use super::types::{NetworkResponse, OrganizationResponse, TagsFilterType};
use crate::error::Error;

/// Page size requested from the network listing (API maximum).
const NETWORKS_PER_PAGE: u32 = 1000;

impl DashboardClient {
    /// List every organization the API key can see.
    ///
    /// `GET /organizations`
    pub async fn list_organizations(&self) -> Result<Vec<OrganizationResponse>, Error> {
        debug!("listing organizations");
        self.get("organizations").await
    }

    /// List the networks of an organization, optionally filtered by tags.
    ///
    /// `GET /organizations/{org}/networks?tags[]=..&tagsFilterType=..`
    ///
    /// The server-side filter is a hint only; callers must re-validate.
    pub async fn list_networks(
        &self,
        org_id: &str,
        tags: &[String],
        filter: Option<TagsFilterType>,
    ) -> Result<Vec<NetworkResponse>, Error> {
        debug!(org_id, ?tags, ?filter, "listing networks");

        let mut params = vec![("perPage", NETWORKS_PER_PAGE.to_string())];
        if let Some(filter) = filter {
            params.extend(tags.iter().map(|t| ("tags[]", t.clone())));
            params.push(("tagsFilterType", filter.as_str().to_owned()));
        }

        self.get_paginated(&format!("organizations/{org_id}/networks"), &params)
            .await
    }
}
