//! Service index discovery

use std::collections::BTreeSet;

use rand::seq::IndexedRandom;
use serde::Deserialize;
use tracing::debug;

use crate::config::EndpointSelection;
use crate::error::BadgeError;

/// Resource type prefix of search endpoints, compared case-insensitively
const SEARCH_SERVICE_TYPE: &str = "searchqueryservice";

/// Root document of a package feed
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceIndex {
    pub resources: Option<Vec<ServiceResource>>,
}

/// Feeds may list entries without an id or type; those are skipped
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResource {
    #[serde(rename = "@id")]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "@type")]
    pub resource_type: Option<serde_json::Value>,
}

impl ServiceResource {
    fn search_endpoint(&self) -> Option<&str> {
        let resource_type = self.resource_type.as_ref()?.as_str()?;
        if !resource_type.to_lowercase().starts_with(SEARCH_SERVICE_TYPE) {
            return None;
        }
        self.id.as_ref()?.as_str()
    }
}

impl ServiceIndex {
    /// Unique search endpoint URLs advertised by the feed
    pub fn search_endpoints(&self) -> Result<BTreeSet<String>, BadgeError> {
        let endpoints: BTreeSet<String> = self
            .resources
            .iter()
            .flatten()
            .filter_map(ServiceResource::search_endpoint)
            .map(str::to_string)
            .collect();

        if endpoints.is_empty() {
            return Err(BadgeError::ServiceUnavailable(
                "The feed advertises no search service".to_string(),
            ));
        }

        debug!("Feed advertises {} search endpoint(s)", endpoints.len());
        Ok(endpoints)
    }
}

/// Picks one endpoint among equivalent candidates
pub fn select_endpoint(
    endpoints: &BTreeSet<String>,
    selection: EndpointSelection,
) -> Option<&String> {
    match selection {
        EndpointSelection::First => endpoints.iter().next(),
        EndpointSelection::Random => {
            let candidates: Vec<&String> = endpoints.iter().collect();
            candidates.choose(&mut rand::rng()).copied()
        }
    }
}
