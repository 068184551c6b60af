//! Package registry resolution
//! - feed.rs: service index discovery and search endpoint selection
//! - search.rs: search response model
//! - semver.rs: version parsing, filtering and ordering
//! - template.rs: feed URL templates

pub mod feed;
pub mod search;
pub mod semver;
pub mod template;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::HttpClient;
use crate::config::{EndpointSelection, RegistryConfig};
use crate::context::RequestContext;
use crate::error::BadgeError;
use crate::request::BadgeRequest;

pub use feed::{ServiceIndex, select_endpoint};
pub use search::{SearchPackage, SearchResponse, SearchVersion};
pub use self::semver::{PackageVersionCandidate, VersionFilter, collect_candidates, latest, parse_version};
pub use template::UrlTemplate;

/// What a registry badge reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryMode {
    /// Latest stable version
    Version,
    /// Latest version including prereleases
    VersionPrerelease,
    /// Download count of the latest version
    Downloads,
}

impl RegistryMode {
    pub const ALL: [RegistryMode; 3] = [
        RegistryMode::Version,
        RegistryMode::VersionPrerelease,
        RegistryMode::Downloads,
    ];

    /// Route segment selecting this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryMode::Version => "v",
            RegistryMode::VersionPrerelease => "vpre",
            RegistryMode::Downloads => "dt",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == segment)
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            RegistryMode::Version | RegistryMode::VersionPrerelease => "nuget",
            RegistryMode::Downloads => "downloads",
        }
    }

    /// Explicit `prerelease` flag sent to the search service, if any
    fn prerelease_flag(&self) -> Option<bool> {
        match self {
            RegistryMode::Version => Some(false),
            RegistryMode::VersionPrerelease => Some(true),
            RegistryMode::Downloads => None,
        }
    }

    fn includes_prerelease(&self) -> bool {
        self.prerelease_flag() != Some(false)
    }
}

/// Discovers a search endpoint through the feed and picks the best matching version
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    client: HttpClient,
    feed: UrlTemplate,
    selection: EndpointSelection,
}

impl RegistryResolver {
    pub fn new(client: HttpClient, config: &RegistryConfig) -> Self {
        Self {
            client,
            feed: UrlTemplate::parse(&config.feed_url),
            selection: config.endpoint_selection,
        }
    }

    /// Resolves the `packageName` request parameter to its latest matching version
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        request: &BadgeRequest,
        mode: RegistryMode,
    ) -> Result<PackageVersionCandidate, BadgeError> {
        let package_name = request.required_param("packageName")?;
        let filter = VersionFilter {
            major: request.numeric_param("major")?,
            minor: request.numeric_param("minor")?,
            include_prerelease: mode.includes_prerelease(),
        };

        let feed_url = self.feed.expand(request.params())?;
        let search_url = self.search_url(ctx, &feed_url, package_name, mode).await?;

        let response: SearchResponse = self
            .fetch_json(ctx, &search_url, "Failed to parse search response")
            .await?;
        debug!(
            "Search for {} returned {} package(s), {} total hit(s)",
            package_name,
            response.data.len(),
            response.total_hits
        );

        let candidates = collect_candidates(&response.data, package_name);
        let best = latest(filter.apply(candidates)).ok_or_else(|| {
            BadgeError::BadRequest(format!("Failed to resolve package data for {}", package_name))
        })?;

        info!("Resolved {} to {} ({:?})", package_name, best.version, mode);
        Ok(best)
    }

    async fn search_url(
        &self,
        ctx: &RequestContext,
        feed_url: &str,
        package_name: &str,
        mode: RegistryMode,
    ) -> Result<String, BadgeError> {
        let index: ServiceIndex = self
            .fetch_json(ctx, feed_url, "Failed to parse service index")
            .await?;
        let endpoints = index.search_endpoints().map_err(|_| {
            BadgeError::ServiceUnavailable(format!(
                "{} did not provide any search query services",
                feed_url
            ))
        })?;
        let endpoint = select_endpoint(&endpoints, self.selection).ok_or_else(|| {
            BadgeError::ServiceUnavailable(format!("{} did not provide any resources", feed_url))
        })?;
        debug!("Selected search endpoint {}", endpoint);

        let mut url = reqwest::Url::parse(endpoint).map_err(|e| {
            BadgeError::ServiceUnavailable(format!("Invalid search endpoint {}: {}", endpoint, e))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", package_name);
            if let Some(prerelease) = mode.prerelease_flag() {
                query.append_pair("prerelease", if prerelease { "true" } else { "false" });
            }
        }
        Ok(url.into())
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        url: &str,
        parse_failure: &str,
    ) -> Result<T, BadgeError> {
        let response = self.client.get(ctx, url).await?.ensure_ok(url)?;
        if response.body.is_empty() {
            return Err(BadgeError::ServiceUnavailable(format!("{} yielded no data", url)));
        }
        serde_json::from_slice(&response.body).map_err(|e| {
            BadgeError::UnprocessableEntity(format!("{} from {}: {}", parse_failure, url, e))
        })
    }
}
