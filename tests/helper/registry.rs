//! Registry feed and search fixtures

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

/// Packages returned by the mocked search service
#[derive(Default)]
pub struct SearchFixture {
    packages: Vec<(String, Vec<(String, u64)>)>,
}

impl SearchFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, id: &str, versions: &[(&str, u64)]) -> Self {
        self.packages.push((
            id.to_string(),
            versions
                .iter()
                .map(|(version, downloads)| (version.to_string(), *downloads))
                .collect(),
        ));
        self
    }

    fn body(&self) -> String {
        let data: Vec<_> = self
            .packages
            .iter()
            .map(|(id, versions)| {
                json!({
                    "id": id,
                    "version": versions.last().map(|(v, _)| v.clone()).unwrap_or_default(),
                    "versions": versions
                        .iter()
                        .map(|(version, downloads)| json!({
                            "@id": format!("https://example.test/{}/{}", id, version),
                            "version": version,
                            "downloads": downloads,
                        }))
                        .collect::<Vec<_>>(),
                    "packageTypes": [{"name": "Dependency"}],
                })
            })
            .collect();
        json!({ "totalHits": data.len(), "data": data }).to_string()
    }
}

/// Mounts `/v3/index.json` advertising `/query` next to an untyped entry, and `/query`
/// answering with `search`
pub async fn mock_registry(server: &mut ServerGuard, search: &SearchFixture) -> (Mock, Mock) {
    let feed = json!({
        "version": "3.0.0",
        "resources": [
            {"@id": format!("{}/query", server.url()), "@type": "SearchQueryService/3.5.0"},
            {"@id": format!("{}/flat", server.url()), "@type": "PackageBaseAddress/3.0.0"},
            {"@id": format!("{}/untyped", server.url())},
        ]
    });

    let feed_mock = server
        .mock("GET", "/v3/index.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(feed.to_string())
        .create_async()
        .await;
    let search_mock = server
        .mock("GET", "/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search.body())
        .create_async()
        .await;

    (feed_mock, search_mock)
}
