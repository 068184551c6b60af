//! Search service response model

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub data: Vec<SearchPackage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPackage {
    pub id: String,
    /// Latest version of the package
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub versions: Vec<SearchVersion>,
    #[serde(default)]
    pub package_types: Vec<PackageType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchVersion {
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    pub version: String,
    #[serde(default)]
    pub downloads: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageType {
    pub name: String,
}
