//! Document query engine
//! - traits.rs: DocumentFormat trait and the parsed Document
//! - json_path.rs: JSONPath subset over JSON-shaped values
//! - xml_path.rs: element paths over XML trees
//! - json_document.rs / yaml_document.rs / toml_document.rs / xml_document.rs: format adapters

pub mod json_document;
pub mod json_path;
pub mod toml_document;
pub mod traits;
pub mod xml_document;
pub mod xml_path;
pub mod yaml_document;

pub use json_document::JsonDocument;
pub use toml_document::TomlDocument;
pub use traits::{Document, DocumentFormat, OVERRIDE_FIELDS};
pub use xml_document::{XmlDocument, XmlElement, XmlNode};
pub use yaml_document::YamlDocument;

static FORMATS: [&dyn DocumentFormat; 4] = [&JsonDocument, &YamlDocument, &TomlDocument, &XmlDocument];

/// Looks up a format adapter by its route name
pub fn format_for(name: &str) -> Option<&'static dyn DocumentFormat> {
    FORMATS
        .iter()
        .copied()
        .find(|format| format.name().eq_ignore_ascii_case(name))
}

/// Every supported format
pub fn formats() -> &'static [&'static dyn DocumentFormat] {
    &FORMATS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("json", Some("json"))]
    #[case("YAML", Some("yaml"))]
    #[case("toml", Some("toml"))]
    #[case("xml", Some("xml"))]
    #[case("csv", None)]
    fn format_for_finds_adapter_by_name(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(format_for(name).map(|f| f.name()), expected);
    }
}
