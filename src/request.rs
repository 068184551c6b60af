//! Request normalization
//!
//! Raw request parameters (route path, path captures and query pairs) are
//! parsed into an immutable [`BadgeRequest`]. Sources read the typed fields
//! and fall back to [`BadgeRequest::param`] for their own parameters.

use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::debug;

use crate::badge::render::BadgeStyle;
use crate::error::BadgeError;

/// Raw parameters of one inbound badge call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    path: String,
    path_params: BTreeMap<String, String>,
    query: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Builds parameters from a request path and its raw (still encoded) query string
    pub fn from_uri(path: impl Into<String>, query: Option<&str>) -> Self {
        let query = query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            path: path.into(),
            path_params: BTreeMap::new(),
            query,
        }
    }

    pub fn with_path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn path_params(&self) -> &BTreeMap<String, String> {
        &self.path_params
    }

    /// Query pairs in insertion order
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Query pairs keyed by name; the last of repeated keys wins
    pub fn query_map(&self) -> BTreeMap<String, String> {
        self.query.iter().cloned().collect()
    }

    /// All parameters in one map; path captures win over query pairs of the same name
    fn merged(&self) -> BTreeMap<String, String> {
        let mut merged = self.query_map();
        merged.extend(self.path_params.clone());
        merged
    }
}

/// Normalized badge request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeRequest {
    pub label: Option<String>,
    pub message: Option<String>,
    pub color: Option<String>,
    pub label_color: Option<String>,
    pub logo: Option<String>,
    pub logo_color: Option<String>,
    pub cache_seconds: Option<u64>,
    pub style: Option<BadgeStyle>,
    params: BTreeMap<String, String>,
}

impl BadgeRequest {
    /// Parses raw request parameters, normalizing literal label and message text
    ///
    /// The message is taken from the `text` path capture, else the `message` query pair.
    pub fn parse(raw: &RequestParams) -> Result<Self, BadgeError> {
        let mut fields = raw.merged();
        if let Some(text) = fields.remove("text") {
            fields.insert("message".to_string(), text);
        }
        let mut request = Self::from_fields(fields)?;
        request.label = request.label.as_deref().map(normalize_text);
        request.message = request.message.as_deref().map(normalize_text);
        Ok(request)
    }

    /// Reads the badge schema (`label`, `message`, `color`, ...) from arbitrary fields
    ///
    /// Used for remote documents that may carry badge overrides; no text
    /// normalization is applied.
    pub fn from_fields(fields: BTreeMap<String, String>) -> Result<Self, BadgeError> {
        let cache_seconds = parse_numeric::<u64>(&fields, "cacheSeconds")?;
        let style = fields.get("style").and_then(|s| match s.parse::<BadgeStyle>() {
            Ok(style) => Some(style),
            Err(()) => {
                debug!("Ignoring unknown badge style '{}'", s);
                None
            }
        });

        Ok(Self {
            label: fields.get("label").cloned(),
            message: fields.get("message").cloned(),
            color: fields.get("color").cloned(),
            label_color: fields.get("labelColor").cloned(),
            logo: fields.get("logo").cloned(),
            logo_color: fields.get("logoColor").cloned(),
            cache_seconds,
            style,
            params: fields,
        })
    }

    /// Field-wise merge: values of `self` win, missing ones come from `fallback`
    pub fn or(&self, fallback: &BadgeRequest) -> BadgeRequest {
        let mut params = fallback.params.clone();
        params.extend(self.params.clone());
        BadgeRequest {
            label: self.label.clone().or_else(|| fallback.label.clone()),
            message: self.message.clone().or_else(|| fallback.message.clone()),
            color: self.color.clone().or_else(|| fallback.color.clone()),
            label_color: self.label_color.clone().or_else(|| fallback.label_color.clone()),
            logo: self.logo.clone().or_else(|| fallback.logo.clone()),
            logo_color: self.logo_color.clone().or_else(|| fallback.logo_color.clone()),
            cache_seconds: self.cache_seconds.or(fallback.cache_seconds),
            style: self.style.or(fallback.style),
            params,
        }
    }

    /// Any raw parameter, including source-specific ones
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// A parameter the source cannot work without
    pub fn required_param(&self, name: &str) -> Result<&str, BadgeError> {
        self.param(name)
            .ok_or_else(|| BadgeError::BadRequest(format!("'{}' parameter is missing", name)))
    }

    /// A declared-numeric parameter; present but non-numeric is a parse error
    pub fn numeric_param<T: FromStr>(&self, name: &str) -> Result<Option<T>, BadgeError> {
        parse_numeric(&self.params, name)
    }

    pub fn style(&self) -> BadgeStyle {
        self.style.unwrap_or_default()
    }
}

fn parse_numeric<T: FromStr>(
    fields: &BTreeMap<String, String>,
    name: &str,
) -> Result<Option<T>, BadgeError> {
    fields
        .get(name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| {
                BadgeError::Parse(format!("'{}' must be numeric, got '{}'", name, value))
            })
        })
        .transpose()
}

/// Decodes the shorthand used in literal badge text
///
/// `%20` and a single `_` become a space, `__` becomes `_` and `--` becomes `-`.
/// The input is scanned once, so an underscore produced by `__` is never
/// turned into a space afterwards.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("%20") {
            out.push(' ');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("__") {
            out.push('_');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("--") {
            out.push('-');
            rest = tail;
        } else if c == '_' {
            out.push(' ');
            rest = &rest[1..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}
