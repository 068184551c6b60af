//! JSONPath subset evaluated over `serde_json::Value`
//!
//! Supported: `$`, `.name`, `['name']`, `[n]` (negative counts from the end),
//! `[*]`, `.*` and recursive descent `..name` / `..*` / `..[n]`.

use serde_json::Value;

use crate::error::BadgeError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Name(String),
    Index(i64),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Child(Selector),
    Descendant(Selector),
}

/// Returns every value matched by `expr`, in document order
pub fn select<'a>(root: &'a Value, expr: &str) -> Result<Vec<&'a Value>, BadgeError> {
    let segments = parse(expr)?;

    let mut current = vec![root];
    for segment in &segments {
        current = match segment {
            Segment::Child(selector) => current
                .into_iter()
                .flat_map(|node| apply(node, selector))
                .collect(),
            Segment::Descendant(selector) => current
                .into_iter()
                .flat_map(descendants)
                .flat_map(|node| apply(node, selector))
                .collect(),
        };
    }

    Ok(current)
}

/// Text form of a matched value: strings as-is, everything else as JSON
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply<'a>(node: &'a Value, selector: &Selector) -> Vec<&'a Value> {
    match (selector, node) {
        (Selector::Name(name), Value::Object(map)) => map.get(name).into_iter().collect(),
        (Selector::Index(index), Value::Array(items)) => {
            let len = items.len() as i64;
            let position = if *index < 0 { len + index } else { *index };
            if (0..len).contains(&position) {
                vec![&items[position as usize]]
            } else {
                Vec::new()
            }
        }
        (Selector::Wildcard, Value::Object(map)) => map.values().collect(),
        (Selector::Wildcard, Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// The node itself followed by all nested values, pre-order
fn descendants(node: &Value) -> Vec<&Value> {
    let mut out = vec![node];
    let children: Vec<&Value> = match node {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    };
    for child in children {
        out.extend(descendants(child));
    }
    out
}

fn invalid(expr: &str, reason: &str) -> BadgeError {
    BadgeError::BadRequest(format!("Invalid query '{}': {}", expr, reason))
}

fn parse(expr: &str) -> Result<Vec<Segment>, BadgeError> {
    let mut rest = expr
        .trim()
        .strip_prefix('$')
        .ok_or_else(|| invalid(expr, "must start with '$'"))?;
    let mut segments = Vec::new();

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("..") {
            let (selector, tail) = if tail.starts_with('[') {
                parse_bracket(expr, tail)?
            } else {
                parse_dotted(expr, tail)?
            };
            segments.push(Segment::Descendant(selector));
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('.') {
            let (selector, tail) = parse_dotted(expr, tail)?;
            segments.push(Segment::Child(selector));
            rest = tail;
        } else if rest.starts_with('[') {
            let (selector, tail) = parse_bracket(expr, rest)?;
            segments.push(Segment::Child(selector));
            rest = tail;
        } else {
            return Err(invalid(expr, "expected '.' or '['"));
        }
    }

    Ok(segments)
}

fn parse_dotted<'e>(expr: &str, input: &'e str) -> Result<(Selector, &'e str), BadgeError> {
    if let Some(tail) = input.strip_prefix('*') {
        return Ok((Selector::Wildcard, tail));
    }

    let end = input.find(['.', '[']).unwrap_or(input.len());
    let name = &input[..end];
    if name.is_empty() {
        return Err(invalid(expr, "empty member name"));
    }
    Ok((Selector::Name(name.to_string()), &input[end..]))
}

fn parse_bracket<'e>(expr: &str, input: &'e str) -> Result<(Selector, &'e str), BadgeError> {
    let inner = input[1..].trim_start();

    if let Some(quote) = inner.chars().next().filter(|c| *c == '\'' || *c == '"') {
        let body = &inner[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| invalid(expr, "unterminated quoted name"))?;
        let tail = body[close + 1..]
            .trim_start()
            .strip_prefix(']')
            .ok_or_else(|| invalid(expr, "expected ']'"))?;
        return Ok((Selector::Name(body[..close].to_string()), tail));
    }

    let close = inner
        .find(']')
        .ok_or_else(|| invalid(expr, "expected ']'"))?;
    let content = inner[..close].trim();
    let tail = &inner[close + 1..];

    if content == "*" {
        return Ok((Selector::Wildcard, tail));
    }
    content
        .parse::<i64>()
        .map(|index| (Selector::Index(index), tail))
        .map_err(|_| invalid(expr, "unsupported bracket selector"))
}
