//! Element paths over [`XmlElement`] trees
//!
//! The root element is the context node. Supported steps: `tag`, `*`, `.`,
//! `//` (any depth), predicates `[@attr]`, `[@attr='v']`, `[tag]`,
//! `[tag='text']`, `[n]` (1-based) and `[last()]`, plus a final `text()` or
//! `@attr` step selecting strings instead of elements. Positions count among
//! the matches sharing one parent, also below `//`.

use crate::document::xml_document::XmlElement;
use crate::error::BadgeError;

/// One matched node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlMatch<'a> {
    Element(&'a XmlElement),
    Text(String),
}

impl XmlMatch<'_> {
    /// Serialized element markup, or the plain string
    pub fn render(&self) -> String {
        match self {
            XmlMatch::Element(element) => element.serialize(),
            XmlMatch::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    SelfNode,
    Any,
    Name(String),
    Text,
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttribute(String),
    AttributeEquals(String, String),
    HasChild(String),
    ChildTextEquals(String, String),
    Position(usize),
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

pub fn select<'a>(root: &'a XmlElement, expr: &str) -> Result<Vec<XmlMatch<'a>>, BadgeError> {
    let steps = parse(expr)?;
    let mut current = vec![root];

    for (index, step) in steps.iter().enumerate() {
        let is_last = index + 1 == steps.len();
        match &step.test {
            NodeTest::Text | NodeTest::Attribute(_) if !is_last => {
                return Err(invalid(expr, "text() and @attr must be the final step"));
            }
            NodeTest::Text => {
                return Ok(scope(&current, step.axis)
                    .into_iter()
                    .map(XmlElement::text)
                    .filter(|text| !text.is_empty())
                    .map(XmlMatch::Text)
                    .collect());
            }
            NodeTest::Attribute(name) => {
                return Ok(scope(&current, step.axis)
                    .into_iter()
                    .filter_map(|element| element.attribute(name))
                    .map(|value| XmlMatch::Text(value.to_string()))
                    .collect());
            }
            _ => {}
        }

        current = current
            .into_iter()
            .flat_map(|context| apply(context, step))
            .collect();
    }

    Ok(current.into_iter().map(XmlMatch::Element).collect())
}

/// Elements a terminal `text()`/`@attr` step reads from
fn scope<'a>(current: &[&'a XmlElement], axis: Axis) -> Vec<&'a XmlElement> {
    match axis {
        Axis::Child => current.to_vec(),
        Axis::Descendant => current
            .iter()
            .flat_map(|element| {
                let mut all = vec![*element];
                all.extend(descendants(element));
                all
            })
            .collect(),
    }
}

fn apply<'a>(context: &'a XmlElement, step: &Step) -> Vec<&'a XmlElement> {
    let parents = match step.axis {
        Axis::Child => vec![context],
        Axis::Descendant => {
            let mut all = vec![context];
            all.extend(descendants(context));
            all
        }
    };
    if step.test == NodeTest::SelfNode {
        return filter(parents, &step.predicates);
    }

    parents
        .into_iter()
        .flat_map(|parent| {
            let children = parent
                .child_elements()
                .filter(|element| match &step.test {
                    NodeTest::Name(name) => element.name == *name,
                    _ => true,
                })
                .collect();
            filter(children, &step.predicates)
        })
        .collect()
}

fn descendants(element: &XmlElement) -> Vec<&XmlElement> {
    let mut out = Vec::new();
    for child in element.child_elements() {
        out.push(child);
        out.extend(descendants(child));
    }
    out
}

fn filter<'a>(mut elements: Vec<&'a XmlElement>, predicates: &[Predicate]) -> Vec<&'a XmlElement> {
    for predicate in predicates {
        elements = match predicate {
            Predicate::Position(position) => elements.get(position - 1).copied().into_iter().collect(),
            Predicate::Last => elements.last().copied().into_iter().collect(),
            other => elements
                .into_iter()
                .filter(|element| matches(element, other))
                .collect(),
        };
    }
    elements
}

fn matches(element: &XmlElement, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::HasAttribute(name) => element.attribute(name).is_some(),
        Predicate::AttributeEquals(name, value) => element.attribute(name) == Some(value.as_str()),
        Predicate::HasChild(name) => element.child_elements().any(|child| child.name == *name),
        Predicate::ChildTextEquals(name, text) => element
            .child_elements()
            .any(|child| child.name == *name && child.text() == *text),
        Predicate::Position(_) | Predicate::Last => true,
    }
}

fn invalid(expr: &str, reason: &str) -> BadgeError {
    BadgeError::BadRequest(format!("Invalid query '{}': {}", expr, reason))
}

fn parse(expr: &str) -> Result<Vec<Step>, BadgeError> {
    let mut rest = expr.trim();
    let mut axis = Axis::Child;

    if let Some(tail) = rest.strip_prefix(".//").or_else(|| rest.strip_prefix("//")) {
        axis = Axis::Descendant;
        rest = tail;
    } else if let Some(tail) = rest.strip_prefix('/') {
        rest = tail;
    }

    let parts = split_steps(rest);
    let mut steps = Vec::new();
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            if index == 0 || index + 1 == parts.len() || axis == Axis::Descendant {
                return Err(invalid(expr, "empty path step"));
            }
            axis = Axis::Descendant;
            continue;
        }
        steps.push(parse_step(expr, part, axis)?);
        axis = Axis::Child;
    }

    if steps.is_empty() {
        return Err(invalid(expr, "empty path"));
    }
    Ok(steps)
}

/// Splits on `/` outside of predicates and quotes
fn split_steps(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '/') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_step(expr: &str, part: &str, axis: Axis) -> Result<Step, BadgeError> {
    let (head, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));

    let test = match head.trim() {
        "" => return Err(invalid(expr, "missing node test")),
        "." => NodeTest::SelfNode,
        "*" => NodeTest::Any,
        "text()" => NodeTest::Text,
        name => match name.strip_prefix('@') {
            Some("") => return Err(invalid(expr, "missing attribute name")),
            Some(attribute) => NodeTest::Attribute(attribute.to_string()),
            None => NodeTest::Name(name.to_string()),
        },
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let inner_and_tail = rest
            .strip_prefix('[')
            .ok_or_else(|| invalid(expr, "expected '['"))?;
        let close = find_closing(inner_and_tail).ok_or_else(|| invalid(expr, "expected ']'"))?;
        predicates.push(parse_predicate(expr, inner_and_tail[..close].trim())?);
        rest = &inner_and_tail[close + 1..];
    }

    if !predicates.is_empty() && matches!(test, NodeTest::Text | NodeTest::Attribute(_)) {
        return Err(invalid(expr, "predicates are not allowed on text() or @attr"));
    }

    Ok(Step {
        axis,
        test,
        predicates,
    })
}

fn find_closing(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(expr: &str, inner: &str) -> Result<Predicate, BadgeError> {
    if inner == "last()" {
        return Ok(Predicate::Last);
    }
    if inner.bytes().all(|b| b.is_ascii_digit()) && !inner.is_empty() {
        return match inner.parse::<usize>() {
            Ok(position) if position >= 1 => Ok(Predicate::Position(position)),
            _ => Err(invalid(expr, "positions start at 1")),
        };
    }

    let (name, value) = match inner.split_once('=') {
        Some((name, value)) => (name.trim(), Some(unquote(expr, value.trim())?)),
        None => (inner, None),
    };

    if name.is_empty() || name == "@" {
        return Err(invalid(expr, "empty predicate"));
    }

    match (name.strip_prefix('@'), value) {
        (Some(attribute), None) => Ok(Predicate::HasAttribute(attribute.to_string())),
        (Some(attribute), Some(value)) => {
            Ok(Predicate::AttributeEquals(attribute.to_string(), value))
        }
        (None, None) => Ok(Predicate::HasChild(name.to_string())),
        (None, Some(value)) => Ok(Predicate::ChildTextEquals(name.to_string(), value)),
    }
}

fn unquote(expr: &str, value: &str) -> Result<String, BadgeError> {
    let quote = value
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| invalid(expr, "predicate values must be quoted"))?;
    value[1..]
        .strip_suffix(quote)
        .map(str::to_string)
        .ok_or_else(|| invalid(expr, "unterminated predicate value"))
}
