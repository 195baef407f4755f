//! Key paths: JSON-value-relative addresses for syntax nodes.
//!
//! Unlike a [`NodeId`](crate::address::NodeId), a key path names object keys
//! and array indices, so it stays meaningful across edits that move nodes
//! around. A key segment may carry a `___key` suffix (the property name
//! itself) or a `___value` suffix (the scalar the property holds).

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::address::to_absolute_path;
use crate::error::StructeditError;
use crate::syntax::{NodeKind, SyntaxNode, SyntaxTree};

pub const KEY_SUFFIX: &str = "___key";
pub const VALUE_SUFFIX: &str = "___value";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPathSegment {
    Key(String),
    Index(usize),
    PropertyName(String),
    PropertyValue(String),
}

impl KeyPathSegment {
    /// Classify a raw string token by its suffix.
    pub fn from_token(token: &str) -> Self {
        if let Some(name) = token.strip_suffix(KEY_SUFFIX) {
            return Self::PropertyName(name.to_string());
        }
        if let Some(name) = token.strip_suffix(VALUE_SUFFIX) {
            return Self::PropertyValue(name.to_string());
        }
        Self::Key(token.to_string())
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Key(key) | Self::PropertyName(key) | Self::PropertyValue(key) => Some(key),
            Self::Index(_) => None,
        }
    }

    fn into_name(self) -> Self {
        match self {
            Self::Key(key) | Self::PropertyValue(key) => Self::PropertyName(key),
            other => other,
        }
    }

    fn into_value(self) -> Self {
        match self {
            Self::Key(key) => Self::PropertyValue(key),
            other => other,
        }
    }

    fn token(&self) -> String {
        match self {
            Self::Key(key) => key.clone(),
            Self::PropertyName(key) => format!("{key}{KEY_SUFFIX}"),
            Self::PropertyValue(key) => format!("{key}{VALUE_SUFFIX}"),
            Self::Index(index) => index.to_string(),
        }
    }
}

impl Serialize for KeyPathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Index(index) => serializer.serialize_u64(*index as u64),
            Self::Key(key) => serializer.serialize_str(key),
            Self::PropertyName(key) => serializer.collect_str(&format_args!("{key}{KEY_SUFFIX}")),
            Self::PropertyValue(key) => {
                serializer.collect_str(&format_args!("{key}{VALUE_SUFFIX}"))
            }
        }
    }
}

impl<'de> Deserialize<'de> for KeyPathSegment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSegment {
            Index(u64),
            Token(String),
        }

        match RawSegment::deserialize(deserializer)? {
            RawSegment::Index(index) => usize::try_from(index)
                .map(KeyPathSegment::Index)
                .map_err(|_| de::Error::custom(format!("array index {index} is out of range"))),
            RawSegment::Token(token) => Ok(KeyPathSegment::from_token(&token)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(Vec<KeyPathSegment>);

impl KeyPath {
    pub fn new(segments: Vec<KeyPathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[KeyPathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, segment: KeyPathSegment) {
        self.0.push(segment);
    }

    fn rewrite_last(&mut self, rewrite: fn(KeyPathSegment) -> KeyPathSegment) {
        if let Some(last) = self.0.pop() {
            self.0.push(rewrite(last));
        }
    }

    /// Parse the dotted/bracket text form, e.g. `service.targets[1].name___value`.
    ///
    /// Bare keys use `[A-Za-z0-9_-]`; anything else is written as a quoted
    /// bracket segment such as `["a b"]`. The empty string is the root path.
    pub fn parse(raw: &str) -> Result<Self, StructeditError> {
        let path = raw.trim();
        let bytes = path.as_bytes();
        let mut index = 0usize;
        let mut segments = Vec::new();

        while index < bytes.len() {
            match bytes[index] {
                b'[' => {
                    let (segment, consumed) = parse_bracket_segment(path, index)?;
                    segments.push(segment);
                    index = consumed;
                }
                b'.' => {
                    if segments.is_empty() || index + 1 >= bytes.len() {
                        return Err(invalid_key_path(
                            path,
                            format!("unexpected '.' at byte offset {index}"),
                        ));
                    }
                    index += 1;
                    if !is_key_char(bytes[index]) {
                        return Err(invalid_key_path(
                            path,
                            format!("expected a key after '.' at byte offset {index}"),
                        ));
                    }
                }
                byte if is_key_char(byte) => {
                    if !segments.is_empty() && bytes[index - 1] != b'.' {
                        return Err(invalid_key_path(
                            path,
                            format!("expected '.' or '[' at byte offset {index}"),
                        ));
                    }
                    let start = index;
                    while index < bytes.len() && is_key_char(bytes[index]) {
                        index += 1;
                    }
                    segments.push(KeyPathSegment::from_token(&path[start..index]));
                }
                _ => {
                    let character = path[index..].chars().next().unwrap_or('?');
                    return Err(invalid_key_path(
                        path,
                        format!("unsupported character '{character}' at byte offset {index}"),
                    ));
                }
            }
        }

        Ok(Self(segments))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            let KeyPathSegment::Index(_) = segment else {
                let token = segment.token();
                if !token.is_empty() && token.bytes().all(is_key_char) {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&token)?;
                } else {
                    let quoted = serde_json::to_string(&token).map_err(|_| fmt::Error)?;
                    write!(f, "[{quoted}]")?;
                }
                continue;
            };
            write!(f, "[{}]", segment.token())?;
        }
        Ok(())
    }
}

fn parse_bracket_segment(
    path: &str,
    start: usize,
) -> Result<(KeyPathSegment, usize), StructeditError> {
    let bytes = path.as_bytes();
    let mut cursor = start + 1;

    if bytes.get(cursor) == Some(&b'"') {
        let quote_start = cursor;
        cursor += 1;
        while cursor < bytes.len() && bytes[cursor] != b'"' {
            cursor += if bytes[cursor] == b'\\' { 2 } else { 1 };
        }
        if cursor >= bytes.len() {
            return Err(invalid_key_path(
                path,
                format!("unterminated quoted key starting at byte offset {start}"),
            ));
        }
        let token = serde_json::from_str::<String>(&path[quote_start..=cursor]).map_err(|error| {
            invalid_key_path(path, format!("invalid quoted key: {error}"))
        })?;
        cursor += 1;
        if bytes.get(cursor) != Some(&b']') {
            return Err(invalid_key_path(
                path,
                format!("missing closing ']' for segment starting at byte offset {start}"),
            ));
        }
        return Ok((KeyPathSegment::from_token(&token), cursor + 1));
    }

    let digit_start = cursor;
    while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
        cursor += 1;
    }
    if digit_start == cursor {
        return Err(invalid_key_path(
            path,
            format!("expected digits or a quoted key after '[' at byte offset {start}"),
        ));
    }
    if bytes.get(cursor) != Some(&b']') {
        return Err(invalid_key_path(
            path,
            format!("missing closing ']' for index starting at byte offset {start}"),
        ));
    }

    let value = path[digit_start..cursor].parse::<usize>().map_err(|_| {
        invalid_key_path(
            path,
            format!("index '{}' is out of range", &path[digit_start..cursor]),
        )
    })?;
    Ok((KeyPathSegment::Index(value), cursor + 1))
}

fn is_key_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

fn invalid_key_path(path: &str, message: String) -> StructeditError {
    StructeditError::InvalidKeyPath {
        path: path.to_string(),
        message,
    }
}

/// Derive the key path of `node` by parsing `full_text` as JSON.
pub fn to_key_path(node: SyntaxNode<'_>, full_text: &str) -> Result<KeyPath, StructeditError> {
    let document = serde_json::from_str::<Value>(full_text)
        .map_err(|source| StructeditError::DocumentNotJson { source })?;
    to_key_path_in(node, &document)
}

/// Like [`to_key_path`], against an already parsed document value.
pub fn to_key_path_in(node: SyntaxNode<'_>, document: &Value) -> Result<KeyPath, StructeditError> {
    let steps = to_absolute_path(node);
    let mut current = document;
    let mut path = KeyPath::default();

    for pair in steps.windows(2) {
        let (container, step) = (pair[0], pair[1]);
        match container.kind {
            NodeKind::Object if step.kind == NodeKind::Property => {
                let (key, value) = current
                    .as_object()
                    .and_then(|map| map.iter().nth(step.index))
                    .ok_or_else(|| structure_mismatch(&path, "object member", step.index))?;
                path.push(KeyPathSegment::Key(key.clone()));
                current = value;
            }
            NodeKind::Array if !step.kind.is_liminal() => {
                current = current
                    .as_array()
                    .and_then(|items| items.get(step.index))
                    .ok_or_else(|| structure_mismatch(&path, "array element", step.index))?;
                path.push(KeyPathSegment::Index(step.index));
            }
            NodeKind::Property if step.kind == NodeKind::PropertyName => {
                path.rewrite_last(KeyPathSegment::into_name);
            }
            _ => {}
        }
    }

    let parent_is_property = steps.len() >= 2 && steps[steps.len() - 2].kind == NodeKind::Property;
    if parent_is_property && node.kind().is_scalar() {
        path.rewrite_last(KeyPathSegment::into_value);
    }

    Ok(path)
}

/// Key paths of every node in `tree`, indexed by [`SyntaxNode::position`].
///
/// Equivalent to calling [`to_key_path_in`] per node, but each object's
/// members are paired with the parsed map in a single pass. Entries are
/// `None` where the tree and `document` disagree.
pub fn key_paths_in(tree: &SyntaxTree, document: &Value) -> Vec<Option<KeyPath>> {
    let mut paths = vec![None; tree.len()];
    let mut pending = vec![(tree.root(), Some(document), KeyPath::default())];

    while let Some((node, value, path)) = pending.pop() {
        let Some(value) = value else {
            continue;
        };

        let mut members = value.as_object().map(|map| map.iter());
        let mut consumed = 0usize;
        for child in node.children() {
            let (child_value, child_path) = match (node.kind(), child.kind()) {
                (NodeKind::Object, NodeKind::Property) => {
                    let member = members.as_mut().and_then(|members| {
                        let skip = child.sibling_index().checked_sub(consumed)?;
                        consumed = child.sibling_index() + 1;
                        members.nth(skip)
                    });
                    match member {
                        Some((key, member)) => {
                            let mut path = path.clone();
                            path.push(KeyPathSegment::Key(key.clone()));
                            (Some(member), path)
                        }
                        None => (None, path.clone()),
                    }
                }
                (NodeKind::Array, kind) if !kind.is_liminal() => {
                    let item = value
                        .as_array()
                        .and_then(|items| items.get(child.sibling_index()));
                    let mut path = path.clone();
                    path.push(KeyPathSegment::Index(child.sibling_index()));
                    (item, path)
                }
                (NodeKind::Property, NodeKind::PropertyName) => {
                    let mut path = path.clone();
                    path.rewrite_last(KeyPathSegment::into_name);
                    (Some(value), path)
                }
                _ => (Some(value), path.clone()),
            };
            pending.push((child, child_value, child_path));
        }

        let mut own = path;
        if node.kind().is_scalar()
            && node
                .parent()
                .is_some_and(|parent| parent.kind() == NodeKind::Property)
        {
            own.rewrite_last(KeyPathSegment::into_value);
        }
        paths[node.position()] = Some(own);
    }

    paths
}

/// Key path of `node`, or the empty path while the document is not valid JSON.
pub fn key_path_or_empty(node: SyntaxNode<'_>, full_text: &str) -> KeyPath {
    match to_key_path(node, full_text) {
        Ok(path) => path,
        Err(error) => {
            debug!(%error, ?node, "key path unavailable");
            KeyPath::default()
        }
    }
}

fn structure_mismatch(path: &KeyPath, expected: &str, index: usize) -> StructeditError {
    StructeditError::KeyPathNotFound {
        path: format!("{path} ({expected} #{index} is missing from the parsed value)"),
    }
}

/// Locate the node a key path points at.
///
/// `___key` segments select the property name; plain and `___value` keys
/// select the property's value. When a key occurs more than once the last
/// occurrence wins, matching how JSON parsers resolve duplicates.
pub fn resolve_key_path<'t>(
    tree: &'t SyntaxTree,
    full_text: &str,
    path: &KeyPath,
) -> Result<SyntaxNode<'t>, StructeditError> {
    let not_found = || StructeditError::KeyPathNotFound {
        path: path.to_string(),
    };

    let mut current = tree
        .root()
        .children()
        .find(|child| !matches!(child.kind(), NodeKind::Error))
        .ok_or_else(not_found)?;

    for (position, segment) in path.segments().iter().enumerate() {
        let last = position + 1 == path.len();
        match segment {
            KeyPathSegment::Index(index) => {
                if current.kind() != NodeKind::Array {
                    return Err(expected_container_error(path, segment, current.kind()));
                }
                current = value_children(current).nth(*index).ok_or_else(not_found)?;
            }
            KeyPathSegment::Key(key)
            | KeyPathSegment::PropertyName(key)
            | KeyPathSegment::PropertyValue(key) => {
                if current.kind() != NodeKind::Object {
                    return Err(expected_container_error(path, segment, current.kind()));
                }
                let property = current
                    .children()
                    .filter(|child| child.kind() == NodeKind::Property)
                    .filter(|property| {
                        property_name(*property)
                            .and_then(|name| decoded_key(name, full_text))
                            .is_some_and(|decoded| decoded == *key)
                    })
                    .last()
                    .ok_or_else(not_found)?;

                if let KeyPathSegment::PropertyName(_) = segment {
                    if !last {
                        return Err(invalid_key_path(
                            &path.to_string(),
                            format!("'{key}{KEY_SUFFIX}' must be the final segment"),
                        ));
                    }
                    return property_name(property).ok_or_else(not_found);
                }

                current = property
                    .children()
                    .find(|child| child.kind() != NodeKind::PropertyName)
                    .ok_or_else(not_found)?;
            }
        }
    }

    Ok(current)
}

fn value_children<'t>(container: SyntaxNode<'t>) -> impl Iterator<Item = SyntaxNode<'t>> {
    container
        .children()
        .filter(|child| !child.kind().is_liminal() && child.kind() != NodeKind::Error)
}

fn property_name(property: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    property
        .children()
        .find(|child| child.kind() == NodeKind::PropertyName)
}

fn decoded_key(name: SyntaxNode<'_>, full_text: &str) -> Option<String> {
    let raw = name.text(full_text)?;
    Some(serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim_matches('"').to_string()))
}

fn expected_container_error(
    path: &KeyPath,
    segment: &KeyPathSegment,
    actual: NodeKind,
) -> StructeditError {
    let expected = match segment {
        KeyPathSegment::Index(_) => "Array",
        _ => "Object",
    };
    invalid_key_path(
        &path.to_string(),
        format!(
            "expected {expected} at segment {}, found {actual}",
            KeyPath::new(vec![segment.clone()])
        ),
    )
}
