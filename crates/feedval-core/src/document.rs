//! # Document Model
//!
//! The exchange type between the external loader and both validation
//! layers. A [`Document`] wraps a parsed tree of
//! object / array / string / number / bool / null nodes; object keys keep
//! the order in which the loader produced them.
//!
//! Object lookups are hash lookups and `len` is O(1), so size and
//! "has key" queries stay cheap on large feed files.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// The kind of a single node in the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Ordered map of string keys to nodes.
    Object,
    /// Ordered sequence of nodes.
    Array,
    /// UTF-8 string scalar.
    String,
    /// Integer or floating-point scalar.
    Number,
    /// Boolean scalar.
    Bool,
    /// Explicit null.
    Null,
}

impl NodeKind {
    /// Classify a node.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
        }
    }

    /// Lowercase name, matching JSON Schema's `type` vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// One step of a [`DocumentPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&escape_token(key)),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of a node inside a document, as a sequence of keys and indices.
///
/// Renders as a JSON Pointer (RFC 6901): `/0/inbound-datasets/2/compression`.
/// The root location renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<PathSegment>,
}

impl DocumentPath {
    /// The root location.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the root location.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Location of an object member below this one.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.push(PathSegment::Key(key.into()));
        child
    }

    /// Location of an array element below this one.
    pub fn index(&self, index: usize) -> Self {
        let mut child = self.clone();
        child.push(PathSegment::Index(index));
        child
    }

    /// The enclosing location, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// The array index of the top-level entry this location falls under.
    ///
    /// For a feed document (a top-level array) this is the feed index.
    pub fn top_level_index(&self) -> Option<usize> {
        match self.segments.first() {
            Some(PathSegment::Index(index)) => Some(*index),
            _ => None,
        }
    }

    /// Parse a JSON Pointer, using `root` to tell array indices from
    /// object keys that happen to be numeric.
    ///
    /// Tokens that walk off the tree are kept as keys.
    pub fn from_pointer(pointer: &str, root: &Value) -> Self {
        let mut path = Self::root();
        let Some(tokens) = pointer.strip_prefix('/') else {
            return path;
        };

        let mut current = Some(root);
        for raw in tokens.split('/') {
            let token = unescape_token(raw);
            let segment = match (current, token.parse::<usize>()) {
                (Some(Value::Array(_)), Ok(index)) => PathSegment::Index(index),
                _ => PathSegment::Key(token),
            };
            current = current.and_then(|node| match (&segment, node) {
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
                (PathSegment::Key(key), Value::Object(map)) => map.get(key.as_str()),
                _ => None,
            });
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for DocumentPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed configuration document.
///
/// Constructed once from the loader's output and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// Wrap a parsed tree.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying tree.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the document, returning the tree.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Kind of the root node.
    pub fn kind(&self) -> NodeKind {
        NodeKind::of(&self.0)
    }

    /// Element count of an array root, member count of an object root,
    /// zero for scalars.
    pub fn len(&self) -> usize {
        match &self.0 {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    /// Whether [`len`](Self::len) is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the root is an object containing `key`.
    pub fn has_key(&self, key: &str) -> bool {
        self.0.as_object().is_some_and(|map| map.contains_key(key))
    }

    /// Elements of an array root.
    pub fn entries(&self) -> Option<&[Value]> {
        self.0.as_array().map(Vec::as_slice)
    }

    /// Resolve a location against this document.
    pub fn get(&self, path: &DocumentPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(&self.0, |node, segment| match (segment, node) {
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
                (PathSegment::Key(key), Value::Object(map)) => map.get(key.as_str()),
                _ => None,
            })
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
