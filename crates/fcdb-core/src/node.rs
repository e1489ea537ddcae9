//! Tagged tree used for all schema-less telemetry data.
//!
//! Every entity carries a tree of [`Node`] values keyed by slash separated
//! paths that mirror the nesting of the management API responses.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered map of child nodes.
pub type NodeMap = BTreeMap<String, Node>;

/// Leaf value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// A value in the attribute tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    List(Vec<Node>),
    Map(NodeMap),
}

impl Default for Node {
    fn default() -> Self {
        Node::Scalar(Scalar::Null)
    }
}

impl Node {
    /// Empty map node.
    pub fn map() -> Self {
        Node::Map(NodeMap::new())
    }

    /// Null scalar.
    pub const fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    /// String scalar.
    pub fn str(s: impl Into<String>) -> Self {
        Node::Scalar(Scalar::Str(s.into()))
    }

    pub const fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    /// Short name of the node's type, used in conflict messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "bool",
            Node::Scalar(Scalar::Int(_)) => "int",
            Node::Scalar(Scalar::Float(_)) => "float",
            Node::Scalar(Scalar::Str(_)) => "str",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an int or float scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Scalar(Scalar::Int(i)) => Some(*i as f64),
            Node::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Node>> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut NodeMap> {
        match self {
            Node::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Child of a map node.
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Walks a slash separated path through nested maps.
    ///
    /// An empty path returns the node itself.
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        split_path(path).try_fold(self, |node, seg| node.child(seg))
    }

    /// Returns the strings in a string or list of strings.
    ///
    /// The management API returns a bare value instead of a one element list
    /// in a few places, so both shapes are accepted.
    pub fn string_list(&self) -> Vec<String> {
        match self {
            Node::Scalar(Scalar::Str(s)) => vec![s.clone()],
            Node::List(l) => l
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the elements of a list, or the node itself as a one element slice.
    pub fn as_items(&self) -> &[Node] {
        match self {
            Node::List(l) => l,
            Node::Scalar(Scalar::Null) => &[],
            other => std::slice::from_ref(other),
        }
    }
}

/// Splits a slash separated path, skipping empty segments.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Scalar(Scalar::Null) => Ok(()),
            Node::Scalar(Scalar::Bool(b)) => write!(f, "{}", b),
            Node::Scalar(Scalar::Int(i)) => write!(f, "{}", i),
            Node::Scalar(Scalar::Float(v)) => write!(f, "{}", v),
            Node::Scalar(Scalar::Str(s)) => write!(f, "{}", s),
            other => write!(f, "{}", Value::from(other.clone())),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::str(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::str(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for Node {
    fn from(f: f64) -> Self {
        Node::Scalar(Scalar::Float(f))
    }
}

impl From<Vec<Node>> for Node {
    fn from(l: Vec<Node>) -> Self {
        Node::List(l)
    }
}

impl From<NodeMap> for Node {
    fn from(m: NodeMap) -> Self {
        Node::Map(m)
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Node::null(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => match n.as_i64() {
                Some(i) => i.into(),
                None => n.as_f64().map(Node::from).unwrap_or_default(),
            },
            Value::String(s) => s.into(),
            Value::Array(a) => Node::List(a.into_iter().map(Node::from).collect()),
            Value::Object(o) => Node::Map(o.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<Node> for Value {
    fn from(n: Node) -> Self {
        match n {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Node::Scalar(Scalar::Int(i)) => Value::Number(i.into()),
            Node::Scalar(Scalar::Float(f)) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            Node::Scalar(Scalar::Str(s)) => Value::String(s),
            Node::List(l) => Value::Array(l.into_iter().map(Value::from).collect()),
            Node::Map(m) => Value::Object(
                m.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<JsonMap<_, _>>(),
            ),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(Scalar::Null) => serializer.serialize_none(),
            Node::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Node::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
            Node::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
            Node::Scalar(Scalar::Str(s)) => serializer.serialize_str(s),
            Node::List(l) => l.serialize(serializer),
            Node::Map(m) => m.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

/// Builds a map node from `(key, value)` pairs.
///
/// ```
/// use fcdb_core::{node_map, Node};
///
/// let n = node_map([("speed", Node::from(16_000_000_000_i64)), ("name", "0/1".into())]);
/// assert_eq!(n.lookup("name").and_then(Node::as_str), Some("0/1"));
/// ```
pub fn node_map<K, I>(pairs: I) -> Node
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Node)>,
{
    Node::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
}
