//! Path addressed attribute store with merge and conflict policy.
//!
//! Repeated telemetry fetches overlap: the same switch is polled through
//! several URIs, and the name server is read from every switch in a fabric.
//! [`AttributeStore::set`] therefore merges into whatever is already bound
//! instead of overwriting it, and reports values that cannot be reconciled
//! as [`Conflict`]s. A conflicting leaf keeps its existing value.

use crate::node::{split_path, Node, NodeMap, Scalar};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Special handling for keys whose values legitimately differ between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergePolicy {
    /// May be filled once; an empty existing value is not a write.
    SingleWriter,
    /// Numeric; keep the lower value.
    PreferLower,
    /// Numeric; keep the higher value.
    PreferHigher,
    /// Volatile or firmware dependent; the new value replaces the old.
    Ignore,
}

static POLICY_TABLE: Lazy<HashMap<&'static str, MergePolicy>> = Lazy::new(|| {
    HashMap::from([
        // RSCN registration is only reported by the chassis where the login occurred
        ("state-change-registration", MergePolicy::SingleWriter),
        ("firmware-version", MergePolicy::Ignore),
        ("dns-servers", MergePolicy::Ignore),
        ("ip-static-gateway-list", MergePolicy::Ignore),
        ("ip-address", MergePolicy::Ignore),
        ("db-avail", MergePolicy::PreferLower),
        ("db-max", MergePolicy::PreferLower),
        ("db-chassis-wide-committed", MergePolicy::PreferHigher),
    ])
});

/// Returns the merge policy declared for a leaf key.
pub fn policy_for(key: &str) -> Option<MergePolicy> {
    POLICY_TABLE.get(key).copied()
}

/// Why a merge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    TypeMismatch,
    ValueChanged,
    SingleWriter,
    InvalidPath,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConflictReason::TypeMismatch => "type mismatch",
            ConflictReason::ValueChanged => "value changed",
            ConflictReason::SingleWriter => "single writer value already set",
            ConflictReason::InvalidPath => "invalid path",
        };
        f.write_str(s)
    }
}

/// A value that could not be merged. The store keeps `existing`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub path: String,
    pub existing: Node,
    pub incoming: Node,
    pub reason: ConflictReason,
}

impl Conflict {
    fn new(path: &str, existing: &Node, incoming: Node, reason: ConflictReason) -> Self {
        Self {
            path: path.to_string(),
            existing: existing.clone(),
            incoming,
            reason,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ConflictReason::TypeMismatch => write!(
                f,
                "{}: {} is bound, refused {}",
                self.reason,
                self.existing.type_name(),
                self.incoming.type_name()
            ),
            _ => write!(
                f,
                "{}: kept '{}', refused '{}'",
                self.reason, self.existing, self.incoming
            ),
        }
    }
}

/// Dynamic attribute tree of one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    root: NodeMap,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing map.
    pub fn from_map(root: NodeMap) -> Self {
        Self { root }
    }

    /// Returns the value at `path`, or `None` when nothing is bound there.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut segments = split_path(path);
        let first = self.root.get(segments.next()?)?;
        segments.try_fold(first, |node, seg| node.child(seg))
    }

    /// Returns the value at `path` or `default`.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Node) -> &'a Node {
        self.get(path).unwrap_or(default)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Binds `value` at `path`, merging with any existing value.
    ///
    /// Intermediate maps are created as needed. With `force` the value
    /// replaces whatever is bound. Conflicts are returned; every conflicting
    /// leaf keeps its existing value while the rest of `value` is merged.
    pub fn set(&mut self, path: &str, value: Node, force: bool) -> Result<(), Vec<Conflict>> {
        let segments: Vec<&str> = split_path(path).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(vec![Conflict::new(
                path,
                &Node::null(),
                value,
                ConflictReason::InvalidPath,
            )]);
        };

        let mut map = &mut self.root;
        for (depth, seg) in parents.iter().enumerate() {
            map = match map.entry((*seg).to_string()).or_insert_with(Node::map) {
                Node::Map(m) => m,
                other => {
                    let prefix = parents[..=depth].join("/");
                    return Err(vec![Conflict::new(
                        &prefix,
                        other,
                        value,
                        ConflictReason::TypeMismatch,
                    )]);
                }
            };
        }

        if !force {
            if let Some(existing) = map.get_mut(*leaf) {
                let mut conflicts = Vec::new();
                merge(existing, value, &segments.join("/"), leaf, &mut conflicts);
                return if conflicts.is_empty() {
                    Ok(())
                } else {
                    Err(conflicts)
                };
            }
        }
        map.insert((*leaf).to_string(), value);
        Ok(())
    }

    /// Returns the value at `path`, binding `default` first if it is absent.
    ///
    /// Returns `None` only when an intermediate segment is bound to a
    /// non-map value.
    pub fn get_or_add(&mut self, path: &str, default: Node) -> Option<&mut Node> {
        let segments: Vec<&str> = split_path(path).collect();
        let (leaf, parents) = segments.split_last()?;
        let mut map = &mut self.root;
        for seg in parents {
            map = map
                .entry((*seg).to_string())
                .or_insert_with(Node::map)
                .as_map_mut()?;
        }
        Some(map.entry((*leaf).to_string()).or_insert(default))
    }

    /// Top level dynamic keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.root.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn as_map(&self) -> &NodeMap {
        &self.root
    }
}

fn join(path: &str, key: &str) -> String {
    format!("{}/{}", path, key)
}

fn is_empty_value(node: &Node) -> bool {
    match node {
        Node::Scalar(Scalar::Null) => true,
        Node::Scalar(Scalar::Str(s)) => s.is_empty(),
        _ => false,
    }
}

fn merge(existing: &mut Node, incoming: Node, path: &str, key: &str, out: &mut Vec<Conflict>) {
    match policy_for(key) {
        Some(policy) => merge_with_policy(policy, existing, incoming, path, out),
        None => merge_generic(existing, incoming, path, out),
    }
}

fn merge_with_policy(
    policy: MergePolicy,
    existing: &mut Node,
    incoming: Node,
    path: &str,
    out: &mut Vec<Conflict>,
) {
    match policy {
        MergePolicy::Ignore => *existing = incoming,
        MergePolicy::SingleWriter => {
            if is_empty_value(&incoming) || *existing == incoming {
                // nothing to write
            } else if is_empty_value(existing) {
                *existing = incoming;
            } else {
                out.push(Conflict::new(
                    path,
                    existing,
                    incoming,
                    ConflictReason::SingleWriter,
                ));
            }
        }
        MergePolicy::PreferLower | MergePolicy::PreferHigher => {
            match (existing.as_f64(), incoming.as_f64()) {
                (Some(old), Some(new)) => {
                    let replace = if policy == MergePolicy::PreferLower {
                        new < old
                    } else {
                        new > old
                    };
                    if replace {
                        *existing = incoming;
                    }
                }
                _ => merge_generic(existing, incoming, path, out),
            }
        }
    }
}

fn merge_generic(existing: &mut Node, incoming: Node, path: &str, out: &mut Vec<Conflict>) {
    match (existing, incoming) {
        (Node::Scalar(old), Node::Scalar(new)) => {
            if std::mem::discriminant(&*old) != std::mem::discriminant(&new) {
                out.push(Conflict::new(
                    path,
                    &Node::Scalar(old.clone()),
                    Node::Scalar(new),
                    ConflictReason::TypeMismatch,
                ));
            } else if *old != new {
                out.push(Conflict::new(
                    path,
                    &Node::Scalar(old.clone()),
                    Node::Scalar(new),
                    ConflictReason::ValueChanged,
                ));
            }
        }
        (Node::List(old), Node::List(new)) => {
            // Equal elements are already merged; anything else is appended.
            for item in new {
                if !old.contains(&item) {
                    old.push(item);
                }
            }
        }
        (Node::Map(old), Node::Map(new)) => {
            for (k, v) in new {
                let child_path = join(path, &k);
                match old.get_mut(&k) {
                    Some(child) => merge(child, v, &child_path, &k, out),
                    None => {
                        old.insert(k, v);
                    }
                }
            }
        }
        (old, new) => {
            out.push(Conflict::new(path, old, new, ConflictReason::TypeMismatch));
        }
    }
}
