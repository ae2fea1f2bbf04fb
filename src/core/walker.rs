//! core::walker
//!
//! Schema-free reference traversal over property trees.
//!
//! # Architecture
//!
//! The walker knows nothing about resource schemas. It visits every mapping
//! in an arbitrary nested tree exactly once, using an explicit worklist
//! rather than recursion, so deeply nested property trees cannot overflow
//! the call stack. Each visited node carries its resolved [`NodePath`], which
//! makes in-place replacement O(1) once a reference is located.
//!
//! # Contract
//!
//! A reference is one of the two literal forms (`{Ref: name}`,
//! `{Fn::GetAtt: [name, attr]}`). The reported path addresses the *enclosing*
//! mapping - the object that directly holds the reference key - so a caller
//! can replace the whole reference node. Sibling order is unspecified;
//! callers must treat results as a set.

use std::collections::VecDeque;
use std::fmt;

use serde_json::Value;

use super::template::{GET_ATT_KEY, REF_KEY};

/// One step of a [`NodePath`]: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// The address of a node within a tree.
///
/// Renders as the dotted/bracketed form (`a.b[3].c`); the root path renders
/// as the empty string.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stackalias::core::walker::NodePath;
///
/// let tree = json!({ "a": [{ "b": 1 }] });
/// let path = NodePath::root().child_key("a").child_index(0);
/// assert_eq!(path.to_string(), "a[0]");
/// assert_eq!(path.resolve(&tree), Some(&json!({ "b": 1 })));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    /// The empty path addressing the root node.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Whether this path addresses the root node.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path segments, in order from the root.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Extend the path with a mapping key.
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.into()));
        Self(segments)
    }

    /// Extend the path with a sequence index.
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// Resolve the path against a root node.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut node = root;
        for segment in &self.0 {
            node = match segment {
                Segment::Key(key) => node.get(key.as_str())?,
                Segment::Index(index) => node.get(*index)?,
            };
        }
        Some(node)
    }

    /// Resolve the path against a root node, mutably.
    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut node = root;
        for segment in &self.0 {
            node = match segment {
                Segment::Key(key) => node.get_mut(key.as_str())?,
                Segment::Index(index) => node.get_mut(*index)?,
            };
        }
        Some(node)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ix, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if ix > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A located reference: the target it names and the path of its enclosing
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub target: String,
    pub path: NodePath,
}

/// Find every reference in the tree, independent of target.
///
/// Returns one [`ReferenceSite`] per reference key; a mapping carrying both
/// forms yields two sites at the same path.
pub fn find_all_references(root: &Value) -> Vec<ReferenceSite> {
    let mut sites = Vec::new();
    let mut work: VecDeque<(NodePath, &Value)> = VecDeque::new();
    work.push_back((NodePath::root(), root));

    while let Some((path, node)) = work.pop_front() {
        match node {
            Value::Object(map) => {
                if let Some(target) = ref_target(node) {
                    sites.push(ReferenceSite {
                        target: target.to_string(),
                        path: path.clone(),
                    });
                }
                if let Some(target) = get_att_target(node) {
                    sites.push(ReferenceSite {
                        target: target.to_string(),
                        path: path.clone(),
                    });
                }
                for (key, child) in map {
                    if child.is_object() || child.is_array() {
                        work.push_back((path.child_key(key.as_str()), child));
                    }
                }
            }
            Value::Array(items) => {
                for (ix, child) in items.iter().enumerate() {
                    if child.is_object() || child.is_array() {
                        work.push_back((path.child_index(ix), child));
                    }
                }
            }
            _ => {}
        }
    }

    sites
}

/// Find every reference whose target is one of `names`, returning the path
/// of each enclosing mapping.
///
/// Used to locate every place a soon-to-be-renamed resource is referenced.
pub fn find_references(root: &Value, names: &[&str]) -> Vec<NodePath> {
    find_all_references(root)
        .into_iter()
        .filter(|site| names.contains(&site.target.as_str()))
        .map(|site| site.path)
        .collect()
}

/// The target of a `{Ref: name}` node, if this mapping is one.
fn ref_target(node: &Value) -> Option<&str> {
    node.get(REF_KEY).and_then(Value::as_str)
}

/// The target of a `{Fn::GetAtt: [name, ..]}` node, if this mapping is one.
fn get_att_target(node: &Value) -> Option<&str> {
    node.get(GET_ATT_KEY)
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(Value::as_str)
}

/// Deep-merge `overlay` onto `dest`.
///
/// Mappings merge per key, sequences merge index-wise (extending the
/// destination when the overlay is longer), everything else replaces.
pub fn deep_merge(dest: &mut Value, overlay: &Value) {
    match (dest, overlay) {
        (Value::Object(dest), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match dest.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        dest.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(dest), Value::Array(overlay)) => {
            for (ix, value) in overlay.iter().enumerate() {
                match dest.get_mut(ix) {
                    Some(existing) => deep_merge(existing, value),
                    None => dest.push(value.clone()),
                }
            }
        }
        (dest, overlay) => *dest = overlay.clone(),
    }
}
