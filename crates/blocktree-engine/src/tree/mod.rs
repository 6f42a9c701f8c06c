//! # Document Tree
//!
//! The live document is a plain tree of [`Node`]s addressed by [`Path`]s.
//! The same tree is the data model, the render source and the anchor for
//! selections, so every mutation here either keeps it structurally valid
//! or fails without touching it.
//!
//! Invariant: every [`Element`] has at least one child. An element with no
//! content holds exactly one empty [`Text`] child.

pub mod path;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
pub use path::Path;

/// Scalar attribute value carried by elements and text marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Attributes of an element, or marks of a text leaf.
pub type Attrs = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: String,
    #[serde(default)]
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub marks: Attrs,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn element(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(Element {
            kind: kind.into(),
            attrs: Attrs::new(),
            children,
        })
    }

    /// An element holding a single empty text leaf.
    pub fn empty(kind: impl Into<String>) -> Self {
        Node::element(kind, vec![Node::text("")])
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text {
            marks: Attrs::new(),
            text: text.into(),
        })
    }

    /// Builder-style attribute (elements) or mark (text) setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props_mut().insert(key.into(), value.into());
        self
    }

    /// Element kind; `None` for text leaves.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Node::Element(e) => Some(&e.kind),
            Node::Text(_) => None,
        }
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Two nodes are the same kind when both are text or both are elements of one kind.
    pub fn same_kind(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(_), Node::Text(_)) => true,
            (Node::Element(a), Node::Element(b)) => a.kind == b.kind,
            _ => false,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(e) => &e.children,
            Node::Text(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(e) => Some(&mut e.children),
            Node::Text(_) => None,
        }
    }

    /// Element attributes or text marks.
    pub fn props(&self) -> &Attrs {
        match self {
            Node::Element(e) => &e.attrs,
            Node::Text(t) => &t.marks,
        }
    }

    pub fn props_mut(&mut self) -> &mut Attrs {
        match self {
            Node::Element(e) => &mut e.attrs,
            Node::Text(t) => &mut t.marks,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.props().get(key)
    }

    /// Concatenated text of every leaf below this node.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text(t) => t.text.clone(),
            Node::Element(e) => e.children.iter().map(Node::plain_text).collect(),
        }
    }

    fn check(&self, path: &Path) -> Result<(), EditError> {
        if let Node::Element(e) = self {
            if e.children.is_empty() {
                return Err(EditError::invalid(
                    path,
                    format!("{} element has no children", e.kind),
                ));
            }
            for (i, child) in e.children.iter().enumerate() {
                child.check(&path.child(i))?;
            }
        }
        Ok(())
    }
}

/// The document root. Not an element itself, so it may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub children: Vec<Node>,
}

impl Tree {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn resolve(&self, path: &Path) -> Result<&Node, EditError> {
        self.get(path).ok_or_else(|| EditError::StalePath(path.clone()))
    }

    pub fn resolve_mut(&mut self, path: &Path) -> Result<&mut Node, EditError> {
        let (first, rest) = path
            .as_slice()
            .split_first()
            .ok_or_else(|| EditError::StalePath(path.clone()))?;
        let mut node = self
            .children
            .get_mut(*first)
            .ok_or_else(|| EditError::StalePath(path.clone()))?;
        for index in rest {
            node = node
                .children_mut()
                .and_then(|children| children.get_mut(*index))
                .ok_or_else(|| EditError::StalePath(path.clone()))?;
        }
        Ok(node)
    }

    pub fn get(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    /// Identity-based reverse lookup: finds the path of this exact node instance.
    pub fn path_of(&self, node: &Node) -> Option<Path> {
        fn search(children: &[Node], target: &Node, path: &mut Vec<usize>) -> bool {
            for (i, child) in children.iter().enumerate() {
                path.push(i);
                if std::ptr::eq(child, target) || search(child.children(), target, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.children, node, &mut path).then(|| Path::new(path))
    }

    /// Child list at `parent`; the root path yields the document's top-level nodes.
    pub fn children_at(&self, parent: &Path) -> Result<&[Node], EditError> {
        if parent.is_empty() {
            return Ok(&self.children);
        }
        match self.resolve(parent)? {
            Node::Element(e) => Ok(&e.children),
            Node::Text(_) => Err(EditError::invalid(parent, "text nodes have no children")),
        }
    }

    fn children_at_mut(&mut self, parent: &Path) -> Result<&mut Vec<Node>, EditError> {
        if parent.is_empty() {
            return Ok(&mut self.children);
        }
        self.resolve_mut(parent)?
            .children_mut()
            .ok_or_else(|| EditError::invalid(parent, "text nodes have no children"))
    }

    /// Insert `node` so that it ends up at `path`, shifting later siblings.
    pub fn insert(&mut self, path: &Path, node: Node) -> Result<(), EditError> {
        node.check(path)?;
        let parent = path
            .parent()
            .ok_or_else(|| EditError::invalid(path, "cannot insert at the root path"))?;
        let index = path.last().unwrap_or_default();
        let children = self.children_at_mut(&parent)?;
        if index > children.len() {
            return Err(EditError::StalePath(path.clone()));
        }
        children.insert(index, node);
        Ok(())
    }

    /// Remove and return the node at `path`. Refuses to leave an element childless.
    pub fn remove(&mut self, path: &Path) -> Result<Node, EditError> {
        let parent = path
            .parent()
            .ok_or_else(|| EditError::invalid(path, "cannot remove the root"))?;
        if !parent.is_empty() && self.children_at(&parent)?.len() == 1 {
            self.resolve(path)?;
            return Err(EditError::invalid(
                &parent,
                "removing the only child would leave an empty element",
            ));
        }
        self.detach(path)
    }

    /// Remove without the non-empty check; callers restore the invariant themselves.
    pub(crate) fn detach(&mut self, path: &Path) -> Result<Node, EditError> {
        let parent = path
            .parent()
            .ok_or_else(|| EditError::invalid(path, "cannot remove the root"))?;
        let index = path.last().unwrap_or_default();
        let children = self.children_at_mut(&parent)?;
        if index >= children.len() {
            return Err(EditError::StalePath(path.clone()));
        }
        Ok(children.remove(index))
    }

    /// Swap the subtree at `path` for `node`, returning the old subtree.
    pub fn replace(&mut self, path: &Path, node: Node) -> Result<Node, EditError> {
        node.check(path)?;
        let slot = self.resolve_mut(path)?;
        Ok(std::mem::replace(slot, node))
    }

    /// Overwrite the attributes (or marks) of the node at `path`.
    pub fn set_props(&mut self, path: &Path, props: Attrs) -> Result<(), EditError> {
        *self.resolve_mut(path)?.props_mut() = props;
        Ok(())
    }

    pub fn replace_text(&mut self, path: &Path, text: &str) -> Result<(), EditError> {
        match self.resolve_mut(path)? {
            Node::Text(t) => {
                t.text = text.to_string();
                Ok(())
            }
            Node::Element(_) => Err(EditError::invalid(path, "replace-text targets an element")),
        }
    }

    /// Check the non-empty-element invariant across the whole tree.
    pub fn validate(&self) -> Result<(), EditError> {
        for (i, child) in self.children.iter().enumerate() {
            child.check(&Path::from([i]))?;
        }
        Ok(())
    }

    /// Visit every node in document order together with its path.
    pub fn walk<F: FnMut(&Path, &Node)>(&self, mut visit: F) {
        fn go<F: FnMut(&Path, &Node)>(children: &[Node], path: &Path, visit: &mut F) {
            for (i, child) in children.iter().enumerate() {
                let child_path = path.child(i);
                visit(&child_path, child);
                go(child.children(), &child_path, visit);
            }
        }
        go(&self.children, &Path::root(), &mut visit);
    }

    /// Indented, human-readable dump of the tree.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            format_node(&mut out, node, 0);
        }
        out
    }
}

fn format_node(out: &mut String, node: &Node, indent: usize) {
    let prefix = "  ".repeat(indent);
    match node {
        Node::Element(e) => {
            out.push_str(&format!("{prefix}{}", e.kind));
            format_props(out, &e.attrs);
            out.push('\n');
            for child in &e.children {
                format_node(out, child, indent + 1);
            }
        }
        Node::Text(t) => {
            out.push_str(&format!("{prefix}{:?}", t.text));
            format_props(out, &t.marks);
            out.push('\n');
        }
    }
}

fn format_props(out: &mut String, props: &Attrs) {
    for (key, value) in props {
        out.push_str(&format!(" {key}={value}"));
    }
}

/// Prepare an incoming tree for diffing.
///
/// Childless elements whose kind is collapsible are dropped; any other
/// childless element gets one empty text child. Applied bottom-up, so a
/// list whose items all collapse collapses too.
pub fn normalize_nodes<F>(nodes: Vec<Node>, is_collapsible: &F) -> Vec<Node>
where
    F: Fn(&str) -> bool,
{
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Text(t) => Some(Node::Text(t)),
            Node::Element(mut e) => {
                e.children = normalize_nodes(e.children, is_collapsible);
                if e.children.is_empty() {
                    if is_collapsible(&e.kind) {
                        return None;
                    }
                    e.children.push(Node::text(""));
                }
                Some(Node::Element(e))
            }
        })
        .collect()
}
