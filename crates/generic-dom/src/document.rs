//! Element tree
//!
//! Nodes live in an arena and are addressed by [`ElementId`]. Removed nodes
//! are detached, never freed, so an id handed out once stays valid for the
//! lifetime of the document.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::DomError;
use crate::Result;

const TEXT_NODE_NAME: &str = "#text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A change recorded by the document, drained by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Children were inserted into or removed from `parent`
    ChildList { parent: ElementId },
    /// An attribute was written or removed. Recorded even when the value is
    /// unchanged; consumers compare `old_value` and `new_value` themselves.
    Attribute {
        target: ElementId,
        name: String,
        old_value: Option<String>,
        new_value: Option<String>,
    },
}

/// Serializable view of a subtree, for assertions and debug output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<ElementSnapshot>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Node {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

struct Tree {
    nodes: Vec<Node>,
    body: ElementId,
    focused: Option<ElementId>,
    mutations: Vec<Mutation>,
}

impl Tree {
    fn new() -> Self {
        Self {
            nodes: vec![Node::element("body")],
            body: ElementId(0),
            focused: None,
            mutations: Vec::new(),
        }
    }

    fn node(&self, id: ElementId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::NotFound(id))
    }

    fn attributes(&self, id: ElementId) -> Result<&BTreeMap<String, String>> {
        match &self.node(id)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn attributes_mut(&mut self, id: ElementId) -> Result<&mut BTreeMap<String, String>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn push(&mut self, node: Node) -> ElementId {
        self.nodes.push(node);
        ElementId(self.nodes.len() - 1)
    }

    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> Result<bool> {
        self.node(ancestor)?;
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.node(id)?.parent;
        }
        Ok(false)
    }

    fn detach(&mut self, child: ElementId) -> Result<()> {
        if let Some(parent) = self.node(child)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != child);
            self.node_mut(child)?.parent = None;
            self.mutations.push(Mutation::ChildList { parent });
        }
        Ok(())
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if !self.node(parent)?.is_element() {
            return Err(DomError::NotAnElement(parent));
        }
        if self.contains(child, parent)? {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.mutations.push(Mutation::ChildList { parent });
        self.fix_focus()
    }

    fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }

        self.detach(child)?;
        self.fix_focus()
    }

    /// Focus does not survive its element leaving the connected tree
    fn fix_focus(&mut self) -> Result<()> {
        if let Some(focused) = self.focused {
            if !self.contains(self.body, focused)? {
                self.focused = None;
            }
        }
        Ok(())
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old_value = self
            .attributes_mut(id)?
            .insert(name.clone(), value.to_string());

        self.mutations.push(Mutation::Attribute {
            target: id,
            name,
            old_value,
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, id: ElementId, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        if let Some(old_value) = self.attributes_mut(id)?.remove(&name) {
            self.mutations.push(Mutation::Attribute {
                target: id,
                name,
                old_value: Some(old_value),
                new_value: None,
            });
        }
        Ok(())
    }

    fn collect_text(&self, id: ElementId, out: &mut String) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &node.children {
                    self.collect_text(child, out)?;
                }
            }
        }
        Ok(())
    }

    fn collect_descendants(&self, id: ElementId, out: &mut Vec<ElementId>) -> Result<()> {
        for &child in &self.node(id)?.children {
            if self.node(child)?.is_element() {
                out.push(child);
                self.collect_descendants(child, out)?;
            }
        }
        Ok(())
    }

    fn descendants(&self, id: ElementId) -> Result<Vec<ElementId>> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out)?;
        Ok(out)
    }

    fn snapshot(&self, id: ElementId) -> Result<ElementSnapshot> {
        let node = self.node(id)?;
        let (tag, attributes) = match &node.kind {
            NodeKind::Element { tag, attributes } => (tag.clone(), attributes.clone()),
            NodeKind::Text(_) => return Err(DomError::NotAnElement(id)),
        };

        let mut text = String::new();
        self.collect_text(id, &mut text)?;

        let children = node
            .children
            .iter()
            .filter(|&&child| self.nodes[child.0].is_element())
            .map(|&child| self.snapshot(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(ElementSnapshot {
            id,
            tag,
            attributes,
            text,
            children,
        })
    }
}

/// Shared handle to an element tree.
///
/// Clones share the same tree. The lock is only held for the duration of a
/// single call, never across component callbacks.
pub struct Document {
    tree: Arc<RwLock<Tree>>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Tree::new())),
        }
    }

    /// The connected root every live element hangs off
    pub fn body(&self) -> ElementId {
        self.tree.read().body
    }

    pub fn create_element(&self, tag: &str) -> ElementId {
        self.tree.write().push(Node::element(tag))
    }

    pub fn create_text(&self, text: &str) -> ElementId {
        self.tree.write().push(Node::text(text))
    }

    /// Append `child` to `parent`, moving it out of its current parent first
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        self.tree.write().append_child(parent, child)
    }

    pub fn remove_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        self.tree.write().remove_child(parent, child)
    }

    pub fn set_attribute(&self, id: ElementId, name: &str, value: &str) -> Result<()> {
        self.tree.write().set_attribute(id, name, value)
    }

    pub fn remove_attribute(&self, id: ElementId, name: &str) -> Result<()> {
        self.tree.write().remove_attribute(id, name)
    }

    pub fn get_attribute(&self, id: ElementId, name: &str) -> Result<Option<String>> {
        let tree = self.tree.read();
        Ok(tree
            .attributes(id)?
            .get(&name.to_ascii_lowercase())
            .cloned())
    }

    pub fn has_attribute(&self, id: ElementId, name: &str) -> Result<bool> {
        let tree = self.tree.read();
        Ok(tree.attributes(id)?.contains_key(&name.to_ascii_lowercase()))
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text(&self, id: ElementId, text: &str) -> Result<()> {
        let mut tree = self.tree.write();
        if !tree.node(id)?.is_element() {
            return Err(DomError::NotAnElement(id));
        }

        let old_children = std::mem::take(&mut tree.node_mut(id)?.children);
        for child in old_children {
            tree.node_mut(child)?.parent = None;
        }

        let text_node = tree.push(Node::text(text));
        tree.node_mut(text_node)?.parent = Some(id);
        tree.node_mut(id)?.children.push(text_node);
        tree.mutations.push(Mutation::ChildList { parent: id });
        tree.fix_focus()
    }

    /// Concatenated text of every descendant text node, in document order
    pub fn text_content(&self, id: ElementId) -> Result<String> {
        let mut out = String::new();
        self.tree.read().collect_text(id, &mut out)?;
        Ok(out)
    }

    pub fn tag_name(&self, id: ElementId) -> Result<String> {
        let tree = self.tree.read();
        Ok(match &tree.node(id)?.kind {
            NodeKind::Element { tag, .. } => tag.clone(),
            NodeKind::Text(_) => TEXT_NODE_NAME.to_string(),
        })
    }

    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>> {
        Ok(self.tree.read().node(id)?.parent)
    }

    /// Element children of `id`, text nodes excluded
    pub fn children(&self, id: ElementId) -> Result<Vec<ElementId>> {
        let tree = self.tree.read();
        Ok(tree
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|&child| tree.nodes[child.0].is_element())
            .collect())
    }

    /// Element descendants of `id` in document order, `id` excluded
    pub fn descendants(&self, id: ElementId) -> Result<Vec<ElementId>> {
        self.tree.read().descendants(id)
    }

    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> Result<bool> {
        self.tree.read().contains(ancestor, node)
    }

    pub fn is_connected(&self, id: ElementId) -> Result<bool> {
        let tree = self.tree.read();
        tree.contains(tree.body, id)
    }

    /// Descendants of `root` carrying the given tag, in document order
    pub fn find_by_tag(&self, root: ElementId, tag: &str) -> Result<Vec<ElementId>> {
        let tree = self.tree.read();
        let tag = tag.to_ascii_lowercase();
        Ok(tree
            .descendants(root)?
            .into_iter()
            .filter(|&id| {
                matches!(&tree.nodes[id.0].kind, NodeKind::Element { tag: t, .. } if *t == tag)
            })
            .collect())
    }

    /// Descendants of `host` assigned to the named slot, in document order
    pub fn query_slot(&self, host: ElementId, slot: &str) -> Result<Vec<ElementId>> {
        let tree = self.tree.read();
        let mut assigned = Vec::new();
        for id in tree.descendants(host)? {
            if tree.attributes(id)?.get("slot").map(String::as_str) == Some(slot) {
                assigned.push(id);
            }
        }
        Ok(assigned)
    }

    /// Move input focus. Focusing a detached element has no effect.
    pub fn focus(&self, id: ElementId) -> Result<()> {
        let mut tree = self.tree.write();
        if !tree.node(id)?.is_element() {
            return Err(DomError::NotAnElement(id));
        }
        let body = tree.body;
        if tree.contains(body, id)? {
            tree.focused = Some(id);
        }
        Ok(())
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.tree.read().focused
    }

    /// Drain every mutation recorded since the last call
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.tree.write().mutations)
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.tree.read().mutations.is_empty()
    }

    pub fn snapshot(&self, id: ElementId) -> Result<ElementSnapshot> {
        self.tree.read().snapshot(id)
    }

    pub(crate) fn with_tree_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TreeWriter<'_>) -> Result<T>,
    {
        let mut tree = self.tree.write();
        let mut writer = TreeWriter { tree: &mut *tree };
        f(&mut writer)
    }
}

/// Batched write access used by the markup parser, so a whole fragment is
/// inserted under one lock.
pub(crate) struct TreeWriter<'a> {
    tree: &'a mut Tree,
}

impl TreeWriter<'_> {
    pub(crate) fn create_element(&mut self, tag: &str) -> ElementId {
        self.tree.push(Node::element(tag))
    }

    pub(crate) fn create_text(&mut self, text: &str) -> ElementId {
        self.tree.push(Node::text(text))
    }

    pub(crate) fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        self.tree.set_attribute(id, name, value)
    }

    pub(crate) fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.tree.append_child(parent, child)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_connect() {
        let doc = Document::new();
        let list = doc.create_element("ul");
        let item = doc.create_element("li");

        doc.append_child(list, item).unwrap();
        assert!(!doc.is_connected(item).unwrap());

        doc.append_child(doc.body(), list).unwrap();
        assert!(doc.is_connected(item).unwrap());
        assert_eq!(doc.parent(item).unwrap(), Some(list));
        assert_eq!(doc.children(list).unwrap(), vec![item]);
    }

    #[test]
    fn test_cycle_rejected() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        let result = doc.append_child(inner, outer);
        assert_eq!(
            result,
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn test_reparent_records_both_parents() {
        let doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(a, child).unwrap();
        doc.take_mutations();

        doc.append_child(b, child).unwrap();
        let mutations = doc.take_mutations();
        assert_eq!(
            mutations,
            vec![
                Mutation::ChildList { parent: a },
                Mutation::ChildList { parent: b },
            ]
        );
        assert!(doc.children(a).unwrap().is_empty());
    }

    #[test]
    fn test_remove_child_requires_parent() {
        let doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");

        assert_eq!(
            doc.remove_child(a, b),
            Err(DomError::NotAChild {
                parent: a,
                child: b
            })
        );
    }

    #[test]
    fn test_attribute_records() {
        let doc = Document::new();
        let el = doc.create_element("div");

        doc.set_attribute(el, "Selected", "1").unwrap();
        doc.set_attribute(el, "selected", "1").unwrap();
        doc.remove_attribute(el, "selected").unwrap();
        // Removing an absent attribute records nothing
        doc.remove_attribute(el, "selected").unwrap();

        let mutations = doc.take_mutations();
        assert_eq!(mutations.len(), 3);
        assert_eq!(
            mutations[1],
            Mutation::Attribute {
                target: el,
                name: "selected".to_string(),
                old_value: Some("1".to_string()),
                new_value: Some("1".to_string()),
            }
        );
        assert!(!doc.has_attribute(el, "selected").unwrap());
        assert!(!doc.has_pending_mutations());
    }

    #[test]
    fn test_text_content() {
        let doc = Document::new();
        let button = doc.create_element("button");
        let icon = doc.create_element("span");
        doc.set_text(icon, "*").unwrap();

        let before = doc.create_text("  Tab ");
        doc.append_child(button, before).unwrap();
        doc.append_child(button, icon).unwrap();

        assert_eq!(doc.text_content(button).unwrap(), "  Tab *");

        doc.set_text(button, "Replaced").unwrap();
        assert_eq!(doc.text_content(button).unwrap(), "Replaced");
        assert!(doc.children(button).unwrap().is_empty());
    }

    #[test]
    fn test_text_node_has_no_attributes() {
        let doc = Document::new();
        let text = doc.create_text("hello");
        assert_eq!(
            doc.set_attribute(text, "role", "tab"),
            Err(DomError::NotAnElement(text))
        );
        assert_eq!(doc.tag_name(text).unwrap(), "#text");
    }

    #[test]
    fn test_query_slot_document_order() {
        let doc = Document::new();
        let host = doc.create_element("generic-tabs");
        let wrapper = doc.create_element("div");
        let first = doc.create_element("button");
        let nested = doc.create_element("button");
        let panel = doc.create_element("div");

        doc.set_attribute(first, "slot", "tab").unwrap();
        doc.set_attribute(nested, "slot", "tab").unwrap();
        doc.set_attribute(panel, "slot", "panel").unwrap();

        doc.append_child(host, first).unwrap();
        doc.append_child(host, wrapper).unwrap();
        doc.append_child(wrapper, nested).unwrap();
        doc.append_child(host, panel).unwrap();

        assert_eq!(doc.query_slot(host, "tab").unwrap(), vec![first, nested]);
        assert_eq!(doc.query_slot(host, "panel").unwrap(), vec![panel]);
        assert!(doc.query_slot(host, "missing").unwrap().is_empty());
    }

    #[test]
    fn test_focus_follows_removal() {
        let doc = Document::new();
        let container = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(container, button).unwrap();

        // Detached elements cannot take focus
        doc.focus(button).unwrap();
        assert_eq!(doc.focused(), None);

        doc.append_child(doc.body(), container).unwrap();
        doc.focus(button).unwrap();
        assert_eq!(doc.focused(), Some(button));

        doc.remove_child(doc.body(), container).unwrap();
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn test_focus_survives_connected_move() {
        let doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(doc.body(), a).unwrap();
        doc.append_child(doc.body(), b).unwrap();
        doc.append_child(a, button).unwrap();
        doc.focus(button).unwrap();

        doc.append_child(b, button).unwrap();
        assert_eq!(doc.focused(), Some(button));
    }

    #[test]
    fn test_focus_lost_when_moved_into_detached_tree() {
        let doc = Document::new();
        let container = doc.create_element("div");
        let button = doc.create_element("button");
        let detached = doc.create_element("div");
        doc.append_child(container, button).unwrap();
        doc.append_child(doc.body(), container).unwrap();
        doc.focus(button).unwrap();

        doc.append_child(detached, container).unwrap();
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn test_focus_lost_when_replaced_by_text() {
        let doc = Document::new();
        let container = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(doc.body(), container).unwrap();
        doc.append_child(container, button).unwrap();
        doc.focus(button).unwrap();

        doc.set_text(container, "gone").unwrap();
        assert_eq!(doc.focused(), None);
        assert!(!doc.is_connected(button).unwrap());
    }

    #[test]
    fn test_unknown_id() {
        let doc = Document::new();
        let other = Document::new();
        other.create_element("div");
        let foreign = other.create_element("div");

        assert_eq!(
            doc.get_attribute(foreign, "role"),
            Err(DomError::NotFound(foreign))
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let doc = Document::new();
        let host = doc.create_element("div");
        let child = doc.create_element("span");
        doc.set_attribute(child, "role", "tab").unwrap();
        doc.set_text(child, "A").unwrap();
        doc.append_child(host, child).unwrap();

        let snapshot = doc.snapshot(host).unwrap();
        assert_eq!(snapshot.children.len(), 1);
        assert_eq!(snapshot.text, "A");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["children"][0]["attributes"]["role"], "tab");
        assert_eq!(json["children"][0]["tag"], "span");
    }
}
