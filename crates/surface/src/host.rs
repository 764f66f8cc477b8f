//! Minimal model of the host page a surface is attached to.
//!
//! A [`Page`] owns a viewport size and a set of named containers; `body` is
//! always present. Containers and surface elements are [`Node`]s, cheap
//! handles that can be cloned freely and compared by identity.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct NodeData {
    name: String,
    children: Vec<Node>,
    attributes: BTreeMap<String, String>,
}

/// Handle to an element of the page.
#[derive(Clone, Default)]
pub struct Node {
    inner: Rc<RefCell<NodeData>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Node")
            .field("name", &data.name)
            .field("children", &data.children.len())
            .finish()
    }
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeData {
                name: name.into(),
                ..NodeData::default()
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Identity comparison.
    pub fn same_node(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Append `child`. A node already present is not added twice.
    pub fn append_child(&self, child: &Node) {
        if self.contains_child(child) {
            return;
        }
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Remove `child`; returns whether it was present.
    pub fn remove_child(&self, child: &Node) -> bool {
        let mut data = self.inner.borrow_mut();
        let before = data.children.len();
        data.children.retain(|c| !c.same_node(child));
        data.children.len() != before
    }

    pub fn contains_child(&self, child: &Node) -> bool {
        self.inner.borrow().children.iter().any(|c| c.same_node(child))
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.borrow().children.clone()
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.borrow_mut().attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.inner.borrow().attributes.get(key).cloned()
    }
}

/// Where a surface should be attached.
#[derive(Clone, Debug)]
pub enum ContainerRef {
    /// Name of a container registered on the page, e.g. `"body"`.
    Selector(String),
    /// A node handle obtained earlier. Only resolves while still on the page.
    Node(Node),
}

impl From<&str> for ContainerRef {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for ContainerRef {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<Node> for ContainerRef {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(s) => f.write_str(s),
            Self::Node(n) => write!(f, "<{}>", n.name()),
        }
    }
}

pub const DEFAULT_VIEWPORT: (u32, u32) = (1600, 1200);

/// The host page.
#[derive(Debug)]
pub struct Page {
    viewport: (u32, u32),
    containers: BTreeMap<String, Node>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1)
    }
}

impl Page {
    pub fn new(width: u32, height: u32) -> Self {
        let mut containers = BTreeMap::new();
        containers.insert("body".to_owned(), Node::new("body"));
        Self {
            viewport: (width, height),
            containers,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn body(&self) -> Option<Node> {
        self.query("body")
    }

    /// Register a container under `selector`, replacing any previous one.
    pub fn add_container(&mut self, selector: impl Into<String>) -> Node {
        let selector = selector.into();
        let node = Node::new(selector.clone());
        self.containers.insert(selector, node.clone());
        node
    }

    /// Take a container off the page. Handles to it stop resolving.
    pub fn remove_container(&mut self, selector: &str) -> Option<Node> {
        self.containers.remove(selector)
    }

    pub fn query(&self, selector: &str) -> Option<Node> {
        self.containers.get(selector).cloned()
    }

    /// Live attachment point for `target`, if any.
    pub fn resolve(&self, target: &ContainerRef) -> Option<Node> {
        match target {
            ContainerRef::Selector(s) => self.query(s),
            ContainerRef::Node(n) => self
                .containers
                .values()
                .find(|c| c.same_node(n))
                .cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_always_present() {
        let page = Page::default();
        assert_eq!(page.viewport(), DEFAULT_VIEWPORT);
        assert!(page.resolve(&"body".into()).is_some());
        assert!(page.resolve(&"#missing".into()).is_none());
    }

    #[test]
    fn detached_node_no_longer_resolves() {
        let mut page = Page::new(800, 600);
        let hero = page.add_container("#hero");
        let target = ContainerRef::Node(hero.clone());
        assert!(page.resolve(&target).is_some_and(|n| n.same_node(&hero)));

        page.remove_container("#hero");
        assert!(page.resolve(&target).is_none());
        assert!(page.resolve(&ContainerRef::Node(Node::new("orphan"))).is_none());
    }

    #[test]
    fn children_are_tracked_by_identity() {
        let parent = Node::new("div");
        let a = Node::new("canvas");
        let b = Node::new("canvas");
        parent.append_child(&a);
        parent.append_child(&a);
        parent.append_child(&b);
        assert_eq!(parent.children().len(), 2);

        assert!(parent.remove_child(&a));
        assert!(!parent.remove_child(&a));
        assert!(parent.contains_child(&b));
        assert!(!parent.contains_child(&a));
    }

    #[test]
    fn attributes_round_trip() {
        let n = Node::new("canvas");
        assert_eq!(n.attribute("style"), None);
        n.set_attribute("style", "display:block");
        assert_eq!(n.attribute("style").as_deref(), Some("display:block"));
    }
}
