//! MemoryDom: arena-backed document for native hosts and tests
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]. Alongside the tree
//! it keeps what a browser would otherwise own: click listeners, the
//! clipboard, and the list of added nodes a MutationObserver would report.

use std::collections::BTreeMap;

use crate::dom::{DomError, DomHost, NodeKind, Timer};
use crate::scanner::config::HighlightStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element {
        tag_name: String,
        attrs: BTreeMap<String, String>,
    },
    Text(String),
    Comment(String),
}

/// Click listener attached to a node
#[derive(Debug, Clone, PartialEq)]
pub enum Listener {
    /// Highlight span behavior: swallow the event and copy `code`
    CopyCode(String),
    /// Plain handler that only records that it ran
    Record(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
    listeners: Vec<Listener>,
}

/// Result of dispatching a click
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickOutcome {
    /// Labels of `Listener::Record` handlers that ran, target first
    pub fired: Vec<String>,
    pub default_prevented: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    document: NodeId,
    body: NodeId,
    clipboard: Vec<String>,
    clipboard_denied: bool,
    /// Added-node lists, one per mutation, drained by `take_records`
    records: Vec<Vec<NodeId>>,
    mutation_count: usize,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Empty document with a `<body>`
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            body: NodeId(0),
            clipboard: Vec::new(),
            clipboard_denied: false,
            records: Vec::new(),
            mutation_count: 0,
        };
        dom.document = dom.alloc(NodeData::Document);
        let body = dom.create_element("body");
        dom.attach(dom.document, body);
        dom.body = body;
        dom.records.clear();
        dom.mutation_count = 0;
        dom
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
            listeners: Vec::new(),
        });
        id
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    // ==================== Tree building ====================

    /// Detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag_name: tag_name.to_string(),
            attrs: BTreeMap::new(),
        })
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeData::Comment(data.to_string()))
    }

    /// Append `child` to `parent`, reporting it as an added node when the
    /// parent is part of the document
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child);
        self.mutation_count += 1;
        if self.is_connected(parent) {
            self.records.push(vec![child]);
        }
    }

    /// Create and append an element in one step
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        let el = self.create_element(tag_name);
        self.append_child(parent, el);
        el
    }

    /// Create and append a text node in one step
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.alloc(NodeData::Text(text.to_string()));
        self.append_child(parent, node);
        node
    }

    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
        self.mutation_count += 1;
    }

    pub fn add_listener(&mut self, node: NodeId, listener: Listener) {
        self.nodes[node.0].listeners.push(listener);
    }

    // ==================== Inspection ====================

    /// True if `node` is reachable from the document root
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.document {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(|v| v.as_str()),
            _ => None,
        }
    }

    pub fn listeners(&self, node: NodeId) -> &[Listener] {
        &self.nodes[node.0].listeners
    }

    /// Serialized markup of `node`'s children (attributes in name order)
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[node.0].children {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Document => {
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
            }
            NodeData::Element { tag_name, attrs } => {
                out.push('<');
                out.push_str(tag_name);
                for (name, value) in attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, value));
                }
                out.push('>');
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", tag_name));
            }
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(data) => out.push_str(&format!("<!--{}-->", data)),
        }
    }

    /// Total tree or attribute mutations since creation
    pub fn mutation_count(&self) -> usize {
        self.mutation_count
    }

    /// Drain pending added-node lists, oldest first
    pub fn take_records(&mut self) -> Vec<Vec<NodeId>> {
        std::mem::take(&mut self.records)
    }

    // ==================== Events & clipboard ====================

    /// Make clipboard writes fail silently, like a denied permission
    pub fn deny_clipboard(&mut self) {
        self.clipboard_denied = true;
    }

    pub fn clipboard(&self) -> &[String] {
        &self.clipboard
    }

    /// Dispatch a bubbling click at `target`
    pub fn click(&mut self, target: NodeId) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            let mut stopped = false;
            for listener in self.nodes[current.0].listeners.clone() {
                match listener {
                    Listener::CopyCode(code) => {
                        outcome.default_prevented = true;
                        stopped = true;
                        if !self.clipboard_denied {
                            self.clipboard.push(code);
                        }
                        // stopImmediatePropagation
                        break;
                    }
                    Listener::Record(label) => outcome.fired.push(label),
                }
            }
            if stopped {
                break;
            }
            cursor = self.nodes[current.0].parent;
        }
        outcome
    }
}

impl DomHost for MemoryDom {
    type Node = NodeId;

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes[node.0].data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Document | NodeData::Comment(_) => NodeKind::Other,
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match &self.nodes[node.0].data {
            NodeData::Element { tag_name, .. } => Some(tag_name.to_ascii_uppercase()),
            _ => None,
        }
    }

    fn has_attribute(&self, node: &NodeId, name: &str) -> bool {
        self.attribute(*node, name).is_some()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.nodes[node.0].data {
            NodeData::Element { attrs, .. } => {
                attrs.insert(name.to_string(), value.to_string());
                self.mutation_count += 1;
                Ok(())
            }
            _ => Err(DomError::Js(format!("setAttribute on non-element {:?}", node))),
        }
    }

    fn text_content(&self, node: &NodeId) -> String {
        match &self.nodes[node.0].data {
            NodeData::Text(text) | NodeData::Comment(text) => text.clone(),
            NodeData::Document | NodeData::Element { .. } => {
                let mut out = String::new();
                for child in &self.nodes[node.0].children {
                    if !matches!(self.nodes[child.0].data, NodeData::Comment(_)) {
                        out.push_str(&self.text_content(child));
                    }
                }
                out
            }
        }
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    /// Supports bare tag names only, matched case-insensitively
    fn query_all(&self, root: &NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = selector.trim();
        if selector.is_empty() || !selector.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::Js(format!("Unsupported selector '{}'", selector)));
        }
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if let NodeData::Element { tag_name, .. } = &self.nodes[node.0].data {
                if tag_name.eq_ignore_ascii_case(selector) {
                    found.push(node);
                }
            }
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        Ok(found)
    }

    fn create_text(&mut self, text: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(NodeData::Text(text.to_string())))
    }

    fn create_highlight(
        &mut self,
        code: &str,
        marker: &str,
        style: &HighlightStyle,
    ) -> Result<NodeId, DomError> {
        let span = self.create_element("span");
        self.set_attribute(&span, marker, "true")?;
        self.set_attribute(&span, "style", &style.to_css())?;
        let text = self.alloc(NodeData::Text(code.to_string()));
        self.attach(span, text);
        self.add_listener(span, Listener::CopyCode(code.to_string()));
        Ok(span)
    }

    fn replace_with(&mut self, node: &NodeId, replacements: Vec<NodeId>) -> Result<(), DomError> {
        let parent = self.nodes[node.0].parent.ok_or(DomError::Detached)?;
        for r in &replacements {
            self.detach(*r);
        }
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| c == node)
            .ok_or(DomError::Detached)?;

        self.nodes[node.0].parent = None;
        self.nodes[parent.0]
            .children
            .splice(index..=index, replacements.iter().copied());
        for r in &replacements {
            self.nodes[r.0].parent = Some(parent);
        }

        self.mutation_count += 1;
        if self.is_connected(parent) {
            self.records.push(replacements);
        }
        Ok(())
    }
}

// =============================================================================
// ManualTimer
// =============================================================================

/// Timer driven by explicit `advance()` calls
#[derive(Debug, Default)]
pub struct ManualTimer {
    now_ms: u64,
    next_handle: u64,
    /// (handle, due_at)
    scheduled: Vec<(u64, u64)>,
    cancelled: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward, returning handles that came due in order
    pub fn advance(&mut self, ms: u64) -> Vec<u64> {
        self.now_ms += ms;
        let now = self.now_ms;
        let mut due: Vec<(u64, u64)> = self.scheduled.iter().copied().filter(|(_, at)| *at <= now).collect();
        self.scheduled.retain(|(_, at)| *at > now);
        due.sort_by_key(|(handle, at)| (*at, *handle));
        due.into_iter().map(|(handle, _)| handle).collect()
    }

    pub fn pending(&self) -> usize {
        self.scheduled.len()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl Timer for ManualTimer {
    type Handle = u64;

    fn schedule(&mut self, delay_ms: u32) -> Result<u64, DomError> {
        self.next_handle += 1;
        self.scheduled.push((self.next_handle, self.now_ms + delay_ms as u64));
        Ok(self.next_handle)
    }

    fn cancel(&mut self, handle: u64) {
        let before = self.scheduled.len();
        self.scheduled.retain(|(h, _)| *h != handle);
        if self.scheduled.len() < before {
            self.cancelled += 1;
        }
    }
}
