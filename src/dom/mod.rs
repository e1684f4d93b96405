//! Host DOM seam
//!
//! The highlighter never touches `web_sys` directly. Everything it needs from
//! the page goes through [`DomHost`], which is implemented twice:
//! - `memory.rs` - MemoryDom: arena-backed DOM for native hosts and tests
//! - `web.rs` - WebDom: the live browser document (wasm32 only)
//!
//! Deferred work (the container-mode debounce) goes through [`Timer`].

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

use crate::scanner::config::HighlightStyle;

// =============================================================================
// Types
// =============================================================================

/// Node classification, mirroring `Node.nodeType` for the kinds we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Comments, documents, fragments, processing instructions...
    Other,
}

/// DOM operation failures
#[derive(Debug, Clone, PartialEq)]
pub enum DomError {
    /// Node has no parent to splice into
    Detached,
    /// Selector or id did not resolve
    NotFound(String),
    /// Exception raised by the host
    Js(String),
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomError::Detached => write!(f, "Node is detached from the document"),
            DomError::NotFound(what) => write!(f, "Not found: {}", what),
            DomError::Js(msg) => write!(f, "DOM exception: {}", msg),
        }
    }
}

impl std::error::Error for DomError {}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for DomError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        DomError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Everything the highlighter needs from a document.
///
/// Handles are cheap clones (`NodeId` for MemoryDom, `web_sys::Node` on the web).
pub trait DomHost {
    type Node: Clone;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Upper- or lower-case tag name; `None` for non-elements
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn has_attribute(&self, node: &Self::Node, name: &str) -> bool;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    /// Concatenated text of the node and its descendants
    fn text_content(&self, node: &Self::Node) -> String;

    /// Snapshot of the current child list
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Every element under `root` matching `selector`, in document order
    fn query_all(&self, root: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    fn create_text(&mut self, text: &str) -> Result<Self::Node, DomError>;

    /// Create a styled, marked highlight span that copies `code` on click
    fn create_highlight(
        &mut self,
        code: &str,
        marker: &str,
        style: &HighlightStyle,
    ) -> Result<Self::Node, DomError>;

    /// Replace `node` in its parent with `replacements`, in order
    fn replace_with(&mut self, node: &Self::Node, replacements: Vec<Self::Node>) -> Result<(), DomError>;
}

/// One-shot timer scheduling used for debouncing
pub trait Timer {
    type Handle;

    fn schedule(&mut self, delay_ms: u32) -> Result<Self::Handle, DomError>;

    fn cancel(&mut self, handle: Self::Handle);
}
