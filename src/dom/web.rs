//! WebDom: the live browser document behind the DomHost seam
//!
//! Highlight spans get a capture-phase click listener that swallows the event
//! and writes the code to the clipboard. Listeners are leaked with
//! `Closure::forget` - they live as long as the page.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlElement, Node, Window};

use crate::dom::{DomError, DomHost, NodeKind, Timer};
use crate::scanner::config::HighlightStyle;

pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// Fire-and-forget clipboard write; rejection (e.g. no permission) is dropped
fn write_clipboard(code: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = window.navigator().clipboard().write_text(code);
    wasm_bindgen_futures::spawn_local(async move {
        let _ = JsFuture::from(promise).await;
    });
}

impl DomHost for WebDom {
    type Node = Node;

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>().map(|el| el.tag_name())
    }

    fn has_attribute(&self, node: &Node, name: &str) -> bool {
        node.dyn_ref::<Element>()
            .map(|el| el.has_attribute(name))
            .unwrap_or(false)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        let el = node
            .dyn_ref::<Element>()
            .ok_or_else(|| DomError::Js(format!("setAttribute on {}", node.node_name())))?;
        el.set_attribute(name, value)?;
        Ok(())
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn query_all(&self, root: &Node, selector: &str) -> Result<Vec<Node>, DomError> {
        let list = if let Some(el) = root.dyn_ref::<Element>() {
            el.query_selector_all(selector)?
        } else if let Some(doc) = root.dyn_ref::<Document>() {
            doc.query_selector_all(selector)?
        } else {
            return Err(DomError::NotFound(format!("query root for '{}'", selector)));
        };
        Ok((0..list.length()).filter_map(|i| list.get(i)).collect())
    }

    fn create_text(&mut self, text: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn create_highlight(
        &mut self,
        code: &str,
        marker: &str,
        style: &HighlightStyle,
    ) -> Result<Node, DomError> {
        let span: HtmlElement = self
            .document
            .create_element("span")?
            .dyn_into()
            .map_err(|_| DomError::Js("span is not an HtmlElement".to_string()))?;
        span.set_attribute(marker, "true")?;

        let css = span.style();
        for (property, value) in style.declarations() {
            css.set_property(property, value)?;
        }
        span.set_text_content(Some(code));

        let code = code.to_string();
        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.stop_propagation();
            event.stop_immediate_propagation();
            event.prevent_default();
            write_clipboard(&code);
        });
        span.add_event_listener_with_callback_and_bool(
            "click",
            on_click.as_ref().unchecked_ref(),
            true,
        )?;
        on_click.forget();

        Ok(span.into())
    }

    fn replace_with(&mut self, node: &Node, replacements: Vec<Node>) -> Result<(), DomError> {
        let parent = node.parent_node().ok_or(DomError::Detached)?;
        let fragment = self.document.create_document_fragment();
        for replacement in &replacements {
            fragment.append_child(replacement)?;
        }
        parent.replace_child(&fragment, node)?;
        Ok(())
    }
}

// =============================================================================
// WebTimer
// =============================================================================

/// `setTimeout`-backed timer. The callback is installed after construction
/// because it usually captures the conductor that owns this timer.
pub struct WebTimer {
    window: Window,
    callback: Option<Function>,
}

impl WebTimer {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
        }
    }

    pub fn set_callback(&mut self, callback: Function) {
        self.callback = Some(callback);
    }
}

impl Timer for WebTimer {
    type Handle = i32;

    fn schedule(&mut self, delay_ms: u32) -> Result<i32, DomError> {
        let callback = self
            .callback
            .as_ref()
            .ok_or_else(|| DomError::NotFound("timer callback".to_string()))?;
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, delay_ms as i32)?;
        Ok(handle)
    }

    fn cancel(&mut self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}
