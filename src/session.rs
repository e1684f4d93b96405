//! HighlightSession: JS entry point
//!
//! `install()` resolves the observed root, runs the initial scan, and wires a
//! MutationObserver (plus a debounce timer in container mode) to a shared
//! ScanConductor. There is no teardown; the observer runs for the life of
//! the page.
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { install } from 'codemark';
//!
//! await init();
//!
//! // Whole page
//! const session = install();
//!
//! // Or just the message thread, debounced
//! const session = install({ mode: { kind: 'container', debounceMs: 300 } });
//!
//! console.log(session.stats());  // { highlightsCreated, textNodesScanned, ... }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MutationObserver, MutationObserverInit, MutationRecord, Node};

use crate::console;
use crate::dom::{DomError, WebDom, WebTimer};
use crate::scanner::conductor::ScanConductor;
use crate::scanner::config::{HighlightConfig, ScanMode};
use crate::scanner::highlighter::{CodeHighlighter, ScanStats};

type WebConductor = ScanConductor<WebDom, WebTimer>;

fn to_js(e: DomError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn stats_to_js(stats: &ScanStats) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(stats).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Decode the options object; `undefined`/`null` means defaults
fn parse_options(options: JsValue) -> Result<HighlightConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(HighlightConfig::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))
}

/// Handle returned by `install()`
#[wasm_bindgen]
pub struct HighlightSession {
    conductor: Rc<RefCell<WebConductor>>,
    _observer: MutationObserver,
}

#[wasm_bindgen]
impl HighlightSession {
    /// "document" or "container"
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.conductor.borrow().highlighter().config().mode.as_str().to_string()
    }

    /// Counters accumulated since install
    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        stats_to_js(self.conductor.borrow().highlighter().stats())
    }

    /// Mutation batches delivered by the observer
    #[wasm_bindgen(js_name = batchesSeen)]
    pub fn batches_seen(&self) -> f64 {
        self.conductor.borrow().batches_seen() as f64
    }

    /// Scan the observed root immediately, skipping any debounce
    #[wasm_bindgen]
    pub fn rescan(&self) -> Result<JsValue, JsValue> {
        let stats = self.conductor.borrow_mut().rescan().map_err(to_js)?;
        stats_to_js(&stats)
    }
}

/// Scan the page and keep highlighting new content.
///
/// `options` is an optional `HighlightConfig` object (camelCase keys).
#[wasm_bindgen]
pub fn install(options: JsValue) -> Result<HighlightSession, JsValue> {
    let config = parse_options(options)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let root: Node = match &config.mode {
        ScanMode::Document => document
            .body()
            .ok_or_else(|| to_js(DomError::NotFound("document.body".to_string())))?
            .into(),
        ScanMode::Container {
            container_selector, ..
        } => document
            .query_selector(container_selector)?
            .ok_or_else(|| to_js(DomError::NotFound(container_selector.clone())))?
            .into(),
    };

    let highlighter = CodeHighlighter::new(WebDom::new(document), config).map_err(|e| {
        console::error(&format!("[CodeHighlighter] Rejected options: {}", e));
        JsValue::from_str(&e.to_string())
    })?;
    let conductor: Rc<RefCell<WebConductor>> = Rc::new(RefCell::new(ScanConductor::new(
        highlighter,
        root.clone(),
        WebTimer::new(window),
    )));

    // Debounce timer callback (container mode only)
    if conductor.borrow().debouncer().is_some() {
        let on_timer = Closure::<dyn FnMut() -> Result<(), JsValue>>::new({
            let conductor = conductor.clone();
            move || conductor.borrow_mut().on_timer().map(|_| ()).map_err(to_js)
        });
        if let Some(debouncer) = conductor.borrow_mut().debouncer_mut() {
            let callback: &Function = on_timer.as_ref().unchecked_ref();
            debouncer.timer_mut().set_callback(callback.clone());
        }
        on_timer.forget();
    }

    conductor.borrow_mut().start().map_err(to_js)?;

    let on_mutations = Closure::<dyn FnMut(Array, MutationObserver) -> Result<(), JsValue>>::new({
        let conductor = conductor.clone();
        move |records: Array, _observer: MutationObserver| {
            let batch: Vec<Vec<Node>> = records
                .iter()
                .map(|record| {
                    let added = record.unchecked_into::<MutationRecord>().added_nodes();
                    (0..added.length()).filter_map(|i| added.get(i)).collect()
                })
                .collect();
            conductor.borrow_mut().on_mutations(&batch).map(|_| ()).map_err(to_js)
        }
    });
    let observer = MutationObserver::new(on_mutations.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&root, &init)?;
    on_mutations.forget();

    console::log(&format!(
        "[CodeHighlighter] Observing {} ({} mode)",
        root.node_name().to_lowercase(),
        conductor.borrow().highlighter().config().mode.as_str()
    ));

    Ok(HighlightSession {
        conductor,
        _observer: observer,
    })
}
