//! codemark: Verification-Code Highlighter
//!
//! A Rust/WASM page enhancement that finds "code 123456" mentions in live
//! text, wraps the digits in a dotted, click-to-copy highlight, and keeps
//! doing so as the page changes.
//!
//! # Architecture
//!
//! ## Scanner Components
//! - `pattern.rs` - CodeCortex: stateless "code <digits>" detection
//! - `highlighter.rs` - CodeHighlighter: DOM walk + highlight span splicing
//! - `conductor.rs` - ScanConductor: initial scan + mutation/timer dispatch
//! - `debounce.rs` - Debouncer: timer-reset coalescing (container mode)
//! - `config.rs` - HighlightConfig, ScanMode, HighlightStyle
//!
//! ## DOM Hosts
//! - `dom/memory.rs` - MemoryDom + ManualTimer (native, tests)
//! - `dom/web.rs` - WebDom + WebTimer (browser, wasm32 only)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { install, CodeCortex } from 'codemark';
//!
//! await init();
//!
//! const session = install();              // highlight + observe document.body
//! new CodeCortex().scan("code 4242");     // [{ code: "4242", start: 5, ... }]
//! ```

pub mod console;
pub mod dom;
pub mod scanner;
#[cfg(target_arch = "wasm32")]
pub mod session;

// Public exports - Scanner
pub use scanner::*;

#[cfg(target_arch = "wasm32")]
pub use session::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("codemark v{}", env!("CARGO_PKG_VERSION"))
}
