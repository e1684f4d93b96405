//! CodeCortex - verification code detection via Regex
//!
//! Detects "code 123456" style mentions and reports the digit run.
//! Matching is stateless: every call walks the text from the start with
//! `captures_iter`, so no cursor leaks between calls or between nodes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::scanner::config::{ConfigError, HighlightConfig, DEFAULT_PATTERN};

// ==================== TYPE DEFINITIONS ====================

/// A single detected code
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CodeMatch {
    /// The digit run
    pub code: String,
    /// Byte offsets of the digit run
    pub start: usize,
    pub end: usize,
    /// Byte offsets of the whole match ("code 123456")
    pub match_start: usize,
    pub match_end: usize,
}

/// A piece of a text node after splitting on matches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Unmatched text, copied verbatim
    Text(&'a str),
    /// Digit run to wrap in a highlight span
    Code(&'a str),
}

// ==================== MAIN IMPLEMENTATION ====================

/// CodeCortex - verification code detector
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct CodeCortex {
    code_re: Regex,
}

impl Default for CodeCortex {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl CodeCortex {
    /// Create a CodeCortex with the default `code <digits>` pattern
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let code_re = regex::RegexBuilder::new(DEFAULT_PATTERN)
            .case_insensitive(true)
            .build()
            .unwrap();
        Self { code_re }
    }

    /// Scan text for codes
    ///
    /// Returns a JsValue containing an array of CodeMatch objects.
    #[wasm_bindgen(js_name = scan)]
    pub fn js_scan(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.find_all(text))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Quick check without collecting matches
    #[wasm_bindgen(js_name = hasMatch)]
    pub fn has_match(&self, text: &str) -> bool {
        self.code_re.is_match(text)
    }

    /// Source of the compiled pattern
    #[wasm_bindgen(getter)]
    pub fn pattern(&self) -> String {
        self.code_re.as_str().to_string()
    }
}

impl CodeCortex {
    /// Build from a user configuration
    pub fn from_config(config: &HighlightConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_regex(config.compile_pattern()?))
    }

    /// Wrap an already validated regex (capture 1 must exist)
    pub fn with_regex(code_re: Regex) -> Self {
        Self { code_re }
    }

    /// All matches in `text`, in order
    pub fn find_all(&self, text: &str) -> Vec<CodeMatch> {
        self.code_re
            .captures_iter(text)
            .filter_map(|cap| {
                let full = cap.get(0)?;
                let digits = cap.get(1)?;
                Some(CodeMatch {
                    code: digits.as_str().to_string(),
                    start: digits.start(),
                    end: digits.end(),
                    match_start: full.start(),
                    match_end: full.end(),
                })
            })
            .collect()
    }

    /// Split `text` into verbatim text and code segments.
    ///
    /// Returns an empty Vec when nothing matches so callers can leave the
    /// node untouched. Empty text pieces are never emitted.
    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let matches = self.find_all(text);
        if matches.is_empty() {
            return Vec::new();
        }

        let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
        let mut last = 0;
        for m in &matches {
            if m.start > last {
                segments.push(Segment::Text(&text[last..m.start]));
            }
            segments.push(Segment::Code(&text[m.start..m.end]));
            // Resume after the whole match, like a global regex cursor would
            last = m.match_end;
        }
        if last < text.len() {
            segments.push(Segment::Text(&text[last..]));
        }
        segments
    }
}
