//! Configuration types and defaults for the code highlighter
//!
//! Every field defaults to the page script constants, so an empty options
//! object (or `undefined` from JS) gives the stock behavior.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute marking a node as already processed
pub const DEFAULT_MARKER_ATTR: &str = "data-code-highlighted";

/// "code" as a whole word, whitespace, then the digit run (capture 1).
/// The boundary is ASCII-only, so "code" right after a non-ASCII letter
/// still counts as a word start.
pub const DEFAULT_PATTERN: &str = r"(?-u:\b)code\s+([0-9]+)";

pub const DEFAULT_CONTAINER_SELECTOR: &str = "gv-message-list";
pub const DEFAULT_ANNOTATION_SELECTOR: &str = "gv-annotation";
pub const DEFAULT_DEBOUNCE_MS: u32 = 300;

// =============================================================================
// Errors
// =============================================================================

/// Rejected configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyMarker,
    InvalidPattern(String),
    /// Pattern compiles but has no group to wrap
    MissingCapture,
    ZeroDebounce,
    EmptySelector(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyMarker => write!(f, "Marker attribute must not be empty"),
            ConfigError::InvalidPattern(e) => write!(f, "Invalid pattern: {}", e),
            ConfigError::MissingCapture => write!(f, "Pattern needs a capture group for the code"),
            ConfigError::ZeroDebounce => write!(f, "Debounce delay must be greater than zero"),
            ConfigError::EmptySelector(which) => write!(f, "Selector '{}' must not be empty", which),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Highlight Style
// =============================================================================

/// Inline style applied to every highlight span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightStyle {
    pub display: String,
    pub border: String,
    pub border_radius: String,
    pub padding: String,
    pub background_color: String,
    pub cursor: String,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            display: "inline-block".to_string(),
            border: "2px dotted #f59e0b".to_string(),
            border_radius: "4px".to_string(),
            padding: "1px 4px".to_string(),
            background_color: "#fef3c7".to_string(),
            cursor: "pointer".to_string(),
        }
    }
}

impl HighlightStyle {
    /// CSS property/value pairs, in the order they are applied
    pub fn declarations(&self) -> [(&'static str, &str); 6] {
        [
            ("display", self.display.as_str()),
            ("border", self.border.as_str()),
            ("border-radius", self.border_radius.as_str()),
            ("padding", self.padding.as_str()),
            ("background-color", self.background_color.as_str()),
            ("cursor", self.cursor.as_str()),
        ]
    }

    /// Serialized `style` attribute value
    pub fn to_css(&self) -> String {
        self.declarations()
            .iter()
            .map(|(prop, value)| format!("{}: {};", prop, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// =============================================================================
// Scan Mode
// =============================================================================

/// Where scanning starts and how mutations trigger it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScanMode {
    /// Recursive scan of the whole body; added nodes scanned immediately
    Document,
    /// Annotation elements inside one container; debounced rescans
    #[serde(rename_all = "camelCase")]
    Container {
        #[serde(default = "default_container_selector")]
        container_selector: String,
        #[serde(default = "default_annotation_selector")]
        annotation_selector: String,
        #[serde(default = "default_debounce_ms")]
        debounce_ms: u32,
    },
}

fn default_container_selector() -> String {
    DEFAULT_CONTAINER_SELECTOR.to_string()
}

fn default_annotation_selector() -> String {
    DEFAULT_ANNOTATION_SELECTOR.to_string()
}

fn default_debounce_ms() -> u32 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for ScanMode {
    fn default() -> Self {
        ScanMode::Document
    }
}

impl ScanMode {
    /// Container mode with every option at its default
    pub fn container() -> Self {
        ScanMode::Container {
            container_selector: default_container_selector(),
            annotation_selector: default_annotation_selector(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Document => "document",
            ScanMode::Container { .. } => "container",
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Highlighter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightConfig {
    /// Attribute set on processed nodes. Default: `data-code-highlighted`
    pub marker_attribute: String,
    /// Pattern source, compiled case-insensitive. Capture 1 is wrapped.
    pub pattern: String,
    pub style: HighlightStyle,
    pub mode: ScanMode,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTR.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            style: HighlightStyle::default(),
            mode: ScanMode::Document,
        }
    }
}

impl HighlightConfig {
    /// Defaults with the container variant selected
    pub fn container() -> Self {
        Self {
            mode: ScanMode::container(),
            ..Self::default()
        }
    }

    /// Compile the configured pattern
    pub fn compile_pattern(&self) -> Result<Regex, ConfigError> {
        let re = RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        if re.captures_len() < 2 {
            return Err(ConfigError::MissingCapture);
        }
        Ok(re)
    }

    /// Check every field, compiling the pattern once
    pub fn validate(&self) -> Result<Regex, ConfigError> {
        if self.marker_attribute.trim().is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if let ScanMode::Container {
            container_selector,
            annotation_selector,
            debounce_ms,
        } = &self.mode
        {
            if container_selector.trim().is_empty() {
                return Err(ConfigError::EmptySelector("containerSelector"));
            }
            if annotation_selector.trim().is_empty() {
                return Err(ConfigError::EmptySelector("annotationSelector"));
            }
            if *debounce_ms == 0 {
                return Err(ConfigError::ZeroDebounce);
            }
        }
        self.compile_pattern()
    }
}
