//! CodeHighlighter: wraps detected codes in clickable highlight spans
//!
//! Two entry points, one per deployment mode:
//! - `scan()` walks any node recursively (whole-document mode)
//! - `scan_container()` checks annotation elements and only touches their
//!   direct text children (container mode)
//!
//! The marker attribute is the only state: marked elements are skipped, and
//! so are text nodes whose parent is marked. Highlight spans carry the marker,
//! which is what stops our own insertions from being rescanned when they come
//! back through the mutation observer.

use serde::{Deserialize, Serialize};

use crate::dom::{DomError, DomHost, NodeKind};
use crate::scanner::config::{ConfigError, HighlightConfig};
use crate::scanner::pattern::{CodeCortex, Segment};

/// Elements whose text is never scanned
const SKIPPED_TAGS: [&str; 2] = ["SCRIPT", "STYLE"];

// =============================================================================
// Types
// =============================================================================

/// Counters for one scan, or accumulated over a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub text_nodes_scanned: usize,
    pub highlights_created: usize,
    /// Marked or script/style elements not descended into
    pub elements_skipped: usize,
    /// Container mode: annotations marked as processed
    pub annotations_marked: usize,
    pub total_us: u64,
}

impl ScanStats {
    pub fn merge(&mut self, other: &ScanStats) {
        self.text_nodes_scanned += other.text_nodes_scanned;
        self.highlights_created += other.highlights_created;
        self.elements_skipped += other.elements_skipped;
        self.annotations_marked += other.annotations_marked;
        self.total_us += other.total_us;
    }
}

// =============================================================================
// CodeHighlighter
// =============================================================================

pub struct CodeHighlighter<D: DomHost> {
    dom: D,
    cortex: CodeCortex,
    config: HighlightConfig,
    /// Accumulated over every call
    stats: ScanStats,
}

impl<D: DomHost> CodeHighlighter<D> {
    /// Validate `config` and bind it to a document
    pub fn new(dom: D, config: HighlightConfig) -> Result<Self, ConfigError> {
        let code_re = config.validate()?;
        Ok(Self {
            dom,
            cortex: CodeCortex::with_regex(code_re),
            config,
            stats: ScanStats::default(),
        })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// True if `node` is an element carrying the marker attribute
    pub fn is_marked(&self, node: &D::Node) -> bool {
        self.dom.kind(node) == NodeKind::Element
            && self.dom.has_attribute(node, &self.config.marker_attribute)
    }

    /// Recursively highlight codes under `node` (text or element)
    pub fn scan(&mut self, node: &D::Node) -> Result<ScanStats, DomError> {
        let start = instant::Instant::now();
        let mut stats = ScanStats::default();
        self.scan_node(node, &mut stats)?;
        stats.total_us = start.elapsed().as_micros() as u64;
        self.stats.merge(&stats);
        Ok(stats)
    }

    /// Scan every node added by one mutation batch, in delivery order
    pub fn scan_added(&mut self, batch: &[Vec<D::Node>]) -> Result<ScanStats, DomError> {
        let mut stats = ScanStats::default();
        for added in batch {
            for node in added {
                match self.dom.kind(node) {
                    NodeKind::Element | NodeKind::Text => stats.merge(&self.scan(node)?),
                    NodeKind::Other => {}
                }
            }
        }
        Ok(stats)
    }

    /// Container mode: highlight codes in matching annotation elements
    pub fn scan_container(
        &mut self,
        container: &D::Node,
        annotation_selector: &str,
    ) -> Result<ScanStats, DomError> {
        let start = instant::Instant::now();
        let mut stats = ScanStats::default();

        for annotation in self.dom.query_all(container, annotation_selector)? {
            if self.is_marked(&annotation) {
                stats.elements_skipped += 1;
                continue;
            }
            if !self.cortex.has_match(&self.dom.text_content(&annotation)) {
                continue;
            }
            for child in self.dom.children(&annotation) {
                if self.dom.kind(&child) == NodeKind::Text {
                    self.scan_text(&child, &mut stats)?;
                }
            }
            let marker = self.config.marker_attribute.clone();
            self.dom.set_attribute(&annotation, &marker, "true")?;
            stats.annotations_marked += 1;
        }

        stats.total_us = start.elapsed().as_micros() as u64;
        self.stats.merge(&stats);
        Ok(stats)
    }

    fn scan_node(&mut self, node: &D::Node, stats: &mut ScanStats) -> Result<(), DomError> {
        match self.dom.kind(node) {
            NodeKind::Text => self.scan_text(node, stats),
            NodeKind::Element => {
                let skipped_tag = self
                    .dom
                    .tag_name(node)
                    .map(|tag| SKIPPED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(&tag)))
                    .unwrap_or(false);
                if skipped_tag || self.is_marked(node) {
                    stats.elements_skipped += 1;
                    return Ok(());
                }
                // Snapshot: scanning a text child replaces it in the live list
                for child in self.dom.children(node) {
                    self.scan_node(&child, stats)?;
                }
                Ok(())
            }
            NodeKind::Other => Ok(()),
        }
    }

    fn scan_text(&mut self, node: &D::Node, stats: &mut ScanStats) -> Result<(), DomError> {
        if let Some(parent) = self.dom.parent(node) {
            if self.is_marked(&parent) {
                return Ok(());
            }
        }
        stats.text_nodes_scanned += 1;

        let text = self.dom.text_content(node);
        let segments = self.cortex.segments(&text);
        if segments.is_empty() {
            return Ok(());
        }

        let mut replacements = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Text(piece) => replacements.push(self.dom.create_text(piece)?),
                Segment::Code(code) => {
                    replacements.push(self.dom.create_highlight(
                        code,
                        &self.config.marker_attribute,
                        &self.config.style,
                    )?);
                    stats.highlights_created += 1;
                }
            }
        }
        self.dom.replace_with(node, replacements)
    }
}
