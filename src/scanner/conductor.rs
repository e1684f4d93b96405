//! ScanConductor: ties the highlighter to mutation delivery
//!
//! # Design Principles
//! 1. State machine: Idle → Observing (after the initial scan)
//! 2. One engine, two deployment modes (see `ScanMode`)
//! 3. Host callbacks stay thin: the observer forwards batches to
//!    `on_mutations()`, the timer calls `on_timer()`
//!
//! # Usage
//! ```rust,ignore
//! let mut conductor = ScanConductor::new(highlighter, root, timer);
//! conductor.start()?;                 // initial scan
//! conductor.on_mutations(&batch)?;    // from the MutationObserver
//! conductor.on_timer()?;              // from the debounce timer (container mode)
//! ```

use crate::console;
use crate::dom::{DomError, DomHost, Timer};
use crate::scanner::config::ScanMode;
use crate::scanner::debounce::Debouncer;
use crate::scanner::highlighter::{CodeHighlighter, ScanStats};

// =============================================================================
// State Machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Constructed, nothing scanned yet
    Idle,
    /// Initial scan done, reacting to mutations
    Observing,
}

// =============================================================================
// ScanConductor
// =============================================================================

/// Drives one highlighter over one observed root.
///
/// Document mode scans added nodes as they arrive. Container mode turns every
/// mutation batch into a debounce trigger and rescans the container when the
/// timer fires.
pub struct ScanConductor<D: DomHost, T: Timer> {
    highlighter: CodeHighlighter<D>,
    root: D::Node,
    /// Present only in container mode
    debouncer: Option<Debouncer<T>>,
    annotation_selector: Option<String>,
    state: State,
    batches_seen: u64,
}

impl<D: DomHost, T: Timer> ScanConductor<D, T> {
    /// `root` is the body (document mode) or the container element.
    /// The timer is only used in container mode.
    pub fn new(highlighter: CodeHighlighter<D>, root: D::Node, timer: T) -> Self {
        let (debouncer, annotation_selector) = match &highlighter.config().mode {
            ScanMode::Document => (None, None),
            ScanMode::Container {
                annotation_selector,
                debounce_ms,
                ..
            } => (
                Some(Debouncer::new(timer, *debounce_ms)),
                Some(annotation_selector.clone()),
            ),
        };
        Self {
            highlighter,
            root,
            debouncer,
            annotation_selector,
            state: State::Idle,
            batches_seen: 0,
        }
    }

    pub fn highlighter(&self) -> &CodeHighlighter<D> {
        &self.highlighter
    }

    pub fn highlighter_mut(&mut self) -> &mut CodeHighlighter<D> {
        &mut self.highlighter
    }

    pub fn root(&self) -> &D::Node {
        &self.root
    }

    pub fn debouncer(&self) -> Option<&Debouncer<T>> {
        self.debouncer.as_ref()
    }

    pub fn debouncer_mut(&mut self) -> Option<&mut Debouncer<T>> {
        self.debouncer.as_mut()
    }

    pub fn is_observing(&self) -> bool {
        self.state == State::Observing
    }

    pub fn batches_seen(&self) -> u64 {
        self.batches_seen
    }

    /// Current state name (for debugging)
    pub fn state_name(&self) -> &'static str {
        match self.state {
            State::Idle => "idle",
            State::Observing => "observing",
        }
    }

    /// Initial full scan. Idempotent - later calls just rescan.
    pub fn start(&mut self) -> Result<ScanStats, DomError> {
        let stats = self.rescan()?;
        if self.state == State::Idle {
            console::log(&format!(
                "[ScanConductor] {} mode: {} highlight(s) in initial scan",
                self.highlighter.config().mode.as_str(),
                stats.highlights_created
            ));
        }
        self.state = State::Observing;
        Ok(stats)
    }

    /// Scan the whole root now, bypassing any debounce
    pub fn rescan(&mut self) -> Result<ScanStats, DomError> {
        match &self.annotation_selector {
            None => self.highlighter.scan(&self.root),
            Some(selector) => self.highlighter.scan_container(&self.root, selector),
        }
    }

    /// One MutationObserver callback: the added-node list of each record.
    ///
    /// Returns the stats of work done synchronously (always empty in
    /// container mode, where the scan is deferred). Batches arriving before
    /// `start()` are ignored.
    pub fn on_mutations(&mut self, batch: &[Vec<D::Node>]) -> Result<ScanStats, DomError> {
        if self.state != State::Observing {
            return Ok(ScanStats::default());
        }
        self.batches_seen += 1;
        match self.debouncer.as_mut() {
            None => self.highlighter.scan_added(batch),
            Some(debouncer) => {
                debouncer.trigger()?;
                Ok(ScanStats::default())
            }
        }
    }

    /// Debounce timer elapsed. Returns `None` if no scan was pending.
    pub fn on_timer(&mut self) -> Result<Option<ScanStats>, DomError> {
        let fired = match self.debouncer.as_mut() {
            Some(debouncer) => debouncer.fire(),
            None => false,
        };
        if !fired {
            console::warn("[ScanConductor] Timer tick with no pending scan, ignored");
            return Ok(None);
        }
        let stats = self.rescan()?;
        if stats.annotations_marked > 0 {
            console::log(&format!(
                "[ScanConductor] Debounced scan marked {} annotation(s)",
                stats.annotations_marked
            ));
        }
        Ok(Some(stats))
    }
}
