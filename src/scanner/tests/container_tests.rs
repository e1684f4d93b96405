//! Tests for container-scoped scanning with debounced rescans

use crate::dom::{DomHost, ManualTimer, MemoryDom, NodeId, NodeKind};
use crate::scanner::conductor::ScanConductor;
use crate::scanner::config::{HighlightConfig, ScanMode};
use crate::scanner::highlighter::CodeHighlighter;

const MARKER: &str = "data-code-highlighted";

/// Conductor observing a `<gv-message-list>` under the body
fn conductor() -> (ScanConductor<MemoryDom, ManualTimer>, NodeId) {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let list = dom.append_element(body, "gv-message-list");
    dom.take_records();
    let highlighter = CodeHighlighter::new(dom, HighlightConfig::container()).unwrap();
    (ScanConductor::new(highlighter, list, ManualTimer::new()), list)
}

/// Insert `<gv-annotation>text</gv-annotation>` and return the records
fn add_annotation(c: &mut ScanConductor<MemoryDom, ManualTimer>, list: NodeId, text: &str) -> (NodeId, Vec<Vec<NodeId>>) {
    let dom = c.highlighter_mut().dom_mut();
    let annotation = dom.create_element("gv-annotation");
    dom.append_text(annotation, text);
    dom.append_child(list, annotation);
    (annotation, dom.take_records())
}

/// Advance the timer and deliver each elapsed callback
fn advance(c: &mut ScanConductor<MemoryDom, ManualTimer>, ms: u64) -> usize {
    let due = match c.debouncer_mut() {
        Some(debouncer) => debouncer.timer_mut().advance(ms),
        None => Vec::new(),
    };
    let mut scans = 0;
    for _ in due {
        if c.on_timer().unwrap().is_some() {
            scans += 1;
        }
    }
    scans
}

// ============================================================================
// Annotation scanning
// ============================================================================

#[test]
fn test_initial_scan_marks_matching_annotation() {
    let (mut c, list) = conductor();
    let (annotation, _) = add_annotation(&mut c, list, "code 42");

    let stats = c.start().unwrap();
    assert_eq!(stats.annotations_marked, 1);
    assert_eq!(stats.highlights_created, 1);

    let dom = c.highlighter().dom();
    assert_eq!(dom.attribute(annotation, MARKER), Some("true"));
    let children = dom.children(&annotation);
    assert_eq!(children.len(), 2);
    assert_eq!(dom.text_content(&children[0]), "code ");
    assert_eq!(dom.attribute(children[1], MARKER), Some("true"));
    assert_eq!(dom.text_content(&children[1]), "42");
}

#[test]
fn test_non_matching_annotation_left_unmarked() {
    let (mut c, list) = conductor();
    let (annotation, _) = add_annotation(&mut c, list, "Call me back");

    let stats = c.start().unwrap();
    assert_eq!(stats.annotations_marked, 0);
    assert_eq!(c.highlighter().dom().attribute(annotation, MARKER), None);
}

#[test]
fn test_only_direct_text_children_scanned() {
    let (mut c, list) = conductor();
    let dom = c.highlighter_mut().dom_mut();
    let annotation = dom.append_element(list, "gv-annotation");
    dom.append_text(annotation, "Your code 111 ");
    let bold = dom.append_element(annotation, "b");
    let nested = dom.append_text(bold, "backup code 222");

    let stats = c.start().unwrap();
    assert_eq!(stats.highlights_created, 1);

    let dom = c.highlighter().dom();
    assert_eq!(dom.children(&bold), vec![nested]);
    assert_eq!(dom.attribute(annotation, MARKER), Some("true"));
}

#[test]
fn test_match_split_across_children_marks_without_highlight() {
    // Full text matches, but no single direct text child does
    let (mut c, list) = conductor();
    let dom = c.highlighter_mut().dom_mut();
    let annotation = dom.append_element(list, "gv-annotation");
    dom.append_text(annotation, "code ");
    let strong = dom.append_element(annotation, "strong");
    dom.append_text(strong, "9000");

    let stats = c.start().unwrap();
    assert_eq!(stats.highlights_created, 0);
    assert_eq!(stats.annotations_marked, 1);
}

#[test]
fn test_annotations_outside_container_ignored() {
    let (mut c, _list) = conductor();
    let dom = c.highlighter_mut().dom_mut();
    let body = dom.body();
    let stray = dom.append_element(body, "gv-annotation");
    dom.append_text(stray, "code 5");

    let stats = c.start().unwrap();
    assert_eq!(stats.annotations_marked, 0);
    assert_eq!(c.highlighter().dom().attribute(stray, MARKER), None);
}

#[test]
fn test_plain_text_in_container_not_scanned() {
    let (mut c, list) = conductor();
    let dom = c.highlighter_mut().dom_mut();
    let text = dom.append_text(list, "code 77");

    c.start().unwrap();
    assert_eq!(c.highlighter().dom().children(&list), vec![text]);
}

// ============================================================================
// Debounce
// ============================================================================

#[test]
fn test_mutation_scan_is_deferred() {
    let (mut c, list) = conductor();
    c.start().unwrap();

    let (annotation, batch) = add_annotation(&mut c, list, "code 42");
    let stats = c.on_mutations(&batch).unwrap();
    assert_eq!(stats.highlights_created, 0);
    assert_eq!(c.highlighter().dom().attribute(annotation, MARKER), None);

    assert_eq!(advance(&mut c, 299), 0);
    assert_eq!(c.highlighter().dom().attribute(annotation, MARKER), None);
    assert_eq!(advance(&mut c, 1), 1);
    assert_eq!(c.highlighter().dom().attribute(annotation, MARKER), Some("true"));
}

#[test]
fn test_two_mutations_one_scan() {
    let (mut c, list) = conductor();
    c.start().unwrap();

    let (first, batch) = add_annotation(&mut c, list, "code 42");
    c.on_mutations(&batch).unwrap();
    assert_eq!(advance(&mut c, 100), 0);

    let (second, batch) = add_annotation(&mut c, list, "code 42");
    c.on_mutations(&batch).unwrap();

    assert_eq!(advance(&mut c, 299), 0);
    assert_eq!(advance(&mut c, 1), 1);
    assert_eq!(advance(&mut c, 1000), 0);

    let dom = c.highlighter().dom();
    assert_eq!(dom.attribute(first, MARKER), Some("true"));
    assert_eq!(dom.attribute(second, MARKER), Some("true"));

    let debouncer = c.debouncer().unwrap();
    assert_eq!(debouncer.trigger_count(), 2);
    assert_eq!(debouncer.fire_count(), 1);
    assert_eq!(c.highlighter().stats().annotations_marked, 2);
}

#[test]
fn test_own_mutations_settle() {
    let (mut c, list) = conductor();
    c.start().unwrap();

    let (_, batch) = add_annotation(&mut c, list, "code 1");
    c.on_mutations(&batch).unwrap();
    assert_eq!(advance(&mut c, 300), 1);

    // The scan's own replacement is reported back; it triggers one more
    // debounced pass which finds the annotation already marked
    let batch = c.highlighter_mut().dom_mut().take_records();
    assert!(!batch.is_empty());
    c.on_mutations(&batch).unwrap();
    assert_eq!(advance(&mut c, 300), 1);
    assert!(c.highlighter_mut().dom_mut().take_records().is_empty());
    assert_eq!(c.highlighter().stats().highlights_created, 1);
    assert_eq!(c.highlighter().stats().elements_skipped, 1);
}

#[test]
fn test_stale_timer_tick_ignored() {
    let (mut c, list) = conductor();
    c.start().unwrap();

    let (_, batch) = add_annotation(&mut c, list, "code 9");
    c.on_mutations(&batch).unwrap();
    assert_eq!(advance(&mut c, 300), 1);
    let stats = c.highlighter().stats().clone();

    // A late tick after the scan already ran does nothing
    assert_eq!(c.on_timer().unwrap(), None);
    assert_eq!(c.debouncer().unwrap().fire_count(), 1);
    assert_eq!(c.highlighter().stats(), &stats);
}

#[test]
fn test_rescan_bypasses_debounce() {
    let (mut c, list) = conductor();
    c.start().unwrap();
    let (annotation, _) = add_annotation(&mut c, list, "Code 31");

    let stats = c.rescan().unwrap();
    assert_eq!(stats.annotations_marked, 1);
    let span = c.highlighter().dom().children(&annotation)[1];
    assert_eq!(c.highlighter().dom().kind(&span), NodeKind::Element);
}

#[test]
fn test_custom_debounce_and_selectors() {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let thread = dom.append_element(body, "main");
    let note = dom.create_element("p");
    dom.append_text(note, "code 64");
    dom.take_records();

    let config = HighlightConfig {
        mode: ScanMode::Container {
            container_selector: "main".to_string(),
            annotation_selector: "p".to_string(),
            debounce_ms: 50,
        },
        ..HighlightConfig::default()
    };
    let highlighter = CodeHighlighter::new(dom, config).unwrap();
    let mut c = ScanConductor::new(highlighter, thread, ManualTimer::new());
    c.start().unwrap();

    c.highlighter_mut().dom_mut().append_child(thread, note);
    let batch = c.highlighter_mut().dom_mut().take_records();
    c.on_mutations(&batch).unwrap();

    assert_eq!(advance(&mut c, 49), 0);
    assert_eq!(advance(&mut c, 1), 1);
    assert_eq!(c.highlighter().dom().attribute(note, MARKER), Some("true"));
}
