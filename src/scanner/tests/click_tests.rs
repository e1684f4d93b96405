//! Tests for highlight span click behavior (copy + event interception)

use crate::dom::{DomHost, Listener, MemoryDom, NodeId};
use crate::scanner::config::HighlightConfig;
use crate::scanner::highlighter::CodeHighlighter;

/// Highlight `text` inside `<div><p>text</p></div>` with recording
/// listeners on both ancestors; returns the highlighter and the spans
fn highlighted(text: &str) -> (CodeHighlighter<MemoryDom>, Vec<NodeId>) {
    let mut hl = CodeHighlighter::new(MemoryDom::new(), HighlightConfig::default()).unwrap();
    let body = hl.dom().body();
    let dom = hl.dom_mut();
    let div = dom.append_element(body, "div");
    let p = dom.append_element(div, "p");
    dom.append_text(p, text);
    dom.add_listener(div, Listener::Record("div".into()));
    dom.add_listener(p, Listener::Record("p".into()));

    hl.scan(&body).unwrap();

    let spans = hl
        .dom()
        .children(&p)
        .into_iter()
        .filter(|n| hl.dom().attribute(*n, "data-code-highlighted").is_some())
        .collect();
    (hl, spans)
}

#[test]
fn test_click_copies_exact_digits() {
    let (mut hl, spans) = highlighted("Your code is code 123456, please enter it");
    assert_eq!(spans.len(), 1);

    hl.dom_mut().click(spans[0]);
    assert_eq!(hl.dom().clipboard(), &["123456".to_string()]);
}

#[test]
fn test_click_does_not_reach_ancestors() {
    let (mut hl, spans) = highlighted("code 42");

    let outcome = hl.dom_mut().click(spans[0]);
    assert!(outcome.fired.is_empty());
    assert!(outcome.default_prevented);
}

#[test]
fn test_click_on_plain_text_still_bubbles() {
    let (mut hl, _) = highlighted("code 42");
    let body = hl.dom().body();
    let div = hl.dom().children(&body)[0];
    let p = hl.dom().children(&div)[0];
    let leading_text = hl.dom().children(&p)[0];

    let outcome = hl.dom_mut().click(leading_text);
    assert_eq!(outcome.fired, vec!["p", "div"]);
    assert!(hl.dom().clipboard().is_empty());
}

#[test]
fn test_each_span_copies_its_own_code() {
    let (mut hl, spans) = highlighted("code 111 or code 222");
    assert_eq!(spans.len(), 2);

    hl.dom_mut().click(spans[1]);
    hl.dom_mut().click(spans[0]);
    assert_eq!(hl.dom().clipboard(), &["222".to_string(), "111".to_string()]);
}

#[test]
fn test_span_has_single_copy_listener() {
    let (hl, spans) = highlighted("code 7");
    assert_eq!(
        hl.dom().listeners(spans[0]),
        &[Listener::CopyCode("7".to_string())]
    );
}

#[test]
fn test_denied_clipboard_fails_silently() {
    let (mut hl, spans) = highlighted("code 9");
    hl.dom_mut().deny_clipboard();

    let outcome = hl.dom_mut().click(spans[0]);
    assert!(outcome.default_prevented);
    assert!(outcome.fired.is_empty());
    assert!(hl.dom().clipboard().is_empty());
}
