//! Integration tests for editor crate

use redline_commands::parse;
use redline_editor::{
    execute_all, Block, BlockTree, Document, FailureKind, Page, ReviewSession, ReviewState,
};

fn markup(lines: &[&str]) -> String {
    let body: Vec<String> = lines.iter().map(|l| format!("<!-- {l} -->")).collect();
    format!(
        "<p>Document text</p>\n<!-- EDIT_COMMANDS_START -->\n{}\n<!-- EDIT_COMMANDS_END -->\n",
        body.join("\n")
    )
}

fn single_page(texts: &[&str]) -> Document {
    Document::from_paragraphs("integration.json", texts).unwrap()
}

#[test]
fn test_replace_end_to_end() {
    let parsed = parse(&markup(&["REPLACE_PARAGRAPH([p1-1],[Hello World])"]));
    assert!(parsed.is_clean());

    let mut doc = single_page(&["Hi"]);
    let results = execute_all(&mut doc, &parsed.commands);

    assert_eq!(results.len(), 1);
    assert!(results[0].success());
    assert_eq!(results[0].affected_paragraph_ids(), ["p1-1"]);
    assert_eq!(doc.texts(), vec!["Hello World"]);
}

#[test]
fn test_insert_creates_missing_page() {
    let parsed = parse(&markup(&["INSERT_PARAGRAPH([p2-1],[before],[New Text])"]));
    let mut doc = single_page(&["Only page"]);

    let results = execute_all(&mut doc, &parsed.commands);

    assert!(results[0].success());
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.pages()[1].blocks.len(), 1);
    assert_eq!(doc.pages()[1].blocks[0].text, "New Text");
}

#[test]
fn test_results_are_one_to_one_with_commands() {
    let parsed = parse(&markup(&[
        "REPLACE_PARAGRAPH([p1-1],[A])",
        "DELETE_PARAGRAPH([p9-9])",
        "MERGE_PARAGRAPH([p1-2],[prev])",
        "SPLIT_PARAGRAPH([p1-1],[100])",
        "MOVE_PARAGRAPH([p1-3],[p1-1],[before])",
    ]));
    assert_eq!(parsed.commands.len(), 5);

    let mut doc = single_page(&["a", "b", "c"]);
    let results = execute_all(&mut doc, &parsed.commands);

    assert_eq!(results.len(), parsed.commands.len());
    for (result, command) in results.iter().zip(&parsed.commands) {
        assert_eq!(result.command_id(), command.id);
        assert_eq!(result.raw_command(), command.raw);
    }
}

#[test]
fn test_later_commands_see_split_ids() {
    let mut doc = single_page(&["Hello World"]);
    let parsed = parse(&markup(&["SPLIT_PARAGRAPH([p1-1],[5])"]));
    let split = execute_all(&mut doc, &parsed.commands);
    let new_id = split[0].affected_paragraph_ids()[1].clone();

    let follow_up = format!("REPLACE_PARAGRAPH([{new_id}],[ there])");
    let parsed = parse(&markup(&[follow_up.as_str()]));
    let results = execute_all(&mut doc, &parsed.commands);

    assert!(results[0].success(), "{:?}", results[0].error());
    assert_eq!(doc.texts(), vec!["Hello", " there"]);
}

#[test]
fn test_same_batch_can_target_created_ids() {
    // temp ids are derived from the document name, so a fresh document with
    // the same name hands out the same sequence
    let mut probe = single_page(&["x"]);
    let first_temp = probe.allocate_temp_id();

    let mut doc = single_page(&["Hello World"]);
    let follow_up = format!("MERGE_PARAGRAPH([{first_temp}],[prev])");
    let parsed = parse(&markup(&["SPLIT_PARAGRAPH([p1-1],[5])", follow_up.as_str()]));
    let results = execute_all(&mut doc, &parsed.commands);

    assert!(results.iter().all(|r| r.success()));
    assert_eq!(doc.texts(), vec!["Hello World"]);
    assert_eq!(doc.ids(), vec![first_temp.as_str()]);
}

#[test]
fn test_page_one_guard_leaves_tree_unchanged() {
    let mut doc = Document::new(
        "guard.json",
        vec![
            Page::new(1, vec![Block::paragraph("cover").with_id("p1-1")]),
            Page::new(2, vec![Block::paragraph("body").with_id("p2-1")]),
        ],
    )
    .unwrap();
    let before = doc.to_json().unwrap();

    let parsed = parse(&markup(&[
        "DELETE_PARAGRAPH([p1-1])",
        "MERGE_PARAGRAPH([p2-1],[prev])",
        "MOVE_PARAGRAPH([p1-1],[p2-1],[before])",
    ]));
    let results = execute_all(&mut doc, &parsed.commands);

    for result in &results {
        assert_eq!(result.failure_kind(), Some(FailureKind::InvariantViolation));
    }
    assert_eq!(doc.to_json().unwrap(), before);
    assert_eq!(doc.version, 0);
}

#[test]
fn test_partial_failure_applies_successful_subset() {
    let parsed = parse(&markup(&[
        "REPLACE_PARAGRAPH([p1-1],[First])",
        "REPLACE_PARAGRAPH([p1-5],[Nowhere])",
        "REPLACE_PARAGRAPH([p1-2],[Second])",
    ]));
    let mut session = ReviewSession::new(single_page(&["a", "b"]));

    let outcome = session.run_batch(&parsed.commands);

    assert_eq!(outcome.summary.succeeded, 2);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(outcome.highlight.applied, 2);
    assert_eq!(session.state(), ReviewState::AutoEditPending);

    let marked: Vec<bool> = session.tree().blocks().map(|(_, b)| b.is_marked()).collect();
    assert_eq!(marked, vec![true, true]);
}

#[test]
fn test_review_approve_then_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    single_page(&["Draft"]).save_to(&path).unwrap();

    let parsed = parse(&markup(&[
        "REPLACE_PARAGRAPH([p1-1],[Final])",
        "INSERT_PARAGRAPH([p1-1],[after],[Appendix])",
    ]));
    let mut session = ReviewSession::new(Document::load(&path).unwrap());
    session.run_batch(&parsed.commands);

    let doc = session.approve().unwrap();
    doc.renumber();
    doc.save().unwrap();

    let saved = Document::load(&path).unwrap();
    assert_eq!(saved.texts(), vec!["Final", "Appendix"]);
    assert_eq!(saved.ids(), vec!["p1-1", "p1-2"]);
    assert!(saved.blocks().all(|(_, b)| !b.is_marked()));
}

#[test]
fn test_review_reject_discards_batch() {
    let parsed = parse(&markup(&[
        "DELETE_PARAGRAPH([p1-2])",
        "INSERT_PARAGRAPH([p3-1],[after],[Appendix])",
    ]));
    let original = single_page(&["a", "b"]);
    let mut session = ReviewSession::new(original.clone());

    session.run_batch(&parsed.commands);
    assert_eq!(session.tree().page_count(), 2);

    session.reject().unwrap();
    assert_eq!(
        session.tree().to_json().unwrap(),
        original.to_json().unwrap()
    );
}
