//! End-to-end tests: markup in, commands and diagnostics out

use crate::*;

fn document(commands: &[&str]) -> String {
    let mut markup = String::from("<div class=\"page\" data-page=\"1\">\n<p id=\"p1-1\">Hello</p>\n</div>\n");
    markup.push_str(START_MARKER);
    markup.push('\n');
    markup.push_str("<!-- Add one command per line, e.g. REPLACE_PARAGRAPH([id],[text]) -->\n");
    for command in commands {
        markup.push_str(command);
        markup.push('\n');
    }
    markup.push_str(END_MARKER);
    markup.push('\n');
    markup
}

#[test]
fn test_parse_mixed_document() {
    let markup = document(&[
        "<!-- REPLACE_PARAGRAPH([p1-1],[Hello World]) -->",
        "<!-- DELETE_PARAGRAPH([p1-1],[p1-2]) -->",
        "",
        "<!-- MOVE_PARAGRAPH([p1-2],[p1-1],[before]) -->",
    ]);

    let result = parse(&markup);

    assert_eq!(result.commands.len(), 2);
    assert_eq!(result.errors.len(), 1);
    assert!(!result.is_clean());

    let replace = &result.commands[0];
    assert_eq!(replace.command_type(), CommandType::ReplaceParagraph);
    assert_eq!(replace.line_number, Some(6));

    let error = &result.errors[0];
    assert_eq!(error.line_number, Some(7));
    assert_eq!(error.raw_command, "DELETE_PARAGRAPH([p1-1],[p1-2])");
    assert!(matches!(error.kind, ParseErrorKind::ArgumentCount { found: 2, .. }));
    assert_eq!(&markup[error.span.clone().unwrap()], error.raw_command);

    assert_eq!(result.commands[1].command_type(), CommandType::MoveParagraph);
}

#[test]
fn test_ids_are_stable_per_markup() {
    let markup = document(&[
        "<!-- DELETE_PARAGRAPH([p1-1]) -->",
        "<!-- DELETE_PARAGRAPH([p1-2]) -->",
    ]);

    let first = parse(&markup);
    let second = parse(&markup);

    assert_eq!(first.commands[0].id, second.commands[0].id);
    assert_ne!(first.commands[0].id, first.commands[1].id);
    assert!(first.commands[1].id.ends_with("-2"));
}

#[test]
fn test_markup_without_area_parses_to_nothing() {
    let markup = "<p>no commands here</p>\n<!-- DELETE_PARAGRAPH([p1-1]) -->";
    assert!(parse(markup).is_empty());
}

#[test]
fn test_area_missing_end_marker_parses_to_nothing() {
    let markup = format!("{}\n<!-- DELETE_PARAGRAPH([p1-1]) -->\n", START_MARKER);
    assert!(parse(&markup).is_empty());
}

#[test]
fn test_crlf_markup() {
    let markup = document(&["<!-- SPLIT_PARAGRAPH([p1-1],[3]) -->"]).replace('\n', "\r\n");
    let result = parse(&markup);

    assert!(result.is_clean());
    assert_eq!(result.commands.len(), 1);
    assert_eq!(
        result.commands[0].kind,
        CommandKind::SplitParagraph {
            target: ParagraphId::persisted(1, 1),
            offset: 3,
        }
    );
}

#[test]
fn test_custom_area() {
    let area = CommandArea::new("<!-- agent:begin -->", "<!-- agent:end -->");
    let markup = "<!-- agent:begin -->\n<!-- MERGE_PARAGRAPH([p1-2],[prev]) -->\n<!-- agent:end -->";

    let result = parse_with_area(markup, &area);
    assert_eq!(result.commands.len(), 1);
    assert!(parse(markup).is_empty());
}

#[test]
fn test_parse_result_serializes() {
    let markup = document(&["<!-- SPLIT_PARAGRAPH([p1-1],[x]) -->"]);
    let result = parse(&markup);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["commands"].as_array().unwrap().len(), 0);
    assert_eq!(json["errors"][0]["kind"]["kind"], "invalidOffset");
    assert_eq!(json["errors"][0]["rawCommand"], "SPLIT_PARAGRAPH([p1-1],[x])");
}
