//! Property-based tests for the command parser
//!
//! Well-formed commands always parse; anything else yields a diagnostic
//! instead of panicking.

use proptest::prelude::*;
use redline_commands::{
    parse, parse_command, CommandKind, CommandType, ParseErrorKind, END_MARKER, START_MARKER,
};

fn paragraph_id() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..500, 1u32..500).prop_map(|(page, index)| format!("p{}-{}", page, index)),
        "[a-z0-9]{1,8}(-[0-9]{1,3})?".prop_map(|rest| format!("tmp-{}", rest)),
    ]
}

/// Content without brackets or comment terminators
fn content() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,.;:!?'()-]{0,40}"
}

fn position() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("before"), Just("after"), Just("BEFORE")]
}

fn direction() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("prev"), Just("next")]
}

fn well_formed_command() -> impl Strategy<Value = String> {
    prop_oneof![
        (paragraph_id(), content())
            .prop_map(|(id, text)| format!("REPLACE_PARAGRAPH([{}],[{}])", id, text)),
        (paragraph_id(), position(), content())
            .prop_map(|(id, pos, text)| format!("INSERT_PARAGRAPH([{}],[{}],[{}])", id, pos, text)),
        paragraph_id().prop_map(|id| format!("DELETE_PARAGRAPH([{}])", id)),
        (paragraph_id(), paragraph_id(), position())
            .prop_map(|(id, anchor, pos)| format!("MOVE_PARAGRAPH([{}],[{}],[{}])", id, anchor, pos)),
        (paragraph_id(), 0usize..10_000)
            .prop_map(|(id, offset)| format!("SPLIT_PARAGRAPH([{}],[{}])", id, offset)),
        (paragraph_id(), direction())
            .prop_map(|(id, dir)| format!("MERGE_PARAGRAPH([{}],[{}])", id, dir)),
    ]
}

proptest! {
    #[test]
    fn well_formed_commands_always_parse(raw in well_formed_command()) {
        let parsed = parse_command(&raw);
        prop_assert!(parsed.is_ok(), "{:?} -> {:?}", raw, parsed);
    }

    #[test]
    fn nested_brackets_stay_inside_content(inner in "[a-z ]{0,10}") {
        let raw = format!("REPLACE_PARAGRAPH([p1-1],[see [{}] here])", inner);
        let command = parse_command(&raw).unwrap();
        let expected = format!("see [{}] here", inner);
        let CommandKind::ReplaceParagraph { content, .. } = command.kind else {
            return Err(TestCaseError::fail("expected a replace command"));
        };
        prop_assert_eq!(content, expected);
    }

    #[test]
    fn arbitrary_strings_never_panic(raw in "\\PC{0,80}") {
        let _ = parse_command(&raw);
    }

    #[test]
    fn unknown_verbs_are_diagnostics(verb in "[A-Z_]{1,20}", args in "[^()]{0,20}") {
        prop_assume!(verb.parse::<CommandType>().is_err());
        let raw = format!("{}({})", verb, args);
        let err = parse_command(&raw).unwrap_err();
        prop_assert_eq!(err.kind, ParseErrorKind::UnknownCommand(verb));
    }

    #[test]
    fn whole_documents_never_panic(body in "\\PC{0,200}") {
        let markup = format!("{}\n{}\n{}", START_MARKER, body, END_MARKER);
        let _ = parse(&markup);
    }

    #[test]
    fn each_command_line_yields_one_outcome(commands in prop::collection::vec(well_formed_command(), 0..8)) {
        let mut markup = format!("{}\n", START_MARKER);
        for command in &commands {
            markup.push_str(&format!("<!-- {} -->\n", command));
        }
        markup.push_str(END_MARKER);

        let result = parse(&markup);
        prop_assert_eq!(result.commands.len() + result.errors.len(), commands.len());
        prop_assert!(result.errors.is_empty());
    }
}
