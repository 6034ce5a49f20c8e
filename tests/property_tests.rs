//! Property-based tests for parsing and incremental rendering.

use hubmon::parser::parse_records;
use hubmon::render::{RenderEngine, RenderMode, RenderOutcome, SHOW_LESS, SHOW_MORE};
use proptest::prelude::*;

/// One generated log line and whether it should become a record.
#[derive(Debug, Clone)]
enum Line {
    Message(String),
    OtherType,
    NullMessage,
    Garbage(String),
    Blank(String),
}

impl Line {
    fn raw(&self) -> String {
        match self {
            Line::Message(text) => serde_json::json!({
                "type": "message",
                "message": { "role": "assistant", "content": text },
            })
            .to_string(),
            Line::OtherType => r#"{"type":"status","message":{"role":"user"}}"#.to_string(),
            Line::NullMessage => r#"{"type":"message","message":null}"#.to_string(),
            Line::Garbage(text) => format!("{{not json {text}"),
            Line::Blank(spaces) => spaces.clone(),
        }
    }

    fn is_message(&self) -> bool {
        matches!(self, Line::Message(_))
    }

    fn is_blank(&self) -> bool {
        matches!(self, Line::Blank(_))
    }
}

fn line_strategy() -> impl Strategy<Value = Line> {
    prop_oneof![
        4 => "[a-z ]{0,20}".prop_map(Line::Message),
        1 => Just(Line::OtherType),
        1 => Just(Line::NullMessage),
        1 => "[a-z]{0,8}".prop_map(Line::Garbage),
        1 => "[ \t]{0,3}".prop_map(Line::Blank),
    ]
}

fn join(lines: &[Line]) -> String {
    lines.iter().map(Line::raw).collect::<Vec<_>>().join("\n")
}

fn message(text: &str) -> String {
    Line::Message(text.to_string()).raw()
}

proptest! {
    #[test]
    fn parser_keeps_exactly_the_message_lines(lines in prop::collection::vec(line_strategy(), 0..40)) {
        let content = join(&lines);
        let records: Vec<_> = parse_records(&content).collect();

        let non_blank = lines.iter().filter(|line| !line.is_blank()).count();
        let messages: Vec<String> = lines
            .iter()
            .filter_map(|line| match line {
                Line::Message(text) => Some(text.clone()),
                _ => None,
            })
            .collect();

        prop_assert!(records.len() <= non_blank);
        prop_assert_eq!(records.len(), lines.iter().filter(|line| line.is_message()).count());
        let texts: Vec<String> = records.iter().map(|record| record.text()).collect();
        prop_assert_eq!(texts, messages);
    }

    #[test]
    fn parser_is_restartable(lines in prop::collection::vec(line_strategy(), 0..20)) {
        let content = join(&lines);
        let records = parse_records(&content);
        prop_assert_eq!(records.clone().count(), records.count());
    }

    #[test]
    fn repeated_incremental_render_appends_nothing(
        lines in prop::collection::vec(line_strategy(), 0..30),
    ) {
        let content = join(&lines);
        let mut engine = RenderEngine::new(20, true);

        engine.render(&content, RenderMode::Incremental);
        let first = engine.last_rendered_count();
        let bubbles = engine.bubbles().len();

        prop_assert_eq!(engine.render(&content, RenderMode::Incremental), RenderOutcome::Unchanged);
        prop_assert_eq!(engine.last_rendered_count(), first);
        prop_assert_eq!(engine.bubbles().len(), bubbles);
    }

    #[test]
    fn incremental_growth_appends_exactly_the_suffix(
        prefix in prop::collection::vec("[a-z]{1,10}", 0..10),
        suffix in prop::collection::vec("[a-z]{1,10}", 1..10),
    ) {
        let before: Vec<String> = prefix.iter().map(|text| message(text)).collect();
        let after: Vec<String> = prefix.iter().chain(&suffix).map(|text| message(text)).collect();

        let mut engine = RenderEngine::new(20, true);
        engine.render(&before.join("\n"), RenderMode::Full);
        let outcome = engine.render(&after.join("\n"), RenderMode::Incremental);

        prop_assert_eq!(outcome, RenderOutcome::Appended {
            from: prefix.len(),
            to: prefix.len() + suffix.len(),
        });
        let appended: Vec<String> = engine.bubbles()[prefix.len()..]
            .iter()
            .map(|bubble| bubble.lines().join("\n"))
            .collect();
        prop_assert_eq!(appended, suffix);
    }

    #[test]
    fn rendered_count_never_decreases_under_incremental(
        sizes in prop::collection::vec(0usize..15, 1..10),
    ) {
        let mut engine = RenderEngine::new(20, true);
        let mut previous = 0;
        for size in sizes {
            let content = (0..size).map(|i| message(&format!("m{i}"))).collect::<Vec<_>>().join("\n");
            engine.render(&content, RenderMode::Incremental);
            prop_assert!(engine.last_rendered_count() >= previous);
            previous = engine.last_rendered_count();
        }
    }

    #[test]
    fn truncation_toggle_round_trips(line_count in 1usize..40, max_lines in 1usize..30) {
        let text = (0..line_count).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut engine = RenderEngine::new(max_lines, true);
        engine.render(&message(&text), RenderMode::Full);

        let bubble = &engine.bubbles()[0];
        let capped = line_count > max_lines;
        prop_assert_eq!(bubble.truncation().is_collapsed(), capped);
        prop_assert_eq!(bubble.visible_lines().len(), line_count.min(max_lines));
        let initial_label = bubble.truncation().label();
        prop_assert_eq!(initial_label, capped.then_some(SHOW_MORE));

        prop_assert_eq!(engine.toggle_expand(0), capped);
        if capped {
            prop_assert_eq!(engine.bubbles()[0].truncation().label(), Some(SHOW_LESS));
            prop_assert_eq!(engine.bubbles()[0].visible_lines().len(), line_count);
        }
        engine.toggle_expand(0);

        let bubble = &engine.bubbles()[0];
        prop_assert_eq!(bubble.truncation().label(), initial_label);
        prop_assert_eq!(bubble.visible_lines().len(), line_count.min(max_lines));
    }
}
