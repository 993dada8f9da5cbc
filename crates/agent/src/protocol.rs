//! Turn protocol parser: recognizes `Answer:` and `Action:` markers in
//! raw model output.
//!
//! The model is prompted to reply in one of two shapes:
//!
//! ```text
//! Thought: <reasoning>
//! Answer: <reply to the customer>
//! ```
//!
//! ```text
//! Thought: <reasoning>
//! Action: record_feedback({"question": "Do you bake on Sundays?"})
//! ```
//!
//! Grammar (informal):
//! ```text
//! answer  = WB "answer" WS* ":" REST
//! action  = WB "action" WS* ":" WS* IDENT WS* "(" WS* args
//! args    = object WS* ")"? | ")" | <anything else: malformed>
//! object  = "{" (STRING | object | OTHER)* "}"
//! IDENT   = (alphanumeric | "_")+
//! ```
//!
//! Keywords are case-insensitive and must start at a word boundary.
//! Braces inside JSON strings do not count toward nesting, so argument
//! values may contain `{`, `}` or `)` freely. An `Answer:` inside the
//! argument list of a recognized action is part of the arguments, not a
//! final answer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Range;

const ANSWER_KEYWORD: &str = "answer";
const ACTION_KEYWORD: &str = "action";

/// A tool call parsed from one turn of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    /// Name of the tool to dispatch to
    pub tool_name: String,

    /// Keyword arguments; empty when the argument object was malformed
    pub arguments: Map<String, Value>,

    /// The matched `Action: name(...)` text
    pub raw_text: String,

    /// Why the arguments could not be parsed, if they could not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

/// Classification of one turn of model output.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutput {
    /// An `Answer:` marker was present; holds the extracted answer.
    Answer(String),
    /// No answer, but an `Action:` was present.
    Action(ActionInvocation),
    /// Neither marker.
    Inconclusive,
}

/// Classify model output. `Answer:` takes precedence over `Action:`.
pub fn classify(text: &str) -> TurnOutput {
    if has_final_answer(text) {
        TurnOutput::Answer(extract_answer(text))
    } else if let Some(action) = detect_action(text) {
        TurnOutput::Action(action)
    } else {
        TurnOutput::Inconclusive
    }
}

/// True iff the text contains an `Answer:` marker.
pub fn has_final_answer(text: &str) -> bool {
    answer_marker(text).is_some()
}

/// The text after the first `Answer:` marker, trimmed and cut at the
/// first blank line. Text without a marker is returned unchanged.
pub fn extract_answer(text: &str) -> String {
    let Some(body_start) = answer_marker(text) else {
        return text.to_string();
    };

    let answer = text[body_start..].trim();
    match paragraph_break(answer) {
        Some(end) => answer[..end].trim_end().to_string(),
        None => answer.to_string(),
    }
}

/// The first `Action: name(...)` in the text, if any.
///
/// A marker not followed by `name(` is skipped and scanning continues.
/// Unparsable arguments yield an empty argument map, never an error.
pub fn detect_action(text: &str) -> Option<ActionInvocation> {
    let mut from = 0;
    while let Some((start, after_colon)) = find_marker(text, ACTION_KEYWORD, from) {
        if let Some((action, _)) = parse_call(text, start, after_colon) {
            return Some(action);
        }
        from = start + ACTION_KEYWORD.len();
    }
    None
}

/// Offset just past the colon of the first `Answer:` that is not inside
/// an action's argument list.
fn answer_marker(text: &str) -> Option<usize> {
    let spans = argument_spans(text);
    let mut from = 0;
    while let Some((start, after_colon)) = find_marker(text, ANSWER_KEYWORD, from) {
        match spans.iter().find(|span| span.contains(&start)) {
            Some(span) => from = span.end,
            None => return Some(after_colon),
        }
    }
    None
}

/// Byte ranges covered by the argument lists of every well-formed
/// `Action: name(` in the text.
fn argument_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some((start, after_colon)) = find_marker(text, ACTION_KEYWORD, from) {
        from = start + ACTION_KEYWORD.len();
        if let Some((_, span)) = parse_call(text, start, after_colon) {
            from = from.max(span.end);
            spans.push(span);
        }
    }
    spans
}

// ── Scanner ───────────────────────────────────────────────────────────────

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of the first non-whitespace char at or after `pos`.
fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, _)| pos + i)
}

/// Find `keyword WS* ":"` at a word boundary, starting the search at `from`.
///
/// Returns `(keyword_start, offset_after_colon)`.
fn find_marker(text: &str, keyword: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let kw = keyword.as_bytes();
    let mut i = from;

    while i + kw.len() <= bytes.len() {
        // Keywords are ASCII, so a match always sits on a char boundary.
        if bytes[i..i + kw.len()].eq_ignore_ascii_case(kw) {
            let at_boundary = text[..i].chars().next_back().is_none_or(|c| !is_word_char(c));
            if at_boundary {
                let colon = skip_whitespace(text, i + kw.len());
                if text[colon..].starts_with(':') {
                    return Some((i, colon + 1));
                }
            }
        }
        i += 1;
    }
    None
}

/// Byte offset of the first blank line (`\n`, optional spaces/tabs/CR, `\n`).
fn paragraph_break(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'\n' {
            continue;
        }
        let mut j = i + 1;
        while j < bytes.len() && matches!(bytes[j], b' ' | b'\t' | b'\r') {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'\n' {
            return Some(i);
        }
    }
    None
}

/// End offset (exclusive) of the balanced JSON object starting at `start`.
///
/// `None` if the object is never closed.
fn scan_object(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `WS* IDENT WS* "(" args` after an `Action:` marker.
///
/// Also returns the span of the argument list, from just after `(` to the
/// end of the raw action text.
fn parse_call(
    text: &str,
    start: usize,
    after_colon: usize,
) -> Option<(ActionInvocation, Range<usize>)> {
    let name_start = skip_whitespace(text, after_colon);
    let name_end = text[name_start..]
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(text.len(), |(i, _)| name_start + i);
    if name_end == name_start {
        return None;
    }

    let open = skip_whitespace(text, name_end);
    if !text[open..].starts_with('(') {
        return None;
    }

    let tool_name = text[name_start..name_end].to_string();
    let args_start = skip_whitespace(text, open + 1);
    let (arguments, parse_error, end) = parse_arguments(text, args_start);

    let action = ActionInvocation {
        tool_name,
        arguments,
        raw_text: text[start..end].trim_end().to_string(),
        parse_error,
    };
    Some((action, open + 1..end))
}

/// Parse the argument list starting right after `(`.
///
/// Returns the arguments, a parse error if any, and where the raw action text ends.
fn parse_arguments(text: &str, pos: usize) -> (Map<String, Value>, Option<String>, usize) {
    let rest = &text[pos..];

    if rest.starts_with(')') {
        return (Map::new(), None, pos + 1);
    }

    if rest.starts_with('{') {
        let Some(obj_end) = scan_object(text, pos) else {
            return (
                Map::new(),
                Some("unterminated argument object".into()),
                line_end(text, pos),
            );
        };

        let close = skip_whitespace(text, obj_end);
        let end = if text[close..].starts_with(')') {
            close + 1
        } else {
            obj_end
        };

        return match serde_json::from_str::<Map<String, Value>>(&text[pos..obj_end]) {
            Ok(arguments) => (arguments, None, end),
            Err(e) => (Map::new(), Some(e.to_string()), end),
        };
    }

    let end = rest.find(')').map_or_else(|| line_end(text, pos), |i| pos + i + 1);
    (
        Map::new(),
        Some("arguments must be a JSON object".into()),
        end,
    )
}

fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Answer marker ──

    #[test]
    fn answer_marker_is_case_insensitive() {
        assert!(has_final_answer("Thought: easy\nAnswer: Yes"));
        assert!(has_final_answer("ANSWER : yes"));
        assert!(has_final_answer("final answer: yes"));
        assert!(!has_final_answer("The answer is yes"));
    }

    #[test]
    fn answer_marker_needs_word_boundary() {
        assert!(!has_final_answer("Reanswer: no"));
        assert!(!has_final_answer("Answers: no"));
        assert!(has_final_answer("(Answer: yes)"));
    }

    #[test]
    fn extract_answer_takes_text_after_marker() {
        let text = "Thought: The customer asks about hours.\nAnswer: We open at 7am daily.";
        assert_eq!(extract_answer(text), "We open at 7am daily.");
    }

    #[test]
    fn extract_answer_stops_at_blank_line() {
        let text = "Answer: Fresh batches every 3 hours.\nAsk us anytime!\n\nThought: done";
        assert_eq!(
            extract_answer(text),
            "Fresh batches every 3 hours.\nAsk us anytime!"
        );
    }

    #[test]
    fn extract_answer_treats_whitespace_only_line_as_break() {
        assert_eq!(extract_answer("Answer: one\r\n  \r\ntwo"), "one");
    }

    #[test]
    fn extract_answer_uses_first_marker() {
        assert_eq!(extract_answer("Answer: first\nAnswer: second"), "first\nAnswer: second");
    }

    #[test]
    fn extract_answer_without_marker_is_identity() {
        let text = "We have sourdough and baguettes.";
        let once = extract_answer(text);
        assert_eq!(once, text);
        assert_eq!(extract_answer(&once), once);
    }

    // ── Action marker ──

    #[test]
    fn detects_simple_action() {
        let text = "Thought: log it\nAction: record_feedback({\"question\": \"X\"})";
        let action = detect_action(text).unwrap();
        assert_eq!(action.tool_name, "record_feedback");
        assert_eq!(action.arguments["question"], "X");
        assert_eq!(action.raw_text, "Action: record_feedback({\"question\": \"X\"})");
        assert!(action.parse_error.is_none());
    }

    #[test]
    fn action_keyword_is_case_insensitive() {
        let action = detect_action("action : foo({})").unwrap();
        assert_eq!(action.tool_name, "foo");
        assert!(action.arguments.is_empty());
    }

    #[test]
    fn invalid_json_yields_empty_arguments() {
        let action = detect_action("Action: foo({invalid json").unwrap();
        assert_eq!(action.tool_name, "foo");
        assert!(action.arguments.is_empty());
        assert!(action.parse_error.is_some());
    }

    #[test]
    fn closed_but_invalid_json_yields_empty_arguments() {
        let action = detect_action("Action: foo({'single': 'quotes'})").unwrap();
        assert_eq!(action.tool_name, "foo");
        assert!(action.arguments.is_empty());
        assert_eq!(action.raw_text, "Action: foo({'single': 'quotes'})");
    }

    #[test]
    fn non_object_arguments_are_malformed() {
        let action = detect_action("Action: record_feedback(question=\"X\")\nmore").unwrap();
        assert!(action.arguments.is_empty());
        assert_eq!(action.raw_text, "Action: record_feedback(question=\"X\")");
    }

    #[test]
    fn empty_parens_are_valid() {
        let action = detect_action("Action: list_specials()").unwrap();
        assert!(action.arguments.is_empty());
        assert!(action.parse_error.is_none());
    }

    #[test]
    fn nested_braces_and_parens_in_strings() {
        let text = r#"Action: record_customer_interest({"email": "a@b.c", "name": "Ana", "message": "Cake with {icing} :) and (nuts)", "meta": {"k": [1, 2]}}) trailing"#;
        let action = detect_action(text).unwrap();
        assert_eq!(action.arguments["message"], "Cake with {icing} :) and (nuts)");
        assert_eq!(action.arguments["meta"]["k"][1], 2);
        assert!(action.raw_text.ends_with("}})"));
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let action = detect_action(r#"Action: record_feedback({"question": "Is \"gluten-free}\" real?"})"#)
            .unwrap();
        assert_eq!(action.arguments["question"], "Is \"gluten-free}\" real?");
    }

    #[test]
    fn only_first_action_is_used() {
        let text = "Action: a({\"x\": 1})\nAction: b({\"y\": 2})";
        assert_eq!(detect_action(text).unwrap().tool_name, "a");
    }

    #[test]
    fn marker_without_call_is_skipped() {
        let text = "Action: none needed.\nAction: record_feedback({\"question\": \"Q\"})";
        assert_eq!(detect_action(text).unwrap().tool_name, "record_feedback");
    }

    #[test]
    fn no_action_without_marker() {
        assert!(detect_action("Thought: I should record_feedback({})").is_none());
        assert!(detect_action("Transaction: foo({})").is_none());
    }

    #[test]
    fn pickup_scenario_has_exactly_four_arguments() {
        let text = r#"Action: schedule_pickup({"customer_name":"John","items":"2 loaves","pickup_date":"Saturday","pickup_time":"3 PM"})"#;
        let action = detect_action(text).unwrap();
        assert_eq!(action.tool_name, "schedule_pickup");
        let mut keys: Vec<&str> = action.arguments.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["customer_name", "items", "pickup_date", "pickup_time"]);
        assert_eq!(action.arguments["items"], "2 loaves");
    }

    // ── Classification ──

    #[test]
    fn answer_wins_over_action() {
        let text = "Action: record_feedback({\"question\": \"Q\"})\nAnswer: logged";
        assert_eq!(classify(text), TurnOutput::Answer("logged".into()));
    }

    #[test]
    fn answer_marker_inside_action_arguments_is_not_an_answer() {
        let text = "Thought: log it\nAction: record_feedback({\"question\": \"Answer: vegan?\"})";
        assert!(!has_final_answer(text));
        assert_eq!(extract_answer(text), text);
        match classify(text) {
            TurnOutput::Action(action) => {
                assert_eq!(action.tool_name, "record_feedback");
                assert_eq!(action.arguments["question"], "Answer: vegan?");
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn answer_after_action_with_answer_in_arguments_still_wins() {
        let text = "Action: record_feedback({\"question\": \"Answer: vegan?\"})\nAnswer: logged it";
        assert_eq!(classify(text), TurnOutput::Answer("logged it".into()));
    }

    #[test]
    fn answer_inside_unterminated_arguments_is_masked_to_line_end() {
        let text = "Action: record_feedback({\"question\": \"Answer: vegan?";
        assert!(!has_final_answer(text));
        assert!(matches!(classify(text), TurnOutput::Action(a) if a.parse_error.is_some()));
    }

    #[test]
    fn plain_text_is_inconclusive() {
        assert_eq!(classify("Thought: hmm, let me think"), TurnOutput::Inconclusive);
    }

    #[test]
    fn non_ascii_text_is_scanned_safely() {
        assert_eq!(classify("Pâtisserie — réponse"), TurnOutput::Inconclusive);
        assert_eq!(
            classify("Thought: crème brûlée\nAnswer: Oui, déjà prête ✓"),
            TurnOutput::Answer("Oui, déjà prête ✓".into())
        );
    }
}
