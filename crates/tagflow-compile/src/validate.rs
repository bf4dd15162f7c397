//! Pre-compile AST validators.
//!
//! Validators accumulate messages over the whole program; they never stop
//! at the first finding. Both walk every node, including the sub-graphs
//! nested in ask answers and consider answers/else branches. Message
//! order is deterministic: repeat-id errors are emitted sorted by node id
//! (one per repeated id), duplicate-answer warnings follow AST order.

use std::collections::{BTreeMap, HashSet};

use tagflow_ast::{walk_nodes, AstNode};

use crate::error::{Severity, ValidationMessage};

/// Reports an `ERROR` for every node id that appears more than once.
///
/// Nodes without an id cannot collide (the compiler generates fresh ids
/// for them) and are skipped.
pub fn validate_repeat_ids(nodes: &[AstNode]) -> Vec<ValidationMessage> {
    let mut seen = HashSet::new();
    let mut messages: BTreeMap<String, ValidationMessage> = BTreeMap::new();

    walk_nodes(nodes, &mut |node| {
        if let Some(id) = node.id() {
            if !seen.insert(id.to_string()) {
                messages.entry(id.to_string()).or_insert_with(|| {
                    ValidationMessage::error(
                        format!("Duplicate node id: \"{id}\"."),
                        Some(id.to_string()),
                    )
                });
            }
        }
    });

    messages.into_values().collect()
}

/// Reports a `WARNING` for every repeated answer on an ask or consider
/// node: ask answers compare by text, consider answers by their value
/// list (or assignment list, for compound slots).
pub fn validate_duplicate_answers(nodes: &[AstNode]) -> Vec<ValidationMessage> {
    let mut messages = Vec::new();

    walk_nodes(nodes, &mut |node| match node {
        AstNode::Ask(ask) => {
            let mut earlier: Vec<&str> = Vec::new();
            for answer in &ask.answers {
                if earlier.contains(&answer.text.as_str()) {
                    messages.push(ValidationMessage {
                        severity: Severity::Warning,
                        message: format!(
                            "ask node \"{}\" has duplicate answers",
                            node.id().unwrap_or("?")
                        ),
                        node_id: node.id().map(String::from),
                    });
                }
                earlier.push(&answer.text);
            }
        }
        AstNode::Consider(consider) => {
            let mut earlier = Vec::new();
            for answer in &consider.answers {
                let payload = (&answer.values, &answer.assignments);
                if earlier.contains(&payload) {
                    messages.push(ValidationMessage {
                        severity: Severity::Warning,
                        message: format!(
                            "consider node \"{}\" has duplicate answers",
                            node.id().unwrap_or("?")
                        ),
                        node_id: node.id().map(String::from),
                    });
                }
                earlier.push(payload);
            }
        }
        _ => {}
    });

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_ast::{AstAnswer, AstAskNode, AstConsiderAnswer, AstConsiderNode, AstTodoNode};

    fn todo(id: Option<&str>) -> AstNode {
        AstNode::Todo(AstTodoNode {
            id: id.map(String::from),
            text: "todo".into(),
        })
    }

    fn ask(id: &str, answers: Vec<(&str, Vec<AstNode>)>) -> AstNode {
        AstNode::Ask(AstAskNode {
            id: Some(id.into()),
            text: "?".into(),
            terms: Vec::new(),
            answers: answers
                .into_iter()
                .map(|(text, sub_graph)| AstAnswer {
                    text: text.into(),
                    sub_graph,
                })
                .collect(),
        })
    }

    #[test]
    fn test_unique_ids_pass() {
        let program = vec![todo(Some("a")), todo(Some("b")), todo(None), todo(None)];
        assert!(validate_repeat_ids(&program).is_empty());
    }

    #[test]
    fn test_repeated_id_is_an_error_reported_once() {
        let program = vec![todo(Some("a")), todo(Some("a")), todo(Some("a"))];
        let messages = validate_repeat_ids(&program);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Error);
        assert_eq!(messages[0].message, "Duplicate node id: \"a\".");
        assert_eq!(messages[0].node_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_repeat_ids_are_sorted() {
        let program = vec![
            todo(Some("z")),
            todo(Some("z")),
            todo(Some("a")),
            todo(Some("a")),
        ];
        let messages = validate_repeat_ids(&program);
        let ids: Vec<_> = messages.iter().filter_map(|m| m.node_id.as_deref()).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[test]
    fn test_repeat_ids_found_in_nested_subgraphs() {
        let program = vec![
            ask("q", vec![("yes", vec![todo(Some("dup"))])]),
            todo(Some("dup")),
        ];
        let messages = validate_repeat_ids(&program);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].node_id.as_deref(), Some("dup"));
    }

    #[test]
    fn test_duplicate_ask_answers_warn() {
        let program = vec![ask(
            "q",
            vec![("yes", Vec::new()), ("no", Vec::new()), ("yes", Vec::new())],
        )];
        let messages = validate_duplicate_answers(&program);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Warning);
        assert!(messages[0].message.contains("\"q\""));
    }

    #[test]
    fn test_distinct_answers_pass() {
        let program = vec![ask("q", vec![("yes", Vec::new()), ("no", Vec::new())])];
        assert!(validate_duplicate_answers(&program).is_empty());
    }

    #[test]
    fn test_duplicate_consider_answers_warn() {
        let answer = |values: Vec<&str>| AstConsiderAnswer {
            values: Some(values.into_iter().map(String::from).collect()),
            assignments: None,
            sub_graph: Vec::new(),
        };
        let program = vec![AstNode::Consider(AstConsiderNode {
            id: Some("c".into()),
            slot: Some(vec!["Handling".into()]),
            answers: vec![answer(vec!["open"]), answer(vec!["open"])],
            else_graph: None,
        })];

        let messages = validate_duplicate_answers(&program);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message.contains("consider node"));
    }

    #[test]
    fn test_duplicate_answers_found_in_nested_subgraphs() {
        let inner = ask("inner", vec![("yes", Vec::new()), ("yes", Vec::new())]);
        let program = vec![ask("outer", vec![("no", vec![inner])])];

        let messages = validate_duplicate_answers(&program);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].node_id.as_deref(), Some("inner"));
    }
}
