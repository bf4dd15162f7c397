//! Compile-and-run scenarios over a small tag space, plus boundary cases
//! for the compiler's implicit wiring.

use std::sync::Arc;

use tagflow::{
    compile, Answer, AtomicType, CompileError, CompoundType, DecisionGraph, Engine, EngineStatus,
    NodeId, SchemaError, TagType, TagValue, SYN_END,
};
use tagflow_ast::{
    AstAnswer, AstAskNode, AstAssignment, AstConsiderAnswer, AstConsiderNode, AstEndNode, AstNode,
    AstRejectNode, AstSetNode, AstTodoNode,
};

/// Top
/// ├── Handling        (atomic: open | restricted | sealed)
/// └── Storage
///     ├── Encryption  (atomic: none | at_rest)
///     └── Topics      (aggregate over Topic: health | finance | location)
fn space() -> CompoundType {
    let handling = AtomicType::new("Handling").with_values(["open", "restricted", "sealed"]);
    let encryption = AtomicType::new("Encryption").with_values(["none", "at_rest"]);
    let topic = AtomicType::new("Topic").with_values(["health", "finance", "location"]);
    let storage = CompoundType::new("Storage")
        .with_field(TagType::Atomic(encryption))
        .with_field(TagType::Aggregate(tagflow::AggregateType::new(
            "Topics", topic,
        )));
    CompoundType::new("Top")
        .with_field(TagType::Atomic(handling))
        .with_field(TagType::Compound(storage))
}

fn slot(s: &str) -> Vec<String> {
    s.split('/').map(String::from).collect()
}

fn ask(id: &str, answers: Vec<(&str, Vec<AstNode>)>) -> AstNode {
    AstNode::Ask(AstAskNode {
        id: Some(id.into()),
        text: format!("{id}?"),
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

fn set_atomic(id: &str, slot_ref: &str, value: &str) -> AstNode {
    AstNode::Set(AstSetNode {
        id: Some(id.into()),
        assignments: vec![AstAssignment::Atomic {
            slot: slot(slot_ref),
            value: value.into(),
        }],
    })
}

fn todo(id: &str) -> AstNode {
    AstNode::Todo(AstTodoNode {
        id: Some(id.into()),
        text: id.into(),
    })
}

fn end(id: &str) -> AstNode {
    AstNode::End(AstEndNode { id: Some(id.into()) })
}

fn run(graph: DecisionGraph, answers: &[Answer]) -> Engine {
    let mut engine = Engine::new(Arc::new(graph));
    engine.start().unwrap();
    for answer in answers {
        engine.answer(answer).unwrap();
    }
    engine
}

fn trace_of(engine: &Engine) -> Vec<&str> {
    engine.trace().iter().map(NodeId::as_str).collect()
}

#[test]
fn empty_program_runs_to_the_synthesized_end() {
    let graph = compile(Vec::new(), space()).unwrap();
    let engine = run(graph, &[]);

    assert_eq!(engine.status(), EngineStatus::Accepted);
    assert_eq!(trace_of(&engine), vec![SYN_END]);
}

#[test]
fn set_nodes_accumulate_across_branches() {
    let program = vec![
        set_atomic("s1", "Encryption", "at_rest"),
        ask(
            "q",
            vec![("yes", vec![set_atomic("s2", "Handling", "open")])],
        ),
        end("e"),
    ];
    let graph = compile(program, space()).unwrap();
    let engine = run(graph, &[Answer::yes()]);

    assert_eq!(engine.status(), EngineStatus::Accepted);
    assert_eq!(trace_of(&engine), vec!["s1", "q", "s2", "e"]);

    let tags = engine.accumulator();
    match tags.get("Handling").unwrap() {
        TagValue::Atomic(v) => assert_eq!(v.name(), "open"),
        other => panic!("unexpected {other:?}"),
    }
    match tags
        .project(&["Storage".to_string(), "Encryption".to_string()])
        .unwrap()
    {
        TagValue::Atomic(v) => assert_eq!(v.name(), "at_rest"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn implied_no_answer_falls_through() {
    // "q" authors only a yes branch; answering no must take the implied
    // edge to the syntactically next node
    let program = vec![
        ask("q", vec![("yes", vec![todo("taken_on_yes")])]),
        todo("after"),
        end("e"),
    ];
    let graph = compile(program, space()).unwrap();
    let engine = run(graph, &[Answer::no()]);

    assert_eq!(trace_of(&engine), vec!["q", "after", "e"]);
}

#[test]
fn consider_routes_on_the_accumulated_value() {
    let consider = AstNode::Consider(AstConsiderNode {
        id: Some("c".into()),
        slot: Some(slot("Handling")),
        answers: vec![
            AstConsiderAnswer {
                values: Some(vec!["open".into()]),
                assignments: None,
                sub_graph: vec![todo("when_open")],
            },
            AstConsiderAnswer {
                values: Some(vec!["sealed".into()]),
                assignments: None,
                sub_graph: vec![todo("when_sealed")],
            },
        ],
        else_graph: Some(vec![todo("otherwise")]),
    });
    let program = vec![set_atomic("s", "Handling", "open"), consider, end("e")];
    let graph = compile(program, space()).unwrap();

    let engine = run(graph, &[]);
    assert_eq!(engine.status(), EngineStatus::Accepted);
    assert_eq!(trace_of(&engine), vec!["s", "c", "when_open", "e"]);
}

#[test]
fn consider_takes_else_when_the_slot_is_unset() {
    let consider = AstNode::Consider(AstConsiderNode {
        id: Some("c".into()),
        slot: Some(slot("Handling")),
        answers: vec![AstConsiderAnswer {
            values: Some(vec!["open".into()]),
            assignments: None,
            sub_graph: vec![todo("when_open")],
        }],
        else_graph: Some(vec![todo("otherwise")]),
    });
    let program = vec![consider, end("e")];
    let graph = compile(program, space()).unwrap();

    let engine = run(graph, &[]);
    assert_eq!(trace_of(&engine), vec!["c", "otherwise", "e"]);
}

#[test]
fn consider_aggregate_slot_matches_whole_sets() {
    let consider = AstNode::Consider(AstConsiderNode {
        id: Some("c".into()),
        slot: Some(slot("Topics")),
        answers: vec![
            AstConsiderAnswer {
                values: Some(vec!["health".into()]),
                assignments: None,
                sub_graph: vec![todo("health_only")],
            },
            AstConsiderAnswer {
                // authored order differs from accumulation order; set
                // equality must still match
                values: Some(vec!["finance".into(), "health".into()]),
                assignments: None,
                sub_graph: vec![todo("both")],
            },
        ],
        else_graph: Some(vec![todo("otherwise")]),
    });
    let set = AstNode::Set(AstSetNode {
        id: Some("s".into()),
        assignments: vec![AstAssignment::Aggregate {
            slot: slot("Topics"),
            values: vec!["health".into(), "finance".into()],
        }],
    });
    let program = vec![set, consider, end("e")];
    let graph = compile(program, space()).unwrap();

    let engine = run(graph, &[]);
    assert_eq!(trace_of(&engine), vec!["s", "c", "both", "e"]);
}

#[test]
fn reject_stops_the_run_with_rejection() {
    let program = vec![
        ask(
            "q",
            vec![(
                "no",
                vec![AstNode::Reject(AstRejectNode {
                    id: Some("r".into()),
                    reason: "cannot proceed".into(),
                })],
            )],
        ),
        end("e"),
    ];
    let graph = compile(program, space()).unwrap();

    let mut engine = Engine::new(Arc::new(graph));
    engine.start().unwrap();
    let awaiting = engine.answer(&Answer::no()).unwrap();

    assert!(!awaiting);
    assert_eq!(engine.status(), EngineStatus::Rejected);
    assert_eq!(trace_of(&engine), vec!["q", "r"]);
}

#[test]
fn ambiguous_abbreviation_is_a_compile_error() {
    // two slots end in "b"; referring to plain "b" is ambiguous
    let mid = CompoundType::new("mid")
        .with_field(TagType::Atomic(AtomicType::new("b").with_value("v")));
    let mid2 = CompoundType::new("mid2")
        .with_field(TagType::Atomic(AtomicType::new("b").with_value("v")));
    let ambiguous_space = CompoundType::new("top")
        .with_field(TagType::Compound(mid))
        .with_field(TagType::Compound(mid2));

    let program = vec![set_atomic("s", "b", "v"), end("e")];
    let err = compile(program, ambiguous_space).unwrap_err();

    match err {
        CompileError::BadSetInstruction { source, node } => {
            assert_eq!(source, SchemaError::AmbiguousSlot("b".into()));
            assert_eq!(node, "s".into());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn fresh_engines_replay_identically() {
    let program = vec![
        set_atomic("s", "Handling", "restricted"),
        ask("q", vec![("yes", Vec::new()), ("no", Vec::new())]),
        end("e"),
    ];
    let graph = Arc::new(compile(program, space()).unwrap());

    let mut first = Engine::new(Arc::clone(&graph));
    first.start().unwrap();
    first.answer(&Answer::no()).unwrap();

    let mut second = Engine::new(Arc::clone(&graph));
    second.start().unwrap();
    second.answer(&Answer::no()).unwrap();

    assert_eq!(first.trace(), second.trace());
    assert_eq!(first.accumulator(), second.accumulator());
    assert_eq!(first.accumulator().type_name(), "Top");
}
