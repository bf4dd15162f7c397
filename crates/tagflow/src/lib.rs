//! # Tagflow
//!
//! Decision-graph DSL core for interactive questionnaires that classify a
//! subject into a structured set of tags.
//!
//! This crate is a facade over the pipeline:
//!
//! - [`tagflow_space`] — tag-space schema and values
//! - [`tagflow_ast`] — the AST contract produced by the surface parser
//! - [`tagflow_compile`] — validators, slot index, and the AST→graph
//!   compiler
//! - [`tagflow_graph`] — the compiled decision-graph model
//! - [`tagflow_runtime`] — the interactive interpreter
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tagflow::{compile, Answer, Engine};
//!
//! let graph = compile(ast_nodes, tag_space)?;
//! let mut engine = Engine::new(Arc::new(graph));
//! engine.start()?;
//! while engine.status() == tagflow::EngineStatus::Running {
//!     engine.answer(&Answer::yes())?;
//! }
//! println!("{:?}", engine.trace());
//! ```

pub use tagflow_ast as ast;
pub use tagflow_compile::{
    validate_duplicate_answers, validate_repeat_ids, CompileError, Compiler, SchemaError,
    Severity, SlotIndex, ValidationMessage, ValueBuilder, SYN_END,
};
pub use tagflow_graph::{
    Answer, AskNode, CallNode, ConsiderNode, DecisionGraph, EndNode, GraphError, Node, NodeId,
    RejectNode, SetNode, SlotPath, TodoNode,
};
pub use tagflow_runtime::{Engine, EngineStatus, Result as RuntimeResult, RuntimeError};
pub use tagflow_space::{
    AggregateType, AggregateValue, AtomicType, AtomicValue, CompoundType, CompoundValue,
    MergeError, PlaceholderType, TagKind, TagType, TagValue,
};

use tagflow_ast::AstNode;

/// Compiles a questionnaire program against a tag space.
pub fn compile(nodes: Vec<AstNode>, space: CompoundType) -> Result<DecisionGraph, CompileError> {
    Compiler::new(space).compile(nodes)
}

/// Compiles with a source URI attached; the graph's title becomes the last
/// path segment of the URI.
pub fn compile_with_source(
    nodes: Vec<AstNode>,
    space: CompoundType,
    source: impl Into<String>,
) -> Result<DecisionGraph, CompileError> {
    Compiler::new(space).with_source(source).compile(nodes)
}

/// Runs both validators over a program: repeat-id errors first, then
/// duplicate-answer warnings, each in its own deterministic order.
pub fn check(nodes: &[AstNode]) -> Vec<ValidationMessage> {
    let mut messages = validate_repeat_ids(nodes);
    messages.extend(validate_duplicate_answers(nodes));
    messages
}

/// Serializes a compiled graph to pretty-printed JSON.
pub fn serialize_graph(graph: &DecisionGraph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

/// Deserializes a compiled graph from JSON.
pub fn deserialize_graph(json: &str) -> serde_json::Result<DecisionGraph> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_ast::AstEndNode;

    #[test]
    fn test_graph_json_round_trip() {
        let space = CompoundType::new("Top").with_field(TagType::Atomic(
            AtomicType::new("Handling").with_values(["open", "sealed"]),
        ));
        let graph = compile(
            vec![AstNode::End(AstEndNode {
                id: Some("e".into()),
            })],
            space,
        )
        .unwrap();

        let json = serialize_graph(&graph).unwrap();
        let restored = deserialize_graph(&json).unwrap();
        assert_eq!(graph, restored);
    }

    #[test]
    fn test_check_concatenates_both_validators() {
        let dup = AstNode::End(AstEndNode {
            id: Some("x".into()),
        });
        let messages = check(&[dup.clone(), dup]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Error);
    }
}
