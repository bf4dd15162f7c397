//! Compiled decision-graph model.
//!
//! A decision graph is an id-keyed table of typed nodes with a designated
//! start node. Edges are [`NodeId`]s rather than owned references, so
//! cycles (recursion through call nodes) and shared successors need no
//! special handling, and a compiled graph can be shared read-only between
//! any number of interpreter runs.

mod answer;
mod graph;
mod node;

pub use answer::Answer;
pub use graph::{DecisionGraph, GraphError};
pub use node::{
    AskNode, CallNode, ConsiderNode, EndNode, Node, NodeId, RejectNode, SetNode, SlotPath,
    TodoNode,
};
