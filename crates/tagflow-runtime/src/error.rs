//! Runtime errors.

use tagflow_graph::{Answer, NodeId};
use tagflow_space::MergeError;
use thiserror::Error;

/// Runtime result type.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failures surfaced to the host during a run.
///
/// Reaching a reject node is not an error: it terminates the run with
/// [`EngineStatus::Rejected`](crate::EngineStatus::Rejected).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("graph has no start node")]
    NoStartNode,

    #[error("node \"{0}\" is not in the graph")]
    UnknownNode(NodeId),

    #[error("call node \"{node}\" refers to unknown callee \"{callee}\"")]
    CalleeNotFound { node: NodeId, callee: NodeId },

    #[error("node \"{node}\" has no edge for answer '{answer}'")]
    NoSuchAnswer { node: NodeId, answer: Answer },

    #[error("consider node \"{node}\" matched no answer and has no else edge")]
    NoConsiderMatch { node: NodeId },

    #[error("set node \"{node}\" could not be applied: {source}")]
    MergeFailed {
        node: NodeId,
        #[source]
        source: MergeError,
    },

    #[error("engine is not awaiting input")]
    NotAwaitingInput,
}
