//! Compile-phase diagnostics.
//!
//! Two distinct error surfaces live here:
//!
//! - [`SchemaError`] / [`CompileError`] — the compiler's fail-fast path.
//!   Schema errors are raised by the value builder without node context;
//!   the compiler wraps them with the offending AST node id attached.
//! - [`ValidationMessage`] — accumulated, never thrown. Validators walk
//!   the whole program and report everything they find in a deterministic
//!   order; promoting their errors to a compile failure is the caller's
//!   decision.

use tagflow_graph::{GraphError, NodeId};
use tagflow_space::TagKind;
use thiserror::Error;

/// A slot-resolution or value-construction failure, without node context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown slot '{0}'")]
    SlotNotFound(String),

    #[error("ambiguous slot abbreviation '{0}'")]
    AmbiguousSlot(String),

    #[error("type '{type_name}' does not have a field '{field}'")]
    NoSuchField { type_name: String, field: String },

    #[error("cannot descend through '{slot}': it is {kind}, not compound")]
    NotCompound { slot: String, kind: TagKind },

    #[error("slot '{slot}' does not have a value '{value}'")]
    NoSuchValue { slot: String, value: String },

    #[error("slot '{slot}' is {actual}, expected {expected}")]
    KindMismatch {
        slot: String,
        expected: TagKind,
        actual: TagKind,
    },
}

/// A fatal compilation error, carrying the offending AST node where one is
/// known. The compiler stops at the first of these it raises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{source} (at node \"{node}\")")]
    Schema {
        #[source]
        source: SchemaError,
        node: NodeId,
    },

    /// A schema failure inside a `set` node's assignment batch.
    #[error("bad set instruction: {source} (at node \"{node}\")")]
    BadSetInstruction {
        #[source]
        source: SchemaError,
        node: NodeId,
    },

    /// A consider answer carried the wrong payload for its slot kind
    /// (values for a compound slot, assignments for an atomic one, or an
    /// atomic answer without exactly one value).
    #[error("consider node \"{node}\": {detail}")]
    BadConsiderAnswer { node: NodeId, detail: String },

    /// A consider node references a slot kind that cannot be branched on.
    #[error("consider node \"{node}\": slot '{slot}' is {kind} and cannot be considered")]
    UnsupportedConsiderSlot {
        node: NodeId,
        slot: String,
        kind: TagKind,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl SchemaError {
    /// Attaches the offending node, producing the compiler-level error.
    pub fn at_node(self, node: NodeId) -> CompileError {
        CompileError::Schema { source: self, node }
    }
}

/// Severity of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One accumulated validator finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub message: String,
    /// The offending AST node's id, when it has one.
    pub node_id: Option<String>,
}

impl ValidationMessage {
    pub fn warning(message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            node_id,
        }
    }

    pub fn error(message: impl Into<String>, node_id: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            node_id,
        }
    }
}

impl std::fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}
