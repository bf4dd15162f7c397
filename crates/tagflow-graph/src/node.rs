//! Graph node variants.
//!
//! Nodes are a tagged sum; the compiler, validators, and interpreter all
//! dispatch with exhaustive `match`. Ask and consider nodes await input;
//! set, call, and todo nodes are traversed transparently; end and reject
//! terminate (an end node doubles as a subroutine return when a call is on
//! the interpreter's stack).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tagflow_space::CompoundValue;

use crate::answer::Answer;

/// Unique node identifier within one graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// A fully-qualified slot path, root type name first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotPath(pub Vec<String>);

impl SlotPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The path below the root: every segment but the first.
    pub fn below_root(&self) -> &[String] {
        if self.0.is_empty() {
            &self.0
        } else {
            &self.0[1..]
        }
    }
}

impl std::fmt::Display for SlotPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl From<Vec<String>> for SlotPath {
    fn from(segments: Vec<String>) -> Self {
        SlotPath(segments)
    }
}

/// An interactive question node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskNode {
    pub id: NodeId,
    pub text: String,
    /// Glossary: term → explanation, in authoring order.
    pub terms: IndexMap<String, String>,
    /// Outgoing edges by answer, authored answers first.
    pub answers: IndexMap<Answer, NodeId>,
}

impl AskNode {
    pub fn new(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            terms: IndexMap::new(),
            answers: IndexMap::new(),
        }
    }

    pub fn add_term(&mut self, term: impl Into<String>, explanation: impl Into<String>) {
        self.terms.insert(term.into(), explanation.into());
    }

    /// Wires `answer` to `target`, replacing any previous edge.
    pub fn set_edge(&mut self, answer: Answer, target: NodeId) {
        self.answers.insert(answer, target);
    }

    pub fn edge(&self, answer: &Answer) -> Option<&NodeId> {
        self.answers.get(answer)
    }
}

/// A branch on the accumulated value at a slot.
///
/// Edge keys are whole-root compound values materialized at compile time;
/// matching is first-wins structural equality, so the keys live in a `Vec`
/// rather than a hash map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsiderNode {
    pub id: NodeId,
    pub slot: SlotPath,
    pub answers: Vec<(CompoundValue, NodeId)>,
    pub else_edge: Option<NodeId>,
}

impl ConsiderNode {
    pub fn new(id: impl Into<NodeId>, slot: SlotPath) -> Self {
        Self {
            id: id.into(),
            slot,
            answers: Vec::new(),
            else_edge: None,
        }
    }

    /// Adds an edge unless an equal key is already present (first wins).
    pub fn add_edge(&mut self, key: CompoundValue, target: NodeId) {
        if !self.answers.iter().any(|(k, _)| *k == key) {
            self.answers.push((key, target));
        }
    }

    pub fn edge(&self, key: &CompoundValue) -> Option<&NodeId> {
        self.answers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, target)| target)
    }
}

/// Merges a compound-value delta into the interpreter's accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNode {
    pub id: NodeId,
    pub value: CompoundValue,
    pub next: NodeId,
}

/// A subroutine call; `next` is the return continuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    pub id: NodeId,
    pub callee: NodeId,
    pub next: NodeId,
}

/// A free-text marker traversed transparently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoNode {
    pub id: NodeId,
    pub text: String,
    pub next: NodeId,
}

/// Terminal end (or subroutine return).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndNode {
    pub id: NodeId,
}

/// Terminal rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectNode {
    pub id: NodeId,
    pub reason: String,
}

/// Any node of a decision graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Ask(AskNode),
    Consider(ConsiderNode),
    Set(SetNode),
    Call(CallNode),
    Todo(TodoNode),
    End(EndNode),
    Reject(RejectNode),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Ask(n) => &n.id,
            Node::Consider(n) => &n.id,
            Node::Set(n) => &n.id,
            Node::Call(n) => &n.id,
            Node::Todo(n) => &n.id,
            Node::End(n) => &n.id,
            Node::Reject(n) => &n.id,
        }
    }

    /// Interactive nodes hold the interpreter until an answer arrives.
    pub fn awaits_input(&self) -> bool {
        matches!(self, Node::Ask(_))
    }
}
