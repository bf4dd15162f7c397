//! The decision graph: an id-keyed node table with a designated start.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tagflow_space::CompoundType;
use thiserror::Error;

use crate::node::{Node, NodeId};

/// Graph construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id: \"{0}\"")]
    DuplicateNodeId(NodeId),

    #[error("start node \"{0}\" is not in the graph")]
    UnknownStart(NodeId),
}

/// A compiled, ready-to-run decision graph.
///
/// Immutable once compilation finishes; the interpreter only reads it.
/// Node iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionGraph {
    nodes: IndexMap<NodeId, Node>,
    start: Option<NodeId>,
    top_level_type: CompoundType,
    source: Option<String>,
    title: Option<String>,
}

impl DecisionGraph {
    pub fn new(top_level_type: CompoundType) -> Self {
        Self {
            nodes: IndexMap::new(),
            start: None,
            top_level_type,
            source: None,
            title: None,
        }
    }

    /// Adds a node, enforcing id uniqueness.
    pub fn add(&mut self, node: Node) -> Result<(), GraphError> {
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn set_start(&mut self, id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownStart(id));
        }
        self.start = Some(id);
        Ok(())
    }

    pub fn start(&self) -> Option<&NodeId> {
        self.start.as_ref()
    }

    pub fn top_level_type(&self) -> &CompoundType {
        &self.top_level_type
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = Some(source.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }
}
