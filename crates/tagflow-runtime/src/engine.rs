//! The interpreter engine.
//!
//! State is a program counter, a stack of return continuations, the
//! accumulated compound value, and the visit trace. Between `start` and
//! `answer` calls the caller owns the thread; nothing runs in the
//! background.
//!
//! The engine advances through non-interactive nodes on its own:
//!
//! - **set** merges its delta into the accumulator
//! - **call** pushes its continuation and jumps to the callee
//! - **todo** falls through
//! - **consider** projects the accumulator at the considered slot and
//!   takes the first matching edge, else the else edge
//! - **end** pops a continuation and continues there; with an empty stack
//!   it terminates the run as accepted
//! - **reject** terminates the run as rejected
//! - **ask** stops and awaits [`Engine::answer`]
//!
//! Every node the program counter lands on is appended to the trace in
//! visit order, including transient set/call/todo nodes and every popped
//! continuation.

use std::sync::Arc;

use tracing::{debug, trace};

use tagflow_graph::{Answer, ConsiderNode, DecisionGraph, Node, NodeId};
use tagflow_space::CompoundValue;

use crate::error::{Result, RuntimeError};

/// Lifecycle of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Created but not started.
    Idle,
    /// Awaiting the next answer.
    Running,
    /// Terminated at an end node with an empty stack.
    Accepted,
    /// Terminated at a reject node.
    Rejected,
}

/// Interprets one decision graph for one subject.
pub struct Engine {
    graph: Arc<DecisionGraph>,
    pc: Option<NodeId>,
    stack: Vec<NodeId>,
    accumulator: CompoundValue,
    trace: Vec<NodeId>,
    status: EngineStatus,
}

impl Engine {
    pub fn new(graph: Arc<DecisionGraph>) -> Self {
        let accumulator = graph.top_level_type().new_value();
        Self {
            graph,
            pc: None,
            stack: Vec::new(),
            accumulator,
            trace: Vec::new(),
            status: EngineStatus::Idle,
        }
    }

    /// Begins a run at the graph's start node, advancing through any
    /// leading non-interactive nodes.
    ///
    /// Returns `true` while the engine awaits an answer, `false` once the
    /// run already terminated (e.g. a graph with no interactive nodes).
    pub fn start(&mut self) -> Result<bool> {
        let start = self
            .graph
            .start()
            .cloned()
            .ok_or(RuntimeError::NoStartNode)?;
        debug!(start = %start, "run started");

        self.stack.clear();
        self.accumulator = self.graph.top_level_type().new_value();
        self.trace = vec![start.clone()];
        self.pc = Some(start);
        self.status = EngineStatus::Running;
        self.advance()
    }

    /// Feeds one answer to the awaited ask node and advances to the next
    /// interactive or terminal node.
    ///
    /// Returns `true` while the engine still awaits input.
    pub fn answer(&mut self, answer: &Answer) -> Result<bool> {
        if self.status != EngineStatus::Running {
            return Err(RuntimeError::NotAwaitingInput);
        }
        let graph = Arc::clone(&self.graph);
        let pc = self.pc.clone().ok_or(RuntimeError::NotAwaitingInput)?;
        let node = graph
            .get(&pc)
            .ok_or_else(|| RuntimeError::UnknownNode(pc.clone()))?;

        match node {
            Node::Ask(ask) => {
                let target = ask
                    .edge(answer)
                    .cloned()
                    .ok_or_else(|| RuntimeError::NoSuchAnswer {
                        node: pc.clone(),
                        answer: answer.clone(),
                    })?;
                self.goto(target);
                self.advance()
            }
            _ => Err(RuntimeError::NotAwaitingInput),
        }
    }

    /// Whether the run reached a terminal node.
    pub fn terminated(&self) -> bool {
        matches!(self.status, EngineStatus::Accepted | EngineStatus::Rejected)
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Node ids in visit order, including transient nodes and popped
    /// return continuations.
    pub fn trace(&self) -> &[NodeId] {
        &self.trace
    }

    /// The tag value accumulated so far.
    pub fn accumulator(&self) -> &CompoundValue {
        &self.accumulator
    }

    /// The node the engine is stopped at: the awaited ask node while
    /// running, the terminal node after termination.
    pub fn current_node_id(&self) -> Option<&NodeId> {
        self.pc.as_ref()
    }

    fn goto(&mut self, id: NodeId) {
        trace!(node = %id, "visit");
        self.trace.push(id.clone());
        self.pc = Some(id);
    }

    /// Moves through non-interactive nodes until an ask node or a
    /// terminal is reached.
    fn advance(&mut self) -> Result<bool> {
        let graph = Arc::clone(&self.graph);
        loop {
            let pc = match &self.pc {
                Some(pc) => pc.clone(),
                None => return Ok(false),
            };
            let node = graph
                .get(&pc)
                .ok_or_else(|| RuntimeError::UnknownNode(pc.clone()))?;

            match node {
                Node::Ask(_) => return Ok(true),
                Node::Consider(consider) => {
                    let target = self.match_consider(consider)?;
                    self.goto(target);
                }
                Node::Set(set) => {
                    self.accumulator = self
                        .accumulator
                        .merge(&set.value)
                        .map_err(|source| RuntimeError::MergeFailed {
                            node: pc.clone(),
                            source,
                        })?;
                    self.goto(set.next.clone());
                }
                Node::Call(call) => {
                    if !graph.contains(&call.callee) {
                        return Err(RuntimeError::CalleeNotFound {
                            node: pc.clone(),
                            callee: call.callee.clone(),
                        });
                    }
                    self.stack.push(call.next.clone());
                    self.goto(call.callee.clone());
                }
                Node::Todo(todo) => {
                    self.goto(todo.next.clone());
                }
                Node::End(_) => match self.stack.pop() {
                    Some(continuation) => self.goto(continuation),
                    None => {
                        self.status = EngineStatus::Accepted;
                        debug!(node = %pc, "run accepted");
                        return Ok(false);
                    }
                },
                Node::Reject(reject) => {
                    self.status = EngineStatus::Rejected;
                    debug!(node = %pc, reason = %reject.reason, "run rejected");
                    return Ok(false);
                }
            }
        }
    }

    /// Selects a consider node's edge from the accumulator: the first
    /// answer whose key equals the accumulator's projection at the
    /// considered slot, else the else edge.
    fn match_consider(&self, consider: &ConsiderNode) -> Result<NodeId> {
        let below = consider.slot.below_root();
        if below.is_empty() {
            // root slot: compare whole values
            for (key, target) in &consider.answers {
                if *key == self.accumulator {
                    return Ok(target.clone());
                }
            }
        } else if let Some(projection) = self.accumulator.project(below) {
            for (key, target) in &consider.answers {
                if key.project(below) == Some(projection) {
                    return Ok(target.clone());
                }
            }
        }
        consider
            .else_edge
            .clone()
            .ok_or_else(|| RuntimeError::NoConsiderMatch {
                node: consider.id.clone(),
            })
    }
}
