//! AST-to-graph lowering.
//!
//! Compilation runs in three stages:
//!
//! 1. **ID assignment** — every AST node without an id gets a generated
//!    one (`[#1]`, `[#2]`, …), in pre-order.
//! 2. **Chain segmentation** — the top-level list is split after every
//!    terminator (end, reject), so an author cannot accidentally wire a
//!    "next" edge past a terminal node. Nested sub-graphs keep their
//!    lexical structure and are not re-segmented.
//! 3. **Lowering** — each segment is compiled head-first: the head node's
//!    outgoing edges default to the compilation of its tail (the
//!    "syntactically next" node), and the outermost default of every
//!    segment is a synthesized end node, `[SYN-END]`, present in every
//!    graph.
//!
//! Ask nodes with boolean answers get their missing half implied: a lone
//! `yes` answer implies `no` → syntactically-next (and vice versa); an ask
//! node with no answers at all implies both.

use tracing::{debug, trace};

use tagflow_ast::{AstAssignment, AstConsiderNode, AstNode};
use tagflow_graph::{
    Answer, AskNode, CallNode, ConsiderNode, DecisionGraph, EndNode, Node, NodeId, RejectNode,
    SetNode, SlotPath, TodoNode,
};
use tagflow_space::{CompoundType, TagKind};

use crate::error::{CompileError, SchemaError};
use crate::slots::{slot_type, SlotIndex};
use crate::value_builder::ValueBuilder;

/// Id of the synthesized end node every compiled graph contains.
pub const SYN_END: &str = "[SYN-END]";

/// Compiles an ordered AST list against a tag space.
pub struct Compiler {
    space: CompoundType,
    source: Option<String>,
}

impl Compiler {
    pub fn new(space: CompoundType) -> Self {
        Self {
            space,
            source: None,
        }
    }

    /// Attaches a source URI; the graph's title becomes its last `/`
    /// segment.
    pub fn with_source(mut self, uri: impl Into<String>) -> Self {
        self.source = Some(uri.into());
        self
    }

    /// Lowers the program into a ready-to-run decision graph.
    ///
    /// Fails fast on the first schema or structural error.
    pub fn compile(self, mut nodes: Vec<AstNode>) -> Result<DecisionGraph, CompileError> {
        debug!(nodes = nodes.len(), "compiling decision graph");

        let index = SlotIndex::new(&self.space);
        let mut graph = DecisionGraph::new(self.space.clone());

        let syn_end = NodeId::from(SYN_END);
        graph.add(Node::End(EndNode {
            id: syn_end.clone(),
        }))?;

        let mut ids = IdGenerator::default();
        assign_ids(&mut nodes, &mut ids);

        let start = nodes
            .first()
            .map(|node| NodeId::from(assigned_id(node)))
            .unwrap_or_else(|| syn_end.clone());

        {
            let mut lowering = Lowering {
                space: &self.space,
                index: &index,
                graph: &mut graph,
            };
            for segment in segments(&nodes) {
                lowering.lower_list(segment, &syn_end)?;
            }
        }

        graph.set_start(start)?;
        if let Some(source) = self.source {
            if let Some(title) = source.rsplit('/').next().filter(|s| !s.is_empty()) {
                graph.set_title(title);
            }
            graph.set_source(source);
        }

        debug!(nodes = graph.node_count(), "decision graph compiled");
        Ok(graph)
    }
}

#[derive(Default)]
struct IdGenerator {
    next: usize,
}

impl IdGenerator {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("[#{}]", self.next)
    }
}

/// Stage 1: fills in missing node ids, pre-order.
fn assign_ids(nodes: &mut [AstNode], ids: &mut IdGenerator) {
    for node in nodes {
        if node.id().is_none() {
            node.set_id(ids.next_id());
        }
        match node {
            AstNode::Ask(ask) => {
                for answer in &mut ask.answers {
                    assign_ids(&mut answer.sub_graph, ids);
                }
            }
            AstNode::Consider(consider) => {
                for answer in &mut consider.answers {
                    assign_ids(&mut answer.sub_graph, ids);
                }
                if let Some(else_graph) = &mut consider.else_graph {
                    assign_ids(else_graph, ids);
                }
            }
            _ => {}
        }
    }
}

/// Stage 2: splits the top-level list after every terminator. The
/// trailing segment may be empty; lowering an empty segment is a no-op.
fn segments(nodes: &[AstNode]) -> Vec<&[AstNode]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, node) in nodes.iter().enumerate() {
        if node.is_terminator() {
            out.push(&nodes[start..=i]);
            start = i + 1;
        }
    }
    out.push(&nodes[start..]);
    out
}

// Ids are filled in by stage 1 before lowering runs.
fn assigned_id(node: &AstNode) -> &str {
    node.id().expect("node ids are assigned before lowering")
}

struct Lowering<'a> {
    space: &'a CompoundType,
    index: &'a SlotIndex,
    graph: &'a mut DecisionGraph,
}

impl Lowering<'_> {
    /// Stage 3: compiles a node list, returning the id of its first node
    /// (or `default` for an empty list). `default` is where the list falls
    /// through when it does not end in a terminator.
    fn lower_list(&mut self, nodes: &[AstNode], default: &NodeId) -> Result<NodeId, CompileError> {
        let Some((head, tail)) = nodes.split_first() else {
            return Ok(default.clone());
        };
        let id = NodeId::from(assigned_id(head));
        trace!(node = %id, "lowering");

        match head {
            AstNode::Ask(ast) => {
                let mut ask = AskNode::new(id.clone(), &ast.text);
                for (term, explanation) in &ast.terms {
                    ask.add_term(term, explanation);
                }

                let next = self.lower_list(tail, default)?;
                for answer in &ast.answers {
                    let target = self.lower_list(&answer.sub_graph, &next)?;
                    ask.set_edge(Answer::new(&answer.text), target);
                }
                for implied in implied_answers(&ask) {
                    ask.set_edge(implied, next.clone());
                }
                self.graph.add(Node::Ask(ask))?;
            }
            AstNode::Consider(ast) => {
                let next = self.lower_list(tail, default)?;
                let else_edge = match &ast.else_graph {
                    Some(else_graph) => self.lower_list(else_graph, &next)?,
                    None => next.clone(),
                };

                let (slot_path, slot_kind) = self.consider_slot(ast, &id)?;
                let mut consider = ConsiderNode::new(id.clone(), slot_path);
                consider.else_edge = Some(else_edge);

                for answer in &ast.answers {
                    let key = self.consider_key(ast, answer, slot_kind, &id)?;
                    let target = self.lower_list(&answer.sub_graph, &next)?;
                    consider.add_edge(key, target);
                }
                self.graph.add(Node::Consider(consider))?;
            }
            AstNode::Set(ast) => {
                let builder = ValueBuilder::new(self.space, self.index);
                let mut value = self.space.new_value();
                for assignment in &ast.assignments {
                    builder.apply(&mut value, assignment).map_err(|source| {
                        CompileError::BadSetInstruction {
                            source,
                            node: id.clone(),
                        }
                    })?;
                }
                let next = self.lower_list(tail, default)?;
                self.graph.add(Node::Set(SetNode {
                    id: id.clone(),
                    value,
                    next,
                }))?;
            }
            AstNode::Call(ast) => {
                let next = self.lower_list(tail, default)?;
                self.graph.add(Node::Call(CallNode {
                    id: id.clone(),
                    callee: NodeId::from(ast.callee_id.as_str()),
                    next,
                }))?;
            }
            AstNode::Todo(ast) => {
                let next = self.lower_list(tail, default)?;
                self.graph.add(Node::Todo(TodoNode {
                    id: id.clone(),
                    text: ast.text.clone(),
                    next,
                }))?;
            }
            AstNode::Reject(ast) => {
                self.graph.add(Node::Reject(RejectNode {
                    id: id.clone(),
                    reason: ast.reason.clone(),
                }))?;
            }
            AstNode::End(_) => {
                self.graph.add(Node::End(EndNode { id: id.clone() }))?;
            }
        }
        Ok(id)
    }

    /// Resolves a consider node's slot to its canonical path and kind.
    ///
    /// An absent slot, or one naming the top-level type, addresses the
    /// root of the tag space.
    fn consider_slot(
        &self,
        ast: &AstConsiderNode,
        node: &NodeId,
    ) -> Result<(SlotPath, TagKind), CompileError> {
        let is_root = match &ast.slot {
            None => true,
            Some(slot) => slot.last().map(String::as_str) == Some(self.space.name()),
        };
        if is_root {
            return Ok((
                SlotPath(vec![self.space.name().to_string()]),
                TagKind::Compound,
            ));
        }

        let slot = ast.slot.as_ref().expect("non-root slot is present");
        let canonical = self
            .index
            .resolve(slot)
            .map_err(|e| e.at_node(node.clone()))?;
        let ty = slot_type(self.space, canonical).map_err(|e| e.at_node(node.clone()))?;
        match ty.kind() {
            TagKind::Placeholder => Err(CompileError::UnsupportedConsiderSlot {
                node: node.clone(),
                slot: canonical.to_string(),
                kind: TagKind::Placeholder,
            }),
            kind => Ok((canonical.clone(), kind)),
        }
    }

    /// Materializes one consider answer as a whole-root edge key.
    fn consider_key(
        &self,
        ast: &AstConsiderNode,
        answer: &tagflow_ast::AstConsiderAnswer,
        slot_kind: TagKind,
        node: &NodeId,
    ) -> Result<tagflow_space::CompoundValue, CompileError> {
        let builder = ValueBuilder::new(self.space, self.index);
        let mut key = self.space.new_value();

        match slot_kind {
            TagKind::Atomic => {
                let values = answer.values.as_ref().ok_or_else(|| {
                    CompileError::BadConsiderAnswer {
                        node: node.clone(),
                        detail: "an atomic slot takes answer values, not assignments".into(),
                    }
                })?;
                let [value] = values.as_slice() else {
                    return Err(CompileError::BadConsiderAnswer {
                        node: node.clone(),
                        detail: "an atomic slot takes exactly one value per answer".into(),
                    });
                };
                let slot = ast.slot.clone().expect("atomic slot is never the root");
                builder
                    .apply(
                        &mut key,
                        &AstAssignment::Atomic {
                            slot,
                            value: value.clone(),
                        },
                    )
                    .map_err(|e| e.at_node(node.clone()))?;
            }
            TagKind::Aggregate => {
                let values = answer.values.as_ref().ok_or_else(|| {
                    CompileError::BadConsiderAnswer {
                        node: node.clone(),
                        detail: "an aggregate slot takes answer values, not assignments".into(),
                    }
                })?;
                let slot = ast.slot.clone().expect("aggregate slot is never the root");
                builder
                    .apply(
                        &mut key,
                        &AstAssignment::Aggregate {
                            slot,
                            values: values.clone(),
                        },
                    )
                    .map_err(|e| e.at_node(node.clone()))?;
            }
            TagKind::Compound => {
                let assignments = answer.assignments.as_ref().ok_or_else(|| {
                    CompileError::BadConsiderAnswer {
                        node: node.clone(),
                        detail: "a compound slot takes assignments, not bare values".into(),
                    }
                })?;
                for assignment in assignments {
                    builder
                        .apply(&mut key, assignment)
                        .map_err(|e| e.at_node(node.clone()))?;
                }
            }
            TagKind::Placeholder => {
                // consider_slot already rejected placeholder slots
                unreachable!("placeholder slots are rejected before key construction")
            }
        }
        Ok(key)
    }
}

/// Detects the implied boolean complement of an ask node's answers.
///
/// No answers at all implies both `no` and `yes`; a single boolean answer
/// implies its opposite; anything else implies nothing.
fn implied_answers(ask: &AskNode) -> Vec<Answer> {
    if ask.answers.len() > 1 {
        return Vec::new();
    }
    let Some(only) = ask.answers.keys().next() else {
        return vec![Answer::no(), Answer::yes()];
    };
    match only.text().to_lowercase().as_str() {
        "yes" => vec![Answer::no()],
        "no" => vec![Answer::yes()],
        _ => Vec::new(),
    }
}
