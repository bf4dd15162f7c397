//! AST node types for questionnaire programs.
//!
//! This crate is the contract between the (external) surface-syntax parser
//! and the compiler: a flat, ordered list of [`AstNode`]s, where ask and
//! consider nodes nest sub-lists for their answers. Node ids are optional
//! in source; the compiler generates the missing ones.
//!
//! Validation and compilation passes share traversal through
//! [`walk_nodes`], a closure-based pre-order walker. A visitor trait would
//! be over-engineered here: every pass needs the same order and owns its
//! own state.

/// A slot reference as written in source: a possibly-abbreviated sequence
/// of field names. Resolution to a fully-qualified path happens at compile
/// time.
pub type SlotRef = Vec<String>;

/// One node of the questionnaire program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    Ask(AstAskNode),
    Consider(AstConsiderNode),
    Set(AstSetNode),
    Call(AstCallNode),
    Todo(AstTodoNode),
    Reject(AstRejectNode),
    End(AstEndNode),
}

/// An interactive question with free-text answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstAskNode {
    pub id: Option<String>,
    pub text: String,
    /// Glossary terms: (term, explanation).
    pub terms: Vec<(String, String)>,
    pub answers: Vec<AstAnswer>,
}

/// One authored answer of an ask node, with the sub-graph it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstAnswer {
    pub text: String,
    pub sub_graph: Vec<AstNode>,
}

/// A branch on the value accumulated at a slot.
///
/// `slot` is `None` when the node considers the root of the tag space; a
/// slot naming the top-level type means the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstConsiderNode {
    pub id: Option<String>,
    pub slot: Option<SlotRef>,
    pub answers: Vec<AstConsiderAnswer>,
    pub else_graph: Option<Vec<AstNode>>,
}

/// One answer of a consider node.
///
/// Atomic/aggregate slots take `values`; a compound slot takes
/// `assignments`. Exactly one of the two is expected; the compiler rejects
/// the other combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstConsiderAnswer {
    pub values: Option<Vec<String>>,
    pub assignments: Option<Vec<AstAssignment>>,
    pub sub_graph: Vec<AstNode>,
}

/// An unconditional tag assignment batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstSetNode {
    pub id: Option<String>,
    pub assignments: Vec<AstAssignment>,
}

/// A single slot assignment inside a set node or consider answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstAssignment {
    /// `slot = value`
    Atomic { slot: SlotRef, value: String },
    /// `slot += {values…}`
    Aggregate { slot: SlotRef, values: Vec<String> },
}

impl AstAssignment {
    pub fn slot(&self) -> &SlotRef {
        match self {
            AstAssignment::Atomic { slot, .. } => slot,
            AstAssignment::Aggregate { slot, .. } => slot,
        }
    }
}

/// A subroutine-style jump to another node, returning to `next` when the
/// callee's sub-graph reaches an end node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstCallNode {
    pub id: Option<String>,
    pub callee_id: String,
}

/// A free-text marker for unfinished questionnaire parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstTodoNode {
    pub id: Option<String>,
    pub text: String,
}

/// Terminal rejection with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstRejectNode {
    pub id: Option<String>,
    pub reason: String,
}

/// Terminal (or, inside a called sub-graph, returning) end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstEndNode {
    pub id: Option<String>,
}

impl AstNode {
    pub fn id(&self) -> Option<&str> {
        match self {
            AstNode::Ask(n) => n.id.as_deref(),
            AstNode::Consider(n) => n.id.as_deref(),
            AstNode::Set(n) => n.id.as_deref(),
            AstNode::Call(n) => n.id.as_deref(),
            AstNode::Todo(n) => n.id.as_deref(),
            AstNode::Reject(n) => n.id.as_deref(),
            AstNode::End(n) => n.id.as_deref(),
        }
    }

    pub fn set_id(&mut self, id: String) {
        let slot = match self {
            AstNode::Ask(n) => &mut n.id,
            AstNode::Consider(n) => &mut n.id,
            AstNode::Set(n) => &mut n.id,
            AstNode::Call(n) => &mut n.id,
            AstNode::Todo(n) => &mut n.id,
            AstNode::Reject(n) => &mut n.id,
            AstNode::End(n) => &mut n.id,
        };
        *slot = Some(id);
    }

    /// End and reject nodes terminate the chain they appear in.
    pub fn is_terminator(&self) -> bool {
        matches!(self, AstNode::End(_) | AstNode::Reject(_))
    }
}

/// Walks a node list in pre-order (node before its sub-graphs), calling
/// `visitor` for every node, recursing into ask answers, consider answers,
/// and consider else branches.
pub fn walk_nodes<V>(nodes: &[AstNode], visitor: &mut V)
where
    V: FnMut(&AstNode),
{
    for node in nodes {
        visitor(node);
        match node {
            AstNode::Ask(ask) => {
                for answer in &ask.answers {
                    walk_nodes(&answer.sub_graph, visitor);
                }
            }
            AstNode::Consider(consider) => {
                for answer in &consider.answers {
                    walk_nodes(&answer.sub_graph, visitor);
                }
                if let Some(else_graph) = &consider.else_graph {
                    walk_nodes(else_graph, visitor);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(id: &str, answers: Vec<AstAnswer>) -> AstNode {
        AstNode::Ask(AstAskNode {
            id: Some(id.to_string()),
            text: format!("question {id}"),
            terms: Vec::new(),
            answers,
        })
    }

    fn end(id: &str) -> AstNode {
        AstNode::End(AstEndNode {
            id: Some(id.to_string()),
        })
    }

    #[test]
    fn test_walk_visits_nested_subgraphs_in_preorder() {
        let program = vec![
            ask(
                "q1",
                vec![AstAnswer {
                    text: "yes".into(),
                    sub_graph: vec![ask("q2", Vec::new()), end("e1")],
                }],
            ),
            end("e2"),
        ];

        let mut seen = Vec::new();
        walk_nodes(&program, &mut |n| seen.push(n.id().unwrap().to_string()));
        assert_eq!(seen, vec!["q1", "q2", "e1", "e2"]);
    }

    #[test]
    fn test_terminators() {
        assert!(end("e").is_terminator());
        assert!(AstNode::Reject(AstRejectNode {
            id: None,
            reason: "nope".into()
        })
        .is_terminator());
        assert!(!ask("q", Vec::new()).is_terminator());
    }

    #[test]
    fn test_set_id_fills_missing_id() {
        let mut node = AstNode::Todo(AstTodoNode {
            id: None,
            text: "later".into(),
        });
        node.set_id("[#1]".into());
        assert_eq!(node.id(), Some("[#1]"));
    }
}
