//! Compiler for tagflow questionnaire programs.
//!
//! The pipeline takes the ordered AST list produced by the surface parser
//! and a tag space, and emits a ready-to-run
//! [`DecisionGraph`](tagflow_graph::DecisionGraph):
//!
//! 1. **Validators** ([`validate`]) — accumulate warnings/errors over the
//!    raw AST without failing.
//! 2. **Slot index** ([`slots`]) — maps possibly-abbreviated slot
//!    references to fully-qualified paths.
//! 3. **Value builder** ([`value_builder`]) — turns slot assignments into
//!    compound values rooted at the top-level type.
//! 4. **Compiler** ([`compile`]) — assigns missing node ids, segments the
//!    top-level chain at terminators, and lowers each segment into graph
//!    nodes with implicit-edge inference.
//!
//! The compiler fails fast on the first schema or structural error it
//! raises; validators never throw.

pub mod compile;
pub mod error;
pub mod slots;
pub mod validate;
pub mod value_builder;

pub use compile::{Compiler, SYN_END};
pub use error::{CompileError, SchemaError, Severity, ValidationMessage};
pub use slots::{slot_type, SlotIndex};
pub use validate::{validate_duplicate_answers, validate_repeat_ids};
pub use value_builder::ValueBuilder;
