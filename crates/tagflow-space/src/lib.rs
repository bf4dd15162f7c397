//! Tag-space schema and value model.
//!
//! A *tag space* is a tree-shaped type schema describing every field/value
//! combination a subject can be tagged with. The root is always a
//! [`CompoundType`]; leaves are atomic, aggregate, or placeholder slots.
//! Runtime [`values`] conform to the schema and support the merge
//! semantics the interpreter uses to accumulate results.

pub mod types;
pub mod values;

pub use types::{AggregateType, AtomicType, CompoundType, PlaceholderType, TagKind, TagType};
pub use values::{AggregateValue, AtomicValue, CompoundValue, MergeError, TagValue};
