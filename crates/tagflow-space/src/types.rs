//! Tag-space type schema.
//!
//! Four kinds of types form the schema tree:
//!
//! - [`AtomicType`] — an ordered set of named values, exactly one of which
//!   may be assigned to a slot of this type
//! - [`AggregateType`] — a set-valued slot whose items come from an atomic
//!   item type
//! - [`CompoundType`] — a record of named sub-slots; the top-level type of
//!   a tag space is always compound
//! - [`PlaceholderType`] — an intentionally unspecified slot, carrying no
//!   data
//!
//! The schema is an owned tree (compound fields form a tree, no cycles) and
//! field iteration follows declaration order, which downstream slot
//! enumeration relies on.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::values::{AtomicValue, CompoundValue};

/// An atomic type: a named, ordered set of named values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicType {
    name: String,
    values: IndexSet<String>,
}

impl AtomicType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexSet::new(),
        }
    }

    /// Appends a value name, keeping declaration order.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.insert(value.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            self.values.insert(v.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a value by name (trimmed), yielding it with its ordinal.
    pub fn value_of(&self, name: &str) -> Option<AtomicValue> {
        let name = name.trim();
        self.values
            .get_index_of(name)
            .map(|ordinal| AtomicValue::new(&self.name, name, ordinal))
    }

    /// Value names in declaration order.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// An aggregate type: a set-valued slot over an atomic item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateType {
    name: String,
    item_type: AtomicType,
}

impl AggregateType {
    pub fn new(name: impl Into<String>, item_type: AtomicType) -> Self {
        Self {
            name: name.into(),
            item_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item_type(&self) -> &AtomicType {
        &self.item_type
    }
}

/// A placeholder ("todo") type: a named slot that carries no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderType {
    name: String,
}

impl PlaceholderType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A compound type: named sub-slots keyed by the sub-type's own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundType {
    name: String,
    fields: IndexMap<String, TagType>,
}

impl CompoundType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field. The field name is the sub-type's own name; the schema
    /// parser guarantees uniqueness within a compound.
    pub fn with_field(mut self, field: TagType) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&TagType> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &TagType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Creates an empty value of this type (all fields unset).
    pub fn new_value(&self) -> CompoundValue {
        CompoundValue::empty(&self.name)
    }
}

/// The kind of a tag type, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagKind {
    Atomic,
    Aggregate,
    Compound,
    Placeholder,
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagKind::Atomic => write!(f, "atomic"),
            TagKind::Aggregate => write!(f, "aggregate"),
            TagKind::Compound => write!(f, "compound"),
            TagKind::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Any type in the tag space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagType {
    Atomic(AtomicType),
    Aggregate(AggregateType),
    Compound(CompoundType),
    Placeholder(PlaceholderType),
}

impl TagType {
    pub fn name(&self) -> &str {
        match self {
            TagType::Atomic(t) => t.name(),
            TagType::Aggregate(t) => t.name(),
            TagType::Compound(t) => t.name(),
            TagType::Placeholder(t) => t.name(),
        }
    }

    pub fn kind(&self) -> TagKind {
        match self {
            TagType::Atomic(_) => TagKind::Atomic,
            TagType::Aggregate(_) => TagKind::Aggregate,
            TagType::Compound(_) => TagKind::Compound,
            TagType::Placeholder(_) => TagKind::Placeholder,
        }
    }
}
