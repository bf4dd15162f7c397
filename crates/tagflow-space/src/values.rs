//! Runtime tag values.
//!
//! Values are plain data: each carries the *name* of the type it conforms
//! to rather than a reference into the schema tree. The schema is supplied
//! as context wherever a value is constructed or checked, so values stay
//! `Eq`, serializable, and cheap to clone between engine runs.
//!
//! Equality is structural: compound fields and aggregate items compare
//! independently of insertion order (an unset compound field is simply
//! absent), which gives aggregate values set semantics.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single named value of an atomic type.
///
/// Equality covers the type name, value name, and ordinal; since values are
/// only minted by `AtomicType::value_of`, two equal names always agree on
/// the ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomicValue {
    type_name: String,
    name: String,
    ordinal: usize,
}

impl AtomicValue {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            ordinal,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

impl PartialOrd for AtomicValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AtomicValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal
            .cmp(&other.ordinal)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl std::fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A set of atomic values, all of the aggregate's item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateValue {
    type_name: String,
    items: IndexSet<AtomicValue>,
}

impl AggregateValue {
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            items: IndexSet::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn add(&mut self, item: AtomicValue) {
        self.items.insert(item);
    }

    pub fn items(&self) -> impl Iterator<Item = &AtomicValue> {
        self.items.iter()
    }

    pub fn contains(&self, item: &AtomicValue) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Set union with another value of the same aggregate type.
    pub fn union(&self, other: &AggregateValue) -> AggregateValue {
        let mut out = self.clone();
        for item in other.items() {
            out.add(item.clone());
        }
        out
    }
}

/// A record value of a compound type. A missing field means "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundValue {
    type_name: String,
    fields: IndexMap<String, TagValue>,
}

impl CompoundValue {
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&TagValue> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut TagValue> {
        self.fields.get_mut(field)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: TagValue) {
        self.fields.insert(field.into(), value);
    }

    /// Inserts an empty compound for `field` if unset, and returns it.
    ///
    /// Errors if the field is set to a non-compound value.
    pub fn compound_entry(
        &mut self,
        field: &str,
        type_name: &str,
    ) -> Result<&mut CompoundValue, MergeError> {
        let entry = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| TagValue::Compound(CompoundValue::empty(type_name)));
        match entry {
            TagValue::Compound(cv) => Ok(cv),
            other => Err(MergeError::TypeMismatch {
                expected: type_name.to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Follows a field-name path below this compound, returning the value
    /// stored there, or `None` if any step is unset or not a compound.
    pub fn project(&self, path: &[String]) -> Option<&TagValue> {
        let (first, rest) = path.split_first()?;
        let value = self.fields.get(first)?;
        if rest.is_empty() {
            Some(value)
        } else {
            match value {
                TagValue::Compound(cv) => cv.project(rest),
                _ => None,
            }
        }
    }

    /// Merges two values of the same compound type into a new value.
    ///
    /// Per-field: unset ⊔ v = v; atomic ⊔ atomic requires equality;
    /// aggregate ⊔ aggregate unions; compound ⊔ compound recurses.
    pub fn merge(&self, other: &CompoundValue) -> Result<CompoundValue, MergeError> {
        if self.type_name != other.type_name {
            return Err(MergeError::TypeMismatch {
                expected: self.type_name.clone(),
                actual: other.type_name.clone(),
            });
        }

        let mut out = self.clone();
        for (field, theirs) in other.fields() {
            match out.fields.get(field) {
                None => {
                    out.fields.insert(field.to_string(), theirs.clone());
                }
                Some(ours) => {
                    let merged = ours.merge(theirs)?;
                    out.fields.insert(field.to_string(), merged);
                }
            }
        }
        Ok(out)
    }
}

/// Any runtime value in the tag space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    Atomic(AtomicValue),
    Aggregate(AggregateValue),
    Compound(CompoundValue),
}

impl TagValue {
    pub fn type_name(&self) -> &str {
        match self {
            TagValue::Atomic(v) => v.type_name(),
            TagValue::Aggregate(v) => v.type_name(),
            TagValue::Compound(v) => v.type_name(),
        }
    }

    fn merge(&self, other: &TagValue) -> Result<TagValue, MergeError> {
        match (self, other) {
            (TagValue::Atomic(a), TagValue::Atomic(b)) => {
                if a == b {
                    Ok(TagValue::Atomic(a.clone()))
                } else {
                    Err(MergeError::Conflict {
                        type_name: a.type_name().to_string(),
                        left: a.name().to_string(),
                        right: b.name().to_string(),
                    })
                }
            }
            (TagValue::Aggregate(a), TagValue::Aggregate(b)) => {
                if a.type_name() != b.type_name() {
                    return Err(MergeError::TypeMismatch {
                        expected: a.type_name().to_string(),
                        actual: b.type_name().to_string(),
                    });
                }
                Ok(TagValue::Aggregate(a.union(b)))
            }
            (TagValue::Compound(a), TagValue::Compound(b)) => Ok(TagValue::Compound(a.merge(b)?)),
            (a, b) => Err(MergeError::TypeMismatch {
                expected: a.type_name().to_string(),
                actual: b.type_name().to_string(),
            }),
        }
    }
}

/// Failure while merging two tag values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cannot merge value of type '{actual}' into slot of type '{expected}'")]
    TypeMismatch { expected: String, actual: String },

    #[error("conflicting values for atomic type '{type_name}': '{left}' vs '{right}'")]
    Conflict {
        type_name: String,
        left: String,
        right: String,
    },
}
