//! Builds compound values from slot assignments.
//!
//! Both `set` nodes and consider-node answers materialize their payload as
//! a compound value rooted at the top-level type: resolve the slot,
//! descend the type and value trees together (creating intermediate
//! compounds along the way), then type-check and apply the leaf
//! assignment.

use tagflow_ast::AstAssignment;
use tagflow_space::{AggregateValue, CompoundType, CompoundValue, TagKind, TagType, TagValue};

use crate::error::SchemaError;
use crate::slots::SlotIndex;

/// Applies atomic and aggregate assignments to a root compound value.
pub struct ValueBuilder<'a> {
    space: &'a CompoundType,
    index: &'a SlotIndex,
}

impl<'a> ValueBuilder<'a> {
    pub fn new(space: &'a CompoundType, index: &'a SlotIndex) -> Self {
        Self { space, index }
    }

    /// Applies one assignment to `root`, creating intermediate compound
    /// values as needed.
    pub fn apply(
        &self,
        root: &mut CompoundValue,
        assignment: &AstAssignment,
    ) -> Result<(), SchemaError> {
        let canonical = self.index.resolve(assignment.slot())?;
        let slot_display = canonical.to_string();
        let below = canonical.below_root().to_vec();

        let (parent_ty, parent_val, leaf) = descend(self.space, root, &below, &slot_display)?;
        let leaf_ty = parent_ty
            .field(&leaf)
            .ok_or_else(|| SchemaError::NoSuchField {
                type_name: parent_ty.name().to_string(),
                field: leaf.to_string(),
            })?;

        match assignment {
            AstAssignment::Atomic { value, .. } => match leaf_ty {
                TagType::Atomic(t) => {
                    let atomic = t.value_of(value).ok_or_else(|| SchemaError::NoSuchValue {
                        slot: slot_display.clone(),
                        value: value.trim().to_string(),
                    })?;
                    parent_val.set(leaf, TagValue::Atomic(atomic));
                    Ok(())
                }
                other => Err(SchemaError::KindMismatch {
                    slot: slot_display,
                    expected: TagKind::Atomic,
                    actual: other.kind(),
                }),
            },
            AstAssignment::Aggregate { values, .. } => match leaf_ty {
                TagType::Aggregate(t) => {
                    let mut aggregate = match parent_val.get(&leaf) {
                        Some(TagValue::Aggregate(existing)) => existing.clone(),
                        _ => AggregateValue::empty(t.name()),
                    };
                    for value in values {
                        let item =
                            t.item_type()
                                .value_of(value)
                                .ok_or_else(|| SchemaError::NoSuchValue {
                                    slot: slot_display.clone(),
                                    value: value.trim().to_string(),
                                })?;
                        aggregate.add(item);
                    }
                    parent_val.set(leaf, TagValue::Aggregate(aggregate));
                    Ok(())
                }
                other => Err(SchemaError::KindMismatch {
                    slot: slot_display,
                    expected: TagKind::Aggregate,
                    actual: other.kind(),
                }),
            },
        }
    }
}

/// Descends along all path segments but the last, creating intermediate
/// compound values, and returns the innermost compound type/value pair
/// together with the leaf field name.
fn descend<'t, 'v>(
    space: &'t CompoundType,
    root: &'v mut CompoundValue,
    below: &[String],
    slot_display: &str,
) -> Result<(&'t CompoundType, &'v mut CompoundValue, String), SchemaError> {
    let (leaf, mids) = below
        .split_last()
        .ok_or_else(|| SchemaError::SlotNotFound(slot_display.to_string()))?;

    let mut ty = space;
    let mut val = root;
    for seg in mids {
        let field_ty = ty.field(seg).ok_or_else(|| SchemaError::NoSuchField {
            type_name: ty.name().to_string(),
            field: seg.clone(),
        })?;
        let inner = match field_ty {
            TagType::Compound(inner) => inner,
            other => {
                return Err(SchemaError::NotCompound {
                    slot: seg.clone(),
                    kind: other.kind(),
                })
            }
        };
        val = val
            .compound_entry(seg, inner.name())
            .map_err(|_| SchemaError::NotCompound {
                slot: seg.clone(),
                kind: TagKind::Compound,
            })?;
        ty = inner;
    }
    Ok((ty, val, leaf.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_ast::AstAssignment;
    use tagflow_space::{AggregateType, AtomicType, PlaceholderType};

    fn space() -> CompoundType {
        let encryption = AtomicType::new("Encryption").with_values(["none", "at_rest"]);
        let topics = AtomicType::new("Topic").with_values(["health", "finance", "location"]);
        let storage = CompoundType::new("Storage")
            .with_field(TagType::Atomic(encryption))
            .with_field(TagType::Aggregate(AggregateType::new("Topics", topics)));
        CompoundType::new("Top")
            .with_field(TagType::Atomic(
                AtomicType::new("Handling").with_values(["open", "restricted", "sealed"]),
            ))
            .with_field(TagType::Compound(storage))
            .with_field(TagType::Placeholder(PlaceholderType::new("Later")))
    }

    fn slot(s: &str) -> Vec<String> {
        s.split('/').map(String::from).collect()
    }

    fn apply(space: &CompoundType, root: &mut CompoundValue, assignment: AstAssignment) -> Result<(), SchemaError> {
        let index = SlotIndex::new(space);
        ValueBuilder::new(space, &index).apply(root, &assignment)
    }

    #[test]
    fn test_atomic_assignment_creates_intermediates() {
        let space = space();
        let mut root = space.new_value();
        apply(
            &space,
            &mut root,
            AstAssignment::Atomic {
                slot: slot("Encryption"),
                value: "at_rest".into(),
            },
        )
        .unwrap();

        let projected = root
            .project(&["Storage".to_string(), "Encryption".to_string()])
            .unwrap();
        match projected {
            TagValue::Atomic(v) => assert_eq!(v.name(), "at_rest"),
            other => panic!("expected atomic, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_assignment_unions_into_existing() {
        let space = space();
        let mut root = space.new_value();
        apply(
            &space,
            &mut root,
            AstAssignment::Aggregate {
                slot: slot("Topics"),
                values: vec!["health".into()],
            },
        )
        .unwrap();
        apply(
            &space,
            &mut root,
            AstAssignment::Aggregate {
                slot: slot("Topics"),
                values: vec!["finance".into(), "health".into()],
            },
        )
        .unwrap();

        match root
            .project(&["Storage".to_string(), "Topics".to_string()])
            .unwrap()
        {
            TagValue::Aggregate(v) => assert_eq!(v.len(), 2),
            other => panic!("expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_value_fails() {
        let space = space();
        let mut root = space.new_value();
        let err = apply(
            &space,
            &mut root,
            AstAssignment::Atomic {
                slot: slot("Handling"),
                value: "classified".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::NoSuchValue { .. }));
    }

    #[test]
    fn test_atomic_assignment_to_aggregate_slot_fails() {
        let space = space();
        let mut root = space.new_value();
        let err = apply(
            &space,
            &mut root,
            AstAssignment::Atomic {
                slot: slot("Topics"),
                value: "health".into(),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::KindMismatch {
                slot: "Top/Storage/Topics".into(),
                expected: TagKind::Atomic,
                actual: TagKind::Aggregate,
            }
        );
    }

    #[test]
    fn test_assignment_to_placeholder_slot_fails() {
        let space = space();
        let mut root = space.new_value();
        let err = apply(
            &space,
            &mut root,
            AstAssignment::Atomic {
                slot: slot("Later"),
                value: "anything".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::KindMismatch {
                actual: TagKind::Placeholder,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_slot_fails() {
        let space = space();
        let mut root = space.new_value();
        let err = apply(
            &space,
            &mut root,
            AstAssignment::Atomic {
                slot: slot("Missing"),
                value: "x".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::SlotNotFound("Missing".into()));
    }
}
