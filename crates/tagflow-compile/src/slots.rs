//! Slot index: abbreviation table for slot references.
//!
//! Authors may refer to a slot by any unique suffix of its fully-qualified
//! path. Given a tag space such as
//!
//! ```text
//! top/mid/a
//! top/mid/b
//! top/mid2/b
//! ```
//!
//! the index maps
//!
//! ```text
//! top/mid/a  => top/mid/a      mid/a  => top/mid/a      a => top/mid/a
//! top/mid/b  => top/mid/b      mid/b  => top/mid/b
//! top/mid2/b => top/mid2/b     mid2/b => top/mid2/b
//! ```
//!
//! `b` alone is claimed by two slots, so it is ambiguous and resolves to
//! an error. Full paths are enumerated in declaration order; that order
//! decides which slot claims a contested suffix first, so it is part of
//! the contract.

use indexmap::{IndexMap, IndexSet};
use tagflow_graph::SlotPath;
use tagflow_space::{CompoundType, TagType};

use crate::error::SchemaError;

/// Maps partial slot paths to their fully-qualified form.
#[derive(Debug, Clone)]
pub struct SlotIndex {
    slots: IndexMap<Vec<String>, SlotPath>,
    ambiguous: IndexSet<Vec<String>>,
}

impl SlotIndex {
    /// Builds the index from the top-level type of a tag space.
    ///
    /// Leaf slots (atomic, aggregate, placeholder) are enumerated in
    /// declaration order, each path starting with the root type's name.
    /// Compound interior types are not slots; the root itself is addressed
    /// outside the index (by its type name, or by omitting the slot).
    pub fn new(space: &CompoundType) -> Self {
        let mut full_paths = Vec::new();
        let mut stack = vec![space.name().to_string()];
        collect_leaf_paths(space, &mut stack, &mut full_paths);

        let mut slots: IndexMap<Vec<String>, SlotPath> = IndexMap::new();
        for path in &full_paths {
            slots.insert(path.clone(), SlotPath(path.clone()));
        }

        // Claim unique suffixes; a contested suffix goes ambiguous and
        // stops the shortening of the path that hit it.
        let mut ambiguous = IndexSet::new();
        let mut additions: IndexMap<Vec<String>, SlotPath> = IndexMap::new();
        for path in &full_paths {
            let mut cur = &path[1..];
            while !cur.is_empty() {
                if slots.contains_key(cur) || additions.contains_key(cur) {
                    ambiguous.insert(cur.to_vec());
                    break;
                }
                additions.insert(cur.to_vec(), SlotPath(path.clone()));
                cur = &cur[1..];
            }
        }
        for amb in &ambiguous {
            additions.shift_remove(amb);
        }
        slots.extend(additions);

        Self { slots, ambiguous }
    }

    /// Resolves a slot reference to its fully-qualified path.
    pub fn resolve(&self, slot: &[String]) -> Result<&SlotPath, SchemaError> {
        if let Some(path) = self.slots.get(slot) {
            Ok(path)
        } else if self.ambiguous.contains(slot) {
            Err(SchemaError::AmbiguousSlot(slot.join("/")))
        } else {
            Err(SchemaError::SlotNotFound(slot.join("/")))
        }
    }

    pub fn contains(&self, slot: &[String]) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn collect_leaf_paths(ty: &CompoundType, stack: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for (name, field) in ty.fields() {
        match field {
            TagType::Compound(inner) => {
                stack.push(name.to_string());
                collect_leaf_paths(inner, stack, out);
                stack.pop();
            }
            _ => {
                stack.push(name.to_string());
                out.push(stack.clone());
                stack.pop();
            }
        }
    }
}

/// Looks up the type at a fully-qualified slot path.
///
/// Every segment below the root except the last must name a compound
/// field; the last may name any non-root field.
pub fn slot_type<'a>(space: &'a CompoundType, path: &SlotPath) -> Result<&'a TagType, SchemaError> {
    let below = path.below_root();
    let (leaf, mids) = below
        .split_last()
        .ok_or_else(|| SchemaError::SlotNotFound(path.to_string()))?;

    let mut ty = space;
    for seg in mids {
        let field = ty
            .field(seg)
            .ok_or_else(|| SchemaError::NoSuchField {
                type_name: ty.name().to_string(),
                field: seg.clone(),
            })?;
        match field {
            TagType::Compound(inner) => ty = inner,
            other => {
                return Err(SchemaError::NotCompound {
                    slot: seg.clone(),
                    kind: other.kind(),
                })
            }
        }
    }
    ty.field(leaf).ok_or_else(|| SchemaError::NoSuchField {
        type_name: ty.name().to_string(),
        field: leaf.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_space::{AtomicType, TagKind};

    fn path(s: &str) -> Vec<String> {
        s.split('/').map(String::from).collect()
    }

    /// top/mid/a, top/mid/b, top/mid2/b: the doc-comment example.
    fn space() -> CompoundType {
        let mid = CompoundType::new("mid")
            .with_field(TagType::Atomic(AtomicType::new("a").with_value("v")))
            .with_field(TagType::Atomic(AtomicType::new("b").with_value("v")));
        let mid2 = CompoundType::new("mid2")
            .with_field(TagType::Atomic(AtomicType::new("b").with_value("v")));
        CompoundType::new("top")
            .with_field(TagType::Compound(mid))
            .with_field(TagType::Compound(mid2))
    }

    #[test]
    fn test_full_paths_map_to_themselves() {
        let index = SlotIndex::new(&space());
        assert_eq!(
            index.resolve(&path("top/mid/a")).unwrap().to_string(),
            "top/mid/a"
        );
        assert_eq!(
            index.resolve(&path("top/mid2/b")).unwrap().to_string(),
            "top/mid2/b"
        );
    }

    #[test]
    fn test_unique_suffixes_are_claimed() {
        let index = SlotIndex::new(&space());
        assert_eq!(index.resolve(&path("mid/a")).unwrap().to_string(), "top/mid/a");
        assert_eq!(index.resolve(&path("a")).unwrap().to_string(), "top/mid/a");
        assert_eq!(index.resolve(&path("mid/b")).unwrap().to_string(), "top/mid/b");
        assert_eq!(
            index.resolve(&path("mid2/b")).unwrap().to_string(),
            "top/mid2/b"
        );
    }

    #[test]
    fn test_contested_suffix_is_ambiguous() {
        let index = SlotIndex::new(&space());
        let err = index.resolve(&path("b")).unwrap_err();
        assert_eq!(err, SchemaError::AmbiguousSlot("b".into()));
    }

    #[test]
    fn test_unknown_slot() {
        let index = SlotIndex::new(&space());
        let err = index.resolve(&path("nope")).unwrap_err();
        assert_eq!(err, SchemaError::SlotNotFound("nope".into()));
    }

    #[test]
    fn test_compound_interiors_are_not_slots() {
        let index = SlotIndex::new(&space());
        assert!(index.resolve(&path("top/mid")).is_err());
        assert!(index.resolve(&path("top")).is_err());
    }

    #[test]
    fn test_slot_type_walks_to_the_leaf() {
        let s = space();
        let index = SlotIndex::new(&s);
        let canonical = index.resolve(&path("mid2/b")).unwrap();
        let ty = slot_type(&s, canonical).unwrap();
        assert_eq!(ty.kind(), TagKind::Atomic);
        assert_eq!(ty.name(), "b");
    }
}
