//! Atomic field increments via a `RocksDB` merge operator.
//!
//! An increment is written as a merge operand naming document fields and signed
//! deltas. The store folds operands into the stored CBOR document when it reads or
//! compacts the key, so a writer never computes a new value from one it read earlier.

use std::collections::BTreeMap;

use ciborium::Value;
use rocksdb::MergeOperands;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::Result;

/// Name registered with `RocksDB` for the increment operator.
pub const MERGE_OPERATOR_NAME: &str = "atelier.field_increment";

/// A merge operand: signed deltas keyed by document field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIncrements(BTreeMap<String, i64>);

impl FieldIncrements {
    /// An operand adding `delta` to one field.
    #[must_use]
    pub fn single(field: &str, delta: i64) -> Self {
        Self(BTreeMap::from([(field.to_string(), delta)]))
    }

    /// Encode as a merge operand.
    ///
    /// # Errors
    ///
    /// Returns an error if CBOR encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::serialize(self)
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        ciborium::from_reader(bytes).ok()
    }

    fn absorb(&mut self, other: Self) -> Option<()> {
        for (field, delta) in other.0 {
            let slot = self.0.entry(field).or_insert(0);
            *slot = slot.checked_add(delta)?;
        }
        Some(())
    }

    fn apply_to(&self, doc: &mut Value) -> Option<()> {
        let Value::Map(entries) = doc else {
            return None;
        };

        for (field, delta) in &self.0 {
            let slot = entries
                .iter_mut()
                .find(|(key, _)| matches!(key, Value::Text(name) if name == field));

            match slot {
                Some((_, Value::Integer(current))) => {
                    let next = i64::try_from(*current).ok()?.checked_add(*delta)?;
                    *current = next.into();
                }
                Some(_) => return None,
                None => entries.push((Value::Text(field.clone()), Value::Integer((*delta).into()))),
            }
        }
        Some(())
    }
}

/// Fold increments into an encoded document.
fn merge_document<'a>(
    existing: &[u8],
    operands: impl IntoIterator<Item = &'a [u8]>,
) -> Option<Vec<u8>> {
    let mut doc: Value = ciborium::from_reader(existing).ok()?;
    for operand in operands {
        FieldIncrements::decode(operand)?.apply_to(&mut doc)?;
    }

    let mut out = Vec::new();
    ciborium::into_writer(&doc, &mut out).ok()?;
    Some(out)
}

/// Combine queued increments without a base document.
fn combine_operands<'a>(operands: impl IntoIterator<Item = &'a [u8]>) -> Option<Vec<u8>> {
    let mut combined = FieldIncrements::default();
    for operand in operands {
        combined.absorb(FieldIncrements::decode(operand)?)?;
    }
    combined.encode().ok()
}

/// Full merge: apply every operand to the stored document.
///
/// Increments are only issued against documents read in the same transaction, so a
/// missing base value is a corruption.
pub(crate) fn full_merge(
    key: &[u8],
    existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    let Some(existing) = existing else {
        tracing::error!(key = ?String::from_utf8_lossy(key), "increment on missing document");
        return None;
    };

    let merged = merge_document(existing, operands.iter());
    if merged.is_none() {
        tracing::error!(key = ?String::from_utf8_lossy(key), "failed to apply field increments");
    }
    merged
}

/// Partial merge: sum operands field by field.
pub(crate) fn partial_merge(
    _key: &[u8],
    _existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    combine_operands(operands.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        coins: i64,
        copy_count: i64,
    }

    fn doc(coins: i64, copy_count: i64) -> Vec<u8> {
        codec::serialize(&Doc {
            name: "Aria".into(),
            coins,
            copy_count,
        })
        .unwrap()
    }

    #[test]
    fn applies_increments_in_order() {
        let ops = [
            FieldIncrements::single("coins", -20).encode().unwrap(),
            FieldIncrements::single("coins", 15).encode().unwrap(),
            FieldIncrements::single("copy_count", 1).encode().unwrap(),
        ];
        let merged = merge_document(&doc(25, 2), ops.iter().map(Vec::as_slice)).unwrap();
        let out: Doc = codec::deserialize(&merged).unwrap();

        assert_eq!(out.coins, 20);
        assert_eq!(out.copy_count, 3);
        assert_eq!(out.name, "Aria");
    }

    #[test]
    fn combines_operands() {
        let ops = [
            FieldIncrements::single("like_count", 1).encode().unwrap(),
            FieldIncrements::single("like_count", 1).encode().unwrap(),
            FieldIncrements::single("dislike_count", -1).encode().unwrap(),
        ];
        let combined = combine_operands(ops.iter().map(Vec::as_slice)).unwrap();
        let decoded = FieldIncrements::decode(&combined).unwrap();

        let mut expected = FieldIncrements::single("like_count", 2);
        expected.absorb(FieldIncrements::single("dislike_count", -1)).unwrap();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn rejects_non_integer_field() {
        let op = FieldIncrements::single("name", 1).encode().unwrap();
        assert!(merge_document(&doc(0, 0), [op.as_slice()]).is_none());
    }

    #[test]
    fn rejects_overflow() {
        let op = FieldIncrements::single("coins", 1).encode().unwrap();
        assert!(merge_document(&doc(i64::MAX, 0), [op.as_slice()]).is_none());
    }
}
