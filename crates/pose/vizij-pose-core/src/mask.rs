//! Hierarchical bone mask.
//!
//! Each entry names a joint and a weight. At bind time the joint's subtree is
//! walked once in the rigid hierarchy and turned into a list of slots in the
//! flattened joint table; per frame, [`HierarchyMask::propagate`] writes each
//! entry's weight to its slots. Entries apply in declaration order, so where
//! subtrees overlap the later entry wins.

use crate::config::MaskEntry;
use crate::error::{FrameError, SetupError};
use crate::mixer::{clamp_unit, BoneWeights};
use crate::skeleton::{JointIndex, JointTable, Skeleton};

#[derive(Clone, Debug)]
struct BoundEntry {
    joint: JointIndex,
    weight: f32,
    slots: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct HierarchyMask {
    entries: Vec<BoundEntry>,
    table_len: usize,
}

impl HierarchyMask {
    pub fn bind(
        skeleton: &Skeleton,
        table: &JointTable,
        entries: &[MaskEntry],
    ) -> Result<Self, SetupError> {
        let mut bound = Vec::with_capacity(entries.len());
        for entry in entries {
            let joint = skeleton.index_of(&entry.joint)?;
            let slots = skeleton
                .subtree(joint)
                .iter()
                .map(|j| {
                    table
                        .slot_of(*j)
                        .ok_or_else(|| SetupError::MaskJointNotInTable {
                            name: skeleton.name(*j).to_string(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            bound.push(BoundEntry {
                joint,
                weight: clamp_unit(entry.weight),
                slots,
            });
        }
        log::debug!(
            "hierarchy mask bound: entries={} table={}",
            bound.len(),
            table.len()
        );
        Ok(Self {
            entries: bound,
            table_len: table.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the joint table the slots index into.
    pub fn table_len(&self) -> usize {
        self.table_len
    }

    pub fn joint(&self, entry: usize) -> Option<JointIndex> {
        self.entries.get(entry).map(|e| e.joint)
    }

    pub fn weight(&self, entry: usize) -> Option<f32> {
        self.entries.get(entry).map(|e| e.weight)
    }

    /// Update an entry's weight (clamped). Returns false for an unknown entry.
    pub fn set_weight(&mut self, entry: usize, weight: f32) -> bool {
        match self.entries.get_mut(entry) {
            Some(e) => {
                e.weight = clamp_unit(weight);
                true
            }
            None => false,
        }
    }

    /// Precomputed table slots covered by an entry.
    pub fn slots(&self, entry: usize) -> &[usize] {
        self.entries
            .get(entry)
            .map(|e| e.slots.as_slice())
            .unwrap_or(&[])
    }

    /// Write every entry's weight over its subtree slots. Leaves `weights`
    /// untouched if its length does not match the table.
    pub fn propagate(&self, weights: &mut BoneWeights) -> Result<(), FrameError> {
        if weights.len() != self.table_len {
            return Err(FrameError::WeightCountMismatch {
                expected: self.table_len,
                actual: weights.len(),
            });
        }
        for entry in &self.entries {
            for &slot in &entry.slots {
                weights.set(slot, entry.weight);
            }
        }
        Ok(())
    }
}
