use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::error::{EditorError, Result};
use crate::ids::BlockId;
use crate::registry::BlockEntry;

/// One unit of document content.
///
/// `id` and `block_type` are fixed for the record's lifetime; only `data` is
/// ever rewritten in place. Serializes as `{ "id", "type", "data" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: String,
    pub data: Value,
}

/// A block that does not exist yet: the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub block_type: String,
    pub data: Value,
}

impl NewBlock {
    pub fn new(block_type: impl Into<String>, data: Value) -> Self {
        Self {
            block_type: block_type.into(),
            data,
        }
    }

    /// Fresh block of a registered kind, using its default value.
    pub fn from_entry(entry: &BlockEntry) -> Self {
        Self::new(entry.block_type(), entry.default_value())
    }

    fn into_record(self) -> BlockRecord {
        BlockRecord {
            id: BlockId::new(),
            block_type: self.block_type,
            data: self.data,
        }
    }
}

/// Why a mutation left the document untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoChange {
    /// `insert_after` anchor is no longer in the document.
    AnchorMissing(BlockId),
    /// None of the ids handed to a remove call were present.
    NothingToRemove,
    /// A batch insert with no blocks.
    NothingToInsert,
}

/// What a successful mutation did to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Inserted {
        at: usize,
        ids: Vec<BlockId>,
    },
    Removed {
        ids: Vec<BlockId>,
    },
    Replaced {
        old: BlockId,
        new: BlockId,
    },
    Updated {
        id: BlockId,
    },
    Split {
        original: BlockId,
        inserted: BlockId,
        /// The split consumed the original block entirely.
        original_removed: bool,
    },
    Cleared {
        removed: Vec<BlockId>,
        fresh: BlockId,
    },
    Unchanged(NoChange),
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub version: u64,
    pub change: Change,
}

impl Patch {
    pub fn is_noop(&self) -> bool {
        matches!(self.change, Change::Unchanged(_))
    }

    /// Ids that left the document with this patch.
    pub fn removed_ids(&self) -> Vec<BlockId> {
        match &self.change {
            Change::Removed { ids } => ids.clone(),
            Change::Cleared { removed, .. } => removed.clone(),
            Change::Replaced { old, .. } => vec![*old],
            Change::Split {
                original,
                original_removed: true,
                ..
            } => vec![*original],
            _ => Vec::new(),
        }
    }

    /// Ids that entered the document with this patch, in document order.
    pub fn inserted_ids(&self) -> Vec<BlockId> {
        match &self.change {
            Change::Inserted { ids, .. } => ids.clone(),
            Change::Replaced { new, .. } => vec![*new],
            Change::Split { inserted, .. } => vec![*inserted],
            Change::Cleared { fresh, .. } => vec![*fresh],
            _ => Vec::new(),
        }
    }
}

/// Ordered block ids plus the id → record map.
///
/// `order` is the only place document order lives. Every mutating method
/// either updates `order` and `by_id` together or touches neither, so the two
/// always form a bijection. Positions are resolved against the sequence as it
/// was before the call.
///
/// The store itself refuses to drop below one block (`EditorError::LastBlock`);
/// turning that into a reset is the editor's decision.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    order: Vec<BlockId>,
    by_id: HashMap<BlockId, BlockRecord>,
    version: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding a single block, as created at editor mount.
    pub fn with_block(block: NewBlock) -> Self {
        let mut store = Self::new();
        store.clear(block);
        store.version = 0;
        store
    }

    /// Rebuild a store from its persisted form. Order follows the records.
    pub fn from_records(records: impl IntoIterator<Item = BlockRecord>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            if store.by_id.contains_key(&record.id) {
                return Err(EditorError::DuplicateId(record.id));
            }
            store.order.push(record.id);
            store.by_id.insert(record.id, record);
        }
        Ok(store)
    }

    /// Persisted form: records in document order.
    pub fn to_records(&self) -> Vec<BlockRecord> {
        self.records().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn order(&self) -> &[BlockId] {
        &self.order
    }

    pub fn get(&self, id: &BlockId) -> Option<&BlockRecord> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.order.iter().position(|candidate| candidate == id)
    }

    pub fn id_at(&self, index: usize) -> Option<BlockId> {
        self.order.get(index).copied()
    }

    pub fn get_at(&self, index: usize) -> Option<&BlockRecord> {
        self.order.get(index).and_then(|id| self.by_id.get(id))
    }

    pub fn first(&self) -> Option<&BlockRecord> {
        self.get_at(0)
    }

    pub fn last(&self) -> Option<&BlockRecord> {
        self.order.last().and_then(|id| self.by_id.get(id))
    }

    /// Records in document order.
    pub fn records(&self) -> impl Iterator<Item = &BlockRecord> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// `order` and `by_id` describe the same set of ids, without duplicates.
    pub fn is_consistent(&self) -> bool {
        let unique: HashSet<_> = self.order.iter().collect();
        unique.len() == self.order.len()
            && self.order.len() == self.by_id.len()
            && self.order.iter().all(|id| self.by_id.contains_key(id))
            && self.by_id.iter().all(|(id, record)| record.id == *id)
    }

    fn bump(&mut self, change: Change) -> Patch {
        self.version += 1;
        Patch {
            version: self.version,
            change,
        }
    }

    fn unchanged(&self, reason: NoChange) -> Patch {
        Patch {
            version: self.version,
            change: Change::Unchanged(reason),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index > self.order.len() {
            return Err(EditorError::InvalidIndex {
                index,
                len: self.order.len(),
            });
        }
        Ok(())
    }

    /// Insert at `index`, or append when `index` is `None`.
    ///
    /// Indices past the end are rejected rather than clamped.
    pub fn insert(&mut self, index: Option<usize>, block: NewBlock) -> Result<Patch> {
        let at = index.unwrap_or(self.order.len());
        self.check_index(at)?;

        let record = block.into_record();
        let id = record.id;
        self.order.insert(at, id);
        self.by_id.insert(id, record);
        log::debug!("inserted block {id} at {at}");

        Ok(self.bump(Change::Inserted { at, ids: vec![id] }))
    }

    /// Insert right after `anchor`. A missing anchor is a no-op, since the
    /// anchor may have been removed between the caller reading and acting.
    pub fn insert_after(&mut self, anchor: &BlockId, block: NewBlock) -> Result<Patch> {
        match self.position(anchor) {
            Some(position) => self.insert(Some(position + 1), block),
            None => {
                log::debug!("insert_after: anchor {anchor} is gone");
                Ok(self.unchanged(NoChange::AnchorMissing(*anchor)))
            }
        }
    }

    /// Insert several blocks as one contiguous run, keeping their input order.
    pub fn batch_insert(&mut self, index: Option<usize>, blocks: Vec<NewBlock>) -> Result<Patch> {
        let at = index.unwrap_or(self.order.len());
        self.check_index(at)?;
        if blocks.is_empty() {
            return Ok(self.unchanged(NoChange::NothingToInsert));
        }

        let records: Vec<BlockRecord> = blocks.into_iter().map(NewBlock::into_record).collect();
        let ids: Vec<BlockId> = records.iter().map(|record| record.id).collect();

        self.order.splice(at..at, ids.iter().copied());
        self.by_id
            .extend(records.into_iter().map(|record| (record.id, record)));
        log::debug!("inserted {} blocks at {at}", ids.len());

        Ok(self.bump(Change::Inserted { at, ids }))
    }

    /// Remove one block. Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: &BlockId) -> Result<Patch> {
        self.batch_remove(std::slice::from_ref(id))
    }

    /// Remove every listed id that is present, in one pass.
    ///
    /// Fails with `LastBlock`, leaving the document untouched, if the call
    /// would remove every block.
    pub fn batch_remove(&mut self, ids: &[BlockId]) -> Result<Patch> {
        let doomed: HashSet<BlockId> = ids
            .iter()
            .filter(|id| self.by_id.contains_key(id))
            .copied()
            .collect();
        if doomed.is_empty() {
            return Ok(self.unchanged(NoChange::NothingToRemove));
        }
        if doomed.len() == self.order.len() {
            return Err(EditorError::LastBlock);
        }

        let removed: Vec<BlockId> = self
            .order
            .iter()
            .filter(|id| doomed.contains(id))
            .copied()
            .collect();
        self.order.retain(|id| !doomed.contains(id));
        for id in &removed {
            self.by_id.remove(id);
        }
        log::debug!("removed {} blocks", removed.len());

        Ok(self.bump(Change::Removed { ids: removed }))
    }

    /// Swap the block at `id` for a new record with a fresh id, in place.
    ///
    /// This is how a block changes type.
    pub fn replace(&mut self, id: &BlockId, block: NewBlock) -> Result<Patch> {
        let position = self.position(id).ok_or(EditorError::DanglingId(*id))?;

        let record = block.into_record();
        let new = record.id;
        self.order[position] = new;
        self.by_id.remove(id);
        self.by_id.insert(new, record);
        log::debug!("replaced block {id} with {new}");

        Ok(self.bump(Change::Replaced { old: *id, new }))
    }

    /// Overwrite the data of an existing block; id and type stay as they are.
    pub fn update_data(&mut self, id: &BlockId, data: Value) -> Result<Patch> {
        let record = self.by_id.get_mut(id).ok_or(EditorError::DanglingId(*id))?;
        record.data = data;
        Ok(self.bump(Change::Updated { id: *id }))
    }

    /// Split a block in two.
    ///
    /// `new_block` goes in at `index + 1`. With `left` set, the original keeps
    /// that data as its remaining half; with `None`, the original is removed
    /// because the split consumed it entirely. Preconditions are checked up
    /// front so a failed split changes nothing; the insert then happens before
    /// the update or removal so `index` stays meaningful throughout.
    pub fn split(
        &mut self,
        id: &BlockId,
        index: usize,
        left: Option<Value>,
        new_block: NewBlock,
    ) -> Result<Patch> {
        if !self.contains(id) {
            return Err(EditorError::DanglingId(*id));
        }
        let at = index.checked_add(1).ok_or(EditorError::InvalidIndex {
            index,
            len: self.order.len(),
        })?;
        self.check_index(at)?;

        let record = new_block.into_record();
        let inserted = record.id;
        self.order.insert(at, inserted);
        self.by_id.insert(inserted, record);

        let original_removed = match left {
            Some(data) => {
                if let Some(original) = self.by_id.get_mut(id) {
                    original.data = data;
                }
                false
            }
            None => {
                self.order.retain(|candidate| candidate != id);
                self.by_id.remove(id);
                true
            }
        };
        log::debug!("split block {id} at {index}, new block {inserted}");

        Ok(self.bump(Change::Split {
            original: *id,
            inserted,
            original_removed,
        }))
    }

    /// Reset to a single fresh block.
    pub fn clear(&mut self, block: NewBlock) -> Patch {
        let record = block.into_record();
        let fresh = record.id;
        let removed = std::mem::replace(&mut self.order, vec![fresh]);
        self.by_id.clear();
        self.by_id.insert(fresh, record);
        log::debug!("cleared document, fresh block {fresh}");

        self.bump(Change::Cleared { removed, fresh })
    }
}
