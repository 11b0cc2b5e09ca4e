use std::collections::{BTreeMap, HashMap};

use crate::ids::{BlockId, SurfaceId};

/// Where an editable surface sits: which block, and which of the block's
/// editable regions (a block may render several).
///
/// `block_index` is the index the block had when the surface registered. It
/// goes stale as soon as blocks are inserted above; navigation resolves
/// positions through the document store instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionCoords {
    pub block_index: usize,
    pub sub_index: usize,
    pub id: BlockId,
}

/// Side table from rendered editable surfaces to block coordinates.
///
/// Purely a lookup cache over ephemeral rendering handles. It never owns the
/// surfaces and never decides document order or content. Entries go away
/// explicitly: a surface unregisters when it unmounts, and the editor purges
/// a block's surfaces when the block leaves the document.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    by_surface: HashMap<SurfaceId, RegionCoords>,
    by_block: HashMap<BlockId, BTreeMap<usize, SurfaceId>>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `surface` with `coords`, replacing whatever it pointed at.
    pub fn register(&mut self, surface: SurfaceId, coords: RegionCoords) {
        self.unregister(surface);
        if let Some(previous) = self
            .by_block
            .entry(coords.id)
            .or_default()
            .insert(coords.sub_index, surface)
        {
            // another surface claimed the same slot; it is now unreachable
            self.by_surface.remove(&previous);
        }
        self.by_surface.insert(surface, coords);
    }

    pub fn unregister(&mut self, surface: SurfaceId) -> Option<RegionCoords> {
        let coords = self.by_surface.remove(&surface)?;
        if let Some(slots) = self.by_block.get_mut(&coords.id) {
            slots.remove(&coords.sub_index);
            if slots.is_empty() {
                self.by_block.remove(&coords.id);
            }
        }
        Some(coords)
    }

    pub fn resolve(&self, surface: SurfaceId) -> Option<RegionCoords> {
        self.by_surface.get(&surface).copied()
    }

    /// Surfaces of one block ordered by sub-index.
    pub fn surfaces_for(&self, id: &BlockId) -> Vec<(usize, SurfaceId)> {
        self.by_block
            .get(id)
            .map(|slots| slots.iter().map(|(sub, surface)| (*sub, *surface)).collect())
            .unwrap_or_default()
    }

    pub fn surface_at(&self, id: &BlockId, sub_index: usize) -> Option<SurfaceId> {
        self.by_block.get(id)?.get(&sub_index).copied()
    }

    pub fn first_surface(&self, id: &BlockId) -> Option<(usize, SurfaceId)> {
        let (sub, surface) = self.by_block.get(id)?.first_key_value()?;
        Some((*sub, *surface))
    }

    pub fn last_surface(&self, id: &BlockId) -> Option<(usize, SurfaceId)> {
        let (sub, surface) = self.by_block.get(id)?.last_key_value()?;
        Some((*sub, *surface))
    }

    /// Neighbouring region inside the same block, if any.
    pub fn sibling(&self, coords: &RegionCoords, forward: bool) -> Option<(usize, SurfaceId)> {
        let slots = self.by_block.get(&coords.id)?;
        let found = if forward {
            slots.range(coords.sub_index.checked_add(1)?..).next()
        } else {
            slots.range(..coords.sub_index).next_back()
        };
        found.map(|(sub, surface)| (*sub, *surface))
    }

    /// Drop every surface registered for `id`. Returns what was dropped.
    pub fn unregister_block(&mut self, id: &BlockId) -> Vec<SurfaceId> {
        let Some(slots) = self.by_block.remove(id) else {
            return Vec::new();
        };
        let surfaces: Vec<SurfaceId> = slots.into_values().collect();
        for surface in &surfaces {
            self.by_surface.remove(surface);
        }
        surfaces
    }

    pub fn len(&self) -> usize {
        self.by_surface.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_surface.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_surface.clear();
        self.by_block.clear();
    }
}
