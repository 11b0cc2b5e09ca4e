use std::collections::HashSet;

use crate::ids::BlockId;

/// Transient hover and block-selection state.
///
/// Hover and selection change independently of each other and of focus, so
/// they are tracked as separate fields rather than one combined state.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    hover: Option<BlockId>,
    last_hover: Option<BlockId>,
    selected: HashSet<BlockId>,
    all_selected: bool,
}

/// What is selected right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    /// Whole-document band selection via the select-all accelerator.
    All,
    Blocks(HashSet<BlockId>),
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover_enter(&mut self, id: BlockId) {
        self.hover = Some(id);
        self.last_hover = Some(id);
    }

    /// Pointer left `id`. The last hovered block is kept so a menu opened
    /// right after hover-out still has a target.
    pub fn hover_leave(&mut self, id: BlockId) {
        if self.hover == Some(id) {
            self.hover = None;
        }
    }

    pub fn current_hover(&self) -> Option<BlockId> {
        self.hover
    }

    pub fn last_hover(&self) -> Option<BlockId> {
        self.last_hover
    }

    /// Select exactly one block, or nothing.
    pub fn select_block(&mut self, id: Option<BlockId>) {
        self.selected.clear();
        self.selected.extend(id);
    }

    pub fn set_all_selected(&mut self, all: bool) {
        self.all_selected = all;
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.all_selected || self.selected.contains(id)
    }

    pub fn current(&self) -> Selection {
        if self.all_selected {
            Selection::All
        } else if self.selected.is_empty() {
            Selection::None
        } else {
            Selection::Blocks(self.selected.clone())
        }
    }

    /// Drop both the explicit set and the select-all flag.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.all_selected = false;
    }

    /// Drop every reference to blocks that left the document.
    pub fn forget(&mut self, ids: &[BlockId]) {
        for id in ids {
            self.selected.remove(id);
            if self.hover.as_ref() == Some(id) {
                self.hover = None;
            }
            if self.last_hover.as_ref() == Some(id) {
                self.last_hover = None;
            }
        }
    }
}
