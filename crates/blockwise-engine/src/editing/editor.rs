use serde_json::Value;
use std::sync::Arc;

use crate::editing::focus::{
    self, CaretPlacement, FocusCoordinator, FocusIntent, FocusTarget, KeyInput, KeyOutcome,
};
use crate::editing::regions::{RegionCoords, RegionRegistry};
use crate::editing::render::{self, RenderSlot};
use crate::editing::selection::{Selection, SelectionState};
use crate::editing::store::{BlockRecord, DocumentStore, NewBlock, Patch};
use crate::error::{EditorError, Result};
use crate::ids::{BlockId, SurfaceId};
use crate::options::{EditorOptions, LastBlockPolicy, UnknownTypePolicy};
use crate::registry::{BlockEntry, BlockRegistry};

/// One mounted editor: the document plus all transient UI state over it.
///
/// This is the mutation API handed to block implementations and UI
/// affordances. It owns the document store and keeps the side tables
/// (selection, editable regions, focus) in step with it: whenever a block
/// leaves the document, its regions are unregistered and any hover,
/// selection or focus pointing at it is dropped.
///
/// Created at mount, dropped at unmount. Every method runs to completion
/// synchronously, so each call is one atomic transition of the document.
///
/// ```rust
/// use blockwise_engine::{Editor, EditorOptions, NewBlock, blocks::builtin_registry};
/// use serde_json::json;
///
/// let mut editor = Editor::new(builtin_registry(), EditorOptions::default()).unwrap();
/// let first = editor.store().order()[0];
///
/// let header = editor
///     .insert_block_after(&first, NewBlock::new("header", json!({ "text": "Hi" })))
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(editor.store().order(), &[first, header.id]);
/// ```
#[derive(Debug)]
pub struct Editor {
    pub(crate) registry: Arc<BlockRegistry>,
    pub(crate) store: DocumentStore,
    pub(crate) selection: SelectionState,
    pub(crate) regions: RegionRegistry,
    pub(crate) focus: FocusCoordinator,
    options: EditorOptions,
}

impl Editor {
    /// Mount an editor holding a single default block.
    pub fn new(registry: BlockRegistry, options: EditorOptions) -> Result<Self> {
        let registry = prepare_registry(registry, &options)?;
        let store = DocumentStore::with_block(NewBlock::from_entry(registry.default_entry()?));
        Ok(Self::assemble(registry, store, options))
    }

    /// Mount an editor over a persisted document.
    pub fn with_records(
        registry: BlockRegistry,
        options: EditorOptions,
        records: Vec<BlockRecord>,
    ) -> Result<Self> {
        let registry = prepare_registry(registry, &options)?;
        let store = build_store(&registry, options.unknown_type_policy, records)?;
        Ok(Self::assemble(registry, store, options))
    }

    fn assemble(registry: Arc<BlockRegistry>, store: DocumentStore, options: EditorOptions) -> Self {
        Self {
            registry,
            store,
            selection: SelectionState::new(),
            regions: RegionRegistry::new(),
            focus: FocusCoordinator::new(),
            options,
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Shared handle for components that outlive a borrow of the editor.
    pub fn registry_handle(&self) -> Arc<BlockRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn regions(&self) -> &RegionRegistry {
        &self.regions
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn get_block(&self, id: &BlockId) -> Option<&BlockRecord> {
        self.store.get(id)
    }

    pub fn block_at(&self, index: usize) -> Option<&BlockRecord> {
        self.store.get_at(index)
    }

    /// A fresh block of the default type.
    pub fn default_block(&self) -> Result<NewBlock> {
        focus::default_new_block(self)
    }

    // ---- mutation API ----

    pub fn insert_block(&mut self, index: Option<usize>, block: NewBlock) -> Result<BlockRecord> {
        let patch = self.store.insert(index, block)?;
        self.inserted_record(&patch)
    }

    /// Insert after `anchor`. `Ok(None)` means the anchor is gone and nothing
    /// changed.
    pub fn insert_block_after(
        &mut self,
        anchor: &BlockId,
        block: NewBlock,
    ) -> Result<Option<BlockRecord>> {
        let patch = self.store.insert_after(anchor, block)?;
        if patch.is_noop() {
            return Ok(None);
        }
        self.inserted_record(&patch).map(Some)
    }

    /// Insert a run of blocks; returns their ids in document order.
    pub fn batch_insert_blocks(
        &mut self,
        index: Option<usize>,
        blocks: Vec<NewBlock>,
    ) -> Result<Vec<BlockId>> {
        Ok(self.store.batch_insert(index, blocks)?.inserted_ids())
    }

    /// Remove a block. Missing ids are a no-op; the sole remaining block is
    /// handled according to `LastBlockPolicy`.
    pub fn remove_block(&mut self, id: &BlockId) -> Result<Patch> {
        let result = self.store.remove(id);
        self.settle_removal(result)
    }

    pub fn batch_remove_blocks(&mut self, ids: &[BlockId]) -> Result<Patch> {
        let result = self.store.batch_remove(ids);
        self.settle_removal(result)
    }

    /// Swap a block for a new one (new id, same position). Used to change a
    /// block's type.
    pub fn replace_block(&mut self, id: &BlockId, block: NewBlock) -> Result<BlockRecord> {
        let patch = self.store.replace(id, block)?;
        self.forget(&patch.removed_ids());
        self.inserted_record(&patch)
    }

    pub fn update_block_data(&mut self, id: &BlockId, data: Value) -> Result<&BlockRecord> {
        self.store.update_data(id, data)?;
        self.store.get(id).ok_or(EditorError::DanglingId(*id))
    }

    /// Split block `id` (at position `index`); returns the inserted block.
    /// See [`DocumentStore::split`].
    pub fn split_block(
        &mut self,
        id: &BlockId,
        index: usize,
        left: Option<Value>,
        new_block: NewBlock,
    ) -> Result<BlockRecord> {
        let patch = self.store.split(id, index, left, new_block)?;
        self.forget(&patch.removed_ids());
        self.inserted_record(&patch)
    }

    /// Reset to a single fresh default block.
    pub fn clear(&mut self) -> Result<Patch> {
        let block = self.default_block()?;
        let patch = self.store.clear(block);
        self.forget(&patch.removed_ids());
        Ok(patch)
    }

    /// Replace the whole document with persisted records.
    ///
    /// All transient state is reset. An empty record list yields a cleared
    /// document.
    pub fn load(&mut self, records: Vec<BlockRecord>) -> Result<()> {
        self.store = build_store(&self.registry, self.options.unknown_type_policy, records)?;
        self.selection = SelectionState::new();
        self.regions.clear();
        self.focus = FocusCoordinator::new();
        Ok(())
    }

    /// Persisted form, in document order.
    pub fn to_records(&self) -> Vec<BlockRecord> {
        self.store.to_records()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.store.to_records())?)
    }

    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let records: Vec<BlockRecord> = serde_json::from_str(json)?;
        self.load(records)
    }

    fn inserted_record(&self, patch: &Patch) -> Result<BlockRecord> {
        let id = patch
            .inserted_ids()
            .first()
            .copied()
            .ok_or_else(|| EditorError::Internal("patch carries no inserted block".into()))?;
        self.store.get(&id).cloned().ok_or(EditorError::DanglingId(id))
    }

    fn settle_removal(&mut self, result: Result<Patch>) -> Result<Patch> {
        match result {
            Ok(patch) => {
                self.forget(&patch.removed_ids());
                Ok(patch)
            }
            Err(EditorError::LastBlock) => match self.options.last_block_policy {
                LastBlockPolicy::Clear => {
                    log::debug!("removal would empty the document, clearing instead");
                    self.clear()
                }
                LastBlockPolicy::Reject => {
                    log::warn!("refusing to remove the last remaining block");
                    Err(EditorError::LastBlock)
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Drop every side-table reference to blocks that left the document.
    fn forget(&mut self, ids: &[BlockId]) {
        for id in ids {
            let surfaces = self.regions.unregister_block(id);
            self.focus.forget_surfaces(&surfaces);
        }
        self.selection.forget(ids);
    }

    // ---- hover / selection ----

    pub fn hover_enter(&mut self, id: BlockId) {
        if self.store.contains(&id) {
            self.selection.hover_enter(id);
        }
    }

    pub fn hover_leave(&mut self, id: BlockId) {
        self.selection.hover_leave(id);
    }

    pub fn current_hover(&self) -> Option<BlockId> {
        self.selection.current_hover()
    }

    pub fn last_hover(&self) -> Option<BlockId> {
        self.selection.last_hover()
    }

    pub fn current_selection(&self) -> Selection {
        self.selection.current()
    }

    pub fn select_block(&mut self, id: Option<BlockId>) {
        self.selection
            .select_block(id.filter(|id| self.store.contains(id)));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    /// Block kinds an insert menu should offer, in registration order.
    pub fn insertable_blocks(&self) -> &[BlockEntry] {
        self.registry.list()
    }

    /// Insert-menu action: a default `block_type` block after the last
    /// hovered block. `Ok(None)` when nothing has been hovered yet or the
    /// hovered block is gone.
    pub fn insert_from_menu(&mut self, block_type: &str) -> Result<Option<BlockRecord>> {
        let block = NewBlock::from_entry(self.registry.get(block_type)?);
        let Some(anchor) = self.selection.last_hover() else {
            return Ok(None);
        };
        self.insert_block_after(&anchor, block)
    }

    // ---- editable regions / focus ----

    /// Register a rendered editable surface for region `sub_index` of `id`.
    pub fn register_region(
        &mut self,
        surface: SurfaceId,
        id: BlockId,
        sub_index: usize,
    ) -> Result<RegionCoords> {
        let block_index = self.store.position(&id).ok_or(EditorError::DanglingId(id))?;
        let coords = RegionCoords {
            block_index,
            sub_index,
            id,
        };
        self.regions.register(surface, coords);
        Ok(coords)
    }

    /// The surface unmounted.
    pub fn unregister_region(&mut self, surface: SurfaceId) -> Option<RegionCoords> {
        self.focus.forget_surfaces(&[surface]);
        self.regions.unregister(surface)
    }

    pub fn resolve_region(&self, surface: SurfaceId) -> Option<RegionCoords> {
        self.regions.resolve(surface)
    }

    /// Host notification that native focus moved.
    pub fn focus_changed(&mut self, surface: Option<SurfaceId>) {
        self.focus.set_focused(surface);
    }

    pub fn focused_surface(&self) -> Option<SurfaceId> {
        self.focus.focused()
    }

    /// Block owning the focused surface.
    pub fn focused_block(&self) -> Option<BlockId> {
        self.focus
            .focused()
            .and_then(|surface| self.regions.resolve(surface))
            .map(|coords| coords.id)
    }

    /// Ask for focus on `block` after the next render.
    pub fn request_focus(&mut self, block: BlockId, placement: CaretPlacement) {
        self.focus.schedule(FocusIntent {
            block,
            sub_index: None,
            placement,
        });
    }

    pub fn pending_focus(&self) -> Option<&FocusIntent> {
        self.focus.pending()
    }

    /// The host finished rendering: apply the pending focus intent, if any.
    ///
    /// If the intended block is gone by now, focus falls back to the last
    /// block of the document.
    pub fn render_complete(&mut self) -> Option<FocusTarget> {
        let intent = self.focus.take_pending()?;
        let block = if self.store.contains(&intent.block) {
            intent.block
        } else {
            self.store.last()?.id
        };
        let target = self.focus_target(block, intent.sub_index, intent.placement);
        if target.surface.is_some() {
            self.focus.set_focused(target.surface);
        }
        Some(target)
    }

    pub(crate) fn focus_target(
        &self,
        block: BlockId,
        sub_index: Option<usize>,
        placement: CaretPlacement,
    ) -> FocusTarget {
        let surface = match (sub_index, placement) {
            (Some(sub), _) => self.regions.surface_at(&block, sub),
            (None, CaretPlacement::Start) => self.regions.first_surface(&block).map(|(_, s)| s),
            (None, CaretPlacement::End) => self.regions.last_surface(&block).map(|(_, s)| s),
        };
        FocusTarget {
            block,
            surface,
            placement,
        }
    }

    /// Keyboard entry point; see the `focus` module.
    ///
    /// - ArrowUp with the caret at offset 0 moves to the region above.
    /// - ArrowDown with the caret at the end moves to the region below.
    /// - Enter without Shift inserts a default block below and focuses it.
    /// - Backspace on an empty block other than the first removes it and
    ///   focuses the end of the previous block.
    /// - The select-all chord promotes a full native text selection to a
    ///   whole-document selection; every other key clears block selection.
    pub fn handle_key(&mut self, input: KeyInput) -> KeyOutcome {
        focus::handle_key(self, input)
    }

    // ---- rendering ----

    /// One slot per block in document order. Blocks whose type cannot be
    /// resolved come back as placeholders instead of failing the render.
    pub fn render_slots(&self) -> Vec<RenderSlot<'_>> {
        render::render_slots(self)
    }
}

fn prepare_registry(
    mut registry: BlockRegistry,
    options: &EditorOptions,
) -> Result<Arc<BlockRegistry>> {
    if let Some(default_type) = &options.default_block_type {
        registry.set_default_type(default_type)?;
    }
    registry.default_entry()?;
    Ok(Arc::new(registry))
}

fn build_store(
    registry: &BlockRegistry,
    policy: UnknownTypePolicy,
    records: Vec<BlockRecord>,
) -> Result<DocumentStore> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if registry.contains(&record.block_type) {
            kept.push(record);
            continue;
        }
        match policy {
            UnknownTypePolicy::Placeholder => {
                log::warn!(
                    "block {} has unregistered type '{}', keeping as placeholder",
                    record.id,
                    record.block_type
                );
                kept.push(record);
            }
            UnknownTypePolicy::Reject => {
                return Err(EditorError::UnknownBlockType(record.block_type));
            }
            UnknownTypePolicy::Drop => {
                log::warn!(
                    "dropping block {} with unregistered type '{}'",
                    record.id,
                    record.block_type
                );
            }
        }
    }

    if kept.is_empty() {
        return Ok(DocumentStore::with_block(NewBlock::from_entry(
            registry.default_entry()?,
        )));
    }
    DocumentStore::from_records(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::builtin_registry;
    use crate::editing::store::Change;
    use crate::tests::{editor_with, record};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn paragraph(text: &str) -> NewBlock {
        NewBlock::new("paragraph", json!({ "text": text }))
    }

    fn editor_with_options(options: EditorOptions, records: Vec<BlockRecord>) -> Editor {
        Editor::with_records(builtin_registry(), options, records).unwrap()
    }

    #[test]
    fn test_new_editor_holds_one_default_block() {
        let editor = Editor::new(builtin_registry(), EditorOptions::default()).unwrap();

        assert_eq!(editor.store().len(), 1);
        let block = editor.block_at(0).unwrap();
        assert_eq!(block.block_type, "paragraph");
        assert_eq!(block.data, json!({ "text": "" }));
    }

    #[test]
    fn test_default_block_type_override() {
        let options = EditorOptions {
            default_block_type: Some("header".into()),
            ..EditorOptions::default()
        };
        let editor = Editor::new(builtin_registry(), options).unwrap();
        assert_eq!(editor.block_at(0).unwrap().block_type, "header");

        let options = EditorOptions {
            default_block_type: Some("nope".into()),
            ..EditorOptions::default()
        };
        let err = Editor::new(builtin_registry(), options).err().unwrap();
        assert!(matches!(err, EditorError::UnknownBlockType(t) if t == "nope"));
    }

    #[rstest]
    #[case::paragraph("paragraph")]
    #[case::header("header")]
    #[case::list("list")]
    #[case::quote("quote")]
    #[case::code("code")]
    #[case::delimiter("delimiter")]
    fn test_clear_leaves_an_empty_block(#[case] default_type: &str) {
        let options = EditorOptions {
            default_block_type: Some(default_type.into()),
            ..EditorOptions::default()
        };
        let mut editor = editor_with_options(
            options,
            vec![record("paragraph", json!({ "text": "keep me" }))],
        );

        editor.clear().unwrap();

        let block = editor.block_at(0).unwrap();
        assert_eq!(block.block_type, default_type);
        assert!(
            editor
                .registry()
                .is_block_empty(&block.block_type, &block.data)
                .unwrap()
        );
    }

    #[test]
    fn test_empty_registry_cannot_mount() {
        let err = Editor::new(BlockRegistry::new(), EditorOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, EditorError::NoDefaultBlock));
    }

    #[test]
    fn test_removing_sole_block_clears_by_default() {
        let mut editor = editor_with(vec![record("header", json!({ "text": "Title", "level": 1 }))]);
        let only = editor.store().order()[0];

        let patch = editor.remove_block(&only).unwrap();

        assert!(matches!(patch.change, Change::Cleared { .. }));
        assert_eq!(editor.store().len(), 1);
        let fresh = editor.block_at(0).unwrap();
        assert_ne!(fresh.id, only);
        assert_eq!(fresh.block_type, "paragraph");
        assert_eq!(fresh.data, json!({ "text": "" }));
    }

    #[test]
    fn test_removing_sole_block_rejected_by_policy() {
        let options = EditorOptions {
            last_block_policy: LastBlockPolicy::Reject,
            ..EditorOptions::default()
        };
        let mut editor = editor_with_options(options, vec![record("paragraph", json!({ "text": "x" }))]);
        let before = editor.to_records();
        let only = before[0].id;

        let err = editor.remove_block(&only).err().unwrap();

        assert!(matches!(err, EditorError::LastBlock));
        assert_eq!(editor.to_records(), before);
    }

    #[test]
    fn test_batch_remove_of_everything_follows_policy() {
        let mut editor = editor_with(vec![
            record("paragraph", json!({ "text": "a" })),
            record("paragraph", json!({ "text": "b" })),
        ]);
        let ids = editor.store().order().to_vec();

        editor.batch_remove_blocks(&ids).unwrap();

        assert_eq!(editor.store().len(), 1);
        assert!(!ids.contains(&editor.store().order()[0]));
    }

    #[test]
    fn test_remove_drops_regions_selection_and_focus() {
        let mut editor = editor_with(vec![
            record("paragraph", json!({ "text": "a" })),
            record("paragraph", json!({ "text": "b" })),
        ]);
        let ids = editor.store().order().to_vec();
        editor.register_region(SurfaceId(1), ids[1], 0).unwrap();
        editor.register_region(SurfaceId(2), ids[1], 1).unwrap();
        editor.focus_changed(Some(SurfaceId(2)));
        editor.hover_enter(ids[1]);
        editor.select_block(Some(ids[1]));

        editor.remove_block(&ids[1]).unwrap();

        assert!(editor.regions().is_empty());
        assert_eq!(editor.focused_surface(), None);
        assert_eq!(editor.current_hover(), None);
        assert_eq!(editor.last_hover(), None);
        assert_eq!(editor.current_selection(), Selection::None);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "a" }))]);
        let before = editor.to_records();

        let patch = editor.remove_block(&BlockId::new()).unwrap();

        assert!(patch.is_noop());
        assert_eq!(editor.to_records(), before);
    }

    #[test]
    fn test_insert_block_after_missing_anchor_is_noop() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "a" }))]);
        let inserted = editor
            .insert_block_after(&BlockId::new(), paragraph("b"))
            .unwrap();
        assert_eq!(inserted, None);
        assert_eq!(editor.store().len(), 1);
    }

    #[test]
    fn test_replace_block_changes_type_in_place() {
        let mut editor = editor_with(vec![
            record("paragraph", json!({ "text": "a" })),
            record("paragraph", json!({ "text": "b" })),
        ]);
        let ids = editor.store().order().to_vec();
        editor.register_region(SurfaceId(4), ids[0], 0).unwrap();

        let header = editor
            .replace_block(&ids[0], NewBlock::new("header", json!({ "text": "a", "level": 2 })))
            .unwrap();

        assert_eq!(editor.store().order(), &[header.id, ids[1]]);
        assert_eq!(editor.get_block(&ids[0]), None);
        assert_eq!(editor.resolve_region(SurfaceId(4)), None);
    }

    #[test]
    fn test_update_and_replace_on_missing_id_fail() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "a" }))]);
        let ghost = BlockId::new();
        let before = editor.to_records();

        assert!(matches!(
            editor.update_block_data(&ghost, json!({ "text": "x" })),
            Err(EditorError::DanglingId(id)) if id == ghost
        ));
        assert!(matches!(
            editor.replace_block(&ghost, paragraph("x")),
            Err(EditorError::DanglingId(id)) if id == ghost
        ));
        assert_eq!(editor.to_records(), before);
    }

    #[test]
    fn test_split_block_keeps_left_half() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "hello world" }))]);
        let original = editor.store().order()[0];

        let right = editor
            .split_block(&original, 0, Some(json!({ "text": "hello" })), paragraph("world"))
            .unwrap();

        assert_eq!(editor.store().order(), &[original, right.id]);
        assert_eq!(editor.get_block(&original).unwrap().data, json!({ "text": "hello" }));
        assert_eq!(right.data, json!({ "text": "world" }));
    }

    #[test]
    fn test_insert_from_menu_uses_last_hover() {
        let mut editor = editor_with(vec![
            record("paragraph", json!({ "text": "a" })),
            record("paragraph", json!({ "text": "b" })),
        ]);
        let ids = editor.store().order().to_vec();

        assert_eq!(editor.insert_from_menu("quote").unwrap(), None);

        editor.hover_enter(ids[0]);
        editor.hover_leave(ids[0]);
        assert_eq!(editor.current_hover(), None);

        let quote = editor.insert_from_menu("quote").unwrap().unwrap();

        assert_eq!(editor.store().order(), &[ids[0], quote.id, ids[1]]);
        assert_eq!(quote.block_type, "quote");
        assert!(matches!(
            editor.insert_from_menu("nope"),
            Err(EditorError::UnknownBlockType(_))
        ));
    }

    #[test]
    fn test_hover_ignores_unknown_ids() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "a" }))]);
        editor.hover_enter(BlockId::new());
        assert_eq!(editor.current_hover(), None);
        assert_eq!(editor.last_hover(), None);
    }

    #[rstest]
    #[case::placeholder(UnknownTypePolicy::Placeholder, Some(3))]
    #[case::drop(UnknownTypePolicy::Drop, Some(2))]
    #[case::reject(UnknownTypePolicy::Reject, None)]
    fn test_load_applies_unknown_type_policy(
        #[case] policy: UnknownTypePolicy,
        #[case] expected_len: Option<usize>,
    ) {
        let options = EditorOptions {
            unknown_type_policy: policy,
            ..EditorOptions::default()
        };
        let records = vec![
            record("paragraph", json!({ "text": "a" })),
            record("widget", json!({ "x": 1 })),
            record("paragraph", json!({ "text": "b" })),
        ];

        let result = Editor::with_records(builtin_registry(), options, records);

        match expected_len {
            Some(len) => assert_eq!(result.unwrap().store().len(), len),
            None => assert!(matches!(
                result.err().unwrap(),
                EditorError::UnknownBlockType(t) if t == "widget"
            )),
        }
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "a" }))]);
        let dup = record("paragraph", json!({ "text": "b" }));
        let before = editor.to_records();

        let err = editor.load(vec![dup.clone(), dup.clone()]).err().unwrap();

        assert!(matches!(err, EditorError::DuplicateId(id) if id == dup.id));
        assert_eq!(editor.to_records(), before);
    }

    #[test]
    fn test_load_empty_document_yields_default_block() {
        let mut editor = editor_with(vec![record("quote", json!({ "text": "q", "caption": "" }))]);
        editor.register_region(SurfaceId(1), editor.store().order()[0], 0).unwrap();

        editor.load(Vec::new()).unwrap();

        assert_eq!(editor.store().len(), 1);
        assert_eq!(editor.block_at(0).unwrap().block_type, "paragraph");
        assert!(editor.regions().is_empty());
    }

    #[test]
    fn test_json_round_trip_preserves_ids_and_order() {
        let mut editor = editor_with(vec![
            record("header", json!({ "text": "Title", "level": 1 })),
            record("paragraph", json!({ "text": "body" })),
        ]);
        let json = editor.to_json().unwrap();

        let mut other = Editor::new(builtin_registry(), EditorOptions::default()).unwrap();
        other.load_json(&json).unwrap();

        assert_eq!(other.to_records(), editor.to_records());
        assert!(json.contains("\"type\": \"header\""));
        assert!(editor.load_json("{ not json").is_err());
    }

    #[test]
    fn test_render_complete_falls_back_to_last_block() {
        let mut editor = editor_with(vec![
            record("paragraph", json!({ "text": "a" })),
            record("paragraph", json!({ "text": "b" })),
        ]);
        let ids = editor.store().order().to_vec();
        editor.register_region(SurfaceId(2), ids[1], 0).unwrap();

        let ghost = BlockId::new();
        editor.request_focus(ghost, CaretPlacement::End);
        let target = editor.render_complete().unwrap();

        assert_eq!(target.block, ids[1]);
        assert_eq!(target.surface, Some(SurfaceId(2)));
        assert_eq!(editor.focused_block(), Some(ids[1]));
        assert_eq!(editor.render_complete(), None);
    }

    #[test]
    fn test_register_region_for_missing_block_fails() {
        let mut editor = editor_with(vec![record("paragraph", json!({ "text": "a" }))]);
        assert!(matches!(
            editor.register_region(SurfaceId(1), BlockId::new(), 0),
            Err(EditorError::DanglingId(_))
        ));
        assert!(editor.regions().is_empty());
    }
}
