use crate::editing::editor::Editor;
use crate::editing::store::BlockRecord;
use crate::error::EditorError;
use crate::registry::BlockEntry;

/// What the host should paint at one position of the document.
///
/// A registry miss only affects its own slot: the block renders as an inert
/// placeholder while every other block stays interactive.
#[derive(Debug)]
pub enum RenderSlot<'a> {
    Block {
        index: usize,
        record: &'a BlockRecord,
        implementation: &'a BlockEntry,
        selected: bool,
    },
    Placeholder {
        index: usize,
        record: &'a BlockRecord,
        error: EditorError,
    },
}

impl<'a> RenderSlot<'a> {
    pub fn index(&self) -> usize {
        match self {
            RenderSlot::Block { index, .. } | RenderSlot::Placeholder { index, .. } => *index,
        }
    }

    pub fn record(&self) -> &'a BlockRecord {
        match self {
            RenderSlot::Block { record, .. } | RenderSlot::Placeholder { record, .. } => *record,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderSlot::Placeholder { .. })
    }
}

pub(crate) fn render_slots(editor: &Editor) -> Vec<RenderSlot<'_>> {
    editor
        .store
        .records()
        .enumerate()
        .map(|(index, record)| match editor.registry.get(&record.block_type) {
            Ok(implementation) => RenderSlot::Block {
                index,
                record,
                implementation,
                selected: editor.selection.is_selected(&record.id),
            },
            Err(error) => {
                log::warn!("rendering placeholder for block {}: {error}", record.id);
                RenderSlot::Placeholder {
                    index,
                    record,
                    error,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{editor_with, record};
    use serde_json::json;

    #[test]
    fn test_unknown_type_renders_placeholder_in_place() {
        let editor = editor_with(vec![
            record("paragraph", json!({ "text": "before" })),
            record("unknown", json!({ "x": 1 })),
            record("paragraph", json!({ "text": "after" })),
        ]);
        let before = editor.to_records();

        let slots = editor.render_slots();

        assert_eq!(slots.len(), 3);
        assert!(!slots[0].is_placeholder());
        assert!(slots[1].is_placeholder());
        assert!(!slots[2].is_placeholder());
        assert_eq!(slots[1].index(), 1);
        match &slots[1] {
            RenderSlot::Placeholder { error, .. } => {
                assert!(matches!(error, EditorError::UnknownBlockType(t) if t == "unknown"));
            }
            RenderSlot::Block { .. } => panic!("expected placeholder"),
        }
        assert_eq!(editor.to_records(), before);
    }

    #[test]
    fn test_slots_carry_selection() {
        let mut editor = editor_with(vec![
            record("paragraph", json!({ "text": "a" })),
            record("paragraph", json!({ "text": "b" })),
        ]);
        let second = editor.store().order()[1];
        editor.select_block(Some(second));

        let selected: Vec<bool> = editor
            .render_slots()
            .iter()
            .map(|slot| match slot {
                RenderSlot::Block { selected, .. } => *selected,
                RenderSlot::Placeholder { .. } => false,
            })
            .collect();
        assert_eq!(selected, vec![false, true]);
    }
}
