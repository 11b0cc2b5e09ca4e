//! # Focus Coordination
//!
//! Keyboard navigation across independently rendered editable regions.
//!
//! The host reports each keystroke as a [`KeyInput`] carrying the surface that
//! received it and what the caret looks like inside that surface. The engine
//! answers with a [`KeyOutcome`] saying whether to suppress the native
//! behaviour and where focus should go.
//!
//! Focus into a block that does not exist on screen yet (after Enter, or after
//! Backspace removed the current block) cannot be applied immediately. Those
//! moves are recorded as a [`FocusIntent`] and resolved by
//! `Editor::render_complete`, which the host calls once the new frame is up.
//! Render always completes before the intent is applied.

use crate::editing::editor::Editor;
use crate::editing::store::NewBlock;
use crate::ids::{BlockId, SurfaceId};
use crate::registry::has_no_own_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Backspace,
    Char(char),
    Other,
}

/// Caret state inside the focused surface, measured by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caret {
    /// Caret (selection start) offset in the surface's text.
    pub offset: usize,
    /// Length of the surface's text.
    pub text_len: usize,
    pub collapsed: bool,
    /// The surface's entire text is already selected natively.
    pub all_text_selected: bool,
}

impl Caret {
    /// Collapsed caret at `offset`.
    pub fn at(offset: usize, text_len: usize) -> Self {
        Self {
            offset,
            text_len,
            collapsed: true,
            all_text_selected: false,
        }
    }

    pub fn at_start(&self) -> bool {
        self.offset == 0
    }

    pub fn at_end(&self) -> bool {
        self.text_len == 0 || (self.collapsed && self.offset == self.text_len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    /// Platform command modifier (Ctrl, or Cmd on macOS).
    pub command: bool,
    pub surface: SurfaceId,
    pub caret: Caret,
}

impl KeyInput {
    pub fn new(key: Key, surface: SurfaceId, caret: Caret) -> Self {
        Self {
            key,
            shift: false,
            command: false,
            surface,
            caret,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_command(mut self) -> Self {
        self.command = true;
        self
    }

    fn is_select_all(&self) -> bool {
        self.command && matches!(self.key, Key::Char('a') | Key::Char('A'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretPlacement {
    Start,
    End,
}

/// Deferred request to focus a block once it has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusIntent {
    pub block: BlockId,
    /// Specific region of the block; `None` picks by placement.
    pub sub_index: Option<usize>,
    pub placement: CaretPlacement,
}

/// Where focus should land, resolved against the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    pub block: BlockId,
    /// `None` when the block has not registered any editable region.
    pub surface: Option<SurfaceId>,
    pub placement: CaretPlacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyAction {
    #[default]
    None,
    /// Focus moves right away; the target is already rendered.
    MoveFocus(FocusTarget),
    /// A block was inserted; focus follows after the next render.
    Inserted(BlockId),
    /// A block was removed; focus follows after the next render.
    Removed(BlockId),
    SelectedAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// Suppress the host's native handling of the key.
    pub prevent_default: bool,
    /// Drop the native text selection (the engine took over selection).
    pub clear_native_selection: bool,
    pub action: KeyAction,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(action: KeyAction) -> Self {
        Self {
            prevent_default: true,
            clear_native_selection: false,
            action,
        }
    }
}

/// Which surface owns input focus, and the pending post-render focus move.
#[derive(Debug, Clone, Default)]
pub struct FocusCoordinator {
    focused: Option<SurfaceId>,
    pending: Option<FocusIntent>,
}

impl FocusCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<SurfaceId> {
        self.focused
    }

    pub fn set_focused(&mut self, surface: Option<SurfaceId>) {
        self.focused = surface;
    }

    /// Record a focus move for after the next render. A later intent
    /// supersedes an earlier one.
    pub fn schedule(&mut self, intent: FocusIntent) {
        self.pending = Some(intent);
    }

    pub fn pending(&self) -> Option<&FocusIntent> {
        self.pending.as_ref()
    }

    pub fn take_pending(&mut self) -> Option<FocusIntent> {
        self.pending.take()
    }

    /// The focused surface went away with its block.
    pub(crate) fn forget_surfaces(&mut self, surfaces: &[SurfaceId]) {
        if self.focused.is_some_and(|focused| surfaces.contains(&focused)) {
            self.focused = None;
        }
    }
}

/// Dispatch one keystroke. See [`Editor::handle_key`].
pub(crate) fn handle_key(editor: &mut Editor, input: KeyInput) -> KeyOutcome {
    if input.is_select_all() {
        return handle_select_all(editor, &input);
    }
    // any other keystroke ends a block selection
    editor.selection.clear_selection();

    let Some(coords) = editor.regions.resolve(input.surface) else {
        log::debug!("key on unregistered {}", input.surface);
        return KeyOutcome::ignored();
    };
    let Some(index) = editor.store.position(&coords.id) else {
        log::debug!("key on surface of removed block {}", coords.id);
        return KeyOutcome::ignored();
    };

    match input.key {
        Key::ArrowUp if input.caret.at_start() => {
            let target = editor
                .regions
                .sibling(&coords, false)
                .map(|(_, surface)| FocusTarget {
                    block: coords.id,
                    surface: Some(surface),
                    placement: CaretPlacement::End,
                })
                .or_else(|| {
                    let previous = editor.store.id_at(index.checked_sub(1)?)?;
                    Some(editor.focus_target(previous, None, CaretPlacement::End))
                });
            move_focus(editor, target)
        }
        Key::ArrowDown if input.caret.at_end() => {
            let target = editor
                .regions
                .sibling(&coords, true)
                .map(|(_, surface)| FocusTarget {
                    block: coords.id,
                    surface: Some(surface),
                    placement: CaretPlacement::Start,
                })
                .or_else(|| {
                    let next = editor.store.id_at(index + 1)?;
                    Some(editor.focus_target(next, None, CaretPlacement::Start))
                });
            move_focus(editor, target)
        }
        Key::Enter if !input.shift => insert_default_after(editor, index),
        Key::Backspace => remove_if_empty(editor, coords.id, index),
        _ => KeyOutcome::ignored(),
    }
}

fn handle_select_all(editor: &mut Editor, input: &KeyInput) -> KeyOutcome {
    if editor.selection.is_all_selected() {
        // second press keeps the band selection and swallows the native one
        return KeyOutcome::handled(KeyAction::SelectedAll);
    }
    if input.caret.all_text_selected {
        editor.selection.set_all_selected(true);
        return KeyOutcome {
            prevent_default: true,
            clear_native_selection: true,
            action: KeyAction::SelectedAll,
        };
    }
    // let the host select the surface's own text first
    KeyOutcome::ignored()
}

fn move_focus(editor: &mut Editor, target: Option<FocusTarget>) -> KeyOutcome {
    match target {
        Some(target) => {
            if target.surface.is_some() {
                editor.focus.set_focused(target.surface);
            }
            KeyOutcome::handled(KeyAction::MoveFocus(target))
        }
        None => KeyOutcome::ignored(),
    }
}

fn insert_default_after(editor: &mut Editor, index: usize) -> KeyOutcome {
    let block = match editor.default_block() {
        Ok(block) => block,
        Err(e) => {
            log::warn!("enter: cannot create default block: {e}");
            return KeyOutcome::ignored();
        }
    };
    match editor.insert_block(Some(index + 1), block) {
        Ok(record) => {
            editor.focus.schedule(FocusIntent {
                block: record.id,
                sub_index: None,
                placement: CaretPlacement::Start,
            });
            KeyOutcome::handled(KeyAction::Inserted(record.id))
        }
        Err(e) => {
            log::warn!("enter: insert failed: {e}");
            KeyOutcome::ignored()
        }
    }
}

fn remove_if_empty(editor: &mut Editor, id: BlockId, index: usize) -> KeyOutcome {
    if index == 0 {
        return KeyOutcome::ignored();
    }
    let Some(record) = editor.store.get(&id) else {
        return KeyOutcome::ignored();
    };
    let empty = has_no_own_keys(&record.data)
        || editor
            .registry
            .get(&record.block_type)
            .is_ok_and(|entry| entry.is_empty(&record.data));
    if !empty {
        return KeyOutcome::ignored();
    }

    if let Err(e) = editor.remove_block(&id) {
        log::warn!("backspace: could not remove {id}: {e}");
        return KeyOutcome::ignored();
    }
    let target = editor
        .store
        .id_at(index - 1)
        .or_else(|| editor.store.last().map(|record| record.id));
    if let Some(block) = target {
        editor.focus.schedule(FocusIntent {
            block,
            sub_index: None,
            placement: CaretPlacement::End,
        });
    }
    KeyOutcome::handled(KeyAction::Removed(id))
}

/// New block of the registry's default type.
pub(crate) fn default_new_block(editor: &Editor) -> crate::error::Result<NewBlock> {
    editor.registry.default_entry().map(NewBlock::from_entry)
}
