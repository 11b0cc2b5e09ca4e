use anyhow::{Context, Result};
use blockwise_engine::{
    BlockId, Caret, CaretPlacement, Editor, EditorOptions, FocusTarget, IoError, Key, KeyAction,
    KeyInput, NewBlock, Selection, SurfaceId, blocks::builtin_registry, io,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use relative_path::{RelativePath, RelativePathBuf};
use std::collections::HashMap;
use std::path::PathBuf;

pub enum Flow {
    Continue,
    Quit,
}

/// Where one block landed in the last frame, in content lines.
#[derive(Debug, Clone, Copy)]
pub struct BlockRows {
    pub start: usize,
    pub height: usize,
    pub id: BlockId,
}

pub struct App {
    documents_path: PathBuf,
    pub document: RelativePathBuf,
    pub documents: Vec<RelativePathBuf>,
    pub editor: Editor,
    /// One editable surface per mounted block.
    surfaces: HashMap<BlockId, SurfaceId>,
    next_surface: u64,
    /// Caret offset in chars within the focused block's text.
    pub cursor: usize,
    /// The focused block's whole text is selected (first Ctrl+A).
    pub text_selected: bool,
    pub menu: Option<ListState>,
    pub status: String,
    pub dirty: bool,
    quit_armed: bool,
    pub rows: Vec<BlockRows>,
    pub content_area: Rect,
    pub scroll: u16,
}

impl App {
    pub fn open(
        documents_path: PathBuf,
        document: RelativePathBuf,
        options: EditorOptions,
    ) -> Result<Self> {
        let editor = Editor::new(builtin_registry(), options)?;
        let mut app = Self {
            documents_path,
            document: document.clone(),
            documents: Vec::new(),
            editor,
            surfaces: HashMap::new(),
            next_surface: 0,
            cursor: 0,
            text_selected: false,
            menu: None,
            status: String::new(),
            dirty: false,
            quit_armed: false,
            rows: Vec::new(),
            content_area: Rect::default(),
            scroll: 0,
        };
        app.load_document(document)?;
        app.refresh_documents();
        Ok(app)
    }

    fn load_document(&mut self, document: RelativePathBuf) -> Result<()> {
        let records = match io::read_document(&document, &self.documents_path) {
            Ok(records) => records,
            Err(IoError::NotFound(path)) => {
                log::info!("{} does not exist yet, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e).with_context(|| format!("opening {document}")),
        };
        self.editor.load(records)?;
        self.surfaces.clear();
        self.cursor = 0;
        self.text_selected = false;
        self.dirty = false;
        self.scroll = 0;
        self.status = format!("Opened {document}");
        self.document = document;
        Ok(())
    }

    fn refresh_documents(&mut self) {
        self.documents = match io::scan_documents(&self.documents_path) {
            Ok(paths) => paths
                .iter()
                .filter_map(|path| path.strip_prefix(&self.documents_path).ok())
                .filter_map(|path| RelativePathBuf::from_path(path).ok())
                .collect(),
            Err(e) => {
                log::warn!("could not scan {}: {e}", self.documents_path.display());
                Vec::new()
            }
        };
        if !self.documents.contains(&self.document) {
            self.documents.push(self.document.clone());
            self.documents.sort();
        }
    }

    /// Give every block an editable surface and retire surfaces of blocks
    /// that left the document. Runs right before a frame is drawn.
    pub fn mount_surfaces(&mut self) {
        let editor = &mut self.editor;
        self.surfaces.retain(|id, surface| {
            let alive = editor.store().contains(id);
            if !alive {
                editor.unregister_region(*surface);
            }
            alive
        });

        let ids = self.editor.store().order().to_vec();
        for id in ids {
            if self.surfaces.contains_key(&id) {
                continue;
            }
            let surface = SurfaceId(self.next_surface);
            self.next_surface += 1;
            match self.editor.register_region(surface, id, 0) {
                Ok(_) => {
                    self.surfaces.insert(id, surface);
                }
                Err(e) => log::warn!("could not mount {surface} for {id}: {e}"),
            }
        }
    }

    /// The frame is on screen: apply any focus move that was waiting for it.
    /// Returns whether focus moved, in which case the frame is stale.
    pub fn render_complete(&mut self) -> bool {
        let mut moved = false;
        if let Some(target) = self.editor.render_complete() {
            self.land_focus(target);
            moved = true;
        }
        if self.editor.focused_block().is_none()
            && let Some(last) = self.editor.store().last().map(|record| record.id)
        {
            self.focus_block(last, CaretPlacement::End);
            moved = true;
        }
        moved
    }

    fn land_focus(&mut self, target: FocusTarget) {
        if target.surface.is_some() {
            self.editor.focus_changed(target.surface);
        }
        self.cursor = match target.placement {
            CaretPlacement::Start => 0,
            CaretPlacement::End => self.text_len(&target.block),
        };
        self.text_selected = false;
    }

    fn focus_block(&mut self, id: BlockId, placement: CaretPlacement) {
        let surface = self.surfaces.get(&id).copied();
        self.land_focus(FocusTarget {
            block: id,
            surface,
            placement,
        });
    }

    /// Text form of a block, if its kind has one.
    pub fn text_of(&self, id: &BlockId) -> Option<String> {
        let record = self.editor.get_block(id)?;
        self.editor
            .registry()
            .get(&record.block_type)
            .ok()?
            .export_text(&record.data)
    }

    fn text_len(&self, id: &BlockId) -> usize {
        self.text_of(id).map_or(0, |text| text.chars().count())
    }

    fn set_text(&mut self, id: &BlockId, text: &str) -> Result<()> {
        let Some(record) = self.editor.get_block(id) else {
            return Ok(());
        };
        let entry = self.editor.registry().get(&record.block_type)?;
        let Some(data) = entry.edit_text(&record.data, text) else {
            return Ok(());
        };
        self.editor.update_block_data(id, data)?;
        self.dirty = true;
        Ok(())
    }

    fn caret(&self) -> Caret {
        let text_len = self
            .editor
            .focused_block()
            .map_or(0, |id| self.text_len(&id));
        if self.text_selected {
            Caret {
                offset: 0,
                text_len,
                collapsed: false,
                all_text_selected: true,
            }
        } else {
            // an empty surface has nothing left to select natively
            Caret {
                all_text_selected: text_len == 0,
                ..Caret::at(self.cursor.min(text_len), text_len)
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Result<Flow> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if self.menu.is_some() {
            self.on_menu_key(key)?;
            return Ok(Flow::Continue);
        }
        if ctrl && key.code == KeyCode::Char('q') {
            if self.dirty && !self.quit_armed {
                self.quit_armed = true;
                self.status = "Unsaved changes, press Ctrl+Q again to quit".into();
                return Ok(Flow::Continue);
            }
            return Ok(Flow::Quit);
        }
        self.quit_armed = false;

        match key.code {
            KeyCode::Char('s') if ctrl => return self.save().map(|_| Flow::Continue),
            KeyCode::Char('t') if ctrl => return self.cycle_type().map(|_| Flow::Continue),
            KeyCode::Char('p') if ctrl => {
                self.open_menu();
                return Ok(Flow::Continue);
            }
            KeyCode::Char('n') if ctrl => return self.open_next_document().map(|_| Flow::Continue),
            KeyCode::Backspace | KeyCode::Delete
                if self.editor.current_selection() == Selection::All =>
            {
                self.editor.clear()?;
                self.editor.clear_selection();
                self.dirty = true;
                self.status = "Cleared document".into();
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let (Some(id), Some(surface)) = (self.editor.focused_block(), self.editor.focused_surface())
        else {
            return Ok(Flow::Continue);
        };

        if key.code == KeyCode::Enter
            && !shift
            && !self.text_selected
            && let Some(text) = self.text_of(&id)
            && self.cursor < text.chars().count()
        {
            self.split_focused(id, &text)?;
            return Ok(Flow::Continue);
        }

        let input = KeyInput {
            key: engine_key(key.code),
            shift,
            command: ctrl,
            surface,
            caret: self.caret(),
        };
        let outcome = self.editor.handle_key(input);
        if outcome.clear_native_selection {
            self.text_selected = false;
        }
        match outcome.action {
            KeyAction::MoveFocus(target) => self.land_focus(target),
            KeyAction::Inserted(_) | KeyAction::Removed(_) => self.dirty = true,
            KeyAction::SelectedAll => self.status = "Selected all blocks".into(),
            KeyAction::None => {}
        }
        if !outcome.prevent_default {
            self.native_key(id, key)?;
        }
        Ok(Flow::Continue)
    }

    /// What a plain text field does with a key the engine left alone.
    fn native_key(&mut self, id: BlockId, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(text) = self.text_of(&id) else {
            return Ok(());
        };
        let len = text.chars().count();
        let cursor = self.cursor.min(len);
        let (start, end) = if self.text_selected {
            (0, len)
        } else {
            (cursor, cursor)
        };

        match key.code {
            KeyCode::Char('a' | 'A') if ctrl => {
                self.text_selected = true;
                return Ok(());
            }
            KeyCode::Char(c) if !ctrl => {
                self.set_text(&id, &splice(&text, start, end, &c.to_string()))?;
                self.cursor = start + 1;
            }
            KeyCode::Enter => {
                self.set_text(&id, &splice(&text, start, end, "\n"))?;
                self.cursor = start + 1;
            }
            KeyCode::Backspace if start != end || cursor > 0 => {
                let from = if start == end { cursor - 1 } else { start };
                self.set_text(&id, &splice(&text, from, end, ""))?;
                self.cursor = from;
            }
            KeyCode::Delete if start != end || cursor < len => {
                let to = if start == end { cursor + 1 } else { end };
                self.set_text(&id, &splice(&text, start, to, ""))?;
                self.cursor = start;
            }
            KeyCode::Left => self.cursor = cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (cursor + 1).min(len),
            KeyCode::Home | KeyCode::Up => self.cursor = 0,
            KeyCode::End | KeyCode::Down => self.cursor = len,
            _ => {}
        }
        self.text_selected = false;
        Ok(())
    }

    /// Enter inside text: the tail moves into a new block of the same kind.
    fn split_focused(&mut self, id: BlockId, text: &str) -> Result<()> {
        let at = byte_offset(text, self.cursor);
        let (left, right) = text.split_at(at);

        let index = self
            .editor
            .store()
            .position(&id)
            .context("focused block is not in the document")?;
        let record = self
            .editor
            .get_block(&id)
            .context("focused block is not in the document")?;
        let entry = self.editor.registry().get(&record.block_type)?;
        let left_data = entry.edit_text(&record.data, left);
        let right_data = entry
            .edit_text(&entry.default_value(), right)
            .unwrap_or_else(|| entry.default_value());
        let new_block = NewBlock::new(record.block_type.clone(), right_data);

        let inserted = self.editor.split_block(&id, index, left_data, new_block)?;
        self.editor
            .request_focus(inserted.id, CaretPlacement::Start);
        self.dirty = true;
        Ok(())
    }

    /// Swap the focused block for the next registered kind, carrying its
    /// text over.
    fn cycle_type(&mut self) -> Result<()> {
        let Some(id) = self.editor.focused_block() else {
            return Ok(());
        };
        let Some(record) = self.editor.get_block(&id) else {
            return Ok(());
        };
        let registry = self.editor.registry_handle();
        let entries = registry.list();
        if entries.is_empty() {
            return Ok(());
        }
        let next = entries
            .iter()
            .position(|entry| entry.block_type() == record.block_type)
            .map_or(0, |position| (position + 1) % entries.len());
        let entry = &entries[next];
        let data = self
            .text_of(&id)
            .and_then(|text| entry.import_text(&text))
            .unwrap_or_else(|| entry.default_value());

        let replaced = self
            .editor
            .replace_block(&id, NewBlock::new(entry.block_type(), data))?;
        self.editor.request_focus(replaced.id, CaretPlacement::End);
        self.status = format!("Changed block to {}", entry.icon().text);
        self.dirty = true;
        Ok(())
    }

    fn open_menu(&mut self) {
        if self.editor.last_hover().is_none() {
            self.status = "Hover a block with the mouse to pick where to insert".into();
            return;
        }
        let mut state = ListState::default();
        state.select(Some(0));
        self.menu = Some(state);
    }

    fn on_menu_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.editor.insertable_blocks().len();
        if count == 0 {
            self.menu = None;
            return Ok(());
        }
        let Some(state) = self.menu.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => self.menu = None,
            KeyCode::Down | KeyCode::Char('j') => {
                state.select(Some(state.selected().map_or(0, |i| (i + 1) % count)));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                state.select(Some(state.selected().map_or(0, |i| (i + count - 1) % count)));
            }
            KeyCode::Enter => {
                let choice = state.selected().unwrap_or(0);
                self.menu = None;
                let Some(entry) = self.editor.insertable_blocks().get(choice) else {
                    return Ok(());
                };
                let block_type = entry.block_type().to_string();
                match self.editor.insert_from_menu(&block_type)? {
                    Some(record) => {
                        self.editor.request_focus(record.id, CaretPlacement::Start);
                        self.status = format!("Inserted {block_type}");
                        self.dirty = true;
                    }
                    None => self.status = "The hovered block is gone".into(),
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        io::write_document(
            &self.document,
            &self.documents_path,
            &self.editor.to_records(),
        )
        .with_context(|| format!("saving {}", self.document))?;
        log::info!(
            "saved {} blocks to {}",
            self.editor.store().len(),
            self.document
        );
        self.dirty = false;
        self.status = format!("Saved {}", self.document);
        self.refresh_documents();
        Ok(())
    }

    fn open_next_document(&mut self) -> Result<()> {
        if self.dirty {
            self.status = "Save (Ctrl+S) before switching documents".into();
            return Ok(());
        }
        let position = self
            .documents
            .iter()
            .position(|doc| doc == &self.document)
            .unwrap_or(0);
        let Some(next) = self
            .documents
            .get((position + 1) % self.documents.len().max(1))
            .cloned()
        else {
            return Ok(());
        };
        self.load_document(next)
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let line = self.line_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => self.hover_line(line),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = line.and_then(|line| self.block_at_line(line)) {
                    self.editor.clear_selection();
                    self.focus_block(id, CaretPlacement::End);
                }
            }
            _ => {}
        }
    }

    /// Pointer is over content line `line`, or off the blocks entirely.
    pub fn hover_line(&mut self, line: Option<usize>) {
        let hovered = line.and_then(|line| self.block_at_line(line));
        let current = self.editor.current_hover();
        if hovered == current {
            return;
        }
        if let Some(old) = current {
            self.editor.hover_leave(old);
        }
        if let Some(new) = hovered {
            self.editor.hover_enter(new);
        }
    }

    fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.content_area;
        let inside = column > area.x
            && column + 1 < area.x + area.width
            && row > area.y
            && row + 1 < area.y + area.height;
        inside.then(|| usize::from(row - area.y - 1) + usize::from(self.scroll))
    }

    fn block_at_line(&self, line: usize) -> Option<BlockId> {
        self.rows
            .iter()
            .find(|rows| line >= rows.start && line < rows.start + rows.height)
            .map(|rows| rows.id)
    }

    pub fn report(&mut self, error: anyhow::Error) {
        log::warn!("{error:#}");
        self.status = format!("Error: {error:#}");
    }

    pub fn document_path(&self) -> &RelativePath {
        &self.document
    }
}

fn engine_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

/// Replace chars `start..end` of `text` with `insert`.
fn splice(text: &str, start: usize, end: usize, insert: &str) -> String {
    let (from, to) = (byte_offset(text, start), byte_offset(text, end));
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..from]);
    out.push_str(insert);
    out.push_str(&text[to..]);
    out
}
