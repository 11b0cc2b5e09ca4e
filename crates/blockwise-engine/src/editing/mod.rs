/*!
 * # Editing Core
 *
 * The editor state engine: an ordered document of typed blocks plus the
 * transient UI state layered over it.
 *
 * ## Components
 *
 * - **`store`**: `DocumentStore`, the ordered id list and id → record map.
 *   All structural mutation funnels through it and every call keeps the two
 *   consistent.
 * - **`selection`**: hover (with a retained last-hovered block) and block
 *   selection, including the whole-document select-all flag.
 * - **`regions`**: side table from rendered editable surfaces to
 *   `(block id, block index, sub-index)` coordinates.
 * - **`focus`**: keyboard navigation and deferred focus intents.
 * - **`render`**: per-block render slots, with placeholders for block types
 *   the registry does not know.
 * - **`editor`**: the `Editor` facade that composes all of the above into
 *   the mutation API.
 *
 * ## Deferred focus
 *
 * The host re-renders after a mutation, and focus can only be placed on a
 * surface that exists. Operations that need focus on a new or different
 * block schedule a `FocusIntent`; the host calls `Editor::render_complete`
 * after painting and receives the resolved `FocusTarget`.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use blockwise_engine::{Caret, Editor, EditorOptions, Key, KeyInput, SurfaceId};
 * use blockwise_engine::blocks::builtin_registry;
 *
 * let mut editor = Editor::new(builtin_registry(), EditorOptions::default()).unwrap();
 * let first = editor.store().order()[0];
 *
 * // host rendered the block and registered its editable surface
 * editor.register_region(SurfaceId(1), first, 0).unwrap();
 *
 * // Enter at the end of the paragraph
 * let outcome = editor.handle_key(KeyInput::new(Key::Enter, SurfaceId(1), Caret::at(0, 0)));
 * assert!(outcome.prevent_default);
 * assert_eq!(editor.store().len(), 2);
 *
 * // after the next frame, focus goes to the new block
 * let target = editor.render_complete().unwrap();
 * assert_eq!(target.block, editor.store().order()[1]);
 * ```
 */

pub mod editor;
pub mod focus;
pub mod regions;
pub mod render;
pub mod selection;
pub mod store;
