use blockwise_engine::{
    BlockEntry, BlockId, BlockRecord, RenderSlot, Selection,
    blocks::{Code, Header, List, Quote},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List as ListWidget, ListItem, Paragraph},
};

use crate::app::{App, BlockRows};

pub fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(outer[0]);

    draw_documents(f, app, columns[0]);
    draw_blocks(f, app, columns[1]);
    draw_status(f, app, outer[1]);
    if app.menu.is_some() {
        draw_menu(f, app, columns[1]);
    }
}

fn draw_documents(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .documents
        .iter()
        .map(|doc| {
            let style = if doc == &app.document {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!("📄 {doc}"), style)))
        })
        .collect();

    let list = ListWidget::new(items).block(Block::default().borders(Borders::ALL).title("Documents"));
    f.render_widget(list, area);
}

fn draw_blocks(f: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.editor.focused_block();
    let hovered = app.editor.current_hover();
    let all_selected = app.editor.current_selection() == Selection::All;

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut rows = Vec::new();
    for slot in app.editor.render_slots() {
        let record = slot.record();
        let cursor = (focused == Some(record.id)).then_some(app.cursor);
        let body = match &slot {
            RenderSlot::Block { implementation, .. } => {
                block_lines(record, implementation, cursor, app.text_selected)
            }
            RenderSlot::Placeholder { error, .. } => vec![Line::from(Span::styled(
                format!("⚠ {error}"),
                Style::default().fg(Color::Red),
            ))],
        };
        let selected = all_selected
            || matches!(slot, RenderSlot::Block { selected: true, .. });

        rows.push(BlockRows {
            start: lines.len(),
            height: body.len(),
            id: record.id,
        });
        lines.extend(body.into_iter().map(|line| {
            with_gutter(line, record.id, focused, hovered, selected)
        }));
    }

    let visible = usize::from(area.height.saturating_sub(2));
    if let Some(rows) = rows.iter().find(|rows| Some(rows.id) == focused) {
        let scroll = usize::from(app.scroll);
        if rows.start < scroll {
            app.scroll = rows.start as u16;
        } else if rows.start + rows.height > scroll + visible {
            app.scroll = (rows.start + rows.height).saturating_sub(visible) as u16;
        }
    }
    app.rows = rows;
    app.content_area = area;

    let title = if app.dirty {
        format!("{} [modified]", app.document_path())
    } else {
        app.document_path().to_string()
    };
    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.scroll, 0));
    f.render_widget(content, area);
}

fn with_gutter(
    line: Line<'static>,
    id: BlockId,
    focused: Option<BlockId>,
    hovered: Option<BlockId>,
    selected: bool,
) -> Line<'static> {
    let gutter = if focused == Some(id) {
        Span::styled("▌", Style::default().fg(Color::Yellow))
    } else if hovered == Some(id) {
        Span::styled("│", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(" ")
    };
    let mut spans = vec![gutter, Span::raw(" ")];
    spans.extend(line.spans);
    let line = Line::from(spans);
    if selected {
        line.style(Style::default().bg(Color::Blue))
    } else {
        line
    }
}

/// Lines for one block. `cursor` is set for the focused block.
fn block_lines(
    record: &BlockRecord,
    implementation: &BlockEntry,
    cursor: Option<usize>,
    text_selected: bool,
) -> Vec<Line<'static>> {
    let Some(text) = implementation.export_text(&record.data) else {
        let icon = implementation.icon();
        return vec![Line::from(Span::styled(
            format!("{}  {}", icon.symbol, icon.text),
            Style::default().fg(Color::DarkGray),
        ))];
    };

    let data = &record.data;
    let style = match record.block_type.as_str() {
        Header::TYPE => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        Quote::TYPE => Style::default().add_modifier(Modifier::ITALIC),
        Code::TYPE => Style::default().fg(Color::Green),
        _ => Style::default(),
    };
    let prefix = |line: usize| -> String {
        match record.block_type.as_str() {
            Header::TYPE => format!("{} ", "#".repeat(usize::from(Header::level(data)))),
            List::TYPE if List::is_ordered(data) => format!("{}. ", line + 1),
            List::TYPE => "• ".to_string(),
            Quote::TYPE => "│ ".to_string(),
            Code::TYPE => "  ".to_string(),
            _ => String::new(),
        }
    };

    let mut lines = Vec::new();
    let mut offset = 0;
    for (i, part) in text.split('\n').enumerate() {
        let len = part.chars().count();
        let mut spans = vec![Span::styled(prefix(i), style)];
        match cursor {
            Some(_) if text_selected => {
                spans.push(Span::styled(
                    part.to_string(),
                    style.add_modifier(Modifier::REVERSED),
                ));
            }
            Some(cursor) if cursor >= offset && cursor <= offset + len => {
                spans.extend(cursor_spans(part, cursor - offset, style));
            }
            _ => spans.push(Span::styled(part.to_string(), style)),
        }
        lines.push(Line::from(spans));
        offset += len + 1;
    }

    if record.block_type == Quote::TYPE {
        let caption = data.get("caption").and_then(|c| c.as_str()).unwrap_or("");
        if !caption.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  — {caption}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    if record.block_type == Code::TYPE
        && let Some(lang) = Code::lang(data)
    {
        lines.insert(
            0,
            Line::from(Span::styled(lang.to_string(), Style::default().fg(Color::DarkGray))),
        );
    }
    lines
}

/// Text with the char at `at` drawn as a block cursor.
fn cursor_spans(text: &str, at: usize, style: Style) -> Vec<Span<'static>> {
    let before: String = text.chars().take(at).collect();
    let under: String = text.chars().nth(at).map_or(" ".to_string(), String::from);
    let after: String = text.chars().skip(at + 1).collect();
    vec![
        Span::styled(before, style),
        Span::styled(under, style.add_modifier(Modifier::REVERSED)),
        Span::styled(after, style),
    ]
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::raw(app.status.clone())),
        Line::from(Span::styled(
            "Ctrl+S: Save | Ctrl+P: Insert | Ctrl+T: Block type | Ctrl+A: Select | Ctrl+N: Next document | Ctrl+Q: Quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_menu(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .editor
        .insertable_blocks()
        .iter()
        .map(|entry| {
            let icon = entry.icon();
            ListItem::new(Line::from(format!("{}  {}", icon.symbol, icon.text)))
        })
        .collect();

    let height = (items.len() as u16 + 2).min(area.height);
    let width = 28.min(area.width);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let list = ListWidget::new(items)
        .block(Block::default().borders(Borders::ALL).title("Insert block"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_widget(Clear, popup);
    if let Some(state) = app.menu.as_mut() {
        f.render_stateful_widget(list, popup, state);
    }
}
