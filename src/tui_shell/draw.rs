use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::App;
use super::presenter::{OverlayView, PageView, Screen};
use crate::model::ModalKind;
use crate::navigation::BackControl;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    match screen.top() {
        Some(page) => {
            draw_header(frame, chunks[0], page, screen.pages.len());
            draw_body(frame, chunks[1], page, app.selected);
        }
        None => {
            frame.render_widget(
                Paragraph::new("Connecting...").block(Block::default().borders(Borders::ALL)),
                chunks[0],
            );
        }
    }

    let help = match &screen.overlay {
        Some(OverlayView::Modal { .. }) => "Left/Right choose  Enter select  q quit",
        Some(OverlayView::Working(_)) => "q quit",
        None => "Up/Down move  Enter activate  Esc back  r refresh  q quit",
    };
    let footer = match &app.status {
        Some(status) => Line::from(vec![
            Span::styled(status.as_str(), Style::default().fg(Color::Red)),
            Span::raw("  "),
            Span::styled(help, Style::default().fg(Color::DarkGray)),
        ]),
        None => Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    };
    frame.render_widget(Paragraph::new(footer), chunks[2]);

    if let Some(overlay) = &screen.overlay {
        draw_overlay(frame, overlay, app.modal_selected);
    }
}

fn draw_header(frame: &mut ratatui::Frame, area: Rect, page: &PageView, depth: usize) {
    let mut spans = Vec::new();
    match page.back {
        Some(BackControl::Enabled) => {
            spans.push(Span::styled("< Back", Style::default().fg(Color::Cyan)));
            spans.push(Span::raw("  "));
        }
        Some(BackControl::Disabled) => {
            spans.push(Span::styled("Back", Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw("  "));
        }
        Some(BackControl::Hidden) | None => {}
    }
    spans.push(Span::styled(
        page.title.clone().unwrap_or_default(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if let Some(end) = &page.end {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(end.label(), Style::default().fg(Color::Cyan)));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({})", page.key, depth));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_body(frame: &mut ratatui::Frame, area: Rect, page: &PageView, selected: usize) {
    let items: Vec<ListItem> = page
        .rows
        .iter()
        .map(|row| {
            let style = if row.actions.is_empty() && row.checkbox.is_none() {
                Style::default()
            } else {
                Style::default().fg(Color::Cyan)
            };
            ListItem::new(Line::from(Span::styled(row.label(), style)))
        })
        .collect();
    let mut state = ListState::default();
    if !page.rows.is_empty() {
        state.select(Some(selected.min(page.rows.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn draw_overlay(frame: &mut ratatui::Frame, overlay: &OverlayView, selected: usize) {
    let area = frame.area();
    match overlay {
        OverlayView::Working(text) => {
            let box_area = centered(area, 30, 3);
            frame.render_widget(Clear, box_area);
            frame.render_widget(
                Paragraph::new(format!("{}...", text)).block(Block::default().borders(Borders::ALL)),
                box_area,
            );
        }
        OverlayView::Modal {
            kind,
            title,
            text,
            buttons,
            ..
        } => {
            let w = area.width.saturating_sub(6).clamp(20, 70);
            let h = area.height.saturating_sub(6).clamp(7, 16);
            let box_area = match kind {
                ModalKind::Alert => centered(area, w, h),
                // Drawers sit at the bottom edge.
                ModalKind::Drawer => Rect {
                    x: area.x,
                    y: area.y + area.height.saturating_sub(h),
                    width: area.width,
                    height: h.min(area.height),
                },
            };
            frame.render_widget(Clear, box_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .title(title.as_str())
                .border_style(Style::default().fg(Color::Yellow));
            frame.render_widget(block.clone(), box_area);
            let inner = block.inner(box_area);

            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(inner);
            frame.render_widget(
                Paragraph::new(text.clone().unwrap_or_default()).wrap(Wrap { trim: false }),
                parts[0],
            );

            let mut spans = Vec::new();
            for (i, (label, _)) in buttons.iter().enumerate() {
                let style = if i == selected {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(format!(" {} ", label), style));
                spans.push(Span::raw(" "));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), parts[1]);
        }
    }
}
