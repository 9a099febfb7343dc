use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Widget};
use tui_skeleton::{AnimationMode, SkeletonText};

use crate::store::FeedView;
use crate::ui::post::{PostCard, post_card_height};

/// The current feed page with selection highlight.
///
/// While the collections are loading, `page_size` animated placeholder
/// cards are drawn instead of rows.
pub struct FeedListView<'a> {
    pub view: &'a FeedView<'a>,
    pub selected_index: usize,
    /// Drives the skeleton animation.
    pub elapsed_ms: u64,
}

impl<'a> FeedListView<'a> {
    pub fn new(view: &'a FeedView<'a>, selected_index: usize, elapsed_ms: u64) -> Self {
        Self {
            view,
            selected_index,
            elapsed_ms,
        }
    }
}

impl Widget for FeedListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let filter = self.view.filter;
        let title = if filter.search_term.is_empty() {
            format!(" All Posts ({}) ", filter.sort_order)
        } else {
            format!(
                " All Posts ({}) matching \"{}\" ",
                filter.sort_order, filter.search_term
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.view.loading {
            render_skeleton(inner, filter.page_size, self.elapsed_ms, buf);
            return;
        }

        if self.view.rows.is_empty() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                "No posts to display",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let content_width = inner.width.saturating_sub(1); // 1 char left margin
        let available_height = inner.height;

        // Pre-compute heights for each card (including separator).
        let heights: Vec<u16> = self
            .view
            .rows
            .iter()
            .map(|row| post_card_height(row, content_width) + 1)
            .collect();

        let scroll_start = compute_scroll_start(&heights, self.selected_index, available_height);

        let mut y = inner.y;
        let mut idx = scroll_start;
        while idx < self.view.rows.len() && y < inner.y + inner.height {
            let row = &self.view.rows[idx];
            let remaining = inner.y + inner.height - y;
            let render_h = heights[idx].min(remaining);

            let card_area = Rect::new(inner.x + 1, y, content_width, render_h.saturating_sub(1));
            PostCard::new(row)
                .selected(idx == self.selected_index)
                .render(card_area, buf);

            y += render_h;

            // Separator line
            if y < inner.y + inner.height && idx + 1 < self.view.rows.len() {
                let sep = "\u{2500}".repeat(content_width as usize);
                buf.set_string(
                    inner.x + 1,
                    y.saturating_sub(1),
                    &sep,
                    Style::default().fg(Color::DarkGray),
                );
            }

            idx += 1;
        }
    }
}

/// Title, author and body lines of a placeholder card.
const SKELETON_LINES: [f32; 3] = [0.6, 0.3, 1.0];

/// One sweeping placeholder card per expected row, clipped to `inner`.
fn render_skeleton(inner: Rect, rows: usize, elapsed_ms: u64, buf: &mut Buffer) {
    let card_height = SKELETON_LINES.len() as u16;
    let width = inner.width.saturating_sub(2);
    let bottom = inner.y + inner.height;
    let mut y = inner.y;
    for _ in 0..rows {
        if y >= bottom {
            break;
        }
        let card = Rect::new(inner.x + 1, y, width, card_height.min(bottom - y));
        SkeletonText::new(elapsed_ms)
            .mode(AnimationMode::Sweep)
            .line_widths(&SKELETON_LINES)
            .render(card, buf);
        y = y.saturating_add(card_height + 1);
    }
}

/// Find the smallest scroll start index so that the selected item fits
/// within the available height.
fn compute_scroll_start(heights: &[u16], selected: usize, available: u16) -> usize {
    if heights.is_empty() {
        return 0;
    }

    let selected = selected.min(heights.len() - 1);
    if available == 0 {
        return selected;
    }

    let mut start = selected;
    let mut used = heights[selected];

    while start > 0 {
        let next = used.saturating_add(heights[start - 1]);
        if next > available {
            break;
        }
        start -= 1;
        used = next;
    }

    start
}
