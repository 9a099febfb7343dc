use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::app::AppMode;
use crate::store::{FeedView, LoadState};

/// Bottom status bar showing mode, pager position, and status messages.
pub struct StatusBar<'a> {
    mode: &'a AppMode,
    view: &'a FeedView<'a>,
    status_message: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        mode: &'a AppMode,
        view: &'a FeedView<'a>,
        status_message: Option<&'a str>,
    ) -> Self {
        Self {
            mode,
            view,
            status_message,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        // Background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_style(bg_style);
        }

        let mut spans = Vec::new();

        // Mode indicator
        let (mode_str, mode_color) = match self.mode {
            AppMode::Normal => (" NORMAL ", Color::Blue),
            AppMode::Command => (" COMMAND ", Color::Magenta),
            AppMode::Search => (" SEARCH ", Color::Yellow),
        };
        let mode_style = Style::default()
            .bg(mode_color)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        spans.push(Span::styled(mode_str, mode_style));
        spans.push(Span::raw(" "));

        match self.view.load_state {
            LoadState::Loading => spans.push(Span::styled(
                "[loading...]",
                Style::default().bg(Color::DarkGray).fg(Color::Yellow),
            )),
            LoadState::Failed => spans.push(Span::styled(
                "[load failed, r to retry]",
                Style::default().bg(Color::DarkGray).fg(Color::Red),
            )),
            LoadState::Ready { loaded_at } => {
                let filter = self.view.filter;
                spans.push(Span::styled(
                    format!(
                        "{}  page {}/{}  size {}  loaded {}",
                        self.view.range,
                        filter.page,
                        self.view.page_count.max(1),
                        filter.page_size,
                        loaded_at.format("%H:%M:%S")
                    ),
                    bg_style,
                ));
            }
        }

        // Status message (right-aligned)
        if let Some(msg) = self.status_message {
            let left_width: usize = spans.iter().map(|s| s.width()).sum();
            let msg = truncate_to_width(msg, area.width as usize);
            let padding = (area.width as usize).saturating_sub(left_width + msg.width());
            if padding > 0 {
                spans.push(Span::styled(" ".repeat(padding), bg_style));
            }
            spans.push(Span::styled(
                msg,
                Style::default().bg(Color::DarkGray).fg(Color::Red),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

/// Longest prefix of `s` that fits in `max` terminal columns.
fn truncate_to_width(s: &str, max: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        used += unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used > max {
            return &s[..idx];
        }
    }
    s
}
