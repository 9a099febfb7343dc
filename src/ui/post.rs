use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::store::{FeedRow, LikeState};

/// Body lines shown per card before truncating.
const MAX_BODY_LINES: usize = 2;

/// Renders a single feed row as a compact card.
///
/// Layout:
///   #12 Post title                          Leanne Graham
///   Body text (wrapped, at most two lines) ...
///   ♥ 42  💬 5
pub struct PostCard<'a> {
    pub row: &'a FeedRow<'a>,
    pub selected: bool,
}

impl<'a> PostCard<'a> {
    pub fn new(row: &'a FeedRow<'a>) -> Self {
        Self {
            row,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for PostCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let highlight_style = if self.selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let mut y = area.y;

        // -- Line 1: id + title + author --
        let mut header_spans = vec![
            Span::styled(
                format!("#{} ", self.row.post.id),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                self.row.post.title.as_str(),
                highlight_style.add_modifier(Modifier::BOLD),
            ),
        ];
        // Missing authors render as nothing.
        if let Some(author) = self.row.author {
            header_spans.push(Span::styled(
                format!("  {}", author.name),
                Style::default().fg(Color::DarkGray),
            ));
        }
        buf.set_line(area.x, y, &Line::from(header_spans), area.width);
        y += 1;

        // -- Body --
        let width = area.width as usize;
        for line_text in wrap_text(&self.row.post.body, width)
            .into_iter()
            .take(MAX_BODY_LINES)
        {
            if y >= area.y + area.height {
                return;
            }
            buf.set_string(area.x, y, &line_text, Style::default());
            y += 1;
        }

        if y >= area.y + area.height {
            return;
        }

        // -- Last line: likes + comments --
        let mut metrics = like_spans(self.row.like);
        metrics.push(Span::raw("  "));
        metrics.push(Span::styled(
            format!("\u{1F4AC} {}", self.row.comment_count),
            Style::default().fg(Color::Blue),
        ));
        buf.set_line(area.x, y, &Line::from(metrics), area.width);
    }
}

/// "♥ 42" in red when liked, "♡ 41" otherwise.
pub fn like_spans(like: LikeState) -> Vec<Span<'static>> {
    let (glyph, style) = if like.liked {
        (
            "\u{2665}",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        ("\u{2661}", Style::default().fg(Color::Red))
    };
    vec![Span::styled(format!("{glyph} {}", like.count), style)]
}

/// Height in lines needed for a post card.
pub fn post_card_height(row: &FeedRow<'_>, width: u16) -> u16 {
    let body_lines = wrap_text(&row.post.body, width as usize)
        .len()
        .min(MAX_BODY_LINES) as u16;
    // header + body + metrics
    1 + body_lines + 1
}

pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![];
    }
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.width() + 1 + word.width() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
