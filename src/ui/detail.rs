use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use crate::store::{LikeState, SelectedPostDetail};
use crate::ui::post::like_spans;

/// Centered overlay with the full post body and its comments.
pub struct DetailView<'a> {
    detail: &'a SelectedPostDetail,
    like: LikeState,
}

impl<'a> DetailView<'a> {
    pub fn new(detail: &'a SelectedPostDetail, like: LikeState) -> Self {
        Self { detail, like }
    }
}

impl Widget for DetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 80u16.min(area.width.saturating_sub(4));
        let height = area.height.saturating_sub(2);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let panel = Rect::new(x, y, width, height);

        Clear.render(panel, buf);

        let post = &self.detail.post;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Post #{} ", post.id))
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Cyan));

        let muted = Style::default().fg(Color::DarkGray);
        let mut lines: Vec<Line<'_>> = vec![
            Line::from(Span::styled(
                post.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.detail
                    .author
                    .as_ref()
                    .map(|u| u.name.as_str())
                    .unwrap_or_default(),
                muted,
            )),
            Line::from(""),
        ];
        lines.extend(post.body.lines().map(Line::from));
        lines.push(Line::from(""));
        lines.push(Line::from(like_spans(self.like)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Comments ({})", self.detail.comments.len()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));

        for comment in &self.detail.comments {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(
                    comment.name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  <{}>", comment.email), muted),
            ]));
            lines.extend(comment.body.lines().map(Line::from));
            let mut like_line = like_spans(self.detail.comment_like);
            like_line.insert(0, Span::raw("  "));
            lines.push(Line::from(like_line));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(panel, buf);
    }
}
