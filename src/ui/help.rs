use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

const KEYS: &[(&str, &[(&str, &str)])] = &[
    (
        "Feed",
        &[
            ("j/k, ↓/↑", "Select next / previous post"),
            ("n/p, ←/→", "Next / previous page"),
            ("s", "Flip sort order"),
            ("r", "Reload collections"),
        ],
    ),
    (
        "Posts",
        &[
            ("Enter", "Open post and comments"),
            ("l", "Like / unlike post"),
            ("L", "Like / unlike comments"),
            ("Esc/q", "Close detail, then quit"),
        ],
    ),
    (
        "Commands",
        &[
            ("/term", "Search titles and authors"),
            (":sort asc", "Sort by post id (asc|desc)"),
            (":page N", "Jump to page N"),
            (":size N", "Posts per page"),
            (":open N", "Open post #N"),
            (":like N", "Like / unlike post #N"),
            (":clear", "Clear the search"),
        ],
    ),
];

/// Keybinding overlay toggled with `?`.
#[derive(Default)]
pub struct HelpView;

impl HelpView {
    pub fn new() -> Self {
        Self
    }

    fn lines() -> Vec<Line<'static>> {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let section_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut lines = Vec::new();
        for (i, (section, bindings)) in KEYS.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(*section, section_style)));
            lines.extend(bindings.iter().map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(format!("  {key:<12}"), key_style),
                    Span::raw(*desc),
                ])
            }));
        }
        lines
    }
}

impl Widget for HelpView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = Self::lines();
        let width = 56u16.min(area.width.saturating_sub(4));
        let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let panel = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        Clear.render(panel, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Keys ")
            .border_style(Style::default().fg(Color::Cyan));
        Paragraph::new(lines).block(block).render(panel, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_section() {
        let text: Vec<String> = HelpView::lines().iter().map(|l| l.to_string()).collect();
        for (section, _) in KEYS {
            assert!(text.iter().any(|l| l == section));
        }
    }
}
