use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

/// A simple single-line text input renderer.
///
/// Renders the prompt + text content, with a cursor indicator at the end.
pub struct TextInput<'a> {
    pub prompt: &'a str,
    pub text: &'a str,
    pub style: Style,
}

impl<'a> TextInput<'a> {
    pub fn new(prompt: &'a str, text: &'a str) -> Self {
        Self {
            prompt,
            text,
            style: Style::default().fg(Color::White),
        }
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let display = format!("{}{}\u{2588}", self.prompt, self.text);
        let visible = visible_tail(&display, area.width as usize);
        buf.set_string(area.x, area.y, visible, self.style);
    }
}

/// The rightmost part of `s` that fits in `max` columns, so the cursor stays
/// in view while typing past the edge.
fn visible_tail(s: &str, max: usize) -> &str {
    if s.width() <= max {
        return s;
    }
    let mut used = 0;
    for (idx, ch) in s.char_indices().rev() {
        used += unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used > max {
            return &s[idx + ch.len_utf8()..];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::visible_tail;

    #[test]
    fn shows_whole_text_when_it_fits() {
        assert_eq!(visible_tail("/rust", 10), "/rust");
    }

    #[test]
    fn keeps_rightmost_columns() {
        assert_eq!(visible_tail("/sunt aut facere", 6), "facere");
        assert_eq!(visible_tail("/ünïcödé", 3), "ödé");
    }
}
