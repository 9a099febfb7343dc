pub mod detail;
pub mod feed;
pub mod help;
pub mod input;
pub mod post;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::{App, AppMode};

use detail::DetailView;
use feed::FeedListView;
use help::HelpView;
use input::TextInput;
use status_bar::StatusBar;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let view = app.store.view();

    // Layout: main content + status bar + optional command bar
    let bottom_height = if app.mode != AppMode::Normal { 2 } else { 1 };

    let [main_area, bottom_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(bottom_height)]).areas(area);

    let status_bar = StatusBar::new(&app.mode, &view, app.status_message.as_deref());
    if app.mode != AppMode::Normal {
        let [status_area, cmd_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(bottom_area);
        frame.render_widget(status_bar, status_area);
        let input = match app.mode {
            AppMode::Search => TextInput::new("/", &app.search_input),
            _ => TextInput::new(":", &app.command_input),
        };
        frame.render_widget(input, cmd_area);
    } else {
        frame.render_widget(status_bar, bottom_area);
    }

    frame.render_widget(FeedListView::new(&view, app.selected_index, app.elapsed_ms), main_area);

    if let Some(detail) = view.detail {
        let like = app.store.like(detail.post.id).unwrap_or_default();
        frame.render_widget(DetailView::new(detail, like), main_area);
    }

    if app.show_help {
        frame.render_widget(HelpView::new(), main_area);
    }
}
