use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::api::{FeedClient, fetch_collections};
use crate::command::{self, Command};
use crate::config::AppConfig;
use crate::event::{ApiResult, AppEvent, Event, EventHandler};
use crate::store::FeedStore;
use crate::ui;

// ---------------------------------------------------------------------------
// App mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Command,
    Search,
}

/// `n`/Right and `p`/Left step through pages.
fn paging_event(code: KeyCode) -> Option<AppEvent> {
    match code {
        KeyCode::Char('n') | KeyCode::Right => Some(AppEvent::NextPage),
        KeyCode::Char('p') | KeyCode::Left => Some(AppEvent::PrevPage),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: AppConfig,
    pub mode: AppMode,

    // Feed state
    pub store: FeedStore,
    pub selected_index: usize,
    pub show_help: bool,

    // Input state
    pub command_input: String,
    pub search_input: String,

    pub api_client: Option<Arc<FeedClient>>,

    pub status_message: Option<String>,

    // Animation clock
    started_at: Instant,
    pub elapsed_ms: u64,
}

impl App {
    pub fn new(config: AppConfig, api_client: Option<FeedClient>) -> Self {
        Self {
            running: true,
            events: EventHandler::new(config.tick_rate_fps),
            store: FeedStore::new(config.store_options()),
            config,
            mode: AppMode::Normal,
            selected_index: 0,
            show_help: false,
            command_input: String::new(),
            search_input: String::new(),
            api_client: api_client.map(Arc::new),
            status_message: None,
            started_at: Instant::now(),
            elapsed_ms: 0,
        }
    }

    // -- Main event loop ----------------------------------------------------

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.events.send(AppEvent::FetchCollections);

        while self.running {
            terminal.draw(|frame| self.draw(frame))?;
            match self.events.next().await? {
                Event::Tick => self.tick(),
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key) = event
                        && key.kind == crossterm::event::KeyEventKind::Press
                    {
                        self.handle_key_event(key);
                    }
                }
                Event::App(app_event) => self.handle_app_event(*app_event),
            }
        }
        Ok(())
    }

    fn tick(&mut self) {
        if self.store.is_loading() {
            self.elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        ui::draw(frame, self);
    }

    // -- Key event routing --------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Ctrl-C always quits.
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            self.events.send(AppEvent::Quit);
            return;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Command => self.handle_command_key(key),
            AppMode::Search => self.handle_search_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.show_help {
                    self.events.send(AppEvent::ToggleHelp);
                } else if self.store.detail().is_some() {
                    self.events.send(AppEvent::CloseDetail);
                } else {
                    self.events.send(AppEvent::Quit);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_index + 1 < self.row_count() {
                    self.selected_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(post_id) = self.selected_post_id() {
                    self.events.send(AppEvent::OpenDetail(post_id));
                }
            }
            KeyCode::Char('l') => {
                let target = self
                    .store
                    .detail()
                    .map(|d| d.post.id)
                    .or_else(|| self.selected_post_id());
                if let Some(post_id) = target {
                    self.events.send(AppEvent::ToggleLike(post_id));
                }
            }
            KeyCode::Char('L') => {
                self.events.send(AppEvent::ToggleCommentLike);
            }
            KeyCode::Char('s') => {
                let order = self.store.filter().sort_order.flipped();
                self.events.send(AppEvent::SetSort(order));
            }
            KeyCode::Char('r') => {
                self.events.send(AppEvent::FetchCollections);
            }
            KeyCode::Char('/') => {
                self.mode = AppMode::Search;
                self.search_input = self.store.filter().search_term.clone();
            }
            KeyCode::Char(':') => {
                self.mode = AppMode::Command;
                self.command_input.clear();
            }
            KeyCode::Char('?') => {
                self.events.send(AppEvent::ToggleHelp);
            }
            code => {
                if let Some(event) = paging_event(code) {
                    self.events.send(event);
                }
            }
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                self.execute_command();
                self.mode = AppMode::Normal;
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(c) => {
                self.command_input.push(c);
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.search_input.clear();
            }
            KeyCode::Enter => {
                // An empty term clears the search.
                let term = std::mem::take(&mut self.search_input);
                self.events.send(AppEvent::SetSearch(term.trim().to_string()));
                self.mode = AppMode::Normal;
            }
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
            }
            _ => {}
        }
    }

    // -- Command execution --------------------------------------------------

    fn execute_command(&mut self) {
        let input = std::mem::take(&mut self.command_input);
        let event = match command::parse_command(&input) {
            Some(Command::Search(term)) => AppEvent::SetSearch(term),
            Some(Command::ClearSearch) => AppEvent::SetSearch(String::new()),
            Some(Command::Sort(order)) => AppEvent::SetSort(order),
            Some(Command::Page(page)) => AppEvent::SetPage(page),
            Some(Command::PageSize(size)) => AppEvent::SetPageSize(size),
            Some(Command::Open(post_id)) => AppEvent::OpenDetail(post_id),
            Some(Command::Close) => AppEvent::CloseDetail,
            Some(Command::Like(post_id)) => AppEvent::ToggleLike(post_id),
            Some(Command::Reload) => AppEvent::FetchCollections,
            Some(Command::Help) => AppEvent::ToggleHelp,
            Some(Command::Quit) => AppEvent::Quit,
            None => {
                self.status_message = Some(format!("Unknown command: {input}"));
                return;
            }
        };
        self.events.send(event);
    }

    // -- Selection helpers --------------------------------------------------

    fn row_count(&self) -> usize {
        self.store.view().rows.len()
    }

    fn selected_post_id(&self) -> Option<u64> {
        self.store
            .view()
            .rows
            .get(self.selected_index)
            .map(|row| row.post.id)
    }

    fn clamp_selection(&mut self) {
        self.selected_index = self
            .selected_index
            .min(self.row_count().saturating_sub(1));
    }

    // -- App event handling -------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.running = false;
            }
            AppEvent::ToggleHelp => {
                self.show_help = !self.show_help;
            }

            // Store actions
            AppEvent::SetSearch(term) => {
                self.store.set_search(term);
                self.selected_index = 0;
            }
            AppEvent::SetSort(order) => {
                self.store.set_sort(order);
                self.selected_index = 0;
            }
            AppEvent::SetPage(page) => {
                self.store.set_page(page);
                self.selected_index = 0;
            }
            AppEvent::NextPage => {
                self.store.next_page();
                self.selected_index = 0;
            }
            AppEvent::PrevPage => {
                self.store.prev_page();
                self.selected_index = 0;
            }
            AppEvent::SetPageSize(size) => {
                self.store.set_page_size(size);
                self.clamp_selection();
            }
            AppEvent::ToggleLike(post_id) => {
                if let Err(e) = self.store.toggle_like(post_id) {
                    self.status_message = Some(format!("Cannot like: {e}"));
                }
            }
            AppEvent::OpenDetail(post_id) => {
                if let Err(e) = self.store.open_detail(post_id) {
                    self.status_message = Some(format!("Cannot open: {e}"));
                }
            }
            AppEvent::CloseDetail => {
                self.store.close_detail();
            }
            AppEvent::ToggleCommentLike => {
                self.store.toggle_comment_like();
            }

            // Fetch
            AppEvent::FetchCollections => {
                self.dispatch_fetch();
            }
            AppEvent::CollectionsLoaded { generation, result } => {
                let failure = result.as_ref().err().map(|e| format!("Load failed: {e}"));
                if self.store.apply_fetch(generation, result) {
                    self.status_message = Some(failure.unwrap_or_else(|| {
                        format!("Loaded {} posts", self.store.posts().len())
                    }));
                    self.clamp_selection();
                }
            }
        }
    }

    // -- Fetch dispatch -----------------------------------------------------

    fn dispatch_fetch(&mut self) {
        let Some(ref client) = self.api_client else {
            self.status_message = Some("No feed source configured".to_string());
            return;
        };
        let client = Arc::clone(client);
        let sender = self.events.sender();
        let generation = self.store.begin_fetch();

        tokio::spawn(async move {
            let result: ApiResult<_> = fetch_collections(client.as_ref())
                .await
                .map_err(|e| Arc::new(e.to_string()));
            let _ = sender.send(Event::App(Box::new(AppEvent::CollectionsLoaded {
                generation,
                result,
            })));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_keys() {
        for code in [KeyCode::Char('n'), KeyCode::Right] {
            assert!(matches!(paging_event(code), Some(AppEvent::NextPage)));
        }
        for code in [KeyCode::Char('p'), KeyCode::Left] {
            assert!(matches!(paging_event(code), Some(AppEvent::PrevPage)));
        }
        assert!(paging_event(KeyCode::Char('h')).is_none());
    }
}
