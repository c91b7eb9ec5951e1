//! Board state and key handling
//!
//! The store holds committed orders, the cards hold dialog selections. Only
//! the focused card can have its dialog open.

use crossterm::event::{KeyCode, KeyEvent};
use std::collections::VecDeque;
use table_client::{CardIntent, MENU, OrderApi, TableCard, TableStore, WriteOutcome};
use tokio::sync::mpsc;
use tui_logger::{TuiWidgetEvent, TuiWidgetState};

/// Cards per grid row
pub const GRID_COLUMNS: usize = 4;

pub struct App<A> {
    pub store: TableStore<A>,
    pub cards: Vec<TableCard>,
    /// Focused card index
    pub focus: usize,
    /// Highlighted menu row in the open dialog
    pub menu_cursor: usize,
    /// Blocking notices, oldest first; the front one must be dismissed
    /// before anything else
    pub notices: VecDeque<String>,
    /// Remote writes not yet answered
    pub pending_writes: usize,
    pub push_connected: bool,
    pub should_quit: bool,
    pub logger_state: TuiWidgetState,
    write_tx: mpsc::Sender<WriteOutcome>,
}

impl<A> App<A> {
    /// The card whose selection dialog is open, if any
    pub fn open_card(&self) -> Option<&TableCard> {
        self.cards.get(self.focus).filter(|c| c.is_open())
    }
}

impl<A: OrderApi + Clone + 'static> App<A> {
    pub fn new(store: TableStore<A>, write_tx: mpsc::Sender<WriteOutcome>) -> Self {
        let cards = (0..store.table_count()).map(TableCard::new).collect();
        Self {
            store,
            cards,
            focus: 0,
            menu_cursor: 0,
            notices: VecDeque::new(),
            pending_writes: 0,
            push_connected: false,
            should_quit: false,
            logger_state: TuiWidgetState::new(),
            write_tx,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.notices.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notices.pop_front();
            }
            return;
        }

        if self.open_card().is_some() {
            self.handle_dialog_key(key.code);
        } else {
            self.handle_board_key(key.code);
        }
    }

    fn handle_board_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.move_focus(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_focus(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_focus(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_focus(0, 1),
            KeyCode::Char('a') | KeyCode::Enter => {
                let committed = self.store.table(self.focus).unwrap_or_default().to_vec();
                self.cards[self.focus].open(&committed);
                self.menu_cursor = 0;
            }
            KeyCode::Char('c') => {
                let intent = self.cards[self.focus].clear();
                self.dispatch(intent);
            }
            KeyCode::PageUp => self.logger_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown => self.logger_state.transition(TuiWidgetEvent::NextPageKey),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, code: KeyCode) {
        let card = &mut self.cards[self.focus];
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_cursor = (self.menu_cursor + 1).min(MENU.len() - 1);
            }
            KeyCode::Char(' ') => card.toggle(MENU[self.menu_cursor]),
            KeyCode::Enter => {
                if let Some(intent) = card.confirm() {
                    self.dispatch(intent);
                }
            }
            KeyCode::Esc => card.cancel(),
            _ => {}
        }
    }

    fn move_focus(&mut self, dx: isize, dy: isize) {
        let count = self.cards.len() as isize;
        let columns = GRID_COLUMNS as isize;
        let col = self.focus as isize % columns;
        let new_col = col + dx;
        if !(0..columns).contains(&new_col) {
            return;
        }
        let target = self.focus as isize + dx + dy * columns;
        if (0..count).contains(&target) {
            self.focus = target as usize;
        }
    }

    /// Start the remote write for a card's intent; the outcome comes back
    /// through [`on_write_outcome`](Self::on_write_outcome)
    fn dispatch(&mut self, intent: CardIntent) {
        let result = match intent {
            CardIntent::Save { index, items } => {
                self.store.spawn_save(index, items, self.write_tx.clone())
            }
            CardIntent::Clear { index } => self.store.spawn_clear(index, self.write_tx.clone()),
        };
        match result {
            Ok(()) => self.pending_writes += 1,
            Err(e) => tracing::error!("Failed to dispatch write: {}", e),
        }
    }

    pub fn on_write_outcome(&mut self, outcome: WriteOutcome) {
        self.pending_writes = self.pending_writes.saturating_sub(1);
        if let Err(e) = self.store.apply_write_outcome(outcome) {
            self.notices.push_back(e.to_string());
        }
    }

    /// Push frames replace every table; malformed frames are logged by the store and dropped
    pub fn on_push_payload(&mut self, payload: &str) {
        let _ = self.store.apply_push_update(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use table_client::{InMemoryOrderApi, TableNumber};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn make_app(api: &InMemoryOrderApi) -> (App<InMemoryOrderApi>, mpsc::Receiver<WriteOutcome>) {
        let (tx, rx) = mpsc::channel(8);
        (App::new(TableStore::new(api.clone(), 16), tx), rx)
    }

    #[test]
    fn test_focus_moves_within_grid() {
        let (mut app, _rx) = make_app(&InMemoryOrderApi::new());

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.focus, 0);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.focus, 5);

        app.focus = 3;
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.focus, 3);

        app.focus = 13;
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.focus, 13);
    }

    #[tokio::test]
    async fn test_dialog_save_commits_after_outcome() {
        let api = InMemoryOrderApi::new();
        let (mut app, mut rx) = make_app(&api);

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.open_card().map(TableCard::index), Some(1));

        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        // focus cannot move while the dialog is open
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));

        assert!(app.open_card().is_none());
        assert_eq!(app.focus, 1);
        assert_eq!(app.pending_writes, 1);

        let outcome = rx.recv().await.unwrap();
        app.on_write_outcome(outcome);
        assert_eq!(app.pending_writes, 0);
        assert_eq!(app.store.table(1), Some(&items(&["Pizza", "Burger"])[..]));
        assert_eq!(
            api.orders(TableNumber::new(2).unwrap()),
            Some(items(&["Pizza", "Burger"]))
        );
    }

    #[test]
    fn test_cancel_leaves_store_untouched() {
        let (mut app, _rx) = make_app(&InMemoryOrderApi::new());

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Esc));

        assert!(app.open_card().is_none());
        assert_eq!(app.pending_writes, 0);
        assert!(app.store.table(0).unwrap().is_empty());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_failed_clear_shows_blocking_notice() {
        let api = InMemoryOrderApi::new();
        api.put(TableNumber::new(1).unwrap(), items(&["Sushi"]));
        let (mut app, mut rx) = make_app(&api);
        app.store.load_all().await.unwrap();

        api.set_fail_writes(true);
        app.handle_key(key(KeyCode::Char('c')));
        let outcome = rx.recv().await.unwrap();
        app.on_write_outcome(outcome);

        assert_eq!(app.notices.front().map(String::as_str), Some("Error clearing order."));
        assert_eq!(app.store.table(0), Some(&items(&["Sushi"])[..]));

        // Everything but dismiss is swallowed by the notice
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.notices.is_empty());
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_back_to_back_failures_queue_notices() {
        let api = InMemoryOrderApi::new();
        let (mut app, mut rx) = make_app(&api);
        api.set_fail_writes(true);

        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.pending_writes, 2);

        for _ in 0..2 {
            let outcome = rx.recv().await.unwrap();
            app.on_write_outcome(outcome);
        }
        assert_eq!(app.notices.len(), 2);
        assert!(app.notices.contains(&"Error saving order.".to_string()));
        assert!(app.notices.contains(&"Error clearing order.".to_string()));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.notices.len(), 1);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.notices.is_empty());
        assert!(app.store.state().iter().all(|t| t.is_empty()));
    }

    #[test]
    fn test_push_payload_replaces_tables() {
        let (mut app, _rx) = make_app(&InMemoryOrderApi::new());

        app.on_push_payload(r#"[{"table_number": 16, "orders": ["Steak"]}]"#);
        assert_eq!(app.store.table(15), Some(&items(&["Steak"])[..]));

        app.on_push_payload(r#"{"oops": true}"#);
        assert_eq!(app.store.table(15), Some(&items(&["Steak"])[..]));
    }
}
