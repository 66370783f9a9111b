//! TUI application state.
//!
//! Holds the store, the filter/page/selection state and the add/edit
//! flows, including the draft reference list behind the picker popup. All
//! mutations go through the store so the reference rules apply here
//! exactly as they do on the CLI.

use std::path::PathBuf;

use ratatui::widgets::TableState;

use crate::fields::StatusFilter;
use crate::store::{paginate, Page, Store, ToggleOutcome};
use crate::todo::TodoPatch;

/// Input focus of the TUI.
#[derive(PartialEq)]
pub enum Mode {
    Normal,
    Adding,
    Editing,
}

/// A text input with cursor tracking.
#[derive(Default)]
pub struct Input {
    pub value: String,
    pub cursor: usize,
}

impl Input {
    /// Create an input pre-filled with existing text.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    /// Insert a character at the cursor.
    pub fn handle_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    /// Delete the character at the cursor.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(c) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

pub struct App {
    pub store: Store,
    pub db_path: PathBuf,
    /// Selection within the currently visible page.
    pub state: TableState,
    pub filter: StatusFilter,
    /// 1-based; clamped into range on every read.
    pub page: usize,
    pub page_size: usize,
    pub mode: Mode,
    pub input: Input,
    /// Some(id) while editing, None while adding.
    pub edit_id: Option<u64>,
    /// Reference draft maintained by the picker until the input is committed.
    pub draft_refs: Vec<u64>,
    pub picker_open: bool,
    pub picker_cursor: usize,
    /// One-shot status line, cleared on the next normal-mode key.
    pub message: Option<String>,
}

impl App {
    /// Creates a new App instance and loads the store.
    pub fn new(db_path: PathBuf) -> App {
        let store = Store::load(&db_path);
        let mut state = TableState::default();
        if !store.todos.is_empty() {
            state.select(Some(0));
        }
        App {
            store,
            db_path,
            state,
            filter: StatusFilter::All,
            page: 1,
            page_size: 5,
            mode: Mode::Normal,
            input: Input::default(),
            edit_id: None,
            draft_refs: Vec::new(),
            picker_open: false,
            picker_cursor: 0,
            message: None,
        }
    }

    /// Ids of todos passing the current filter, in store order.
    pub fn filtered(&self) -> Vec<u64> {
        self.store
            .todos
            .iter()
            .filter(|t| self.filter.matches(t))
            .map(|t| t.id)
            .collect()
    }

    /// The pagination window for the current filter and page.
    pub fn page_info(&self) -> Page {
        paginate(self.filtered().len(), self.page_size, self.page)
    }

    /// Ids visible on the current page.
    pub fn visible(&self) -> Vec<u64> {
        let ids = self.filtered();
        let page = paginate(ids.len(), self.page_size, self.page);
        ids[page.start..page.end].to_vec()
    }

    /// Id of the currently selected todo, if any.
    pub fn selected_id(&self) -> Option<u64> {
        let visible = self.visible();
        self.state.selected().and_then(|i| visible.get(i).copied())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(len - 1);
            self.state.select(Some(i));
        }
    }

    /// Selects the next row, wrapping within the page.
    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 >= len => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row, wrapping within the page.
    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn next_page(&mut self) {
        let info = self.page_info();
        if info.number < info.total_pages {
            self.page = info.number + 1;
            self.state.select(Some(0));
        }
    }

    pub fn prev_page(&mut self) {
        let info = self.page_info();
        if info.number > 1 {
            self.page = info.number - 1;
            self.state.select(Some(0));
        }
    }

    /// Advance the status filter; a filter change resets pagination.
    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.page = 1;
        self.clamp_selection();
    }

    /// Toggle the selected todo. A blocked completion surfaces in the
    /// status line instead of changing anything.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.toggle(id) {
            Ok(ToggleOutcome::Blocked(unmet)) => {
                self.message = Some(format!(
                    "todo {} is blocked by {} incomplete reference(s)",
                    id,
                    unmet.len()
                ));
            }
            Ok(_) => {
                self.persist();
                self.clamp_selection();
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Delete the selected todo with cascading reference cleanup.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        match self.store.delete(id) {
            Ok(()) => {
                self.persist();
                self.clamp_selection();
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Open the add popup with an empty draft.
    pub fn start_add(&mut self) {
        self.mode = Mode::Adding;
        self.edit_id = None;
        self.input = Input::default();
        self.draft_refs.clear();
        self.picker_open = false;
        self.message = None;
    }

    /// Open the edit popup for the selected todo, seeding the draft with
    /// its current text and references.
    pub fn start_edit(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some(todo) = self.store.get(id) else { return };
        self.mode = Mode::Editing;
        self.edit_id = Some(id);
        self.input = Input::with_value(&todo.text);
        self.draft_refs = todo.references.clone();
        self.picker_open = false;
        self.message = None;
    }

    /// Commit the add/edit input through the store. A validation failure
    /// keeps the popup open so the user can fix the draft.
    pub fn commit_input(&mut self) {
        let text = self.input.value.clone();
        let result = match self.edit_id {
            None => self.store.create(&text, &self.draft_refs).map(|_| ()),
            Some(id) => self
                .store
                .update(
                    id,
                    TodoPatch {
                        text: Some(text),
                        completed: None,
                        references: Some(self.draft_refs.clone()),
                    },
                )
                .map(|_| ()),
        };
        match result {
            Ok(()) => {
                self.persist();
                self.mode = Mode::Normal;
                self.input.clear();
                self.draft_refs.clear();
                self.edit_id = None;
                self.picker_open = false;
                self.clamp_selection();
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn cancel_input(&mut self) {
        self.mode = Mode::Normal;
        self.input.clear();
        self.draft_refs.clear();
        self.edit_id = None;
        self.picker_open = false;
    }

    /// Candidates offered by the reference picker: every todo except the
    /// one being edited.
    pub fn picker_candidates(&self) -> Vec<u64> {
        self.store
            .todos
            .iter()
            .map(|t| t.id)
            .filter(|id| Some(*id) != self.edit_id)
            .collect()
    }

    pub fn open_picker(&mut self) {
        if !self.picker_candidates().is_empty() {
            self.picker_open = true;
            self.picker_cursor = 0;
        }
    }

    pub fn close_picker(&mut self) {
        self.picker_open = false;
    }

    pub fn picker_next(&mut self) {
        let len = self.picker_candidates().len();
        if len > 0 {
            self.picker_cursor = (self.picker_cursor + 1) % len;
        }
    }

    pub fn picker_previous(&mut self) {
        let len = self.picker_candidates().len();
        if len > 0 {
            self.picker_cursor = (self.picker_cursor + len - 1) % len;
        }
    }

    /// Check or uncheck the highlighted candidate in the draft list.
    pub fn picker_toggle(&mut self) {
        let candidates = self.picker_candidates();
        let Some(&id) = candidates.get(self.picker_cursor) else {
            return;
        };
        if let Some(pos) = self.draft_refs.iter().position(|r| *r == id) {
            self.draft_refs.remove(pos);
        } else {
            self.draft_refs.push(id);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.db_path) {
            self.message = Some(format!("Failed to save DB: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(texts: &[&str]) -> App {
        let mut app = App::new(std::env::temp_dir().join("reftask_tui_test_unused.json"));
        app.store = Store::default();
        for t in texts {
            app.store.create(t, &[]).unwrap();
        }
        app.state.select(Some(0));
        app
    }

    #[test]
    fn test_filter_resets_page() {
        let mut app = app_with(&["a", "b", "c", "d", "e", "f", "g"]);
        app.next_page();
        assert_eq!(app.page_info().number, 2);
        app.cycle_filter();
        assert_eq!(app.page_info().number, 1);
        assert_eq!(app.filter, StatusFilter::Active);
    }

    #[test]
    fn test_visible_is_page_bounded() {
        let app = app_with(&["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(app.visible(), vec![1, 2, 3, 4, 5]);
        assert_eq!(app.page_info().total_pages, 2);
    }

    #[test]
    fn test_picker_excludes_edited_todo() {
        let mut app = app_with(&["a", "b", "c"]);
        app.start_edit();
        assert_eq!(app.edit_id, Some(1));
        assert_eq!(app.picker_candidates(), vec![2, 3]);
    }

    #[test]
    fn test_blocked_toggle_sets_message() {
        let mut app = app_with(&["a", "b"]);
        app.store
            .update(
                1,
                TodoPatch {
                    references: Some(vec![2]),
                    ..Default::default()
                },
            )
            .unwrap();
        app.toggle_selected();
        assert!(!app.store.get(1).unwrap().completed);
        assert!(app.message.is_some());
    }
}
