//! The board interaction controller: a two-mode state machine translating
//! keystrokes into projection mutations paired with persistence calls.
//!
//! Every state-changing operation persists first and only then patches the
//! in-memory projection; a failed store call leaves the projection exactly as
//! it was and surfaces a single visible error.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::board::BoardState;
use crate::column_view::{ColumnItem, ColumnView};
use crate::db::Database;
use crate::theme::Theme;
use crate::types::Task;

const TITLE_CHAR_LIMIT: usize = 100;
const DESCRIPTION_CHAR_LIMIT: usize = 500;

/// Rows reserved outside the column area (header and footer lines).
const CHROME_ROWS: u16 = 2;
/// Border cells flanking each column's inner content.
const COLUMN_FRAME_OVERHEAD: u16 = 2;
/// Margin around the input overlay.
const OVERLAY_MARGIN: u16 = 4;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    Normal,
    Insert,
}

/// What the input overlay is currently for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EditContext {
    None,
    Creating,
    Editing {
        task_id: Uuid,
        origin_column: usize,
        origin_row: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Resize(u16, u16),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputField {
    Title,
    Description,
}

#[derive(Debug, Clone)]
pub struct TextField {
    value: String,
    char_limit: usize,
    pub prompt: &'static str,
    pub placeholder: &'static str,
}

impl TextField {
    fn new(prompt: &'static str, placeholder: &'static str, char_limit: usize) -> Self {
        Self {
            value: String::new(),
            char_limit,
            prompt,
            placeholder,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    fn push(&mut self, ch: char) {
        if self.value.chars().count() < self.char_limit {
            self.value.push(ch);
        }
    }

    fn pop(&mut self) {
        self.value.pop();
    }

    fn clear(&mut self) {
        self.value.clear();
    }
}

#[derive(Debug, Clone)]
pub struct InputOverlay {
    pub title: TextField,
    pub description: TextField,
    pub focused: InputField,
    pub width: u16,
}

impl InputOverlay {
    fn new() -> Self {
        Self {
            title: TextField::new("Title: ", "What to do...", TITLE_CHAR_LIMIT),
            description: TextField::new(
                "Description: ",
                "Task description...",
                DESCRIPTION_CHAR_LIMIT,
            ),
            focused: InputField::Title,
            width: 0,
        }
    }

    fn focused_field_mut(&mut self) -> &mut TextField {
        match self.focused {
            InputField::Title => &mut self.title,
            InputField::Description => &mut self.description,
        }
    }

    fn toggle_focus(&mut self) {
        self.focused = match self.focused {
            InputField::Title => InputField::Description,
            InputField::Description => InputField::Title,
        };
    }

    fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.focused = InputField::Title;
    }
}

/// Pure layout arithmetic derived from the viewport; recomputed before the
/// first paint and after every resize.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct BoardLayout {
    pub column_width: u16,
    pub column_height: u16,
}

impl BoardLayout {
    fn compute(viewport: (u16, u16), column_count: usize) -> Self {
        let columns = column_count.max(1) as u16;
        Self {
            column_width: (viewport.0 / columns).saturating_sub(COLUMN_FRAME_OVERHEAD),
            column_height: viewport.1.saturating_sub(CHROME_ROWS),
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub db: Database,
    pub board: BoardState,
    pub mode: Mode,
    pub edit_context: EditContext,
    pub focused_column: usize,
    pub column_views: Vec<ColumnView>,
    pub input: InputOverlay,
    pub error: Option<String>,
    pub theme: Theme,
    pub viewport: (u16, u16),
    pub layout: BoardLayout,
}

impl App {
    pub fn new(db: Database, theme: Theme) -> Result<Self> {
        let board = db.bootstrap_board()?;
        let column_views = board.columns.iter().map(|_| ColumnView::new()).collect();

        let mut app = Self {
            should_quit: false,
            db,
            board: BoardState::new(board),
            mode: Mode::Normal,
            edit_context: EditContext::None,
            focused_column: 0,
            column_views,
            input: InputOverlay::new(),
            error: None,
            theme,
            viewport: (80, 24),
            layout: BoardLayout::default(),
        };
        app.apply_layout();
        app.sync_column_views();
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn update(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Key(key) => self.handle_key(key),
            Message::Resize(width, height) => {
                self.viewport = (width, height);
                self.apply_layout();
            }
        }
        Ok(())
    }

    pub fn focused_view(&self) -> Option<&ColumnView> {
        self.column_views.get(self.focused_column)
    }

    /// Recomputes column and overlay dimensions and pushes them into every
    /// column view. No state-machine implications.
    fn apply_layout(&mut self) {
        self.layout = BoardLayout::compute(self.viewport, self.board.columns().len());
        for view in &mut self.column_views {
            view.set_size(self.layout.column_width, self.layout.column_height);
        }
        self.input.width = self.viewport.0.saturating_sub(OVERLAY_MARGIN);
    }

    /// The single mutate-then-resync entry point: applies a projection
    /// mutation and rebuilds every derived column view in the same call.
    /// Call sites never choose whether to resync.
    fn commit(&mut self, mutate: impl FnOnce(&mut BoardState)) {
        mutate(&mut self.board);
        self.sync_column_views();
    }

    fn sync_column_views(&mut self) {
        let column_ids: Vec<Uuid> = self.board.columns().iter().map(|c| c.id).collect();
        for (view, column_id) in self.column_views.iter_mut().zip(column_ids) {
            let items = self
                .board
                .tasks_in_column(column_id)
                .into_iter()
                .filter_map(ColumnItem::from_task)
                .collect();
            view.set_items(items);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // A pending persistence error replaces the board until acknowledged;
        // the failed operation is never retried automatically.
        if self.error.is_some() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.error = None,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                }
                _ => {}
            }
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Insert => self.handle_insert_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                self.focused_column = self.focused_column.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.focused_column + 1 < self.board.columns().len() {
                    self.focused_column += 1;
                }
            }
            KeyCode::Char('<') => self.move_selected_task(-1),
            KeyCode::Char('>') => self.move_selected_task(1),
            KeyCode::Char('d') => self.delete_selected_task(),
            KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('i') => {
                // While the column view is mid-filter-entry the keystroke
                // belongs to the filter, not to us.
                let filtering = self
                    .focused_view()
                    .map(ColumnView::is_filtering)
                    .unwrap_or(false);
                if filtering {
                    self.forward_to_focused_view(key);
                } else {
                    self.begin_create();
                }
            }
            _ => self.forward_to_focused_view(key),
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                // Quit immediately, unsaved input discarded.
                self.should_quit = true;
            }
            KeyCode::Esc => {
                self.input.reset();
                self.mode = Mode::Normal;
                self.edit_context = EditContext::None;
            }
            KeyCode::Tab => self.input.toggle_focus(),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => self.input.focused_field_mut().pop(),
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.input.focused_field_mut().push(ch);
            }
            _ => {}
        }
    }

    fn forward_to_focused_view(&mut self, key: KeyEvent) {
        if let Some(view) = self.column_views.get_mut(self.focused_column) {
            view.handle_raw_input(key);
        }
    }

    fn selected_task_id(&self) -> Option<Uuid> {
        self.focused_view().and_then(ColumnView::selected_task_id)
    }

    fn move_selected_task(&mut self, delta: isize) {
        let target = self.focused_column as isize + delta;
        if target < 0 || target as usize >= self.board.columns().len() {
            return;
        }
        let target = target as usize;

        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let Some(target_column_id) = self.board.column_at(target).map(|c| c.id) else {
            return;
        };
        let candidate = match self.board.task(task_id) {
            Some(task) => {
                let mut candidate = task.clone();
                candidate.status_column_id = target_column_id;
                candidate
            }
            None => {
                debug!(%task_id, "selected task missing from projection");
                return;
            }
        };

        match self.db.update_task(&candidate) {
            Ok(persisted) => {
                self.commit(|board| board.update_task(persisted));
                // Focus follows the moved task.
                self.focused_column = target;
            }
            Err(err) => {
                // The candidate was never applied to the projection, so
                // there is nothing to roll back beyond surfacing the error.
                warn!(%task_id, "task move failed: {err:#}");
                self.error = Some(format!("failed to move task: {err:#}"));
            }
        }
    }

    fn delete_selected_task(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };

        match self.db.delete_task(task_id) {
            Ok(()) => self.commit(|board| board.remove_task(task_id)),
            Err(err) => {
                warn!(%task_id, "task delete failed: {err:#}");
                self.error = Some(format!("failed to delete task: {err:#}"));
            }
        }
    }

    fn begin_edit(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let Some(task) = self.board.task(task_id) else {
            debug!(%task_id, "selected task missing from projection");
            return;
        };

        let title = task.title.clone();
        let description = task.description.clone();
        let origin_row = self
            .focused_view()
            .map(ColumnView::selected_index)
            .unwrap_or(0);

        self.input.reset();
        self.input.title.set_value(title);
        self.input.description.set_value(description);
        self.mode = Mode::Insert;
        self.edit_context = EditContext::Editing {
            task_id,
            origin_column: self.focused_column,
            origin_row,
        };
    }

    fn begin_create(&mut self) {
        self.input.reset();
        self.mode = Mode::Insert;
        self.edit_context = EditContext::Creating;
    }

    fn submit(&mut self) {
        let title = self.input.title.value().to_string();
        let description = self.input.description.value().to_string();

        match self.edit_context {
            EditContext::Creating => {
                if title.trim().is_empty() {
                    // Empty titles are rejected silently; stay in Insert.
                    return;
                }
                let Some(column_id) = self.board.column_at(self.focused_column).map(|c| c.id)
                else {
                    return;
                };

                let task = Task::new(self.board.board().id, column_id, title, description);
                match self.db.create_task(&task) {
                    Ok(persisted) => {
                        self.commit(|board| board.add_task(persisted));
                        self.finish_submission();
                    }
                    Err(err) => {
                        // Fields keep their values so the user can retry.
                        warn!("task create failed: {err:#}");
                        self.error = Some(format!("failed to create task: {err:#}"));
                    }
                }
            }
            EditContext::Editing { task_id, .. } => {
                let updated = match self.board.task(task_id) {
                    Some(task) => {
                        let mut updated = task.clone();
                        updated.title = title;
                        updated.description = description;
                        // Column membership is not exposed by the form and
                        // must survive the edit unchanged.
                        updated
                    }
                    None => {
                        debug!(%task_id, "edited task missing from projection");
                        self.finish_submission();
                        return;
                    }
                };

                match self.db.update_task(&updated) {
                    Ok(persisted) => self.commit(|board| board.update_task(persisted)),
                    Err(err) => {
                        // No retry on this path; nothing was committed, so
                        // projection and store still agree on the old task.
                        warn!(%task_id, "task edit failed: {err:#}");
                        self.error = Some(format!("failed to update task: {err:#}"));
                    }
                }
                self.finish_submission();
            }
            EditContext::None => {
                debug!("submit with no edit context");
                self.finish_submission();
            }
        }
    }

    fn finish_submission(&mut self) {
        self.input.reset();
        self.mode = Mode::Normal;
        self.edit_context = EditContext::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{Theme, ThemePreset};
    use crate::types::Priority;

    fn test_app() -> App {
        let db = Database::open(":memory:").expect("in-memory db should open");
        App::new(db, Theme::from_preset(ThemePreset::Default)).expect("app should initialize")
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(Message::Key(KeyEvent::new(code, KeyModifiers::empty())))
            .expect("update should not fail");
    }

    fn press_ctrl(app: &mut App, ch: char) {
        app.update(Message::Key(KeyEvent::new(
            KeyCode::Char(ch),
            KeyModifiers::CONTROL,
        )))
        .expect("update should not fail");
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn create_task(app: &mut App, title: &str) {
        press(app, KeyCode::Char('i'));
        type_text(app, title);
        press(app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal, "submission should return to Normal");
    }

    fn column_id(app: &App, index: usize) -> Uuid {
        app.board.column_at(index).expect("column exists").id
    }

    #[test]
    fn quit_keys_set_the_flag() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());

        let mut app = test_app();
        press_ctrl(&mut app, 'c');
        assert!(app.should_quit());
    }

    #[test]
    fn focus_navigation_clamps_at_boundaries() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.focused_column, 0);

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.focused_column, 2);

        press(&mut app, KeyCode::Left);
        assert_eq!(app.focused_column, 1);
    }

    #[test]
    fn create_roundtrip_yields_persisted_defaults() {
        let mut app = test_app();
        create_task(&mut app, "Buy milk");

        assert_eq!(app.board.task_count(), 1);
        let todo = column_id(&app, 0);
        let listed = app.db.list_tasks_by_column(todo).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Buy milk");
        assert_eq!(listed[0].description, "");
        assert_eq!(listed[0].priority, Priority::Low);
        assert_eq!(listed[0].position, 0);

        create_task(&mut app, "Second");
        let listed = app.db.list_tasks_by_column(todo).unwrap();
        assert_eq!(listed[1].title, "Second");
        assert_eq!(listed[1].position, 1);
    }

    #[test]
    fn empty_title_is_silently_rejected() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(app.edit_context, EditContext::Creating);
        assert_eq!(app.board.task_count(), 0);
        assert!(app.error.is_none());

        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(app.board.task_count(), 0);
    }

    #[test]
    fn escape_discards_unsaved_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "half-typed");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.edit_context, EditContext::None);
        assert_eq!(app.input.title.value(), "");
        assert_eq!(app.board.task_count(), 0);
    }

    #[test]
    fn tab_switches_the_focused_field() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "Title text");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Body text");
        press(&mut app, KeyCode::Enter);

        let tasks = app.db.list_tasks_by_board(app.board.board().id).unwrap();
        assert_eq!(tasks[0].title, "Title text");
        assert_eq!(tasks[0].description, "Body text");
    }

    #[test]
    fn move_right_reassigns_column_and_focus_follows() {
        let mut app = test_app();
        create_task(&mut app, "Movable");
        let in_progress = column_id(&app, 1);

        press(&mut app, KeyCode::Char('>'));

        assert_eq!(app.focused_column, 1, "focus should follow the task");
        let task = app.board.tasks_in_column(in_progress);
        assert_eq!(task.len(), 1);
        assert_eq!(task[0].title, "Movable");

        let stored = app.db.list_tasks_by_column(in_progress).unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn move_left_at_leftmost_is_a_noop() {
        let mut app = test_app();
        create_task(&mut app, "Stuck");
        press(&mut app, KeyCode::Char('<'));

        assert_eq!(app.focused_column, 0);
        assert_eq!(app.board.tasks_in_column(column_id(&app, 0)).len(), 1);
    }

    #[test]
    fn move_sequence_matches_store_replay() {
        let mut app = test_app();
        create_task(&mut app, "Wanderer");
        press(&mut app, KeyCode::Char('>'));
        press(&mut app, KeyCode::Char('>'));
        press(&mut app, KeyCode::Char('<'));

        // Projection task-to-column mapping equals what the store holds.
        let board_id = app.board.board().id;
        let stored = app.db.list_tasks_by_board(board_id).unwrap();
        assert_eq!(stored.len(), 1);
        let projected = app.board.task(stored[0].id.unwrap()).unwrap();
        assert_eq!(projected.status_column_id, stored[0].status_column_id);
        assert_eq!(projected.status_column_id, column_id(&app, 1));
        assert_eq!(app.focused_column, 1);
    }

    #[test]
    fn failed_move_leaves_projection_and_focus_untouched() {
        let mut app = test_app();
        create_task(&mut app, "Immovable");
        let before = app
            .board
            .tasks_in_column(column_id(&app, 0))
            .first()
            .map(|t| (*t).clone())
            .unwrap();

        app.db.sabotage_tasks_table();
        press(&mut app, KeyCode::Char('>'));

        assert!(app.error.is_some(), "failure must surface an error");
        assert_eq!(app.focused_column, 0, "focus must not change");
        let after = app.board.task(before.id.unwrap()).unwrap();
        assert_eq!(
            after.status_column_id, before.status_column_id,
            "column id must be identical to its pre-attempt value"
        );
        assert_eq!(*after, before);
    }

    #[test]
    fn delete_removes_from_projection_and_views() {
        let mut app = test_app();
        create_task(&mut app, "Doomed");
        let todo = column_id(&app, 0);

        press(&mut app, KeyCode::Char('d'));

        assert_eq!(app.board.task_count(), 0);
        assert!(app.board.tasks_in_column(todo).is_empty());
        assert!(app.column_views[0].visible_items().is_empty());
        assert!(app.db.list_tasks_by_column(todo).unwrap().is_empty());
    }

    #[test]
    fn failed_delete_keeps_task_visible() {
        let mut app = test_app();
        create_task(&mut app, "Survivor");
        app.db.sabotage_tasks_table();

        press(&mut app, KeyCode::Char('d'));

        assert!(app.error.is_some());
        assert_eq!(app.board.task_count(), 1);
        assert_eq!(app.column_views[0].visible_items().len(), 1);
    }

    #[test]
    fn edit_preserves_column_membership() {
        let mut app = test_app();
        create_task(&mut app, "Draft");
        press(&mut app, KeyCode::Char('>'));
        let in_progress = column_id(&app, 1);

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(app.input.title.value(), "Draft");

        for _ in 0.."Draft".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "Final");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        let stored = app.db.list_tasks_by_column(in_progress).unwrap();
        assert_eq!(stored.len(), 1, "task must stay in its column");
        assert_eq!(stored[0].title, "Final");
        let projected = app.board.task(stored[0].id.unwrap()).unwrap();
        assert_eq!(projected.title, "Final");
        assert_eq!(projected.status_column_id, in_progress);
    }

    #[test]
    fn edit_with_nothing_selected_is_a_noop() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.edit_context, EditContext::None);
    }

    #[test]
    fn failed_create_stays_in_insert_with_fields_intact() {
        let mut app = test_app();
        app.db.sabotage_tasks_table();

        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "Unsaved");
        press(&mut app, KeyCode::Enter);

        assert!(app.error.is_some());
        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(app.edit_context, EditContext::Creating);
        assert_eq!(app.input.title.value(), "Unsaved");
        assert_eq!(app.board.task_count(), 0);

        // Acknowledge the error; the overlay is still there for a retry.
        press(&mut app, KeyCode::Enter);
        assert!(app.error.is_none());
        assert_eq!(app.mode, Mode::Insert);
    }

    #[test]
    fn failed_edit_returns_to_normal_without_committing() {
        let mut app = test_app();
        create_task(&mut app, "Stable");
        let before = app.board.task_count();

        press(&mut app, KeyCode::Char('e'));
        app.db.sabotage_tasks_table();
        type_text(&mut app, " (edited)");
        press(&mut app, KeyCode::Enter);

        assert!(app.error.is_some());
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.edit_context, EditContext::None);
        assert_eq!(app.board.task_count(), before);
        let task = app.board.tasks_in_column(column_id(&app, 0));
        assert_eq!(task[0].title, "Stable", "projection keeps the old title");
    }

    #[test]
    fn insert_key_is_forwarded_while_filtering() {
        let mut app = test_app();
        create_task(&mut app, "item");

        press(&mut app, KeyCode::Char('/'));
        assert!(app.focused_view().unwrap().is_filtering());
        press(&mut app, KeyCode::Char('i'));

        assert_eq!(app.mode, Mode::Normal, "i belongs to the filter query");
        assert_eq!(app.focused_view().unwrap().filter_query(), Some("i"));
    }

    #[test]
    fn ctrl_c_quits_from_insert_discarding_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "never saved");
        press_ctrl(&mut app, 'c');

        assert!(app.should_quit());
        assert_eq!(app.board.task_count(), 0);
    }

    #[test]
    fn resize_keeps_layout_within_bounds() {
        let mut app = test_app();
        for viewport in [(120u16, 40u16), (37, 11), (9, 3)] {
            app.update(Message::Resize(viewport.0, viewport.1)).unwrap();

            let columns = app.board.columns().len() as u16;
            let total: u32 = app
                .column_views
                .iter()
                .map(|view| view.width() as u32)
                .sum();
            assert!(total <= viewport.0 as u32, "columns must fit the viewport");
            assert_eq!(app.layout.column_width, (viewport.0 / columns).saturating_sub(2));
            assert!(app.layout.column_height <= viewport.1);
            assert!(app.input.width <= viewport.0);
        }
    }

    #[test]
    fn error_state_swallows_board_keys_until_acknowledged() {
        let mut app = test_app();
        create_task(&mut app, "Guarded");
        app.db.sabotage_tasks_table();
        press(&mut app, KeyCode::Char('d'));
        assert!(app.error.is_some());

        // Board commands are ignored while the error is pending.
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.focused_column, 0);

        press(&mut app, KeyCode::Esc);
        assert!(app.error.is_none());
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.focused_column, 1);
    }

    #[test]
    fn title_char_limit_is_enforced_at_input_time() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        for _ in 0..150 {
            press(&mut app, KeyCode::Char('x'));
        }
        assert_eq!(app.input.title.value().chars().count(), TITLE_CHAR_LIMIT);
    }
}
