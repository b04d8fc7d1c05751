//! Per-column rendering adapter state: a derived, disposable list of items
//! with selection, scrolling and substring-filter entry. Rebuilt from the
//! board projection after every mutation.

use crossterm::event::{KeyCode, KeyEvent};
use uuid::Uuid;

use crate::types::{Priority, Task};

/// Terminal rows a single task entry occupies (title, detail, separator).
const ROWS_PER_TASK: usize = 3;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ColumnItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl ColumnItem {
    pub fn from_task(task: &Task) -> Option<Self> {
        Some(Self {
            id: task.id?,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
enum FilterState {
    #[default]
    Idle,
    /// Query text is being typed; ordinary keys belong to the filter.
    Editing(String),
    Applied(String),
}

#[derive(Debug, Default)]
pub struct ColumnView {
    items: Vec<ColumnItem>,
    selected: usize,
    scroll_offset: usize,
    viewport_rows: usize,
    width: u16,
    height: u16,
    filter: FilterState,
}

impl ColumnView {
    pub fn new() -> Self {
        Self {
            viewport_rows: 1,
            ..Self::default()
        }
    }

    /// Replaces the derived item list. Selection and scroll are clamped so a
    /// shrinking list never leaves them dangling.
    pub fn set_items(&mut self, items: Vec<ColumnItem>) {
        self.items = items;
        self.clamp_selection();
        self.ensure_selected_visible();
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let inner_rows = height.saturating_sub(2) as usize;
        self.viewport_rows = (inner_rows / ROWS_PER_TASK).max(1);
        self.clamp_scroll_offset();
        self.ensure_selected_visible();
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Items matching the active filter, in position order.
    pub fn visible_items(&self) -> Vec<&ColumnItem> {
        match self.filter_query() {
            None => self.items.iter().collect(),
            Some(query) => {
                let needle = query.to_lowercase();
                self.items
                    .iter()
                    .filter(|item| item.title.to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_task_id(&self) -> Option<Uuid> {
        self.visible_items().get(self.selected).map(|item| item.id)
    }

    /// True only while the query is being typed, not once it is applied.
    pub fn is_filtering(&self) -> bool {
        matches!(self.filter, FilterState::Editing(_))
    }

    pub fn filter_query(&self) -> Option<&str> {
        match &self.filter {
            FilterState::Idle => None,
            FilterState::Editing(query) | FilterState::Applied(query) => Some(query),
        }
    }

    /// Handles a key the controller does not interpret itself. Returns
    /// whether the key was consumed.
    pub fn handle_raw_input(&mut self, key: KeyEvent) -> bool {
        if let FilterState::Editing(query) = &mut self.filter {
            match key.code {
                KeyCode::Esc => {
                    self.filter = FilterState::Idle;
                    self.clamp_selection();
                    self.ensure_selected_visible();
                }
                KeyCode::Enter => {
                    let query = query.clone();
                    self.filter = if query.is_empty() {
                        FilterState::Idle
                    } else {
                        FilterState::Applied(query)
                    };
                    self.clamp_selection();
                    self.ensure_selected_visible();
                }
                KeyCode::Backspace => {
                    query.pop();
                    self.clamp_selection();
                }
                KeyCode::Char(ch) => {
                    query.push(ch);
                    self.clamp_selection();
                }
                _ => return false,
            }
            return true;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_by(1),
            KeyCode::PageUp => self.move_selection_by(-(self.viewport_rows as isize)),
            KeyCode::PageDown => self.move_selection_by(self.viewport_rows as isize),
            KeyCode::Char('/') => {
                let existing = self.filter_query().unwrap_or_default().to_string();
                self.filter = FilterState::Editing(existing);
                true
            }
            KeyCode::Esc => {
                if matches!(self.filter, FilterState::Applied(_)) {
                    self.filter = FilterState::Idle;
                    self.clamp_selection();
                    self.ensure_selected_visible();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn move_selection_by(&mut self, delta: isize) -> bool {
        let visible = self.visible_items().len();
        if visible == 0 {
            return false;
        }

        let max_index = (visible - 1) as isize;
        let next = (self.selected as isize + delta).clamp(0, max_index) as usize;
        if next == self.selected {
            return true;
        }

        self.selected = next;
        self.ensure_selected_visible();
        true
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible_items().len();
        if visible == 0 {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(visible - 1);
        }
    }

    fn max_scroll_offset(&self) -> usize {
        self.visible_items().len().saturating_sub(self.viewport_rows)
    }

    fn clamp_scroll_offset(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    fn ensure_selected_visible(&mut self) {
        if self.visible_items().is_empty() {
            self.scroll_offset = 0;
            return;
        }

        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else {
            let visible_end = self.scroll_offset + self.viewport_rows;
            if self.selected >= visible_end {
                self.scroll_offset = self.selected + 1 - self.viewport_rows;
            }
        }
        self.clamp_scroll_offset();
    }
}
