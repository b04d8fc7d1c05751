use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use kanban_tui::app::{App, Message, Mode};
use kanban_tui::db::Database;
use kanban_tui::theme::{Theme, ThemePreset};

fn open_app(db_path: &std::path::Path) -> Result<App> {
    let db = Database::open(db_path)?;
    App::new(db, Theme::from_preset(ThemePreset::Default))
}

fn press(app: &mut App, code: KeyCode) {
    app.update(Message::Key(KeyEvent::new(code, KeyModifiers::empty())))
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
    assert_eq!(app.mode, Mode::Normal);
}

#[test]
fn board_state_survives_process_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("kanban.sqlite");

    {
        let mut app = open_app(&db_path)?;
        create_task(&mut app, "Write release notes");
        create_task(&mut app, "Tag the release");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('>'));
    }

    let app = open_app(&db_path)?;
    assert_eq!(app.board.task_count(), 2);

    let todo = app.board.column_at(0).expect("todo column").id;
    let in_progress = app.board.column_at(1).expect("in progress column").id;
    let todo_titles: Vec<&str> = app
        .board
        .tasks_in_column(todo)
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(todo_titles, vec!["Write release notes"]);
    let moved = app.board.tasks_in_column(in_progress);
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].title, "Tag the release");

    Ok(())
}

#[test]
fn full_task_lifecycle_through_key_messages() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("kanban.sqlite");
    let mut app = open_app(&db_path)?;

    create_task(&mut app, "Draft proposal");

    // Edit the title in place.
    press(&mut app, KeyCode::Char('e'));
    assert_eq!(app.mode, Mode::Insert);
    for _ in 0.."Draft proposal".len() {
        press(&mut app, KeyCode::Backspace);
    }
    type_text(&mut app, "Final proposal");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "ready for review");
    press(&mut app, KeyCode::Enter);

    // Walk it across the board and back one step.
    press(&mut app, KeyCode::Char('>'));
    press(&mut app, KeyCode::Char('>'));
    press(&mut app, KeyCode::Char('<'));
    assert_eq!(app.focused_column, 1);

    let in_progress = app.board.column_at(1).expect("in progress column").id;
    let stored = app.db.list_tasks_by_column(in_progress)?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Final proposal");
    assert_eq!(stored[0].description, "ready for review");

    // Delete it and verify nothing lingers anywhere.
    press(&mut app, KeyCode::Char('d'));
    assert_eq!(app.board.task_count(), 0);
    assert!(app.db.list_tasks_by_board(app.board.board().id)?.is_empty());

    Ok(())
}

#[test]
fn projection_always_matches_the_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("kanban.sqlite");
    let mut app = open_app(&db_path)?;

    create_task(&mut app, "alpha");
    create_task(&mut app, "beta");
    press(&mut app, KeyCode::Char('>'));
    app.focused_column = 0;
    create_task(&mut app, "gamma");
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char('>'));
    press(&mut app, KeyCode::Char('>'));

    let board_id = app.board.board().id;
    let stored = app.db.list_tasks_by_board(board_id)?;
    assert_eq!(stored.len(), 3);
    for task in &stored {
        let projected = app
            .board
            .task(task.id.expect("persisted task has id"))
            .expect("every stored task is projected");
        assert_eq!(projected.status_column_id, task.status_column_id);
        assert_eq!(projected.title, task.title);
        assert_eq!(projected.position, task.position);
    }
    assert_eq!(app.board.task_count(), stored.len());

    Ok(())
}
