//! Integration tests for focus mode over the SQLite store.

use magictask_core::{
    enter_focus_mode, exit_focus_mode, AppStateStore, Database, Effort, FocusCursor, NewTask,
    TaskStore, TaskView,
};

fn seed(db: &Database) {
    db.create(&NewTask::new("Write report").urgent()).unwrap();
    db.create(&NewTask::new("Review PR").with_effort(Effort::new(2).unwrap()))
        .unwrap();
    db.create(&NewTask::new("Book flights")).unwrap();
}

#[test]
fn focus_session_walks_every_active_task() {
    let db = Database::open_memory().unwrap();
    seed(&db);

    let tasks = db.list().unwrap();
    let selected = enter_focus_mode(&tasks, TaskView::Active, &db).unwrap();
    assert_eq!(selected.as_deref(), Some(tasks[0].id.as_str()));

    let state = db.read().unwrap();
    let mut cursor = FocusCursor::initialize(tasks, state.selected_task_id.as_deref(), &db);

    let mut seen = Vec::new();
    while let Some(task) = cursor.current().task() {
        seen.push(task.title.clone());
        cursor.complete_and_advance(&db).unwrap();
    }
    assert_eq!(seen, ["Write report", "Review PR", "Book flights"]);
    assert!(cursor.current().is_exhausted());

    let completed = TaskView::Completed.filter(&db.list().unwrap()).len();
    assert_eq!(completed, 3);

    exit_focus_mode(&db).unwrap();
    let state = db.read().unwrap();
    assert!(!state.focus_mode);
    assert!(state.selected_task_id.is_none());
}

#[test]
fn resumes_from_selection_written_on_entry() {
    let db = Database::open_memory().unwrap();
    seed(&db);
    let tasks = db.list().unwrap();
    db.complete(&tasks[0].id).unwrap();

    let tasks = db.list().unwrap();
    enter_focus_mode(&tasks, TaskView::All, &db).unwrap();
    let selected = db.read().unwrap().selected_task_id;
    assert_eq!(selected.as_deref(), Some(tasks[1].id.as_str()));

    let cursor = FocusCursor::initialize(tasks, selected.as_deref(), &db);
    assert_eq!(cursor.current().task().map(|t| t.title.as_str()), Some("Review PR"));
    assert_eq!(cursor.active_tasks().len(), 2);
}

#[test]
fn selection_completed_elsewhere_is_cleared() {
    let db = Database::open_memory().unwrap();
    seed(&db);
    let tasks = db.list().unwrap();
    enter_focus_mode(&tasks, TaskView::Active, &db).unwrap();

    // Another front end completes the selected task.
    db.complete(&tasks[0].id).unwrap();

    let state = db.read().unwrap();
    let cursor = FocusCursor::initialize(
        db.list().unwrap(),
        state.selected_task_id.as_deref(),
        &db,
    );
    assert_eq!(cursor.current().task().map(|t| t.title.as_str()), Some("Review PR"));

    let state = db.read().unwrap();
    assert!(state.selected_task_id.is_none());
    assert!(state.focus_mode);
}
