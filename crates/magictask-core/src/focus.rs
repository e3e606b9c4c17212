//! Focus mode: one incomplete task at a time.
//!
//! [`FocusCursor`] keeps its own snapshot of the active tasks. Completing a
//! task removes it from the snapshot instead of re-fetching the list, so the
//! cursor can drift from the store if something else edits tasks meanwhile.

use tracing::{info, warn};

use crate::error::StoreError;
use crate::storage::{AppStatePatch, AppStateStore, TaskStore};
use crate::task::{Task, TaskView};

/// What focus mode should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus<'a> {
    Task(&'a Task),
    /// No active task left. This is the normal way focus mode ends.
    Exhausted,
}

impl<'a> Focus<'a> {
    pub fn task(self) -> Option<&'a Task> {
        match self {
            Focus::Task(task) => Some(task),
            Focus::Exhausted => None,
        }
    }

    pub fn is_exhausted(self) -> bool {
        matches!(self, Focus::Exhausted)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusCursor {
    active: Vec<Task>,
    index: usize,
}

impl FocusCursor {
    /// Build the cursor from the full task list and the persisted selection.
    ///
    /// A selection that is set but no longer active starts the cursor at the
    /// first task and is cleared in the store. Failing to clear it is logged
    /// only.
    pub fn initialize(tasks: Vec<Task>, selected: Option<&str>, store: &dyn AppStateStore) -> Self {
        let active: Vec<Task> = tasks.into_iter().filter(|t| !t.completed).collect();
        let position = selected.and_then(|id| active.iter().position(|t| t.id == id));

        if let (Some(stale), None) = (selected, position) {
            info!(task_id = stale, "clearing stale focus selection");
            if let Err(e) = store.merge(&AppStatePatch::new().selected_task(None)) {
                warn!(error = %e, "failed to clear stale focus selection");
            }
        }

        Self {
            active,
            index: position.unwrap_or(0),
        }
    }

    pub fn current(&self) -> Focus<'_> {
        self.active.get(self.index).map_or(Focus::Exhausted, Focus::Task)
    }

    /// Complete the current task in the store, then drop it from the snapshot.
    ///
    /// The index stays put, so it now points at the next task.
    ///
    /// # Errors
    /// The store error is returned and the cursor does not move.
    pub fn complete_and_advance(&mut self, store: &dyn TaskStore) -> Result<Focus<'_>, StoreError> {
        let Some(task) = self.active.get(self.index) else {
            return Ok(Focus::Exhausted);
        };
        let done = store.complete(&task.id)?;
        self.active.retain(|t| t.id != done.id);
        Ok(self.current())
    }

    pub fn active_tasks(&self) -> &[Task] {
        &self.active
    }

    pub fn remaining(&self) -> usize {
        self.active.len().saturating_sub(self.index)
    }
}

/// Turn focus mode on, selecting the first incomplete task of `view`.
///
/// Returns the selected id, `None` when the view offers nothing to focus on.
pub fn enter_focus_mode(
    tasks: &[Task],
    view: TaskView,
    store: &dyn AppStateStore,
) -> Result<Option<String>, StoreError> {
    let selected = view.focus_candidates(tasks).first().map(|t| t.id.clone());
    store.merge(
        &AppStatePatch::new()
            .focus_mode(true)
            .selected_task(selected.as_deref()),
    )?;
    Ok(selected)
}

pub fn exit_focus_mode(store: &dyn AppStateStore) -> Result<(), StoreError> {
    store.merge(&AppStatePatch::new().focus_mode(false).selected_task(None))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use crate::task::NewTask;

    fn seeded(titles: &[&str]) -> (Database, Vec<Task>) {
        let db = Database::open_memory().unwrap();
        let tasks = titles
            .iter()
            .map(|t| db.create(&NewTask::new(*t)).unwrap())
            .collect();
        (db, tasks)
    }

    fn title(focus: Focus<'_>) -> Option<&str> {
        focus.task().map(|t| t.title.as_str())
    }

    #[test]
    fn completes_through_to_exhaustion() {
        let (db, tasks) = seeded(&["A", "B", "C"]);
        let mut cursor = FocusCursor::initialize(tasks, None, &db);
        assert_eq!(title(cursor.current()), Some("A"));

        assert_eq!(title(cursor.complete_and_advance(&db).unwrap()), Some("B"));
        assert_eq!(title(cursor.complete_and_advance(&db).unwrap()), Some("C"));
        assert!(cursor.complete_and_advance(&db).unwrap().is_exhausted());
        assert!(cursor.complete_and_advance(&db).unwrap().is_exhausted());
        assert!(db.list().unwrap().iter().all(|t| t.completed));
    }

    #[test]
    fn starts_at_persisted_selection() {
        let (db, tasks) = seeded(&["A", "B", "C"]);
        let b = tasks[1].id.clone();
        let cursor = FocusCursor::initialize(tasks, Some(b.as_str()), &db);
        assert_eq!(title(cursor.current()), Some("B"));
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn last_task_completion_exhausts_even_with_earlier_tasks() {
        let (db, tasks) = seeded(&["A", "B"]);
        let b = tasks[1].id.clone();
        let mut cursor = FocusCursor::initialize(tasks, Some(b.as_str()), &db);
        assert!(cursor.complete_and_advance(&db).unwrap().is_exhausted());
        assert_eq!(cursor.active_tasks().len(), 1);
    }

    #[test]
    fn stale_selection_falls_back_and_is_cleared() {
        let (db, _) = seeded(&["A", "B"]);
        let a_id = db.list().unwrap()[0].id.clone();
        db.complete(&a_id).unwrap();
        db.merge(&AppStatePatch::new().selected_task(Some(a_id.as_str()))).unwrap();

        let cursor = FocusCursor::initialize(db.list().unwrap(), Some(a_id.as_str()), &db);
        assert_eq!(title(cursor.current()), Some("B"));
        assert!(db.read().unwrap().selected_task_id.is_none());
    }

    #[test]
    fn empty_list_is_exhausted() {
        let db = Database::open_memory().unwrap();
        let cursor = FocusCursor::initialize(Vec::new(), None, &db);
        assert!(cursor.current().is_exhausted());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn failed_completion_does_not_advance() {
        let (db, tasks) = seeded(&["A", "B"]);
        let a_id = tasks[0].id.clone();
        let mut cursor = FocusCursor::initialize(tasks, None, &db);
        db.delete(&a_id).unwrap();

        assert!(matches!(
            cursor.complete_and_advance(&db),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(title(cursor.current()), Some("A"));
    }

    #[test]
    fn enter_selects_first_candidate_and_exit_clears() {
        let (db, tasks) = seeded(&["A", "B"]);
        db.complete(&tasks[0].id).unwrap();
        let tasks = db.list().unwrap();

        let selected = enter_focus_mode(&tasks, TaskView::All, &db).unwrap();
        assert_eq!(selected.as_deref(), Some(tasks[1].id.as_str()));
        let state = db.read().unwrap();
        assert!(state.focus_mode);
        assert_eq!(state.selected_task_id, selected);

        exit_focus_mode(&db).unwrap();
        let state = db.read().unwrap();
        assert!(!state.focus_mode);
        assert!(state.selected_task_id.is_none());
    }

    #[test]
    fn enter_from_completed_view_selects_nothing() {
        let (db, tasks) = seeded(&["A"]);
        assert_eq!(enter_focus_mode(&tasks, TaskView::Completed, &db).unwrap(), None);
        assert!(db.read().unwrap().focus_mode);
    }
}
