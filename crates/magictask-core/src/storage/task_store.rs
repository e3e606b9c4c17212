use crate::error::StoreError;
use crate::task::{NewTask, Subtask, SubtaskPatch, Task, TaskPatch};

/// Task and subtask persistence.
///
/// `list` returns tasks in creation order. Lookups by id fail with
/// [`StoreError::NotFound`].
pub trait TaskStore: Send + Sync {
    fn list(&self) -> Result<Vec<Task>, StoreError>;

    fn get(&self, id: &str) -> Result<Task, StoreError>;

    fn create(&self, task: &NewTask) -> Result<Task, StoreError>;

    fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError>;

    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Mark complete, stamping `completed_at`. Completing an already
    /// completed task returns it unchanged.
    fn complete(&self, id: &str) -> Result<Task, StoreError>;

    /// Reopen a task and clear `completed_at`.
    fn uncomplete(&self, id: &str) -> Result<Task, StoreError>;

    fn add_subtask(&self, task_id: &str, title: &str) -> Result<Subtask, StoreError>;

    fn update_subtask(
        &self,
        task_id: &str,
        subtask_id: &str,
        patch: &SubtaskPatch,
    ) -> Result<Subtask, StoreError>;

    fn delete_subtask(&self, task_id: &str, subtask_id: &str) -> Result<(), StoreError>;
}
