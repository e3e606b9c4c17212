use serde::{Deserialize, Serialize};

use super::Task;
use crate::error::ValidationError;

/// Which tasks a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskView {
    #[default]
    Active,
    Completed,
    All,
}

impl TaskView {
    pub fn includes(self, task: &Task) -> bool {
        match self {
            TaskView::Active => !task.completed,
            TaskView::Completed => task.completed,
            TaskView::All => true,
        }
    }

    /// Tasks visible in this view, in store order.
    pub fn filter(self, tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().filter(|t| self.includes(t)).collect()
    }

    /// Tasks focus mode may pick from when entered from this view.
    pub fn focus_candidates(self, tasks: &[Task]) -> Vec<&Task> {
        match self {
            TaskView::Active | TaskView::All => tasks.iter().filter(|t| !t.completed).collect(),
            TaskView::Completed => Vec::new(),
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            TaskView::Active => "No active tasks. Add one or check other views!",
            TaskView::Completed => "No completed tasks yet.",
            TaskView::All => "No tasks at all. Add one!",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskView::Active => "active",
            TaskView::Completed => "completed",
            TaskView::All => "all",
        }
    }
}

impl std::str::FromStr for TaskView {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TaskView::Active),
            "completed" => Ok(TaskView::Completed),
            "all" => Ok(TaskView::All),
            other => Err(ValidationError::InvalidValue {
                field: "view".into(),
                message: format!("unknown view '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{new_id, Effort, Urgency};
    use chrono::Utc;

    fn task(title: &str, completed: bool) -> Task {
        Task {
            id: new_id(),
            title: title.into(),
            urgency: Urgency::Normal,
            effort: Effort::default(),
            completed,
            created_at: Utc::now(),
            completed_at: None,
            subtasks: Vec::new(),
            collapsed: false,
        }
    }

    #[test]
    fn filters_preserve_order() {
        let tasks = vec![task("a", false), task("b", true), task("c", false)];
        let titles = |v: Vec<&Task>| v.iter().map(|t| t.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(TaskView::Active.filter(&tasks)), vec!["a", "c"]);
        assert_eq!(titles(TaskView::Completed.filter(&tasks)), vec!["b"]);
        assert_eq!(titles(TaskView::All.filter(&tasks)), vec!["a", "b", "c"]);
    }

    #[test]
    fn all_view_focus_candidates_skip_completed() {
        let tasks = vec![task("a", true), task("b", false)];
        let candidates = TaskView::All.focus_candidates(&tasks);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "b");
        assert!(TaskView::Completed.focus_candidates(&tasks).is_empty());
    }

    #[test]
    fn parses_view_names() {
        assert_eq!("completed".parse::<TaskView>().unwrap(), TaskView::Completed);
        assert!("archived".parse::<TaskView>().is_err());
    }
}
