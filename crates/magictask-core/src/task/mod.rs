//! Task and subtask model.
//!
//! Tasks are owned by the [`TaskStore`](crate::storage::TaskStore); the rest
//! of the crate treats them as read-mostly values.

mod view;

pub use view::TaskView;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Urgency flag, stored as `0` (normal) or `1` (urgent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Urgency {
    #[default]
    Normal,
    Urgent,
}

impl TryFrom<u8> for Urgency {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Urgency::Normal),
            1 => Ok(Urgency::Urgent),
            other => Err(ValidationError::InvalidUrgency(other)),
        }
    }
}

impl From<Urgency> for u8 {
    fn from(value: Urgency) -> Self {
        match value {
            Urgency::Normal => 0,
            Urgency::Urgent => 1,
        }
    }
}

/// Effort estimate from 1 (small) to 3 (large).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Effort(u8);

impl Effort {
    pub const MIN: Effort = Effort(1);
    pub const MAX: Effort = Effort(3);

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        Self::try_from(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Effort {
    fn default() -> Self {
        Effort::MIN
    }
}

impl TryFrom<u8> for Effort {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Effort(value))
        } else {
            Err(ValidationError::InvalidEffort(value))
        }
    }
}

impl From<Effort> for u8 {
    fn from(value: Effort) -> Self {
        value.0
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub effort: Effort,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Subtasks hidden in list views.
    #[serde(default)]
    pub collapsed: bool,
}

impl Task {
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// `(done, total)` subtask counts.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub effort: Effort,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn urgent(mut self) -> Self {
        self.urgency = Urgency::Urgent;
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = effort;
        self
    }

    /// Trimmed title, or an error if it is blank.
    pub fn validated_title(&self) -> Result<String, ValidationError> {
        non_blank(&self.title, "Task")
    }
}

/// Changes to an existing task. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Effort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl TaskPatch {
    /// Apply to `task`.
    ///
    /// # Errors
    /// Returns an error if the patch is empty or sets a blank title.
    pub fn apply(&self, task: &mut Task) -> Result<(), ValidationError> {
        if *self == TaskPatch::default() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(title) = &self.title {
            task.title = non_blank(title, "Task")?;
        }
        if let Some(urgency) = self.urgency {
            task.urgency = urgency;
        }
        if let Some(effort) = self.effort {
            task.effort = effort;
        }
        if let Some(collapsed) = self.collapsed {
            task.collapsed = collapsed;
        }
        Ok(())
    }
}

/// Changes to an existing subtask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl SubtaskPatch {
    /// Apply to `subtask`, stamping `completed_at` on the first completion
    /// and clearing it when reopened.
    pub fn apply(&self, subtask: &mut Subtask, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if *self == SubtaskPatch::default() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(title) = &self.title {
            subtask.title = non_blank(title, "Subtask")?;
        }
        if let Some(completed) = self.completed {
            if completed && !subtask.completed {
                subtask.completed_at = Some(now);
            } else if !completed {
                subtask.completed_at = None;
            }
            subtask.completed = completed;
        }
        Ok(())
    }
}

pub(crate) fn non_blank(title: &str, kind: &'static str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyTitle(kind))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Fresh identifier in the store's format (32 hex chars).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
