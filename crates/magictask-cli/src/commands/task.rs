//! Task management commands for CLI.

use clap::Subcommand;
use magictask_core::{AppStateStore, Effort, NewTask, TaskPatch, TaskStore, TaskView, Urgency};

use super::open_database;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Mark as urgent
        #[arg(long)]
        urgent: bool,
        /// Effort 1-3 (default: 1)
        #[arg(long, default_value = "1")]
        effort: u8,
    },
    /// List tasks
    List {
        /// active, completed or all (default: the current view)
        #[arg(long)]
        view: Option<String>,
    },
    /// Get task details
    Show {
        /// Task ID
        id: String,
    },
    /// Update a task
    Edit {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New urgency (0 or 1)
        #[arg(long)]
        urgency: Option<u8>,
        /// New effort (1-3)
        #[arg(long)]
        effort: Option<u8>,
        /// Hide or show subtasks in lists
        #[arg(long)]
        collapsed: Option<bool>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Mark a task complete
    Complete {
        /// Task ID
        id: String,
    },
    /// Reopen a completed task
    Uncomplete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database()?;

    match action {
        TaskAction::Add {
            title,
            urgent,
            effort,
        } => {
            let mut new = NewTask::new(title).with_effort(Effort::new(effort)?);
            if urgent {
                new = new.urgent();
            }
            let task = db.create(&new)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { view } => {
            let view = match view {
                Some(v) => v.parse::<TaskView>()?,
                None => db.read()?.current_view,
            };
            let tasks = db.list()?;
            let visible = view.filter(&tasks);
            if visible.is_empty() {
                println!("{}", view.empty_message());
            } else {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            }
        }
        TaskAction::Show { id } => {
            let task = db.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Edit {
            id,
            title,
            urgency,
            effort,
            collapsed,
        } => {
            let patch = TaskPatch {
                title,
                urgency: urgency.map(Urgency::try_from).transpose()?,
                effort: effort.map(Effort::new).transpose()?,
                collapsed,
            };
            let task = db.update(&id, &patch)?;
            println!("Task updated:");
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            db.delete(&id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Complete { id } => {
            let task = db.complete(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Uncomplete { id } => {
            let task = db.uncomplete(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }
    Ok(())
}
