use clap::Subcommand;
use magictask_core::{SubtaskPatch, TaskStore};

use super::open_database;

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Add a subtask to a task
    Add {
        /// Parent task ID
        task_id: String,
        /// Subtask title
        title: String,
    },
    /// Rename or (un)complete a subtask
    Edit {
        /// Parent task ID
        task_id: String,
        /// Subtask ID
        subtask_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Set completed status
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a subtask
    Delete {
        /// Parent task ID
        task_id: String,
        /// Subtask ID
        subtask_id: String,
    },
}

pub fn run(action: SubtaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database()?;

    match action {
        SubtaskAction::Add { task_id, title } => {
            let subtask = db.add_subtask(&task_id, &title)?;
            println!("Subtask created: {}", subtask.id);
            println!("{}", serde_json::to_string_pretty(&subtask)?);
        }
        SubtaskAction::Edit {
            task_id,
            subtask_id,
            title,
            completed,
        } => {
            let patch = SubtaskPatch { title, completed };
            let subtask = db.update_subtask(&task_id, &subtask_id, &patch)?;
            println!("{}", serde_json::to_string_pretty(&subtask)?);
        }
        SubtaskAction::Delete {
            task_id,
            subtask_id,
        } => {
            db.delete_subtask(&task_id, &subtask_id)?;
            println!("Subtask deleted: {subtask_id}");
        }
    }
    Ok(())
}
