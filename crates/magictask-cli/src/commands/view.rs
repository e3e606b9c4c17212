use magictask_core::{AppStatePatch, AppStateStore, TaskStore, TaskView, Urgency};

use super::open_database;

/// Switch the persisted view when one is given, then list it.
pub fn run(view: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database()?;

    let view = match view {
        Some(name) => {
            let view = name.parse::<TaskView>()?;
            db.merge(&AppStatePatch::new().current_view(view))?;
            view
        }
        None => db.read()?.current_view,
    };

    let tasks = db.list()?;
    let visible = view.filter(&tasks);
    println!("View: {}", view.as_str());
    if visible.is_empty() {
        println!("{}", view.empty_message());
        return Ok(());
    }
    for task in visible {
        let mark = if task.completed { "x" } else { " " };
        let (done, total) = task.subtask_progress();
        let urgent = if task.urgency == Urgency::Urgent { " !" } else { "" };
        if total > 0 {
            println!(
                "[{mark}] {} {}{urgent} (effort {}, {done}/{total})",
                task.id, task.title, task.effort
            );
        } else {
            println!("[{mark}] {} {}{urgent} (effort {})", task.id, task.title, task.effort);
        }
        if !task.collapsed {
            for sub in &task.subtasks {
                let mark = if sub.completed { "x" } else { " " };
                println!("    [{mark}] {} {}", sub.id, sub.title);
            }
        }
    }
    Ok(())
}
