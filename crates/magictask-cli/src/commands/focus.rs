//! Focus mode commands for CLI.
//!
//! Each invocation rebuilds the cursor from the stored selection, and `done`
//! writes the next task back as the selection.

use clap::Subcommand;
use magictask_core::{
    enter_focus_mode, exit_focus_mode, AppStatePatch, AppStateStore, Database, Focus,
    FocusCursor, TaskStore, TaskView,
};

use super::open_database;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Turn focus mode on and select the first active task
    Enter {
        /// View to pick from (default: the current view)
        #[arg(long)]
        view: Option<String>,
    },
    /// Show the task in focus
    Show,
    /// Complete the task in focus and move to the next one
    Done,
    /// Turn focus mode off
    Exit,
}

fn cursor(db: &Database) -> Result<FocusCursor, Box<dyn std::error::Error>> {
    let state = db.read()?;
    if !state.focus_mode {
        return Err("focus mode is off; run `magictask focus enter` first".into());
    }
    Ok(FocusCursor::initialize(
        db.list()?,
        state.selected_task_id.as_deref(),
        db,
    ))
}

fn print_focus(focus: Focus<'_>) -> Result<(), Box<dyn std::error::Error>> {
    match focus {
        Focus::Task(task) => println!("{}", serde_json::to_string_pretty(task)?),
        Focus::Exhausted => println!("All tasks complete!"),
    }
    Ok(())
}

pub fn run(action: FocusAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database()?;

    match action {
        FocusAction::Enter { view } => {
            let view = match view {
                Some(v) => v.parse::<TaskView>()?,
                None => db.read()?.current_view,
            };
            match enter_focus_mode(&db.list()?, view, &db)? {
                Some(id) => print_focus(Focus::Task(&db.get(&id)?))?,
                None => println!("No active tasks to focus on."),
            }
        }
        FocusAction::Show => {
            let cursor = cursor(&db)?;
            print_focus(cursor.current())?;
        }
        FocusAction::Done => {
            let mut cursor = cursor(&db)?;
            let next = cursor.complete_and_advance(&db)?;
            let next_id = next.task().map(|t| t.id.clone());
            db.merge(&AppStatePatch::new().selected_task(next_id.as_deref()))?;
            print_focus(next)?;
        }
        FocusAction::Exit => {
            exit_focus_mode(&db)?;
            println!("Focus mode off.");
        }
    }
    Ok(())
}
